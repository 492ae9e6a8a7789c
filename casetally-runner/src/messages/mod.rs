// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding of the Cucumber message stream.
//!
//! The stream is newline-delimited JSON with one message per line, each an
//! object with a single key naming the message kind. See [`Envelope`].

mod envelope;
mod types;

pub use envelope::*;
pub use types::*;
