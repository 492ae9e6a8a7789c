// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporter configuration.
//!
//! Configuration is read from a TOML file, by default
//! [`.config/casetally.toml`](DEFAULT_CONFIG_PATH), and then overridden by
//! `CASETALLY_*` environment variables.

mod imp;

pub use imp::*;
