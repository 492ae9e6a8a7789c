// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staging of attachment payloads on disk.
//!
//! Every attachment is written to its own randomly-named file in the staging
//! directory. Writes happen on the tokio runtime while events continue to be
//! processed; the returned [`PendingAttachment`] is joined later, when the
//! owning instance finishes or the run ends.

use crate::{
    errors::AttachmentWriteError,
    messages::{Attachment, ContentEncoding},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use camino::{Utf8Path, Utf8PathBuf};
use casetally_metadata::AttachmentRef;
use rand::{RngExt, distr::StandardUniform};
use tokio::task::JoinHandle;

/// Writes attachment payloads into a staging directory.
#[derive(Clone, Debug)]
pub struct AttachmentStager {
    dir: Utf8PathBuf,
}

impl AttachmentStager {
    /// Creates a stager that writes into `dir`.
    ///
    /// The directory must already exist.
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the staging directory.
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Begins writing an attachment's payload to a fresh file.
    ///
    /// Must be called from within a tokio runtime. The path is chosen
    /// up front; the write itself completes in the background.
    pub fn stage(&self, attachment: &Attachment) -> PendingAttachment {
        let path = self.dir.join(random_file_name(&attachment.media_type));
        let body = attachment.body.clone();
        let encoding = attachment.content_encoding;

        let task_path = path.clone();
        let handle = tokio::spawn(async move { write_payload(task_path, body, encoding).await });

        PendingAttachment { path, handle }
    }
}

async fn write_payload(
    path: Utf8PathBuf,
    body: String,
    encoding: ContentEncoding,
) -> Result<(), AttachmentWriteError> {
    let bytes = match encoding {
        ContentEncoding::Identity => body.into_bytes(),
        ContentEncoding::Base64 => match STANDARD.decode(&body) {
            Ok(bytes) => bytes,
            Err(error) => return Err(AttachmentWriteError::Decode { path, error }),
        },
    };

    match tokio::fs::write(&path, bytes).await {
        Ok(()) => Ok(()),
        Err(error) => Err(AttachmentWriteError::Write { path, error }),
    }
}

/// An attachment whose write may still be in progress.
#[derive(Debug)]
pub struct PendingAttachment {
    path: Utf8PathBuf,
    handle: JoinHandle<Result<(), AttachmentWriteError>>,
}

impl PendingAttachment {
    /// The path the attachment is being written to.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Waits for the write to complete.
    pub async fn wait(self) -> Result<AttachmentRef, AttachmentWriteError> {
        match self.handle.await {
            Ok(Ok(())) => Ok(AttachmentRef { path: self.path }),
            Ok(Err(error)) => Err(error),
            Err(error) => Err(AttachmentWriteError::Join {
                path: self.path,
                error,
            }),
        }
    }
}

fn random_file_name(media_type: &str) -> String {
    let bytes: [u8; 20] = rand::rng().sample(StandardUniform);
    format!("{}.{}", hex::encode(bytes), extension_for(media_type))
}

/// Returns the file extension for a media type, ignoring any parameters.
///
/// Unknown media types get `bin`.
pub fn extension_for(media_type: &str) -> &'static str {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "text/plain" => "txt",
        "text/x.cucumber.log+plain" => "log",
        "text/html" => "html",
        "text/css" => "css",
        "text/csv" => "csv",
        "text/markdown" => "md",
        "text/xml" | "application/xml" => "xml",
        "text/javascript" | "application/javascript" => "js",
        "application/json" => "json",
        "application/pdf" => "pdf",
        "application/zip" => "zip",
        "application/gzip" => "gz",
        "image/png" => "png",
        "image/jpeg" => "jpeg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        "image/svg+xml" => "svg",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        _ => "bin",
    }
}
