//! Attachment storage configuration.
//!
//! The root directory for stored attachments comes from `ATTACHMENT_DIR` and falls back
//! to `data/attachments`.

use std::path::PathBuf;

/// Gets the attachment root directory from the environment.
#[must_use]
pub fn get_attachment_root() -> PathBuf {
    std::env::var("ATTACHMENT_DIR")
        .map_or_else(|_| PathBuf::from("data/attachments"), PathBuf::from)
}
