//! Avatar upload to the Cloudinary image host.

use std::io::Write;

use cloudinary::upload::{Source, Upload, UploadOptions};
use sha1::{Digest, Sha1};
use tempfile::NamedTempFile;

use crate::config::Cloudinary as CloudinaryConfig;
use crate::error::{Result, ServerError};

/// Accepted avatar media types.
pub const ALLOWED_IMAGE_TYPES: [&str; 3] =
    ["image/jpeg", "image/png", "image/gif"];

/// Avatar size limit, 5 MiB.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Image host manager. Without credentials every upload is rejected.
#[derive(Clone, Default)]
pub struct ImageHost {
    credentials: Option<CloudinaryConfig>,
}

impl ImageHost {
    /// Create a new [`ImageHost`].
    pub fn new(credentials: Option<CloudinaryConfig>) -> Self {
        Self { credentials }
    }

    /// Upload an image buffer, returning its public URL.
    ///
    /// The buffer hash is the public ID, so re-uploading identical bytes is
    /// idempotent on the host side.
    pub async fn upload(&self, buffer: &[u8]) -> Result<String> {
        let Some(credentials) = &self.credentials else {
            return Err(ServerError::Internal {
                details: "image host is not configured".into(),
                source: None,
            });
        };

        let hash = hex::encode(Sha1::digest(buffer));

        let options = UploadOptions::new().set_public_id(hash.clone());
        let upload = Upload::new(
            credentials.key.clone(),
            credentials.cloud_name.clone(),
            credentials.secret.clone(),
        );

        // The host API wants a file path, so spill the buffer to a
        // temporary file first.
        let mut temp_file = NamedTempFile::new()
            .map_err(|err| ServerError::internal("tempfile failed", err))?;
        temp_file
            .write_all(buffer)
            .map_err(|err| ServerError::internal("tempfile write failed", err))?;
        let path_buf = temp_file.path().to_path_buf();

        upload
            .image(Source::Path(path_buf), &options)
            .await
            .map_err(|err| ServerError::Internal {
                details: format!("image upload failed: {err}"),
                source: None,
            })?;

        tracing::debug!(public_id = %hash, "avatar uploaded");

        Ok(format!(
            "https://res.cloudinary.com/{}/image/upload/{}",
            credentials.cloud_name, hash
        ))
    }
}
