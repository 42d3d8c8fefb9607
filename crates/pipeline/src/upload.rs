//! Asset upload step.
//!
//! Client-side constraints are enforced first: constraint violations fail
//! fast with a user-facing message before any collaborator call. The upload
//! is attempted exactly once; an upload counts as failed unless the
//! collaborator reports success *and* returns at least one asset id.

use tracing::{debug, warn};

use textilevision_agent::{AgentClient, AssetId, ImageFile};

use crate::error::{GENERIC_FAILURE_MESSAGE, PipelineError, UPLOAD_FAILURE_MESSAGE};

/// Size cap for a sample image: 10 MiB.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Wraps the opaque upload collaborator.
pub struct AssetUploadStep<'a> {
    client: &'a dyn AgentClient,
}

impl<'a> AssetUploadStep<'a> {
    pub fn new(client: &'a dyn AgentClient) -> Self {
        Self { client }
    }

    /// Client-side constraints: MIME must be `image/*`, size at most 10 MiB.
    pub fn validate(file: &ImageFile) -> Result<(), PipelineError> {
        if !file.is_image() {
            return Err(PipelineError::validation(
                "Please upload an image file (JPG or PNG)",
            ));
        }
        if file.size_bytes > MAX_IMAGE_BYTES {
            return Err(PipelineError::validation("File size must be under 10MB"));
        }
        Ok(())
    }

    /// Invoke the upload collaborator once and extract the asset handle.
    ///
    /// Assumes [`Self::validate`] already passed; the orchestrator calls the
    /// two separately so it can advance the progress gauge in between.
    pub async fn upload(&self, file: &ImageFile) -> Result<AssetId, PipelineError> {
        let receipt = self.client.upload(file).await.map_err(|err| {
            warn!(%err, file = %file.file_name, "upload collaborator call failed");
            PipelineError::upload(GENERIC_FAILURE_MESSAGE)
        })?;

        match receipt.first_asset() {
            Some(asset) => {
                debug!(asset = asset.as_str(), "asset uploaded");
                Ok(asset.clone())
            }
            None => {
                warn!(
                    success = receipt.success,
                    ids = receipt.asset_ids.len(),
                    "upload collaborator returned no usable asset handle"
                );
                Err(PipelineError::upload(UPLOAD_FAILURE_MESSAGE))
            }
        }
    }

    /// Validate then upload, as a single step.
    pub async fn run(&self, file: &ImageFile) -> Result<AssetId, PipelineError> {
        Self::validate(file)?;
        self.upload(file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(size_bytes: u64) -> ImageFile {
        ImageFile::new("sample.png", "image/png", size_bytes)
    }

    #[test]
    fn non_image_mime_is_rejected() {
        let err = AssetUploadStep::validate(&ImageFile::new("notes.txt", "text/plain", 128))
            .unwrap_err();
        assert_eq!(
            err,
            PipelineError::validation("Please upload an image file (JPG or PNG)")
        );
    }

    #[test]
    fn size_cap_is_exclusive_above_10_mib() {
        let err = AssetUploadStep::validate(&png(11_000_000)).unwrap_err();
        assert_eq!(err, PipelineError::validation("File size must be under 10MB"));

        assert!(AssetUploadStep::validate(&png(9_000_000)).is_ok());
        assert!(AssetUploadStep::validate(&png(MAX_IMAGE_BYTES)).is_ok());
        assert!(AssetUploadStep::validate(&png(MAX_IMAGE_BYTES + 1)).is_err());
    }
}
