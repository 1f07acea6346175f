//! Response bodies

use serde::{Deserialize, Serialize};

/// Successful upload: the re-encoded image and its size in bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Base64 (standard alphabet, padded) of the encoded image
    pub image_data: String,
    /// Size of the decoded `image_data`, in bytes
    pub size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
