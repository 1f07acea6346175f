//! Image upload handler
//!
//! Request flow: pick the `image` file part, screen it, then decode and
//! compress on the blocking pool. Moderation runs before any decoding.

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use imgcap_core::{EncodeResult, SizeBudget};
use tracing::{debug, info};

use crate::{
    error::{ApiError, ApiResult},
    models::UploadResponse,
    state::AppState,
};

/// Multipart field carrying the upload.
pub const IMAGE_FIELD: &str = "image";

/// Accept an image, screen it, and return it re-encoded within the size budget.
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    // A body that is not multipart carries no file.
    let multipart = multipart.map_err(|rejection| {
        debug!(%rejection, "upload body is not multipart");
        ApiError::MissingImage
    })?;
    let bytes = read_image_field(multipart).await?;
    debug!(bytes = bytes.len(), "received upload");

    let verdict = state.moderator.check(&bytes).await;
    if !verdict.allowed {
        return Err(ApiError::Rejected(verdict.reason));
    }

    let budget = state.config.budget();
    let result = tokio::task::spawn_blocking(move || process(&bytes, budget))
        .await
        .map_err(|e| ApiError::Internal(format!("image worker failed: {e}")))??;

    info!(
        size = result.size_bytes(),
        mime = result.mime_type(),
        quality = ?result.quality(),
        "upload compressed"
    );

    Ok(Json(UploadResponse {
        size: result.size_bytes(),
        image_data: STANDARD.encode(result.bytes()),
    }))
}

fn process(bytes: &[u8], budget: SizeBudget) -> ApiResult<EncodeResult> {
    let source = imgcap_core::decode(bytes)?;
    Ok(imgcap_core::compress(&source, budget)?)
}

/// Take the first `image` part that was sent as a file.
///
/// Parts without a filename are plain form values and are skipped.
async fn read_image_field(mut multipart: Multipart) -> ApiResult<Bytes> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let empty_name = match field.file_name() {
            Some(name) => name.is_empty(),
            None => continue,
        };
        if empty_name {
            return Err(ApiError::EmptyFilename);
        }

        return Ok(field.bytes().await?);
    }

    Err(ApiError::MissingImage)
}
