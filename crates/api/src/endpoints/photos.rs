//! Photo upload endpoint.

use axum::{
    Router,
    extract::{Multipart, State},
    routing::post,
};
use komuna_common::{AppError, AppResult};
use komuna_core::{StoredPhoto, UploadPhotoInput};

use crate::{middleware::AppState, response::ApiResponse};

/// Upload a report photo via multipart form.
///
/// Returns the public URL to reference from a subsequent submission.
async fn upload_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<StoredPhoto>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(std::string::ToString::to_string);
                content_type = field.content_type().map(std::string::ToString::to_string);
                file_data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?
                        .to_vec(),
                );
            }
            "name" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !text.is_empty() {
                    file_name = Some(text);
                }
            }
            _ => {}
        }
    }

    let data =
        file_data.ok_or_else(|| AppError::BadRequest("Photo file is required".to_string()))?;

    let stored = state
        .photo_service
        .upload(UploadPhotoInput {
            file_name: file_name.unwrap_or_else(|| "photo".to_string()),
            content_type: content_type
                .ok_or_else(|| AppError::BadRequest("Photo content type is required".to_string()))?,
            data,
        })
        .await?;

    Ok(ApiResponse::ok(stored))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(upload_photo))
}
