use axum::{
    extract::multipart::{Multipart, MultipartError},
    http::{HeaderMap, header},
};

use crate::{api::MAX_BODY_BYTES, blobs::MAX_IMAGE_BYTES, error::ApiError};

pub(crate) struct ImageUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Fields of the recipe create/update form. Absent fields stay `None` so
/// PATCH can tell "not sent" apart from "sent as the default" — `isPublic`
/// in particular keeps its prior value when the field is omitted.
#[derive(Default)]
pub(crate) struct RecipeForm {
    pub title: Option<String>,
    pub text: Option<String>,
    pub is_public: Option<bool>,
    pub image_desc: Option<String>,
    pub image: Option<ImageUpload>,
}

fn form_error(err: MultipartError) -> ApiError {
    tracing::debug!("Rejecting multipart form: {err}");
    ApiError::BadRequest("Invalid multipart form data".to_string())
}

impl RecipeForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = RecipeForm::default();

        while let Some(mut field) = multipart.next_field().await.map_err(form_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match name.as_str() {
                "title" => form.title = Some(field.text().await.map_err(form_error)?),
                "text" => form.text = Some(field.text().await.map_err(form_error)?),
                "imageDesc" => form.image_desc = Some(field.text().await.map_err(form_error)?),
                "isPublic" => {
                    let value = field.text().await.map_err(form_error)?;
                    form.is_public = Some(match value.as_str() {
                        "true" | "1" => true,
                        "false" | "0" => false,
                        _ => {
                            return Err(ApiError::BadRequest(
                                "isPublic must be a boolean".to_string(),
                            ));
                        }
                    });
                }
                "image" => {
                    let filename = field.file_name().unwrap_or("upload").to_string();

                    let mut bytes = Vec::new();
                    while let Some(chunk) = field.chunk().await.map_err(form_error)? {
                        if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
                            return Err(ApiError::PayloadTooLarge);
                        }
                        bytes.extend_from_slice(&chunk);
                    }

                    // browsers send an empty part when no file was picked
                    if !bytes.is_empty() {
                        form.image = Some(ImageUpload { bytes, filename });
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    pub fn require_title(&self) -> Result<&str, ApiError> {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => Ok(title),
            _ => Err(ApiError::BadRequest(
                "Recipe title can not be empty!".to_string(),
            )),
        }
    }
}

/// Cheap size gate: when the client declares a content length over the body
/// limit, refuse before reading anything.
pub(crate) fn reject_oversized(headers: &HeaderMap) -> Result<(), ApiError> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());

    if let Some(length) = declared {
        if length > MAX_BODY_BYTES {
            return Err(ApiError::PayloadTooLarge);
        }
    }

    Ok(())
}
