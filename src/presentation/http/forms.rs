use axum::extract::Multipart;

use crate::application::error::AppResult;
use crate::application::ports::image_store::ImageUpload;
use crate::application::validation::image::IMAGE_FIELD;
use crate::application::validation::{RawPayload, ValidationErrors};

/// A listing form as submitted: text fields plus the optional image part.
#[derive(Debug, Default)]
pub struct ListingSubmission {
    pub fields: RawPayload,
    pub image: Option<ImageUpload>,
}

fn malformed(err: impl std::fmt::Display) -> ValidationErrors {
    tracing::debug!(error = %err, "multipart_rejected");
    ValidationErrors::single("form", "The submitted form could not be read")
}

pub async fn read_listing_form(mut multipart: Multipart) -> AppResult<ListingSubmission> {
    let mut out = ListingSubmission::default();
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let Some(name) = field.name().map(|s| s.to_string()) else {
            continue;
        };
        if name == IMAGE_FIELD {
            let filename = field.file_name().map(|s| s.to_string());
            let content_type = field.content_type().map(|s| s.to_string());
            let bytes = field.bytes().await.map_err(malformed)?;
            // browsers send an empty, unnamed part when no file was picked
            let picked = filename.as_deref().is_some_and(|f| !f.is_empty());
            if picked || !bytes.is_empty() {
                out.image = Some(ImageUpload {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let text = field.text().await.map_err(malformed)?;
            out.fields.insert(name, text);
        }
    }
    Ok(out)
}
