use super::ValidationErrors;
use crate::application::ports::image_store::ImageUpload;

pub const IMAGE_FIELD: &str = "listing[image]";

const ALLOWED_TYPES: &[&str] = &["image/png", "image/jpeg", "image/svg+xml"];

/// Resolves the media type of an upload: an explicit, specific content type
/// wins; otherwise the file extension decides.
pub fn image_content_type(upload: &ImageUpload) -> Option<String> {
    let declared = upload
        .content_type
        .as_deref()
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");
    declared.or_else(|| {
        upload
            .filename
            .as_deref()
            .and_then(|name| mime_guess::from_path(name).first())
            .map(|m| m.essence_str().to_string())
    })
}

pub fn validate_image(upload: &ImageUpload, max_bytes: usize) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if upload.bytes.is_empty() {
        errors.push(IMAGE_FIELD, "\"listing.image\" must not be empty");
    } else if upload.bytes.len() > max_bytes {
        errors.push(
            IMAGE_FIELD,
            format!("\"listing.image\" must be at most {max_bytes} bytes"),
        );
    }
    match image_content_type(upload) {
        Some(ct) if ALLOWED_TYPES.contains(&ct.as_str()) => {}
        _ => errors.push(
            IMAGE_FIELD,
            "\"listing.image\" must be one of png, jpeg, jpg, svg",
        ),
    }
    errors.into_result(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: Option<&str>, ct: Option<&str>, len: usize) -> ImageUpload {
        ImageUpload {
            filename: name.map(str::to_string),
            content_type: ct.map(str::to_string),
            bytes: vec![0u8; len],
        }
    }

    #[test]
    fn extension_decides_when_content_type_is_generic() {
        let u = upload(Some("beach.JPG"), Some("application/octet-stream"), 10);
        assert_eq!(image_content_type(&u).as_deref(), Some("image/jpeg"));
        assert!(validate_image(&u, 100).is_ok());
    }

    #[test]
    fn rejects_unsupported_format() {
        let u = upload(Some("notes.pdf"), None, 10);
        let err = validate_image(&u, 100).unwrap_err();
        assert_eq!(
            err.to_string(),
            "\"listing.image\" must be one of png, jpeg, jpg, svg"
        );
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert!(validate_image(&upload(Some("a.png"), None, 0), 100).is_err());
        let err = validate_image(&upload(Some("a.png"), Some("image/png"), 101), 100).unwrap_err();
        assert_eq!(err.to_string(), "\"listing.image\" must be at most 100 bytes");
    }
}
