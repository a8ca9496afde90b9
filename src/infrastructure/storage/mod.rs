pub mod fs_image_store;
pub mod s3_image_store;

use uuid::Uuid;

use crate::application::ports::image_store::ImageUpload;
use crate::application::validation::image::image_content_type;

const IMAGE_PREFIX: &str = "listings";

/// Fresh object key for an upload: `listings/<uuid>.<ext>`.
pub fn image_key_for(upload: &ImageUpload) -> String {
    let ext = match image_content_type(upload).as_deref() {
        Some("image/png") => "png",
        Some("image/jpeg") => "jpg",
        Some("image/svg+xml") => "svg",
        _ => "bin",
    };
    format!("{}/{}.{}", IMAGE_PREFIX, Uuid::new_v4(), ext)
}

/// Rejects keys that could step outside the image prefix.
pub fn is_safe_key(key: &str) -> bool {
    key.starts_with(&format!("{IMAGE_PREFIX}/"))
        && !key.contains("..")
        && !key.contains('\\')
        && !key.contains("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_carry_the_image_extension() {
        let upload = ImageUpload {
            filename: Some("beach.jpeg".into()),
            content_type: None,
            bytes: vec![1],
        };
        let key = image_key_for(&upload);
        assert!(key.starts_with("listings/"));
        assert!(key.ends_with(".jpg"));
        assert!(is_safe_key(&key));
        assert!(!is_safe_key("listings/../etc/passwd"));
        assert!(!is_safe_key("other/file.png"));
    }
}
