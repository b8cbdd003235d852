//! Image uploads written under `{upload_root}/uploads/<kind>/`.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use axum::extract::Multipart;
use bytes::Bytes;

use crate::errors::RequestError;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Empty file")]
    Empty,
    #[error("Invalid file type. Please upload an image.")]
    NotAnImage,
    #[error("File size must be less than 5MB.")]
    TooLarge,
    #[error("Unsupported file extension. Allowed: jpg, jpeg, png, gif, webp")]
    ExtensionNotAllowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Article,
    Avatar,
    Hero,
}

impl UploadKind {
    pub fn dir_name(&self) -> &'static str {
        match self {
            UploadKind::Article => "articles",
            UploadKind::Avatar => "avatars",
            UploadKind::Hero => "hero",
        }
    }

    pub fn dir(&self, upload_root: &Path) -> PathBuf {
        upload_root.join("uploads").join(self.dir_name())
    }
}

/// A file field pulled out of a multipart request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ImageUpload {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Check an upload and return its normalised extension (lowercase, no dot).
pub fn validate_image(upload: &ImageUpload) -> Result<String, UploadError> {
    if upload.data.is_empty() {
        return Err(UploadError::Empty);
    }
    if !upload.content_type.starts_with("image/") {
        return Err(UploadError::NotAnImage);
    }
    if upload.data.len() > MAX_IMAGE_BYTES {
        return Err(UploadError::TooLarge);
    }
    let extension = Path::new(&upload.file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .ok_or(UploadError::ExtensionNotAllowed)?;
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(UploadError::ExtensionNotAllowed);
    }
    Ok(extension)
}

/// Validate and write an image, returning its public URL path.
///
/// Article and avatar files are prefixed with the owner's id, hero files
/// with `hero`.
pub async fn store_image(
    upload_root: &Path,
    kind: UploadKind,
    owner_id: i64,
    upload: &ImageUpload,
) -> Result<String, RequestError> {
    let extension = validate_image(upload)?;
    let prefix = match kind {
        UploadKind::Hero => "hero".to_string(),
        UploadKind::Article | UploadKind::Avatar => owner_id.to_string(),
    };
    let file_name = format!("{prefix}-{}.{extension}", uuid::Uuid::new_v4());
    let dir = kind.dir(upload_root);

    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create upload dir {}: {e}", dir.display()))?;
    tokio::fs::write(dir.join(&file_name), &upload.data)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to write upload {file_name}: {e}"))?;

    tracing::debug!(kind = kind.dir_name(), file = %file_name, bytes = upload.data.len(), "Stored image");
    Ok(format!("/uploads/{}/{file_name}", kind.dir_name()))
}

/// Delete a previously stored image. Only the basename of `url` is used, so a
/// stored URL can never point outside the kind's directory.
pub async fn remove_image(upload_root: &Path, kind: UploadKind, url: &str) -> std::io::Result<()> {
    let file_name = Path::new(url)
        .file_name()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no file name"))?;
    tokio::fs::remove_file(kind.dir(upload_root).join(file_name)).await
}

/// Best-effort removal; failures are logged and otherwise ignored.
pub async fn discard_image(upload_root: &Path, kind: UploadKind, url: &str) {
    if let Err(e) = remove_image(upload_root, kind, url).await {
        tracing::warn!(url, error = %e, "Failed to delete image file");
    }
}

/// Text fields and files of a multipart form, keyed by field name.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, ImageUpload>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, RequestError> {
        let mut form = MultipartForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| RequestError::validation(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            match field.file_name().map(str::to_owned) {
                Some(file_name) => {
                    let content_type = field.content_type().unwrap_or_default().to_owned();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| RequestError::validation(e.body_text()))?;
                    form.files.insert(
                        name,
                        ImageUpload {
                            file_name,
                            content_type,
                            data,
                        },
                    );
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| RequestError::validation(e.body_text()))?;
                    form.fields.insert(name, value);
                }
            }
        }
        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// A text field with surrounding whitespace removed; empty reads as `None`.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.text(name).map(str::trim).filter(|v| !v.is_empty())
    }

    /// A file field, skipping the empty part browsers send for an untouched input.
    pub fn file(&self, name: &str) -> Option<&ImageUpload> {
        self.files.get(name).filter(|upload| !upload.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, content_type: &str, len: usize) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            data: Bytes::from(vec![0u8; len]),
        }
    }

    #[test]
    fn accepts_allowed_images() {
        assert_eq!(validate_image(&upload("cat.PNG", "image/png", 10)), Ok("png".into()));
        assert_eq!(validate_image(&upload("a.b.webp", "image/webp", 10)), Ok("webp".into()));
        assert_eq!(
            validate_image(&upload("max.jpg", "image/jpeg", MAX_IMAGE_BYTES)),
            Ok("jpg".into())
        );
    }

    #[test]
    fn rejections_follow_check_order() {
        // An empty non-image is reported as empty first.
        assert_eq!(validate_image(&upload("x.txt", "text/plain", 0)), Err(UploadError::Empty));
        assert_eq!(
            validate_image(&upload("x.png", "text/plain", 10)),
            Err(UploadError::NotAnImage)
        );
        assert_eq!(
            validate_image(&upload("x.bmp", "image/bmp", MAX_IMAGE_BYTES + 1)),
            Err(UploadError::TooLarge)
        );
        assert_eq!(
            validate_image(&upload("x.bmp", "image/bmp", 10)),
            Err(UploadError::ExtensionNotAllowed)
        );
        assert_eq!(
            validate_image(&upload("noext", "image/png", 10)),
            Err(UploadError::ExtensionNotAllowed)
        );
    }

    #[tokio::test]
    async fn stores_and_removes_files_under_kind_dir() {
        let root = tempfile::tempdir().unwrap();
        let url = store_image(root.path(), UploadKind::Article, 7, &upload("c.jpg", "image/jpeg", 4))
            .await
            .unwrap();
        assert!(url.starts_with("/uploads/articles/7-"));
        assert!(url.ends_with(".jpg"));

        let file_name = url.rsplit('/').next().unwrap();
        let path = root.path().join("uploads/articles").join(file_name);
        assert!(path.exists());

        remove_image(root.path(), UploadKind::Article, &url).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn hero_files_use_hero_prefix() {
        let root = tempfile::tempdir().unwrap();
        let url = store_image(root.path(), UploadKind::Hero, 1, &upload("h.gif", "image/gif", 4))
            .await
            .unwrap();
        assert!(url.starts_with("/uploads/hero/hero-"));
    }

    #[tokio::test]
    async fn removal_ignores_directories_in_the_url() {
        let root = tempfile::tempdir().unwrap();
        let outside = root.path().join("secret.txt");
        std::fs::write(&outside, "keep").unwrap();
        let result = remove_image(root.path(), UploadKind::Avatar, "/uploads/avatars/../../secret.txt").await;
        assert!(result.is_err());
        assert!(outside.exists());
    }
}
