use std::fmt;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use tracing::{debug, warn};

use crate::constants::MAX_IMAGE_BYTES;
use crate::error::AttachmentError;

/// An image accepted by the attachment control, held in memory until sent.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    name: String,
    media_type: String,
    bytes: Vec<u8>,
}

impl ImageAttachment {
    /// Accepts `bytes` only if `media_type` is an image type and the payload
    /// is at or below [`MAX_IMAGE_BYTES`].
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, AttachmentError> {
        let name = name.into();
        let media_type = media_type.into().to_ascii_lowercase();
        check_media_type(&name, &media_type)?;
        check_size(&name, bytes.len() as u64)?;
        Ok(Self {
            name,
            media_type,
            bytes,
        })
    }

    /// Reads an image file, guessing its media type from the extension.
    ///
    /// Type and size are checked before the file body is read, so oversized
    /// files are never loaded.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AttachmentError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        check_media_type(&name, &media_type)?;

        let io_err = |source| AttachmentError::Io {
            path: path.display().to_string(),
            source,
        };
        let metadata = tokio::fs::metadata(path).await.map_err(io_err)?;
        check_size(&name, metadata.len())?;

        let bytes = tokio::fs::read(path).await.map_err(io_err)?;
        debug!(%name, %media_type, size = bytes.len(), "Loaded image attachment");
        Self::new(name, media_type, bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Standard-alphabet, padded base64 of the image bytes.
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.bytes)
    }

    /// Short label for the transcript and status line, e.g. `rash.png (12 KB)`.
    pub fn label(&self) -> String {
        format!("{} ({} KB)", self.name, self.bytes.len().div_ceil(1024))
    }
}

// Image bytes stay out of debug output and logs.
impl fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn check_media_type(name: &str, media_type: &str) -> Result<(), AttachmentError> {
    if media_type.starts_with("image/") {
        Ok(())
    } else {
        Err(AttachmentError::NotAnImage {
            name: name.to_string(),
            media_type: media_type.to_string(),
        })
    }
}

fn check_size(name: &str, size: u64) -> Result<(), AttachmentError> {
    if size <= MAX_IMAGE_BYTES {
        Ok(())
    } else {
        Err(AttachmentError::TooLarge {
            name: name.to_string(),
            size,
            limit: MAX_IMAGE_BYTES,
        })
    }
}

/// Images selected for the next send. The control holds a single image;
/// attaching again replaces it.
#[derive(Debug, Default)]
pub struct PendingImages {
    current: Option<ImageAttachment>,
}

impl PendingImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, image: ImageAttachment) {
        if let Some(previous) = self.current.replace(image) {
            debug!(name = previous.name(), "Replaced pending image");
        }
    }

    /// Loads and attaches the file at `path`. A rejected file leaves the
    /// pending list as it was.
    pub async fn attach_path(&mut self, path: impl AsRef<Path>) -> Result<&ImageAttachment, AttachmentError> {
        let image = ImageAttachment::load(path)
            .await
            .inspect_err(|e| warn!("Attachment rejected: {}", e))?;
        if let Some(previous) = self.current.take() {
            debug!(name = previous.name(), "Replaced pending image");
        }
        Ok(&*self.current.insert(image))
    }

    pub fn clear(&mut self) -> Option<ImageAttachment> {
        self.current.take()
    }

    /// Drains the pending images for a send.
    pub fn take(&mut self) -> Vec<ImageAttachment> {
        self.current.take().into_iter().collect()
    }

    pub fn current(&self) -> Option<&ImageAttachment> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_four_megabyte_image_accepted() {
        let image = ImageAttachment::new("scan.jpg", "image/jpeg", vec![0u8; 4_000_000]).unwrap();
        assert_eq!(image.len(), 4_000_000);
        assert_eq!(image.media_type(), "image/jpeg");
    }

    #[test]
    fn test_six_megabyte_image_rejected() {
        let err = ImageAttachment::new("scan.jpg", "image/jpeg", vec![0u8; 6_000_000]).unwrap_err();
        assert!(matches!(err, AttachmentError::TooLarge { size: 6_000_000, .. }));
    }

    #[test]
    fn test_exact_limit_accepted() {
        let bytes = vec![0u8; MAX_IMAGE_BYTES as usize];
        assert!(ImageAttachment::new("edge.png", "image/png", bytes).is_ok());
    }

    #[test]
    fn test_non_image_rejected() {
        let err = ImageAttachment::new("notes.pdf", "application/pdf", vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, AttachmentError::NotAnImage { .. }));
    }

    #[test]
    fn test_base64_encoding() {
        let image = ImageAttachment::new("a.png", "image/png", b"hello".to_vec()).unwrap();
        assert_eq!(image.to_base64(), "aGVsbG8=");
    }

    #[test]
    fn test_debug_hides_bytes() {
        let image = ImageAttachment::new("a.png", "image/png", vec![42; 16]).unwrap();
        let printed = format!("{:?}", image);
        assert!(printed.contains("len: 16"));
        assert!(!printed.contains("42, 42"));
    }

    #[tokio::test]
    async fn test_load_guesses_media_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rash.PNG");
        std::fs::File::create(&path).unwrap().write_all(PNG_MAGIC).unwrap();

        let image = ImageAttachment::load(&path).await.unwrap();
        assert_eq!(image.name(), "rash.PNG");
        assert_eq!(image.media_type(), "image/png");
        assert_eq!(image.bytes(), PNG_MAGIC);
    }

    #[tokio::test]
    async fn test_load_rejects_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not an image").unwrap();

        let err = ImageAttachment::load(&path).await.unwrap_err();
        assert!(matches!(err, AttachmentError::NotAnImage { .. }));
    }

    #[tokio::test]
    async fn test_load_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.jpg");
        std::fs::write(&path, vec![0u8; 6 * 1024 * 1024]).unwrap();

        let err = ImageAttachment::load(&path).await.unwrap_err();
        assert!(matches!(err, AttachmentError::TooLarge { .. }));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = ImageAttachment::load("/definitely/not/here.png").await.unwrap_err();
        assert!(matches!(err, AttachmentError::Io { .. }));
    }

    #[tokio::test]
    async fn test_rejected_file_never_pending() {
        let dir = tempfile::tempdir().unwrap();
        let ok = dir.path().join("ok.png");
        std::fs::write(&ok, PNG_MAGIC).unwrap();
        let big = dir.path().join("big.png");
        std::fs::write(&big, vec![0u8; 6 * 1024 * 1024]).unwrap();

        let mut pending = PendingImages::new();
        pending.attach_path(&ok).await.unwrap();
        assert!(pending.attach_path(&big).await.is_err());

        let taken = pending.take();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].name(), "ok.png");
        assert!(pending.is_empty());
    }

    #[test]
    fn test_attach_replaces_previous() {
        let mut pending = PendingImages::new();
        pending.attach(ImageAttachment::new("one.png", "image/png", vec![1]).unwrap());
        pending.attach(ImageAttachment::new("two.png", "image/png", vec![2]).unwrap());
        assert_eq!(pending.current().unwrap().name(), "two.png");
        assert_eq!(pending.take().len(), 1);
    }
}
