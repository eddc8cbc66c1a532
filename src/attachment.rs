//! Image attachment pipeline
//!
//! Turns operator-supplied image bytes into a self-contained `data:` URL that
//! is stored directly inside an entity record. Inputs above the size cap are
//! refused before any decoding happens, since base64 inflates the payload by
//! roughly a third and the whole collection must fit in the durable store.

use crate::error::{Error, Result};
use base64::Engine as _;
use image::ImageFormat;
use serde::{Deserialize, Serialize};

/// Largest accepted raw image (2 MiB)
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Reference to an entity image: an embedded `data:` URL or an absolute URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Wrap an absolute URL (used by seed content)
    pub fn url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for `data:` URLs produced by [`embed`]
    pub fn is_embedded(&self) -> bool {
        self.0.starts_with("data:image/")
    }

    /// True when the reference points somewhere an image can be loaded from
    pub fn is_usable(&self) -> bool {
        let s = &self.0;
        s.starts_with("data:image/") || s.starts_with("https://") || s.starts_with("http://")
    }

    /// MIME type of an embedded image
    pub fn mime_type(&self) -> Option<&str> {
        self.0
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_embedded() {
            write!(f, "<embedded {} image>", self.mime_type().unwrap_or("unknown"))
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Validate and embed raw image bytes.
///
/// The size gate runs first; decoding happens on the blocking pool.
pub async fn embed(bytes: Vec<u8>, max_bytes: usize) -> Result<ImageRef> {
    if bytes.len() > max_bytes {
        return Err(Error::ImageTooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }

    tokio::task::spawn_blocking(move || encode_data_url(&bytes))
        .await
        .map_err(|e| Error::Internal(format!("image decode task failed: {}", e)))?
}

/// Check an image reference submitted with a draft.
///
/// Embedded images go through the same gates as [`embed`]: the decoded
/// payload must fit `max_bytes`, be a readable PNG, JPEG, GIF or WebP and
/// match the declared MIME type. Plain URLs pass unchanged.
pub async fn verify(image: &ImageRef, max_bytes: usize) -> Result<()> {
    if !image.is_embedded() {
        return Ok(());
    }

    let (header, payload) = image
        .as_str()
        .split_once(',')
        .ok_or_else(|| Error::ImageUnreadable("data URL has no payload".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(Error::ImageUnreadable(
            "data URL is not base64 encoded".to_string(),
        ));
    }

    // Every 4 base64 chars carry 3 bytes, minus at most 2 of padding
    let approx = payload.len() / 4 * 3;
    if approx.saturating_sub(2) > max_bytes {
        return Err(Error::ImageTooLarge {
            size: approx,
            limit: max_bytes,
        });
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| Error::ImageUnreadable(e.to_string()))?;
    let decoded = embed(bytes, max_bytes).await?;
    if decoded.mime_type() != image.mime_type() {
        return Err(Error::ImageUnreadable(format!(
            "declared {} but contains {}",
            image.mime_type().unwrap_or("unknown"),
            decoded.mime_type().unwrap_or("unknown")
        )));
    }
    Ok(())
}

fn mime_for(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

fn encode_data_url(bytes: &[u8]) -> Result<ImageRef> {
    let format =
        image::guess_format(bytes).map_err(|e| Error::ImageUnreadable(e.to_string()))?;
    let mime = mime_for(format)
        .ok_or_else(|| Error::ImageUnreadable(format!("unsupported format {:?}", format)))?;

    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| Error::ImageUnreadable(e.to_string()))?;

    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(ImageRef(format!("data:{};base64,{}", mime, payload)))
}

/// Image held by an open create/edit form until it is submitted or discarded
#[derive(Debug)]
pub struct PendingImage {
    current: Option<ImageRef>,
    max_bytes: usize,
}

impl PendingImage {
    /// Empty holder for a create form
    pub fn new(max_bytes: usize) -> Self {
        Self {
            current: None,
            max_bytes,
        }
    }

    /// Holder preloaded with the image of the entity being edited
    pub fn with_existing(existing: Option<ImageRef>, max_bytes: usize) -> Self {
        Self {
            current: existing,
            max_bytes,
        }
    }

    /// Replace the held image. On error the previous image is kept.
    pub async fn select(&mut self, bytes: Vec<u8>) -> Result<&ImageRef> {
        let image = embed(bytes, self.max_bytes).await?;
        Ok(&*self.current.insert(image))
    }

    pub fn current(&self) -> Option<&ImageRef> {
        self.current.as_ref()
    }

    /// Hand the image to a draft being submitted
    pub fn take(&mut self) -> Option<ImageRef> {
        self.current.take()
    }

    /// Drop the held image without side effects
    pub fn discard(&mut self) {
        self.current = None;
    }
}

impl Default for PendingImage {
    fn default() -> Self {
        Self::new(MAX_IMAGE_BYTES)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    /// Encode a tiny valid image in the given format
    pub(crate) fn sample_image(format: ImageFormat) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([227, 30, 36]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[tokio::test]
    async fn test_embed_png() {
        let image = embed(sample_image(ImageFormat::Png), MAX_IMAGE_BYTES)
            .await
            .unwrap();
        assert!(image.is_embedded());
        assert!(image.is_usable());
        assert_eq!(image.mime_type(), Some("image/png"));
        assert!(image.as_str().starts_with("data:image/png;base64,iVBOR"));
    }

    #[tokio::test]
    async fn test_embed_jpeg() {
        let image = embed(sample_image(ImageFormat::Jpeg), MAX_IMAGE_BYTES)
            .await
            .unwrap();
        assert_eq!(image.mime_type(), Some("image/jpeg"));
    }

    #[tokio::test]
    async fn test_oversized_rejected_before_decode() {
        let bytes = vec![0u8; 3 * 1024 * 1024];
        let err = embed(bytes, MAX_IMAGE_BYTES).await.unwrap_err();
        match err {
            Error::ImageTooLarge { size, limit } => {
                assert_eq!(size, 3 * 1024 * 1024);
                assert_eq!(limit, MAX_IMAGE_BYTES);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_exactly_at_limit_is_not_too_large() {
        let bytes = vec![0u8; 16];
        let err = embed(bytes, 16).await.unwrap_err();
        assert!(matches!(err, Error::ImageUnreadable(_)));
    }

    #[tokio::test]
    async fn test_garbage_is_unreadable() {
        let err = embed(b"definitely not an image".to_vec(), MAX_IMAGE_BYTES)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ImageUnreadable(_)));
    }

    #[tokio::test]
    async fn test_truncated_png_is_unreadable() {
        let mut bytes = sample_image(ImageFormat::Png);
        bytes.truncate(20);
        let err = embed(bytes, MAX_IMAGE_BYTES).await.unwrap_err();
        assert!(matches!(err, Error::ImageUnreadable(_)));
    }

    #[tokio::test]
    async fn test_pending_image_keeps_previous_on_error() {
        let mut pending = PendingImage::default();
        pending.select(sample_image(ImageFormat::Png)).await.unwrap();
        let before = pending.current().cloned();

        assert!(pending.select(vec![0u8; 3 * 1024 * 1024]).await.is_err());
        assert_eq!(pending.current().cloned(), before);

        assert!(pending.select(b"junk".to_vec()).await.is_err());
        assert_eq!(pending.current().cloned(), before);
    }

    #[tokio::test]
    async fn test_pending_image_oversized_leaves_draft_unset() {
        let mut pending = PendingImage::new(MAX_IMAGE_BYTES);
        let err = pending.select(vec![1u8; 3 * 1024 * 1024]).await.unwrap_err();
        assert!(matches!(err, Error::ImageTooLarge { .. }));
        assert!(pending.current().is_none());
    }

    #[test]
    fn test_pending_image_take_and_discard() {
        let existing = ImageRef::url("https://example.com/a.jpg");
        let mut pending = PendingImage::with_existing(Some(existing.clone()), MAX_IMAGE_BYTES);
        assert_eq!(pending.take(), Some(existing.clone()));
        assert!(pending.take().is_none());

        let mut pending = PendingImage::with_existing(Some(existing), MAX_IMAGE_BYTES);
        pending.discard();
        assert!(pending.current().is_none());
    }

    fn data_url(mime: &str, bytes: &[u8]) -> ImageRef {
        use base64::Engine as _;
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        ImageRef::url(format!("data:{};base64,{}", mime, payload))
    }

    #[tokio::test]
    async fn test_verify_accepts_embedded_and_plain_urls() {
        let image = embed(sample_image(ImageFormat::Png), MAX_IMAGE_BYTES)
            .await
            .unwrap();
        verify(&image, MAX_IMAGE_BYTES).await.unwrap();
        verify(&ImageRef::url("https://example.com/a.jpg"), MAX_IMAGE_BYTES)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_verify_rejects_oversized_payload() {
        let image = data_url("image/png", &vec![0xAB; MAX_IMAGE_BYTES + MAX_IMAGE_BYTES / 4]);
        let err = verify(&image, MAX_IMAGE_BYTES).await.unwrap_err();
        assert!(matches!(err, Error::ImageTooLarge { limit, .. } if limit == MAX_IMAGE_BYTES));
    }

    #[tokio::test]
    async fn test_verify_rejects_just_over_limit() {
        let bytes = sample_image(ImageFormat::Png);
        let image = data_url("image/png", &bytes);
        let err = verify(&image, bytes.len() - 1).await.unwrap_err();
        assert!(matches!(err, Error::ImageTooLarge { .. }));
    }

    #[tokio::test]
    async fn test_verify_rejects_unreadable_payloads() {
        for image in [
            data_url("image/png", b"not an image at all"),
            ImageRef::url("data:image/png;base64,@@@not-base64@@@"),
            ImageRef::url("data:image/png,rawtext"),
            ImageRef::url("data:image/png;base64"),
            data_url("image/jpeg", &sample_image(ImageFormat::Png)),
        ] {
            let err = verify(&image, MAX_IMAGE_BYTES).await.unwrap_err();
            assert!(matches!(err, Error::ImageUnreadable(_)), "{}", image.as_str());
        }
    }

    #[test]
    fn test_image_ref_display_hides_payload() {
        let image = ImageRef("data:image/png;base64,AAAA".to_string());
        assert_eq!(image.to_string(), "<embedded image/png image>");
        let url = ImageRef::url("https://example.com/x.png");
        assert_eq!(url.to_string(), "https://example.com/x.png");
        assert!(url.mime_type().is_none());
    }

    #[test]
    fn test_image_ref_usable() {
        assert!(!ImageRef::url("").is_usable());
        assert!(!ImageRef::url("   ").is_usable());
        assert!(!ImageRef::url("file:///etc/passwd").is_usable());
        assert!(!ImageRef::url(" data:image/png;base64,AAAA").is_usable());
        assert!(ImageRef::url("http://cdn.local/a.png").is_usable());
    }

    #[test]
    fn test_image_ref_serializes_as_string() {
        let image = ImageRef::url("https://example.com/a.jpg");
        let json = serde_json::to_string(&image).unwrap();
        assert_eq!(json, "\"https://example.com/a.jpg\"");
        let parsed: ImageRef = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, image);
    }
}
