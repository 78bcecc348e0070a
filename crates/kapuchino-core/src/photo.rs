//! Motivational photo pipeline.
//!
//! Photos arrive as raw bytes from a [`PhotoSource`] (a picker, a file), are
//! downscaled to fit a square bounding box and re-encoded as JPEG before they
//! reach the store. Decoding and resizing can take a while on large images, so
//! [`load_photo`] runs them on the blocking pool and can be cancelled; the
//! store is only touched once the whole pipeline has succeeded.

use std::path::PathBuf;

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::PhotoError;
use crate::state::ReminderStore;
use crate::storage::{KeyValueStore, PhotoConfig};

/// Decode `bytes`, shrink it so the longest edge is at most
/// `config.max_edge`, and encode it as JPEG.
///
/// Images already within bounds keep their size; nothing is upscaled.
pub fn compress_photo(bytes: &[u8], config: &PhotoConfig) -> Result<Vec<u8>, PhotoError> {
    let img = image::load_from_memory(bytes).map_err(|e| PhotoError::Decode(e.to_string()))?;
    let (width, height) = img.dimensions();

    let img = if width.max(height) > config.max_edge {
        img.resize(config.max_edge, config.max_edge, FilterType::Triangle)
    } else {
        img
    };

    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, config.jpeg_quality);
    rgb.write_with_encoder(encoder)?;

    debug!(
        width,
        height,
        out_width = rgb.width(),
        out_height = rgb.height(),
        bytes = out.len(),
        "photo compressed"
    );
    Ok(out)
}

/// Where photos come from.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Raw image bytes, or `None` if the user cancelled.
    ///
    /// # Errors
    /// Returns [`PhotoError::Load`] if the transfer fails.
    async fn pick(&self) -> Result<Option<Vec<u8>>, PhotoError>;
}

/// Reads a photo from a file on disk.
#[derive(Debug, Clone)]
pub struct FilePhotoSource {
    path: PathBuf,
}

impl FilePhotoSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PhotoSource for FilePhotoSource {
    async fn pick(&self) -> Result<Option<Vec<u8>>, PhotoError> {
        tokio::fs::read(&self.path)
            .await
            .map(Some)
            .map_err(|e| PhotoError::Load(format!("{}: {e}", self.path.display())))
    }
}

/// How a [`load_photo`] call ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoOutcome {
    /// The photo was compressed and stored; `bytes` is the encoded size.
    Applied { bytes: usize },
    /// The user or the caller cancelled; the store is unchanged.
    Cancelled,
}

/// Pick a photo from `source`, compress it off the async thread and store it.
///
/// Cancelling `cancel` at any point before the store is updated returns
/// [`PhotoOutcome::Cancelled`] and leaves the store unchanged.
///
/// # Errors
/// Returns the source's load error or a decode/encode error. The store is
/// unchanged on error.
pub async fn load_photo<S, C, P>(
    store: &mut ReminderStore<S, C>,
    source: &P,
    cancel: &CancellationToken,
) -> Result<PhotoOutcome, PhotoError>
where
    S: KeyValueStore,
    C: Clock,
    P: PhotoSource + ?Sized,
{
    let picked = tokio::select! {
        _ = cancel.cancelled() => return Ok(PhotoOutcome::Cancelled),
        picked = source.pick() => picked?,
    };
    let Some(raw) = picked else {
        debug!("photo selection cancelled by user");
        return Ok(PhotoOutcome::Cancelled);
    };

    let config = store.photo_config().clone();
    let task = tokio::task::spawn_blocking(move || compress_photo(&raw, &config));
    let encoded = tokio::select! {
        _ = cancel.cancelled() => return Ok(PhotoOutcome::Cancelled),
        joined = task => joined
            .map_err(|e| PhotoError::Encode(format!("compression task failed: {e}")))??,
    };

    let bytes = encoded.len();
    store.set_encoded_photo(encoded);
    info!(bytes, "photo applied");
    Ok(PhotoOutcome::Applied { bytes })
}
