use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use image::{
    ColorType, DynamicImage, ImageEncoder, ImageFormat, codecs::jpeg::JpegEncoder,
    imageops::FilterType as ResizeFilterType,
};

use crate::config::UploadLimits;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    Background,
    MemoCover(String),
}

impl UploadTarget {
    pub fn max_dimension(&self, limits: &UploadLimits) -> u32 {
        match self {
            UploadTarget::Background => limits.background_max_dimension,
            UploadTarget::MemoCover(_) => limits.cover_max_dimension,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("image is too large to process ({0} bytes max input)")]
    TooLarge(usize),
    #[error("unsupported file type (jpeg, png, webp, gif)")]
    Unsupported,
    #[error("could not decode image: {0}")]
    Decode(String),
    #[error("could not encode image: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    pub data_url: String,
    pub width: u32,
    pub height: u32,
    pub kept_original: bool,
}

/// Validates, bounds and re-encodes one uploaded raster image.
///
/// GIF input is kept byte-for-byte so animation survives; everything else
/// is scaled down to fit `max_dimension` on its longest edge and stored as
/// JPEG.
pub fn process_upload(
    bytes: &[u8],
    max_dimension: u32,
    limits: &UploadLimits,
) -> Result<ProcessedImage, UploadError> {
    if bytes.len() > limits.max_input_bytes {
        return Err(UploadError::TooLarge(limits.max_input_bytes));
    }

    let format = image::guess_format(bytes).map_err(|_| UploadError::Unsupported)?;
    if !matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP | ImageFormat::Gif
    ) {
        return Err(UploadError::Unsupported);
    }

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|err| UploadError::Decode(err.to_string()))?;

    if format == ImageFormat::Gif {
        return Ok(ProcessedImage {
            data_url: data_url("image/gif", bytes),
            width: img.width(),
            height: img.height(),
            kept_original: true,
        });
    }

    let img = bound_dimensions(img, max_dimension);
    let encoded = encode_jpeg(&img, limits.jpeg_quality)?;
    Ok(ProcessedImage {
        data_url: data_url("image/jpeg", &encoded),
        width: img.width(),
        height: img.height(),
        kept_original: false,
    })
}

fn bound_dimensions(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    if img.width() <= max_dimension && img.height() <= max_dimension {
        return img;
    }
    img.resize(max_dimension, max_dimension, ResizeFilterType::Triangle)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, UploadError> {
    // JPEG has no alpha channel.
    let rgb = img.to_rgb8();
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, quality)
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8.into())
        .map_err(|err| UploadError::Encode(err.to_string()))?;
    Ok(encoded)
}

fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

pub struct UploadTask {
    pub seq: u64,
    pub target: UploadTarget,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct UploadOutcome {
    pub seq: u64,
    pub target: UploadTarget,
    pub result: Result<ProcessedImage, UploadError>,
}

/// Background thread that processes uploads one at a time.
///
/// Each submitted task produces exactly one `UploadOutcome`; outcomes come
/// back in submission order.
pub struct UploadWorker {
    task_tx: Sender<UploadTask>,
    outcome_rx: Receiver<UploadOutcome>,
    next_seq: u64,
}

impl UploadWorker {
    pub fn spawn(limits: UploadLimits) -> Self {
        let (task_tx, task_rx) = mpsc::channel::<UploadTask>();
        let (outcome_tx, outcome_rx) = mpsc::channel::<UploadOutcome>();
        std::thread::spawn(move || {
            while let Ok(task) = task_rx.recv() {
                let max_dimension = task.target.max_dimension(&limits);
                let result = process_upload(&task.bytes, max_dimension, &limits);
                if let Err(err) = &result {
                    log::warn!("upload {} failed: {err}", task.seq);
                }
                let outcome = UploadOutcome {
                    seq: task.seq,
                    target: task.target,
                    result,
                };
                if outcome_tx.send(outcome).is_err() {
                    break;
                }
            }
        });

        Self {
            task_tx,
            outcome_rx,
            next_seq: 0,
        }
    }

    /// Queues an upload and returns its sequence number.
    pub fn submit(&mut self, target: UploadTarget, bytes: Vec<u8>) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        if self.task_tx.send(UploadTask { seq, target, bytes }).is_err() {
            log::warn!("upload worker is gone; dropping upload {seq}");
        }
        seq
    }

    pub fn try_recv(&self) -> Option<UploadOutcome> {
        match self.outcome_rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<UploadOutcome> {
        match self.outcome_rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}
