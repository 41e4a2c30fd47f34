// Frame capture - Save displayed frames as PNG images

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::Frame;

/// Errors that can occur while saving a capture
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    #[error("frame of {width}x{height} holds {got} pixels")]
    Size {
        width: usize,
        height: usize,
        got: usize,
    },
}

/// Save a captured frame into `directory`
///
/// The directory is created if needed.
///
/// # Arguments
///
/// * `frame` - The captured active area
/// * `directory` - Destination directory
/// * `include_timestamp` - Name the file after the current time rather than the frame number
///
/// # Returns
///
/// Result containing the path to the saved image or an error
pub fn save_capture(
    frame: &Frame,
    directory: &Path,
    include_timestamp: bool,
) -> Result<PathBuf, CaptureError> {
    fs::create_dir_all(directory)?;

    let filename = if include_timestamp {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        format!("capture_{}_{:04}.png", timestamp, frame.number)
    } else {
        format!("capture_{:04}.png", frame.number)
    };
    let file_path = directory.join(filename);

    save_png(&file_path, frame)?;
    info!(path = %file_path.display(), frame = frame.number, "frame captured");

    Ok(file_path)
}

/// Save a frame as an 8-bit RGB PNG file
///
/// Channels narrower than 8 bits are widened by bit replication.
pub fn save_png(path: &Path, frame: &Frame) -> Result<(), CaptureError> {
    if frame.pixels.len() != frame.width * frame.height {
        return Err(CaptureError::Size {
            width: frame.width,
            height: frame.height,
            got: frame.pixels.len(),
        });
    }

    let file = fs::File::create(path)?;
    let w = io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, frame.width as u32, frame.height as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&frame.to_rgb888())?;

    Ok(())
}
