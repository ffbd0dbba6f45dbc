use std::{
  io::Cursor,
  path::{Path, PathBuf},
};

use axum::body::Bytes;
use chrono::Utc;
use image::{io::Reader as ImageReader, DynamicImage, ImageFormat};

use crate::{error::AppResult, vision::NormalizedVertex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
  pub x: u32,
  pub y: u32,
  pub width: u32,
  pub height: u32,
}

/// Edges are rounded to the nearest pixel and clamped into the image. The
/// result is never smaller than 1x1.
pub fn pixel_bounds(vertices: &[NormalizedVertex], width: u32, height: u32) -> PixelRect {
  if vertices.is_empty() {
    return PixelRect {
      x: 0,
      y: 0,
      width,
      height,
    };
  }

  let (mut x_min, mut y_min) = (f32::MAX, f32::MAX);
  let (mut x_max, mut y_max) = (f32::MIN, f32::MIN);
  for vertex in vertices {
    x_min = x_min.min(vertex.x);
    y_min = y_min.min(vertex.y);
    x_max = x_max.max(vertex.x);
    y_max = y_max.max(vertex.y);
  }

  let scale = |value: f32, size: u32| ((value * size as f32).round().max(0.) as u32).min(size);

  let left = scale(x_min, width).min(width.saturating_sub(1));
  let top = scale(y_min, height).min(height.saturating_sub(1));
  let right = scale(x_max, width).max(left + 1);
  let bottom = scale(y_max, height).max(top + 1);

  PixelRect {
    x: left,
    y: top,
    width: right - left,
    height: bottom - top,
  }
}

pub fn load_bytes_guessed(bytes: &Bytes) -> AppResult<DynamicImage> {
  let image = ImageReader::new(Cursor::new(bytes))
    .with_guessed_format()?
    .decode()?;
  Ok(image)
}

pub fn extracted_filename(timestamp_ms: i64, index: usize) -> String {
  format!("extracted_{timestamp_ms}_{index}.png")
}

pub fn extract_objects<'a>(
  image: &DynamicImage,
  objects: impl IntoIterator<Item = &'a [NormalizedVertex]>,
  dir: &Path,
) -> AppResult<Vec<String>> {
  let mut filenames = vec![];
  for (index, vertices) in objects.into_iter().enumerate() {
    let rect = pixel_bounds(vertices, image.width(), image.height());
    let cropped = image.crop_imm(rect.x, rect.y, rect.width, rect.height);

    let filename = extracted_filename(Utc::now().timestamp_millis(), index);
    let path: PathBuf = dir.join(&filename);
    tracing::debug!(path = %path.display(), ?rect, "extracting object");
    cropped.save_with_format(&path, ImageFormat::Png)?;

    filenames.push(filename);
  }
  Ok(filenames)
}
