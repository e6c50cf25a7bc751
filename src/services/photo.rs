// src/services/photo.rs

use std::io::Cursor;

use chrono::{DateTime, Utc};
use image::{codecs::jpeg::JpegEncoder, io::Reader, ColorType, GenericImageView, ImageError, RgbImage};
use uuid::Uuid;

use crate::common::error::AppError;

// Limites da foto enviada pelo funcionário
pub const MAX_DIMENSION: u32 = 1280;
pub const TARGET_BYTES: usize = 400 * 1024;

// Teto da foto original, conferido antes de decodificar
pub const MAX_SOURCE_SIDE: u32 = 12_000;
pub const MAX_SOURCE_PIXELS: u64 = 50_000_000;

const START_QUALITY: u8 = 85;
const MIN_QUALITY: u8 = 35;
const QUALITY_STEP: u8 = 10;

/// Reduz a foto para caber em `MAX_DIMENSION` e re-encoda em JPEG,
/// baixando a qualidade até ficar abaixo de `TARGET_BYTES` (ou chegar
/// na qualidade mínima). Trabalho pesado: chamar via `spawn_blocking`.
pub fn compress(raw: &[u8]) -> Result<Vec<u8>, AppError> {
    let (width, height) = Reader::new(Cursor::new(raw))
        .with_guessed_format()
        .map_err(ImageError::IoError)?
        .into_dimensions()?;
    check_dimensions(width, height)?;

    let img = image::load_from_memory(raw)?;

    let img = if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img.thumbnail(MAX_DIMENSION, MAX_DIMENSION)
    } else {
        img
    };

    let rgb = img.to_rgb8();
    let mut quality = START_QUALITY;

    loop {
        let encoded = encode_jpeg(&rgb, quality)?;
        if encoded.len() <= TARGET_BYTES || quality <= MIN_QUALITY {
            return Ok(encoded);
        }
        quality = quality.saturating_sub(QUALITY_STEP).max(MIN_QUALITY);
    }
}

pub fn check_dimensions(width: u32, height: u32) -> Result<(), AppError> {
    let too_wide = width.max(height) > MAX_SOURCE_SIDE;
    let too_many = u64::from(width) * u64::from(height) > MAX_SOURCE_PIXELS;
    if too_wide || too_many {
        return Err(AppError::PhotoTooLarge { width, height });
    }
    Ok(())
}

fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, AppError> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality).encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ColorType::Rgb8,
    )?;
    Ok(buffer)
}

// Nome único: id da tarefa + instante do envio
pub fn object_name(task_id: Uuid, at: DateTime<Utc>) -> String {
    format!("{}-{}.jpg", task_id, at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, ImageOutputFormat, Rgb};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(buffer)
            .write_to(&mut bytes, ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn large_photos_are_scaled_down_keeping_aspect_ratio() {
        let out = compress(&png(2560, 1280)).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();

        assert_eq!(decoded.dimensions(), (1280, 640));
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn small_photos_keep_their_size() {
        let out = compress(&png(320, 200)).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();

        assert_eq!(decoded.dimensions(), (320, 200));
        assert!(out.len() <= TARGET_BYTES);
    }

    #[test]
    fn garbage_is_rejected_as_invalid_image() {
        let err = compress(b"definitely not a photo").unwrap_err();
        assert!(matches!(err, AppError::InvalidImage(_)));
    }

    fn crc32(bytes: &[u8]) -> u32 {
        let mut crc = 0xFFFF_FFFF_u32;
        for &byte in bytes {
            crc ^= u32::from(byte);
            for _ in 0..8 {
                let mask = (crc & 1).wrapping_neg();
                crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
            }
        }
        !crc
    }

    // PNG pequeno cujo cabeçalho IHDR declara outra resolução
    fn png_declaring(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = png(1, 1);
        assert_eq!(&bytes[12..16], b"IHDR");
        bytes[16..20].copy_from_slice(&width.to_be_bytes());
        bytes[20..24].copy_from_slice(&height.to_be_bytes());
        let crc = crc32(&bytes[12..29]);
        bytes[29..33].copy_from_slice(&crc.to_be_bytes());
        bytes
    }

    #[test]
    fn header_resolution_is_checked_before_decoding() {
        let err = compress(&png_declaring(13_000, 1)).unwrap_err();
        assert!(matches!(err, AppError::PhotoTooLarge { width: 13_000, height: 1 }));
    }

    #[rstest::rstest]
    #[case(4000, 3000, true)]
    #[case(12_000, 1, true)]
    #[case(12_001, 1, false)]
    #[case(1, 12_001, false)]
    #[case(9000, 9000, false)]
    fn source_resolution_limits(#[case] width: u32, #[case] height: u32, #[case] accepted: bool) {
        assert_eq!(check_dimensions(width, height).is_ok(), accepted);
    }

    #[test]
    fn object_names_embed_task_and_timestamp() {
        let id = Uuid::nil();
        let at = DateTime::from_timestamp_millis(1_760_000_000_123).unwrap();
        assert_eq!(
            object_name(id, at),
            "00000000-0000-0000-0000-000000000000-1760000000123.jpg"
        );
    }
}
