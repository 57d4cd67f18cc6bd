//! PDF detection and best-effort rasterization of logo references.
//!
//! The compositor only decodes raster formats. When a logo looks like a PDF
//! the normalizer tries to turn it into a PNG, stores that PNG under the
//! `logos/` namespace and hands back its signed URL. A failure to fetch or
//! rasterize the document falls back to the original reference; decoding it
//! later may then fail, which is reported by the compositor. Storing the
//! rasterized PNG is a publish like any other and fails the request.

use super::publisher::ResultPublisher;
use super::source::{LogoSource, SourceFetcher};
use crate::constants::UNCOMPRESSED_LOGO_SEGMENT;
use crate::error::MockupError;
use image::{DynamicImage, GrayImage, ImageFormat, ImageOutputFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, Stream};
use std::io::Cursor;
use thiserror::Error;

/// Why a PDF could not be turned into a raster image
#[derive(Debug, Error)]
pub enum RasterizationError {
    #[error("Failed to fetch document: {0}")]
    Fetch(#[from] MockupError),

    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("No raster image found in document")]
    NoRasterContent,

    #[error("Failed to encode rasterized logo: {0}")]
    Encode(String),
}

/// Path component of a reference, without query string or fragment
pub fn reference_path(reference: &str) -> &str {
    let end = reference.find(['?', '#']).unwrap_or(reference.len());
    &reference[..end]
}

/// True when the reference path ends in `.pdf` (any case)
pub fn is_pdf_reference(reference: &str) -> bool {
    reference_path(reference)
        .to_ascii_lowercase()
        .ends_with(".pdf")
}

/// Stricter check for PDFs uploaded through the original-logo form.
/// Only used for diagnostics.
pub fn is_uncompressed_pdf(reference: &str) -> bool {
    let path = reference_path(reference);
    path.split('/').any(|segment| segment == UNCOMPRESSED_LOGO_SEGMENT) && is_pdf_reference(path)
}

/// The caller's hint wins when set; otherwise the path suffix decides
pub fn detect_pdf(reference: &str, hint: bool) -> bool {
    hint || is_pdf_reference(reference)
}

/// Decides the effective logo reference for a request
pub struct FormatNormalizer<'a> {
    fetcher: &'a SourceFetcher,
    publisher: &'a ResultPublisher,
}

impl<'a> FormatNormalizer<'a> {
    pub fn new(fetcher: &'a SourceFetcher, publisher: &'a ResultPublisher) -> Self {
        Self { fetcher, publisher }
    }

    /// Return the reference the compositor should fetch.
    ///
    /// # Errors
    ///
    /// `MockupError::Publish` if the rasterized logo cannot be stored or
    /// signed. Rasterization failures are not errors.
    pub async fn normalize(
        &self,
        source: &LogoSource,
        timestamp: i64,
    ) -> Result<String, MockupError> {
        if !detect_pdf(&source.reference, source.is_vector_hint) {
            return Ok(source.reference.clone());
        }

        tracing::info!(
            reference = %source.reference,
            hinted = source.is_vector_hint,
            uncompressed_upload = is_uncompressed_pdf(&source.reference),
            "PDF logo detected, attempting rasterization"
        );

        let png = match self.try_rasterize(&source.reference).await {
            Ok(png) => png,
            Err(e) => {
                tracing::warn!(
                    reference = %source.reference,
                    error = %e,
                    "PDF rasterization failed, using original reference"
                );
                return Ok(source.reference.clone());
            }
        };

        let artifact = self.publisher.publish_logo(png, timestamp).await?;
        tracing::info!(key = %artifact.storage_key, "Rasterized logo stored");
        Ok(artifact.signed_url)
    }

    async fn try_rasterize(&self, reference: &str) -> Result<Vec<u8>, RasterizationError> {
        let bytes = self.fetcher.fetch(reference).await?;
        rasterize(&bytes)
    }
}

/// Convert document bytes to an RGBA PNG.
///
/// Tries the bytes as a raster image first (mislabelled uploads), then looks
/// for the largest embedded image in the PDF. Vector content is not rendered.
pub fn rasterize(bytes: &[u8]) -> Result<Vec<u8>, RasterizationError> {
    let image = match image::load_from_memory(bytes) {
        Ok(image) => image,
        Err(_) => extract_embedded_image(bytes)?,
    };

    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image.to_rgba8())
        .write_to(&mut buffer, ImageOutputFormat::Png)
        .map_err(|e| RasterizationError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}

fn extract_embedded_image(bytes: &[u8]) -> Result<DynamicImage, RasterizationError> {
    let document =
        Document::load_mem(bytes).map_err(|e| RasterizationError::Parse(e.to_string()))?;

    document
        .objects
        .values()
        .filter_map(|object| match object {
            Object::Stream(stream) if is_image_xobject(&stream.dict) => decode_image_stream(stream),
            _ => None,
        })
        .max_by_key(|image| u64::from(image.width()) * u64::from(image.height()))
        .ok_or(RasterizationError::NoRasterContent)
}

fn is_image_xobject(dict: &Dictionary) -> bool {
    dict.get(b"Subtype")
        .and_then(|object| object.as_name())
        .map(|name| name == b"Image")
        .unwrap_or(false)
}

fn stream_filters(dict: &Dictionary) -> Vec<&[u8]> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.as_slice()],
        Ok(Object::Array(items)) => items.iter().filter_map(|o| o.as_name().ok()).collect(),
        _ => Vec::new(),
    }
}

fn dimension(dict: &Dictionary, key: &[u8]) -> Option<u32> {
    let value = dict.get(key).ok()?.as_i64().ok()?;
    u32::try_from(value).ok().filter(|v| *v > 0)
}

/// Decode a single image XObject. Handles JPEG streams and 8-bit
/// Flate-compressed DeviceRGB/DeviceGray samples.
fn decode_image_stream(stream: &Stream) -> Option<DynamicImage> {
    let dict = &stream.dict;
    let filters = stream_filters(dict);

    if filters.as_slice() == [b"DCTDecode".as_slice()] {
        return image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg).ok();
    }

    let width = dimension(dict, b"Width")?;
    let height = dimension(dict, b"Height")?;
    let bits = dict.get(b"BitsPerComponent").ok()?.as_i64().ok()?;
    if bits != 8 {
        return None;
    }

    let samples = if filters.is_empty() {
        stream.content.clone()
    } else if filters.as_slice() == [b"FlateDecode".as_slice()] {
        stream.decompressed_content().ok()?
    } else {
        return None;
    };

    let colour_space = dict.get(b"ColorSpace").ok()?.as_name().ok()?;
    match colour_space {
        b"DeviceRGB" => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        b"DeviceGray" => {
            GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8)
        }
        _ => None,
    }
}
