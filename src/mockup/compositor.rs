//! Mockup compositor.
//!
//! Decodes the background and logo, derives one resized logo variant per
//! anchor group, and alpha-blends each variant centred on every anchor of its
//! group. The result is flattened to RGB before encoding.
//!
//! # Example
//!
//! ```ignore
//! use mockup_forge::mockup::{AnchorLayout, Compositor};
//!
//! let layout = AnchorLayout::standard();
//! let compositor = Compositor::new(&layout);
//! let mockup = compositor.composite(&background_png, &logo_png)?;
//! assert_eq!(mockup.dimensions(), (1920, 1080));
//! ```

use super::layout::{centered_origin, AnchorGroup, AnchorLayout, BoundingBox, PlacementPosition};
use crate::error::MockupError;
use fast_image_resize::{FilterType, Image, MulDiv, PixelType, ResizeAlg, Resizer};
use image::io::Reader as ImageReader;
use image::{DynamicImage, Rgba, RgbaImage, RgbImage};
use std::io::Cursor;
use std::num::NonZeroU32;

/// Compositor for placing a logo on the template background
#[derive(Debug, Clone, Copy)]
pub struct Compositor<'a> {
    layout: &'a AnchorLayout,
}

impl<'a> Compositor<'a> {
    pub fn new(layout: &'a AnchorLayout) -> Self {
        Self { layout }
    }

    /// Decode both buffers and composite the logo onto the background.
    ///
    /// # Errors
    ///
    /// `MockupError::Decode` if either buffer is not a decodable image or the
    /// logo has a zero dimension.
    pub fn composite(
        &self,
        background_bytes: &[u8],
        logo_bytes: &[u8],
    ) -> Result<RgbImage, MockupError> {
        let background = decode_rgba(background_bytes, "background")?;
        let logo = decode_rgba(logo_bytes, "logo")?;
        self.composite_images(background, &logo)
    }

    /// Composite an already decoded logo onto an owned background buffer
    pub fn composite_images(
        &self,
        mut background: RgbaImage,
        logo: &RgbaImage,
    ) -> Result<RgbImage, MockupError> {
        if logo.width() == 0 || logo.height() == 0 {
            return Err(MockupError::Decode(format!(
                "logo has zero size ({}x{})",
                logo.width(),
                logo.height()
            )));
        }

        for group in self.layout.passes() {
            let variant = resize_to_fit(logo, group.bounds)?;
            tracing::debug!(
                group = group.name,
                width = variant.width(),
                height = variant.height(),
                anchors = group.anchors.len(),
                "Placing logo variant"
            );
            place_group(&mut background, &variant, group);
        }

        Ok(flatten(background))
    }
}

/// Blend `variant` centred on every anchor of `group`, in anchor order
fn place_group(target: &mut RgbaImage, variant: &RgbaImage, group: &AnchorGroup) {
    for anchor in group.anchors {
        let origin = centered_origin(*anchor, variant.width(), variant.height());
        blend_onto(target, variant, origin);
    }
}

/// Decode image data into an RGBA buffer, adding an opaque alpha channel
/// when the source has none
pub fn decode_rgba(data: &[u8], what: &str) -> Result<RgbaImage, MockupError> {
    let image = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| MockupError::Decode(format!("{}: {}", what, e)))?
        .decode()
        .map_err(|e| MockupError::Decode(format!("{}: {}", what, e)))?;

    if image.width() == 0 || image.height() == 0 {
        return Err(MockupError::Decode(format!(
            "{} has zero size ({}x{})",
            what,
            image.width(),
            image.height()
        )));
    }

    Ok(image.to_rgba8())
}

/// Size of `width`×`height` after fitting it inside `bounds`.
///
/// Images already inside the box are left alone. Larger images are scaled by
/// `min(max_w / w, max_h / h)` with both sides rounded down. The arithmetic
/// is done on integers so the limiting side lands exactly on the box edge.
/// A side that would round to zero is kept at one pixel.
pub fn fit_within(width: u32, height: u32, bounds: BoundingBox) -> (u32, u32) {
    if bounds.contains(width, height) || width == 0 || height == 0 {
        return (width, height);
    }

    let (w, h) = (width as u64, height as u64);
    let (max_w, max_h) = (bounds.max_width as u64, bounds.max_height as u64);

    // max_w / w <= max_h / h  <=>  max_w * h <= max_h * w
    let (new_w, new_h) = if max_w * h <= max_h * w {
        (max_w, h * max_w / w)
    } else {
        (w * max_h / h, max_h)
    };

    (new_w.max(1) as u32, new_h.max(1) as u32)
}

/// Resize a logo to fit `bounds`, returning a copy when no resize is needed
pub fn resize_to_fit(logo: &RgbaImage, bounds: BoundingBox) -> Result<RgbaImage, MockupError> {
    let (target_w, target_h) = fit_within(logo.width(), logo.height(), bounds);
    if (target_w, target_h) == logo.dimensions() {
        return Ok(logo.clone());
    }
    resize_rgba(logo, target_w, target_h)
}

/// Resize an RGBA buffer with a Lanczos3 filter.
///
/// Colour channels are premultiplied by alpha around the convolution so
/// transparent pixels do not bleed their colour into the logo edges.
pub fn resize_rgba(img: &RgbaImage, target_w: u32, target_h: u32) -> Result<RgbaImage, MockupError> {
    let resize_err = |msg: String| MockupError::Decode(format!("resize failed: {}", msg));

    let src_width =
        NonZeroU32::new(img.width()).ok_or_else(|| resize_err("source width is 0".into()))?;
    let src_height =
        NonZeroU32::new(img.height()).ok_or_else(|| resize_err("source height is 0".into()))?;
    let dst_width =
        NonZeroU32::new(target_w).ok_or_else(|| resize_err("target width is 0".into()))?;
    let dst_height =
        NonZeroU32::new(target_h).ok_or_else(|| resize_err("target height is 0".into()))?;

    let mut src_image =
        Image::from_vec_u8(src_width, src_height, img.as_raw().clone(), PixelType::U8x4)
            .map_err(|e| resize_err(format!("{:?}", e)))?;

    let alpha_mul_div = MulDiv::default();
    alpha_mul_div
        .multiply_alpha_inplace(&mut src_image.view_mut())
        .map_err(|e| resize_err(format!("{:?}", e)))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);
    {
        let mut dst_view = dst_image.view_mut();

        let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));
        resizer
            .resize(&src_image.view(), &mut dst_view)
            .map_err(|e| resize_err(format!("{:?}", e)))?;

        alpha_mul_div
            .divide_alpha_inplace(&mut dst_view)
            .map_err(|e| resize_err(format!("{:?}", e)))?;
    }

    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| resize_err("output buffer has the wrong size".into()))
}

/// Blend `overlay` onto `target` with its top-left corner at `position`.
///
/// Pixels falling outside the target are skipped.
pub fn blend_onto(target: &mut RgbaImage, overlay: &RgbaImage, position: PlacementPosition) {
    let target_width = target.width() as i64;
    let target_height = target.height() as i64;

    let (px, py) = (position.x as i64, position.y as i64);

    // Calculate the visible region (clamp to target bounds)
    let x_start = px.max(0);
    let y_start = py.max(0);
    let x_end = (px + overlay.width() as i64).min(target_width);
    let y_end = (py + overlay.height() as i64).min(target_height);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let src = *overlay.get_pixel((tx - px) as u32, (ty - py) as u32);
            let dst = target.get_pixel_mut(tx as u32, ty as u32);
            *dst = blend_pixels(*dst, src);
        }
    }
}

/// Porter-Duff "over": `out = fg * a + bg * (1 - a)` per channel.
///
/// On an opaque background this is exactly the straight alpha blend; with a
/// translucent background the result is renormalised by the output alpha.
pub fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = foreground[3] as f32 / 255.0;
    if foreground[3] == 0 {
        return background;
    }
    if foreground[3] == 255 {
        return foreground;
    }

    let bg_alpha = background[3] as f32 / 255.0;
    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}

/// Drop the alpha channel
pub fn flatten(image: RgbaImage) -> RgbImage {
    DynamicImage::ImageRgba8(image).to_rgb8()
}
