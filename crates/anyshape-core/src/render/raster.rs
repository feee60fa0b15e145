//! Raster backend.
//!
//! # Algorithm
//!
//! 1. Allocate a transparent `S x S` pixmap and fill the background
//! 2. Build a clip mask from the shape path under `scale(S / 100)`
//! 3. Draw the image through the mask with
//!    `translate(center) . rotate . scale(sx, sy) . translate(-bw/2, -bh/2)`
//!    and a final `scale(bw / w, bh / h)` from natural pixels to base size
//! 4. Stroke the border over everything, unclipped
//! 5. Demultiply into a straight-alpha `RgbaImage`

use image::RgbaImage;
use tiny_skia::{
    Color, ColorU8, FillRule, FilterQuality, Mask, Paint, Pixmap, PixmapPaint, Stroke,
    Transform as SkTransform,
};

use super::{ExportConfig, RenderContext, RenderError};
use crate::clip::ClipRegion;
use crate::decode::DecodedImage;
use crate::encode::encode_rgba_png;
use crate::mapping::Placement;
use crate::shape::ClipShape;
use crate::transform::Transform;

/// Render at the configured export size.
pub fn render_raster(
    image: &DecodedImage,
    transform: &Transform,
    shape: &ClipShape,
    config: &ExportConfig,
    ctx: &RenderContext,
) -> Result<RgbaImage, RenderError> {
    render_raster_sized(image, transform, shape, config, config.output_size.pixels(), ctx)
}

/// Render at an arbitrary square size, e.g. the on-screen preview size.
///
/// # Arguments
///
/// * `image` - Decoded, upright source image
/// * `transform` - Placement in preview units
/// * `shape` - Validated clip shape
/// * `config` - Background and border (the output size field is ignored)
/// * `size` - Output side length in pixels
/// * `ctx` - Supplies the preview reference size
///
/// # Returns
///
/// An `RgbaImage` of exactly `size x size` straight-alpha pixels.
pub fn render_raster_sized(
    image: &DecodedImage,
    transform: &Transform,
    shape: &ClipShape,
    config: &ExportConfig,
    size: u32,
    ctx: &RenderContext,
) -> Result<RgbaImage, RenderError> {
    let mut canvas = Pixmap::new(size, size)
        .ok_or_else(|| RenderError::Canvas(format!("cannot allocate {size}x{size} canvas")))?;

    if let Some(c) = config.background.fill() {
        canvas.fill(Color::from_rgba8(c.r, c.g, c.b, c.a));
    }

    let region = ClipRegion::new(shape, size as f64)?;
    let clip_path = region
        .skia_local_path()
        .ok_or_else(|| RenderError::Canvas("clip path has no segments".to_string()))?;
    let path_scale = region.path_scale() as f32;
    let shape_to_canvas = SkTransform::from_scale(path_scale, path_scale);

    let mut mask = Mask::new(size, size)
        .ok_or_else(|| RenderError::Canvas("cannot allocate clip mask".to_string()))?;
    mask.fill_path(&clip_path, FillRule::Winding, true, shape_to_canvas);

    let source = premultiplied_pixmap(image)?;
    let placement = Placement::compute(
        transform,
        size as f64,
        image.width,
        image.height,
        ctx.reference_size,
    );
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    canvas.draw_pixmap(
        0,
        0,
        source.as_ref(),
        &paint,
        image_transform(&placement, image.width, image.height),
        Some(&mask),
    );

    if let Some((width_px, color)) = config.border.stroke() {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = true;
        let stroke = Stroke {
            width: region.border_local_width(width_px) as f32,
            ..Stroke::default()
        };
        canvas.stroke_path(&clip_path, &paint, &stroke, shape_to_canvas, None);
    }

    Ok(demultiplied(&canvas))
}

/// Render and PNG-encode at the configured export size.
pub fn render_png(
    image: &DecodedImage,
    transform: &Transform,
    shape: &ClipShape,
    config: &ExportConfig,
    ctx: &RenderContext,
) -> Result<Vec<u8>, RenderError> {
    let rendered = render_raster(image, transform, shape, config, ctx)?;
    Ok(encode_rgba_png(&rendered)?)
}

/// Natural image pixels to canvas pixels.
fn image_transform(p: &Placement, natural_width: u32, natural_height: u32) -> SkTransform {
    let bw = p.base_width as f32;
    let bh = p.base_height as f32;
    SkTransform::from_translate(p.center_x as f32, p.center_y as f32)
        .pre_concat(SkTransform::from_rotate(p.rotation as f32))
        .pre_scale(p.scale_x as f32, p.scale_y as f32)
        .pre_translate(-bw / 2.0, -bh / 2.0)
        .pre_scale(bw / natural_width as f32, bh / natural_height as f32)
}

fn premultiplied_pixmap(image: &DecodedImage) -> Result<Pixmap, RenderError> {
    if image.is_empty() || image.pixels.len() != image.width as usize * image.height as usize * 4 {
        return Err(RenderError::Canvas(format!(
            "invalid source image {}x{}",
            image.width, image.height
        )));
    }
    let mut pixmap = Pixmap::new(image.width, image.height)
        .ok_or_else(|| RenderError::Canvas("cannot allocate source pixmap".to_string()))?;

    for (dst, px) in pixmap.pixels_mut().iter_mut().zip(image.pixels.chunks_exact(4)) {
        *dst = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
    }
    Ok(pixmap)
}

fn demultiplied(pixmap: &Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, px) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = px.demultiply();
        dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
    out
}
