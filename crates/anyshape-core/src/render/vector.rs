//! Vector backend: a standalone SVG document.
//!
//! The clip path is written verbatim in shape units under
//! `scale(S / 100)`, and the image is embedded as a `data:` URI with the
//! same placement the raster backend uses.

use std::fmt::Write as _;

use quick_xml::escape::escape;

use super::{ExportConfig, RenderContext, Rgba};
use crate::clip::ClipRegion;
use crate::decode::ImageSource;
use crate::mapping::Placement;
use crate::shape::{ClipShape, SHAPE_UNITS};
use crate::transform::Transform;

/// Id of the `<clipPath>` element.
pub const CLIP_ID: &str = "shape-clip";

/// Render an SVG document at the configured export size.
///
/// # Arguments
///
/// * `source` - The original encoded image, embedded as a `data:` URI
/// * `natural_width`, `natural_height` - Decoded (upright) image size
/// * `transform` - Placement in preview units
/// * `shape` - Clip shape, emitted verbatim
/// * `config` - Output size, background and border
/// * `ctx` - Supplies the preview reference size
pub fn render_svg(
    source: &ImageSource,
    natural_width: u32,
    natural_height: u32,
    transform: &Transform,
    shape: &ClipShape,
    config: &ExportConfig,
    ctx: &RenderContext,
) -> String {
    let size = config.output_size.pixels() as f64;
    let path_scale = size / SHAPE_UNITS;
    let p = Placement::compute(transform, size, natural_width, natural_height, ctx.reference_size);
    let path = escape(shape.path.as_str());
    let href = source.to_data_uri();

    // Writing to a String cannot fail
    let mut svg = String::with_capacity(href.len() + 1024);
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
         width=\"{size}\" height=\"{size}\" viewBox=\"0 0 {size} {size}\">"
    );
    let _ = writeln!(
        svg,
        "  <defs>\n    <clipPath id=\"{CLIP_ID}\">\n      \
         <path d=\"{path}\" transform=\"scale({path_scale})\"/>\n    </clipPath>\n  </defs>"
    );

    if let Some(color) = config.background.fill() {
        let _ = writeln!(
            svg,
            "  <rect width=\"{size}\" height=\"{size}\" fill=\"{}\"{}/>",
            color.to_rgb_hex(),
            opacity_attr("fill-opacity", color)
        );
    }

    let _ = writeln!(svg, "  <g clip-path=\"url(#{CLIP_ID})\">");
    let _ = writeln!(
        svg,
        "    <g transform=\"translate({} {}) rotate({}) scale({} {})\">",
        p.center_x, p.center_y, p.rotation, p.scale_x, p.scale_y
    );
    let _ = writeln!(
        svg,
        "      <image href=\"{}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\"/>",
        escape(href.as_str()),
        -p.base_width / 2.0,
        -p.base_height / 2.0,
        p.base_width,
        p.base_height
    );
    svg.push_str("    </g>\n  </g>\n");

    if let Some((width_px, color)) = config.border.stroke() {
        let stroke_width = ClipRegion::local_stroke_width(width_px, size);
        let _ = writeln!(
            svg,
            "  <path d=\"{path}\" transform=\"scale({path_scale})\" fill=\"none\" stroke=\"{}\"{} stroke-width=\"{stroke_width}\"/>",
            color.to_rgb_hex(),
            opacity_attr("stroke-opacity", color)
        );
    }

    svg.push_str("</svg>\n");
    svg
}

fn opacity_attr(name: &str, color: Rgba) -> String {
    if color.a == 255 {
        String::new()
    } else {
        format!(" {name}=\"{}\"", color.alpha())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Background, Border, OutputSize};
    use quick_xml::events::Event;
    use quick_xml::Reader;

    const CIRCLE: &str = "M 50 0 A 50 50 0 1 1 50 100 A 50 50 0 1 1 50 0 Z";

    fn source() -> ImageSource {
        ImageSource::from_data_uri("data:image/png;base64,aGVsbG8=").unwrap()
    }

    fn circle() -> ClipShape {
        ClipShape::trusted("circle", "Circle", CIRCLE)
    }

    fn assert_well_formed(svg: &str) {
        let mut reader = Reader::from_str(svg);
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("malformed svg: {e}\n{svg}"),
            }
        }
    }

    #[test]
    fn test_document_structure() {
        let ctx = RenderContext::new();
        let svg = render_svg(&source(), 800, 600, &Transform::IDENTITY, &circle(), &ExportConfig::default(), &ctx);

        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(svg.contains("width=\"512\" height=\"512\" viewBox=\"0 0 512 512\""));
        assert!(svg.contains("<clipPath id=\"shape-clip\">"));
        assert!(svg.contains(&format!("<path d=\"{CIRCLE}\" transform=\"scale(5.12)\"/>")));
        assert!(svg.contains("<g clip-path=\"url(#shape-clip)\">"));
        assert!(svg.contains("translate(256 256) rotate(0) scale(1 1)"));
        assert!(svg.contains("href=\"data:image/png;base64,aGVsbG8=\""));
        assert!(svg.contains("x=\"-256\" y=\"-192\" width=\"512\" height=\"384\""));
        assert!(svg.contains("preserveAspectRatio=\"none\""));
        assert!(!svg.contains("<rect"));
        assert!(!svg.contains("stroke="));
        assert_well_formed(&svg);
    }

    #[test]
    fn test_background_and_border() {
        let ctx = RenderContext::new();
        let config = ExportConfig {
            background: Background::BLACK,
            border: Border {
                enabled: true,
                width: 4.0,
                color: Rgba::WHITE,
            },
            ..ExportConfig::default()
        };
        let svg = render_svg(&source(), 100, 100, &Transform::IDENTITY, &circle(), &config, &ctx);

        assert!(svg.contains("<rect width=\"512\" height=\"512\" fill=\"#000000\"/>"));
        // 4 * 100 / 512
        assert!(svg.contains("stroke=\"#ffffff\" stroke-width=\"0.78125\""));
        assert_well_formed(&svg);
    }

    #[test]
    fn test_zero_width_border_omitted() {
        let ctx = RenderContext::new();
        let config = ExportConfig {
            border: Border {
                enabled: true,
                width: 0.0,
                color: Rgba::WHITE,
            },
            ..ExportConfig::default()
        };
        let svg = render_svg(&source(), 100, 100, &Transform::IDENTITY, &circle(), &config, &ctx);

        assert!(!svg.contains("stroke="));
        assert_well_formed(&svg);
    }

    #[test]
    fn test_translate_matches_placement() {
        let ctx = RenderContext::new();
        let t = Transform::IDENTITY
            .panned(40.0, -20.0)
            .with_rotation(-45.0)
            .with_scale(1.5)
            .flipped(crate::transform::Axis::Vertical);
        let config = ExportConfig {
            output_size: OutputSize::Px1024,
            ..ExportConfig::default()
        };
        let svg = render_svg(&source(), 10, 10, &t, &circle(), &config, &ctx);

        let p = Placement::compute(&t, 1024.0, 10, 10, ctx.reference_size);
        assert!((p.center_x - 614.4).abs() < 1e-9);
        assert!((p.center_y - 460.8).abs() < 1e-9);
        assert!(svg.contains(&format!(
            "translate({} {}) rotate(-45) scale(1.5 -1.5)",
            p.center_x, p.center_y
        )));
    }

    #[test]
    fn test_attributes_are_escaped() {
        let ctx = RenderContext::new();
        let hostile = ClipShape::trusted("x", "X", "M 0 0 L 10 0 L 0 10 Z\" onload=\"alert(1)");
        let svg = render_svg(&source(), 10, 10, &Transform::IDENTITY, &hostile, &ExportConfig::default(), &ctx);

        assert!(svg.contains("&quot; onload=&quot;alert(1)"));
        assert!(!svg.contains("\" onload=\""));
        assert_well_formed(&svg);
    }

    #[test]
    fn test_translucent_colors_use_opacity() {
        let ctx = RenderContext::new();
        let config = ExportConfig {
            background: Background::Solid(Rgba {
                r: 255,
                g: 0,
                b: 0,
                a: 51,
            }),
            ..ExportConfig::default()
        };
        let svg = render_svg(&source(), 10, 10, &Transform::IDENTITY, &circle(), &config, &ctx);
        assert!(svg.contains("fill=\"#ff0000\" fill-opacity=\"0.2\""));
    }
}
