use png::{BitDepth, ColorType, Encoder};
use thiserror::Error;
use tiling_core::{LayoutResult, Tile, tile_color};

/// Largest preview the browser draws, in CSS pixels.
pub const MAX_PREVIEW_W: f64 = 700.0;
pub const MAX_PREVIEW_H: f64 = 500.0;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("SVG parse error: {0}")]
    Svg(String),
    #[error("pixmap alloc failed for {0}x{1}")]
    Pixmap(u32, u32),
    #[error("png encode: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Pixel box a layout is drawn into, plus the area-to-pixel scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewBox {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

/// Fit an area into at most `max_w` x `max_h` pixels keeping its aspect
/// ratio. Width is filled first; if that overshoots the height bound the
/// height is pinned and the width shrinks to match.
pub fn fit_preview(area_w: f64, area_h: f64, max_w: f64, max_h: f64) -> PreviewBox {
    let aspect = area_h / area_w;
    let mut width = max_w.max(1.0);
    let mut height = width * aspect;
    if height > max_h {
        height = max_h.max(1.0);
        width = height / aspect;
    }
    PreviewBox {
        width,
        height,
        scale: width / area_w,
    }
}

fn tile_rect(t: &Tile, scale: f64, pad: f64) -> String {
    format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>\n",
        pad + t.x * scale,
        pad + t.y * scale,
        t.width * scale,
        t.height * scale,
        tile_color(t.color_index)
    )
}

/// Build an SVG of the layout. Tiles are positioned from the top-left corner
/// of the area, like the browser preview. Returns the document and its pixel
/// size.
pub fn build_preview_svg(layout: &LayoutResult, fit: &PreviewBox, pad_px: f64) -> (String, u32, u32) {
    let w_px = (fit.width + 2.0 * pad_px).ceil() as u32;
    let h_px = (fit.height + 2.0 * pad_px).ceil() as u32;
    let mut s = String::new();
    s.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    s.push_str(&format!("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" stroke=\"#333\" stroke-width=\"1\">\n", w_px, h_px, w_px, h_px));
    s.push_str("<rect x=\"0\" y=\"0\" width=\"100%\" height=\"100%\" fill=\"#ffffff\" stroke=\"none\"/>\n");
    for t in &layout.tiles {
        s.push_str(&tile_rect(t, fit.scale, pad_px));
    }
    // area outline on top so cut edges stay visible
    s.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"#111\" stroke-width=\"2\"/>\n",
        pad_px,
        pad_px,
        layout.area_width * fit.scale,
        layout.area_height * fit.scale
    ));
    s.push_str("</svg>\n");
    (s, w_px, h_px)
}

// Shared PNG encoder: RGBA -> PNG bytes (deterministic for same input)
pub fn encode_rgba_to_png_bytes(
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<Vec<u8>, png::EncodingError> {
    let mut buf = Vec::new();
    {
        let mut enc = Encoder::new(&mut buf, width, height);
        enc.set_color(ColorType::Rgba);
        enc.set_depth(BitDepth::Eight);
        {
            let mut writer = enc.write_header()?;
            writer.write_image_data(rgba)?;
        }
    }
    Ok(buf)
}

/// Rasterize an SVG produced by [`build_preview_svg`] into PNG bytes.
pub fn render_svg_to_png(svg: &str, w_px: u32, h_px: u32) -> Result<Vec<u8>, PreviewError> {
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| PreviewError::Svg(format!("{e:?}")))?;
    let mut pixmap = tiny_skia::Pixmap::new(w_px, h_px).ok_or(PreviewError::Pixmap(w_px, h_px))?;
    let mut pm = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pm);
    Ok(encode_rgba_to_png_bytes(w_px, h_px, pixmap.data())?)
}

pub fn render_png(layout: &LayoutResult, fit: &PreviewBox, pad_px: f64) -> Result<Vec<u8>, PreviewError> {
    let (svg, w_px, h_px) = build_preview_svg(layout, fit, pad_px);
    render_svg_to_png(&svg, w_px, h_px)
}
