//! QR code PNG renderer

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use qrcode::{Color, EcLevel, QrCode};

use crate::types::{ToolOptions, ToolResult};
use crate::tools::error::{HandlerResult, ToolError};

const SIZE_RANGE: (usize, usize) = (50, 1000);
const MARGIN_RANGE: (usize, usize) = (0, 10);

pub(crate) fn ec_level(level: &str) -> Result<EcLevel, ToolError> {
    match level {
        "L" => Ok(EcLevel::L),
        "M" => Ok(EcLevel::M),
        "Q" => Ok(EcLevel::Q),
        "H" => Ok(EcLevel::H),
        other => Err(ToolError::unsupported("error correction level", other)),
    }
}

fn parse_color(color: &str) -> Result<Rgba<u8>, ToolError> {
    let parsed = csscolorparser::parse(color)
        .map_err(|_| ToolError::invalid(format!("Invalid color: {}", color)))?;
    Ok(Rgba(parsed.to_rgba8()))
}

/// Rasterise a QR code into a square image of `size` pixels, `margin`
/// modules of quiet zone on each side. The image never drops below one
/// pixel per module.
pub(crate) fn render(
    code: &QrCode,
    size: u32,
    margin: u32,
    dark: Rgba<u8>,
    light: Rgba<u8>,
) -> Result<RgbaImage, ToolError> {
    let width = u32::try_from(code.width()).map_err(ToolError::other)?;
    let colors = code.to_colors();
    let modules = margin
        .checked_mul(2)
        .and_then(|quiet| quiet.checked_add(width))
        .ok_or_else(|| ToolError::invalid("QR code margin is too large"))?;
    let size = size.max(modules);
    let scale = size as f64 / modules as f64;

    Ok(RgbaImage::from_fn(size, size, |x, y| {
        let mx = (x as f64 / scale).floor() as i64 - margin as i64;
        let my = (y as f64 / scale).floor() as i64 - margin as i64;
        let inside = (0..width as i64).contains(&mx) && (0..width as i64).contains(&my);
        if inside && colors[(my as usize) * width as usize + mx as usize] == Color::Dark {
            dark
        } else {
            light
        }
    }))
}

/// Encode an image as a `data:image/png;base64,` URL
pub(crate) fn png_data_url(image: RgbaImage) -> Result<String, ToolError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(ToolError::other)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
}

/// `qrcode:generate`
pub fn generate(input: &str, options: &ToolOptions) -> HandlerResult {
    if input.is_empty() {
        return Ok(ToolResult::failure("Input text is required"));
    }

    let level = options.str_or("errorCorrection", "M");
    let size = options.count_in("size", 300, SIZE_RANGE.0, SIZE_RANGE.1);
    let margin = options.count_in("margin", 2, MARGIN_RANGE.0, MARGIN_RANGE.1);
    let dark = parse_color(options.str_or("colorDark", "#000000"))?;
    let light = parse_color(options.str_or("colorLight", "#ffffff"))?;

    let code = QrCode::with_error_correction_level(input.as_bytes(), ec_level(level)?)
        .map_err(ToolError::other)?;
    // both values are clamped to small ranges above
    let image = render(&code, size as u32, margin as u32, dark, light)?;

    Ok(ToolResult::success(png_data_url(image)?)
        .with_metadata("errorCorrection", level)
        .with_metadata("format", "PNG (Data URL)")
        .with_metadata("size", size))
}
