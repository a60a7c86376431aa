//! 1D barcodes (and QR) rendered as SVG

use std::fmt::Write as _;

use barcoders::sym::code128::Code128;
use barcoders::sym::code39::Code39;
use barcoders::sym::ean13::EAN13;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use qrcode::{Color, QrCode};

use crate::types::{ToolOptions, ToolResult};
use crate::tools::error::{HandlerResult, ToolError};

/// Millimetres to pixels at 72 dpi
const MM_TO_PX: f64 = 72.0 / 25.4;
const TEXT_POINTS: usize = 10;

/// Code 128 charset B marker understood by the encoder
const CODE128_SET_B: char = 'Ɓ';

fn digits(data: &str, format: &str) -> Result<Vec<u32>, ToolError> {
    data.chars()
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ToolError::invalid(format!("{}: input must contain only digits", format)))
}

/// GS1 mod-10 check digit over the data digits (without the check digit)
fn gs1_check_digit(data: &[u32]) -> u32 {
    let sum: u32 = data
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
        .sum();
    (10 - sum % 10) % 10
}

/// Validate EAN-13 data (12 digits, or 13 with a correct check digit) and
/// return the 12 payload digits
fn ean13_payload(data: &str, format: &str) -> Result<String, ToolError> {
    let parsed = digits(data, format)?;
    match parsed.len() {
        12 => Ok(data.to_string()),
        13 => {
            if gs1_check_digit(&parsed[..12]) != parsed[12] {
                return Err(ToolError::invalid(format!("{}: incorrect checksum", format)));
            }
            Ok(data[..12].to_string())
        }
        n => Err(ToolError::invalid(format!(
            "{}: expected 12 or 13 digits, got {}",
            format, n
        ))),
    }
}

/// UPC-A is EAN-13 with a leading zero
fn upca_payload(data: &str) -> Result<String, ToolError> {
    let parsed = digits(data, "upca")?;
    match parsed.len() {
        11 => Ok(format!("0{}", data)),
        12 => ean13_payload(&format!("0{}", data), "upca"),
        n => Err(ToolError::invalid(format!("upca: expected 11 or 12 digits, got {}", n))),
    }
}

/// Encode `data` into a row of modules (1 = bar)
fn encode_modules(format: &str, data: &str) -> Result<Vec<u8>, ToolError> {
    match format {
        "code128" => {
            if !data.chars().all(|c| (' '..='~').contains(&c)) {
                return Err(ToolError::invalid("code128: only printable ASCII is supported"));
            }
            Ok(Code128::new(format!("{}{}", CODE128_SET_B, data))
                .map_err(ToolError::other)?
                .encode())
        }
        "code39" => Ok(Code39::new(data.to_uppercase())
            .map_err(ToolError::other)?
            .encode()),
        "ean13" => Ok(EAN13::new(ean13_payload(data, "ean13")?)
            .map_err(ToolError::other)?
            .encode()),
        "upca" => Ok(EAN13::new(upca_payload(data)?)
            .map_err(ToolError::other)?
            .encode()),
        other => Err(ToolError::unsupported("barcode type", other)),
    }
}

struct Layout {
    scale: usize,
    bar_height: usize,
    text: Option<(String, &'static str)>,
}

fn svg_document(width: usize, height: usize, body: &str) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\
<rect width=\"{w}\" height=\"{h}\" fill=\"#ffffff\"/>{body}</svg>",
        w = width,
        h = height,
        body = body
    )
}

fn linear_svg(modules: &[u8], layout: &Layout) -> String {
    let width = modules.len() * layout.scale;
    let mut body = String::new();

    // Merge runs of bars into single rects
    let mut i = 0;
    while i < modules.len() {
        if modules[i] == 1 {
            let start = i;
            while i < modules.len() && modules[i] == 1 {
                i += 1;
            }
            let _ = write!(
                body,
                "<rect x=\"{}\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#000000\"/>",
                start * layout.scale,
                (i - start) * layout.scale,
                layout.bar_height
            );
        } else {
            i += 1;
        }
    }

    let mut height = layout.bar_height;
    if let Some((text, anchor)) = &layout.text {
        let font_size = TEXT_POINTS * layout.scale;
        let gap = 2 * layout.scale;
        height += gap + font_size;
        let x = match *anchor {
            "start" => 0,
            "end" => width,
            _ => width / 2,
        };
        let _ = write!(
            body,
            "<text x=\"{}\" y=\"{}\" text-anchor=\"{}\" font-family=\"monospace\" font-size=\"{}\">{}</text>",
            x,
            height - layout.scale,
            anchor,
            font_size,
            quick_xml::escape::escape(text.as_str())
        );
    }

    svg_document(width, height, &body)
}

fn qr_svg(data: &str, scale: usize) -> Result<String, ToolError> {
    let code = QrCode::new(data.as_bytes()).map_err(ToolError::other)?;
    let width = code.width();
    let colors = code.to_colors();
    let mut body = String::new();

    for (idx, color) in colors.iter().enumerate() {
        if *color == Color::Dark {
            let _ = write!(
                body,
                "<rect x=\"{}\" y=\"{}\" width=\"{s}\" height=\"{s}\" fill=\"#000000\"/>",
                (idx % width) * scale,
                (idx / width) * scale,
                s = scale
            );
        }
    }

    Ok(svg_document(width * scale, width * scale, &body))
}

fn text_anchor(align: &str) -> &'static str {
    match align {
        "left" | "offleft" => "start",
        "right" | "offright" => "end",
        _ => "middle",
    }
}

/// `barcode:generate`: Code 128, Code 39, EAN-13, UPC-A or QR as an SVG data URL
pub fn generate(input: &str, options: &ToolOptions) -> HandlerResult {
    if input.is_empty() {
        return Ok(ToolResult::failure("Input text is required"));
    }

    let format = options.str_or("format", "code128");
    let scale = options.count_in("scale", 3, 1, 5);
    let height = options.count_in("height", 10, 5, 50);
    let include_text = options.flag("includeText", true);

    let svg = if format == "qrcode" {
        qr_svg(input, scale)?
    } else {
        let modules = encode_modules(format, input)?;
        let layout = Layout {
            scale,
            bar_height: (height as f64 * MM_TO_PX * scale as f64).round() as usize,
            text: include_text.then(|| (input.to_string(), text_anchor(options.str_or("textAlign", "center")))),
        };
        linear_svg(&modules, &layout)
    };

    Ok(ToolResult::success(format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(svg)
    ))
    .with_metadata("format", format)
    .with_metadata("height", height)
    .with_metadata("scale", scale))
}
