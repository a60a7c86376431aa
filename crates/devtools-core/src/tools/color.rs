//! `color:picker`: color conversions across the common CSS notations

use csscolorparser::Color;
use serde::Serialize;
use serde_json::Value;

use crate::types::{ToolOptions, ToolResult};
use super::error::HandlerResult;
use super::support::{format_number, to_pretty_json};

#[derive(Debug, Serialize)]
struct ColorReport {
    brightness: i64,
    hex: String,
    hsl: String,
    hsv: [Option<f64>; 3],
    input: String,
    lab: String,
    luminance: String,
    name: String,
    rgb: String,
    rgba: String,
}

/// Round to `places` decimals; NaN and negative zero collapse to zero
fn round_to(value: f64, places: i32) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    let factor = 10f64.powi(places);
    (value * factor).round() / factor + 0.0
}

fn channel_luminance(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// WCAG relative luminance
pub fn luminance([r, g, b]: [u8; 3]) -> f64 {
    0.2126 * channel_luminance(r) + 0.7152 * channel_luminance(g) + 0.0722 * channel_luminance(b)
}

/// Hue in degrees, `None` for achromatic colors
fn hue(color: &Color, h: f64) -> Option<f64> {
    let max = color.r.max(color.g).max(color.b);
    let min = color.r.min(color.g).min(color.b);
    (h.is_finite() && max > min).then(|| h.rem_euclid(360.0))
}

/// CSS keyword of an opaque color; aliases resolve to the alphabetically first spelling
fn named(rgb: [u8; 3]) -> Option<String> {
    let [r, g, b] = rgb;
    let name = Color::from_rgba8(r, g, b, 255).name()?;
    let preferred = match name {
        "cyan" => "aqua".to_string(),
        "magenta" => "fuchsia".to_string(),
        other => other.replace("grey", "gray"),
    };
    Some(preferred)
}

fn describe(input: &str, color: &Color) -> ColorReport {
    let [r, g, b, _] = color.to_rgba8();
    let rgb = [r, g, b];
    let alpha = round_to(color.a, 4);
    let lum = luminance(rgb);

    let (h, s, l, _) = color.to_hsla();
    let hsl_body = format!(
        "{}deg, {}%, {}%",
        format_number(round_to(hue(color, h).unwrap_or(0.0), 2)),
        format_number(round_to(s * 100.0, 2)),
        format_number(round_to(l * 100.0, 2)),
    );
    let (hv, sv, vv, _) = color.to_hsva();
    let (lab_l, lab_a, lab_b, _) = color.to_lab();

    let opaque = format!("rgb({}, {}, {})", r, g, b);
    ColorReport {
        brightness: (lum * 255.0).round() as i64,
        hex: color.to_hex_string(),
        hsl: if alpha < 1.0 {
            format!("hsl({} / {})", hsl_body, format_number(alpha))
        } else {
            format!("hsl({})", hsl_body)
        },
        hsv: [hue(color, hv).map(|h| round_to(h, 2)), Some(round_to(sv, 4)), Some(round_to(vv, 4))],
        input: input.to_string(),
        lab: format!(
            "lab({}% {} {})",
            format_number(round_to(lab_l, 2)),
            format_number(round_to(lab_a, 2)),
            format_number(round_to(lab_b, 2)),
        ),
        luminance: format!("{:.3}", lum),
        name: named(rgb).unwrap_or_else(|| format!("#{}", hex::encode(rgb))),
        rgba: if alpha < 1.0 {
            format!("rgba({}, {}, {}, {})", r, g, b, format_number(alpha))
        } else {
            opaque.clone()
        },
        rgb: opaque,
    }
}

/// `color:picker`: the `color` option wins over the main input.
///
/// Colors without a CSS keyword report their hex form as the name.
pub fn picker(input: &str, options: &ToolOptions) -> HandlerResult {
    let color = options.str("color").unwrap_or(input).trim();
    if color.is_empty() {
        return Ok(ToolResult::failure("Color input is required"));
    }

    let parsed = match csscolorparser::parse(color) {
        Ok(parsed) => parsed,
        Err(_) => return Ok(ToolResult::failure(format!("Unknown color format: {}", color))),
    };
    let report = describe(color, &parsed);

    Ok(ToolResult::success(to_pretty_json(&report, 2)?).with_metadata("input", Value::from(color)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(input: &str) -> Value {
        let result = picker(input, &ToolOptions::new()).unwrap();
        assert!(result.success, "{:?}", result.error);
        serde_json::from_str(result.output_str()).unwrap()
    }

    #[test]
    fn test_hex_input() {
        let value = report("#ff0000");
        assert_eq!(value["hex"], json!("#ff0000"));
        assert_eq!(value["rgb"], json!("rgb(255, 0, 0)"));
        assert_eq!(value["hsl"], json!("hsl(0deg, 100%, 50%)"));
        assert_eq!(value["name"], json!("red"));
        assert_eq!(value["luminance"], json!("0.213"));
        assert_eq!(value["brightness"], json!(54));
    }

    #[test]
    fn test_other_notations() {
        assert_eq!(report("rgb(255, 0, 0)")["hex"], json!("#ff0000"));
        assert_eq!(report("hsl(0, 100%, 50%)")["rgb"], json!("rgb(255, 0, 0)"));
        assert_eq!(report("#f00")["rgb"], json!("rgb(255, 0, 0)"));
        assert_eq!(report("red")["hex"], json!("#ff0000"));
        assert_eq!(report("#00ffff")["name"], json!("aqua"));
        assert_eq!(report("cyan")["name"], json!("aqua"));
        assert_eq!(report("#ff00ff")["name"], json!("fuchsia"));
        assert_eq!(report("#808080")["name"], json!("gray"));
        assert_eq!(report("lightslategrey")["name"], json!("lightslategray"));
        assert_eq!(report("#123456")["name"], json!("#123456"));
    }

    #[test]
    fn test_alpha() {
        let value = report("rgba(255, 0, 0, 0.5)");
        assert_eq!(value["rgba"], json!("rgba(255, 0, 0, 0.5)"));
        assert_eq!(value["hsl"], json!("hsl(0deg, 100%, 50% / 0.5)"));

        let opaque = report("rgba(255, 0, 0, 1)");
        assert_eq!(opaque["rgba"], json!("rgb(255, 0, 0)"));
    }

    #[test]
    fn test_hsv_and_lab() {
        let value = report("#ffffff");
        assert_eq!(value["hsv"], json!([null, 0.0, 1.0]));
        assert_eq!(value["lab"], json!("lab(100% 0 0)"));
        assert_eq!(report("#ff0000")["hsv"], json!([0.0, 1.0, 1.0]));
        assert_eq!(report("#0000ff")["hsv"], json!([240.0, 1.0, 1.0]));
        assert_eq!(report("#808080")["hsv"][0], Value::Null);
        assert_eq!(report("#808080")["hsl"], json!("hsl(0deg, 0%, 50.2%)"));

        let red = report("#ff0000");
        let lab = red["lab"].as_str().unwrap();
        assert!(lab.starts_with("lab(53.2"), "{}", lab);
    }

    #[test]
    fn test_option_wins_over_input() {
        let options = ToolOptions::new().with("color", "#00ff00");
        let result = picker("not-used", &options).unwrap();
        assert!(result.output_str().contains("#00ff00"));
        assert_eq!(result.meta("input"), Some(&json!("#00ff00")));
    }

    #[test]
    fn test_invalid_colors() {
        let result = picker("notacolor", &ToolOptions::new()).unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Unknown color format: notacolor"));

        let empty = picker("", &ToolOptions::new()).unwrap();
        assert_eq!(empty.error.as_deref(), Some("Color input is required"));
    }
}
