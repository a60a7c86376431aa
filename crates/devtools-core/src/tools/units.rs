//! `units:convert`: factor-table unit conversion

use crate::types::{ToolOptions, ToolResult};
use super::error::{HandlerResult, ToolError};
use super::support::{format_number, parse_float_prefix};

/// Unit category with its display label and factors relative to a base unit
struct Category {
    label: &'static str,
    factors: &'static [(&'static str, f64)],
}

const DATA: Category = Category {
    label: "Data",
    factors: &[
        ("B", 1.0),
        ("KB", 1024.0),
        ("MB", 1_048_576.0),
        ("GB", 1_073_741_824.0),
        ("TB", 1_099_511_627_776.0),
        ("PB", 1_125_899_906_842_624.0),
        ("EB", 1_152_921_504_606_846_976.0),
    ],
};

/// Base unit: milliseconds
const TIME: Category = Category {
    label: "Time",
    factors: &[
        ("ms", 1.0),
        ("s", 1000.0),
        ("m", 60_000.0),
        ("h", 3_600_000.0),
        ("d", 86_400_000.0),
        ("w", 604_800_000.0),
        ("y", 31_536_000_000.0),
    ],
};

const TRANSFER: Category = Category {
    label: "Transfer Rate",
    factors: &[
        ("bps", 1.0),
        ("kbps", 1000.0),
        ("mbps", 1_000_000.0),
        ("gbps", 1_000_000_000.0),
        ("B/s", 1.0),
        ("kB/s", 1024.0),
        ("MB/s", 1_048_576.0),
        ("GB/s", 1_073_741_824.0),
    ],
};

/// Base unit: metres
const LENGTH: Category = Category {
    label: "Length",
    factors: &[
        ("mm", 0.001),
        ("cm", 0.01),
        ("m", 1.0),
        ("km", 1000.0),
        ("in", 0.0254),
        ("ft", 0.3048),
        ("yd", 0.9144),
        ("mi", 1609.344),
    ],
};

/// Base unit: grams
const WEIGHT: Category = Category {
    label: "Weight",
    factors: &[
        ("mg", 0.001),
        ("g", 1.0),
        ("kg", 1000.0),
        ("t", 1_000_000.0),
        ("oz", 28.349_523_125),
        ("lb", 453.592_37),
    ],
};

impl Category {
    fn factor(&self, unit: &str) -> Result<f64, ToolError> {
        self.factors
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, factor)| *factor)
            .ok_or_else(|| ToolError::unsupported("unit", unit))
    }

    fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, ToolError> {
        Ok(value * self.factor(from)? / self.factor(to)?)
    }
}

fn to_celsius(value: f64, unit: &str) -> Result<f64, ToolError> {
    match unit {
        "C" => Ok(value),
        "F" => Ok((value - 32.0) * 5.0 / 9.0),
        "K" => Ok(value - 273.15),
        other => Err(ToolError::unsupported("unit", other)),
    }
}

fn convert_temperature(value: f64, from: &str, to: &str) -> Result<f64, ToolError> {
    if from == to {
        to_celsius(value, from)?;
        return Ok(value);
    }
    // Direct formulas keep results like 0 C -> 273.15 K exact
    let result = match (from, to) {
        ("C", "F") => value * 9.0 / 5.0 + 32.0,
        ("C", "K") => value + 273.15,
        ("F", "C") => (value - 32.0) * 5.0 / 9.0,
        ("F", "K") => (value - 32.0) * 5.0 / 9.0 + 273.15,
        ("K", "C") => value - 273.15,
        ("K", "F") => (value - 273.15) * 9.0 / 5.0 + 32.0,
        (from, to) => {
            to_celsius(value, from)?;
            return Err(ToolError::unsupported("unit", to));
        }
    };
    Ok(result)
}

/// `units:convert`
pub fn convert(input: &str, options: &ToolOptions) -> HandlerResult {
    let category = options.str_or("category", "bytes");
    let Some(value) = parse_float_prefix(input).filter(|v| !v.is_nan()) else {
        return Ok(ToolResult::failure("Invalid input value"));
    };
    let (Some(from), Some(to)) = (options.str("from"), options.str("to")) else {
        return Ok(ToolResult::failure("From and to units are required"));
    };

    let (label, result) = match category {
        "bytes" => (DATA.label, DATA.convert(value, from, to)?),
        "time" => (TIME.label, TIME.convert(value, from, to)?),
        "transfer" => (TRANSFER.label, TRANSFER.convert(value, from, to)?),
        "length" => (LENGTH.label, LENGTH.convert(value, from, to)?),
        "weight" => (WEIGHT.label, WEIGHT.convert(value, from, to)?),
        "temperature" => ("Temperature", convert_temperature(value, from, to)?),
        other => return Err(ToolError::unsupported("category", other)),
    };

    Ok(ToolResult::success(format_number(result))
        .with_metadata("category", label)
        .with_metadata("convertedValue", result)
        .with_metadata("from", from)
        .with_metadata("originalValue", value)
        .with_metadata("to", to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(input: &str, category: &str, from: &str, to: &str) -> ToolResult {
        let options = ToolOptions::new()
            .with("category", category)
            .with("from", from)
            .with("to", to);
        match convert(input, &options) {
            Ok(result) => result,
            Err(e) => e.into(),
        }
    }

    #[test]
    fn test_factor_tables() {
        assert_eq!(run("1024", "bytes", "B", "KB").output_str(), "1");
        assert_eq!(run("1024", "bytes", "GB", "TB").output_str(), "1");
        assert_eq!(run("1", "bytes", "EB", "PB").output_str(), "1024");
        assert_eq!(run("1", "length", "km", "m").output_str(), "1000");
        assert_eq!(run("1", "length", "ft", "m").output_str(), "0.3048");
        assert_eq!(run("1", "length", "in", "cm").output_str(), "2.54");
        assert_eq!(run("1", "length", "mi", "m").output_str(), "1609.344");
        assert_eq!(run("1", "weight", "lb", "kg").output_str(), "0.45359237");
        assert_eq!(run("1", "weight", "oz", "g").output_str(), "28.349523125");
        assert_eq!(run("1", "weight", "t", "g").output_str(), "1000000");
        assert_eq!(run("60", "time", "s", "m").output_str(), "1");
        assert!(run("52", "time", "w", "y").output_str().starts_with("0.99"));
        assert_eq!(run("1000", "transfer", "kbps", "mbps").output_str(), "1");
        assert_eq!(run("1024", "transfer", "B/s", "kB/s").output_str(), "1");
    }

    #[test]
    fn test_temperature() {
        assert_eq!(run("0", "temperature", "C", "F").output_str(), "32");
        assert_eq!(run("0", "temperature", "C", "K").output_str(), "273.15");
        assert_eq!(run("32", "temperature", "F", "C").output_str(), "0");
        assert_eq!(run("32", "temperature", "F", "K").output_str(), "273.15");
        assert_eq!(run("273.15", "temperature", "K", "C").output_str(), "0");
        assert_eq!(run("273.15", "temperature", "K", "F").output_str(), "32");
        assert_eq!(run("212", "temperature", "F", "F").output_str(), "212");
        assert!(!run("1", "temperature", "C", "R").success);
    }

    #[test]
    fn test_metadata() {
        let result = run("1000", "length", "m", "km");
        assert_eq!(result.meta("category"), Some(&json!("Length")));
        assert_eq!(result.meta("convertedValue"), Some(&json!(1.0)));
        assert_eq!(result.meta("originalValue"), Some(&json!(1000.0)));
        assert_eq!(result.meta("from"), Some(&json!("m")));
        assert_eq!(result.meta("to"), Some(&json!("km")));
    }

    #[test]
    fn test_errors() {
        assert_eq!(run("1", "bytes", "", "KB").error.as_deref(), Some("From and to units are required"));
        assert_eq!(run("1", "bytes", "B", "").error.as_deref(), Some("From and to units are required"));
        assert_eq!(run("not a number", "bytes", "B", "KB").error.as_deref(), Some("Invalid input value"));
        assert_eq!(
            run("1", "unsupported", "x", "y").error.as_deref(),
            Some("Unsupported category: unsupported")
        );
        assert_eq!(run("1", "bytes", "B", "XB").error.as_deref(), Some("Unsupported unit: XB"));
    }
}
