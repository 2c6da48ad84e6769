use super::super::domain::{
    DieGrade, FormatGroup, GaugeNotation, GaugeTier, Printing, ValveUse, ZipperUse,
};
use super::catalog::{DieCatalog, DieClass};
use super::policy::{BoundaryMode, GaugePolicy};
use super::ClassificationError;
use serde_json::Value;

const FORMAT_BOUNDARIES: [i64; 5] = [200, 400, 600, 800, 1000];
const VALVE_KEYWORDS: [&str; 3] = ["VAL", "CONJ", "TAPA"];
const ZIPPER_KEYWORD: &str = "ZIPPER";
const ROLL_PRODUCT: &str = "ROLLO";

pub(crate) fn is_roll(product_type: &str) -> bool {
    product_type.trim().to_uppercase() == ROLL_PRODUCT
}

/// Parses a dimension as float and truncates toward zero.
/// Booleans and values outside the `i64` range are rejected on purpose.
pub(crate) fn coerce_integer(field: &'static str, value: &Value) -> Result<i64, ClassificationError> {
    let conversion_error = || ClassificationError::Conversion {
        field,
        value: match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        },
    };

    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|number| number.is_finite())
    .ok_or_else(conversion_error)?;

    let truncated = parsed.trunc();
    if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
        return Err(conversion_error());
    }
    Ok(truncated as i64)
}

/// Roll stock and side-mounted parts are banded by width, everything else by length.
pub(crate) fn uses_width(product_type: &str, mounting: &str) -> bool {
    is_roll(product_type) || mounting.to_uppercase().contains("LAT")
}

pub(crate) fn format_group(dimension: i64, mode: BoundaryMode) -> FormatGroup {
    let crossed = FORMAT_BOUNDARIES
        .iter()
        .filter(|&&boundary| match mode {
            BoundaryMode::Strict => dimension > boundary,
            BoundaryMode::Inclusive => dimension >= boundary,
        })
        .count();
    FormatGroup::new(crossed as u8 + 1)
}

pub(crate) fn printing(print_type: &str) -> Printing {
    if print_type.is_empty() || print_type.to_uppercase().contains("SIN") {
        Printing::Unprinted
    } else {
        Printing::Printed
    }
}

pub(crate) fn gauge(structure: &str, calibre: i64, policy: GaugePolicy) -> GaugeTier {
    let (threshold, notation) = match policy {
        GaugePolicy::StructureDependent => {
            let single_flexible =
                structure.to_uppercase().contains("FLEXIBLE") && !structure.contains('/');
            (if single_flexible { 70 } else { 100 }, GaugeNotation::Words)
        }
        GaugePolicy::Flat => (100, GaugeNotation::Symbols),
    };

    GaugeTier {
        threshold,
        above: calibre > threshold,
        notation,
    }
}

pub(crate) fn valve(devices: &[&str]) -> ValveUse {
    let found = devices.iter().any(|device| {
        let upper = device.to_uppercase();
        VALVE_KEYWORDS.iter().any(|keyword| upper.contains(keyword))
    });
    if found {
        ValveUse::Valve
    } else {
        ValveUse::NoValve
    }
}

pub(crate) fn zipper(devices: &[&str]) -> ZipperUse {
    if devices
        .iter()
        .any(|device| device.to_uppercase().contains(ZIPPER_KEYWORD))
    {
        ZipperUse::Zipper
    } else {
        ZipperUse::NoZipper
    }
}

/// Scans die-bearing fields left to right.
///
/// A shaped code ends the scan. High and low codes do not: a later high code
/// replaces an earlier low one, a later low code never replaces a high one.
/// Production models were trained on this exact cascade.
pub(crate) fn die_grade(values: &[&str], catalog: &DieCatalog) -> DieGrade {
    let mut grade = DieGrade::NoDie;
    for value in values {
        match catalog.classify(value) {
            Some(DieClass::Shaped) => return DieGrade::Shaped,
            Some(DieClass::High) => grade = DieGrade::High,
            Some(DieClass::Low) if grade != DieGrade::High => grade = DieGrade::Low,
            _ => {}
        }
    }
    grade
}
