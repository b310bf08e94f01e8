// ABOUTME: Unit normalization and quantity display for shopping-list lines
// ABOUTME: Folds kg/l into g/ml for summing and promotes large totals back
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use crate::constants::procurement::{QUANTITY_DECIMALS, WHOLE_NUMBER_TOLERANCE};
use crate::models::round_to;

const PROMOTION_THRESHOLD: f64 = 1000.0;

/// Express `quantity unit` in the smallest unit of its family
///
/// `kg` becomes `g` and `l` becomes `ml`; other units are only lowercased.
#[must_use]
pub fn to_base_unit(quantity: f64, unit: &str) -> (f64, String) {
    let unit = unit.trim().to_lowercase();
    match unit.as_str() {
        "kg" => (quantity * 1000.0, "g".to_owned()),
        "l" => (quantity * 1000.0, "ml".to_owned()),
        _ => (quantity, unit),
    }
}

/// Express a base-unit total in the most readable unit of its family
///
/// Totals of at least 1000 g or ml are promoted to kg or l. The quantity is
/// rounded to three decimals.
#[must_use]
pub fn to_display_unit(quantity: f64, unit: &str) -> (f64, String) {
    let (quantity, unit) = match unit {
        "g" if quantity >= PROMOTION_THRESHOLD => (quantity / 1000.0, "kg".to_owned()),
        "ml" if quantity >= PROMOTION_THRESHOLD => (quantity / 1000.0, "l".to_owned()),
        other => (quantity, other.to_owned()),
    };
    (round_to(quantity, QUANTITY_DECIMALS), unit)
}

/// Render a quantity for people: whole numbers without decimals, otherwise two
#[must_use]
pub fn format_quantity(quantity: f64) -> String {
    let whole = quantity.round();
    if (quantity - whole).abs() < WHOLE_NUMBER_TOLERANCE {
        format!("{}", whole as i64)
    } else {
        format!("{quantity:.2}")
    }
}

/// Quantity followed by its unit, if any
#[must_use]
pub fn format_amount(quantity: f64, unit: Option<&str>) -> String {
    match unit {
        Some(unit) if !unit.is_empty() => format!("{} {unit}", format_quantity(quantity)),
        _ => format_quantity(quantity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_units() {
        assert_eq!(to_base_unit(0.25, "Kg"), (250.0, "g".to_owned()));
        assert_eq!(to_base_unit(1.5, "L"), (1500.0, "ml".to_owned()));
        assert_eq!(to_base_unit(2.0, "pcs"), (2.0, "pcs".to_owned()));
    }

    #[test]
    fn test_display_units_promote_at_threshold() {
        assert_eq!(to_display_unit(999.0, "g"), (999.0, "g".to_owned()));
        assert_eq!(to_display_unit(1000.0, "g"), (1.0, "kg".to_owned()));
        assert_eq!(to_display_unit(2500.0, "ml"), (2.5, "l".to_owned()));
        assert_eq!(to_display_unit(0.123_456, "tbsp"), (0.123, "tbsp".to_owned()));
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(3.0), "3");
        assert_eq!(format_quantity(2.995), "3");
        assert_eq!(format_quantity(4.004), "4");
        assert_eq!(format_quantity(2.5), "2.50");
        assert_eq!(format_quantity(0.333), "0.33");
        assert_eq!(format_quantity(1.02), "1.02");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1.5, Some("kg")), "1.50 kg");
        assert_eq!(format_amount(4.0, None), "4");
        assert_eq!(format_amount(4.0, Some("")), "4");
    }
}
