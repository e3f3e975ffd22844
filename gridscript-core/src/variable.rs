//! Script values and variable references
//!
//! Scripts deal in two scalar shapes: numbers (64-bit floats, the way the
//! surface syntax writes them) and strings. Variables carry the same
//! domain. Conversions follow the converting-accessor rules: numeric
//! strings coerce to numbers, integral reads refuse fractional values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which store a variable reference resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableKind {
    /// Stored on the owning page, visible to every block.
    Global,
    /// Resolved per-entity through the host-supplied callback.
    Private,
}

/// A scalar script value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Str(String),
}

impl Value {
    /// Numeric view. Strings parse if they hold a numeric literal.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Str(s) => s.trim().parse().ok(),
        }
    }

    /// Integral view. Fractional or out-of-range values refuse to convert
    /// rather than truncate.
    pub fn to_integer(&self) -> Option<i64> {
        let n = self.to_number()?;
        let in_range = n >= -9_223_372_036_854_775_808.0 && n < 9_223_372_036_854_775_808.0;
        if n.fract() == 0.0 && in_range {
            Some(n as i64)
        } else {
            None
        }
    }

    /// Text view. Never fails; integral numbers print without a fraction.
    pub fn to_text(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// Integral values always survive the integer accessor unchanged.
        #[test]
        fn prop_integers_round_trip(n in -1_000_000i64..1_000_000) {
            let value = Value::from(n);
            prop_assert_eq!(value.to_integer(), Some(n));
            prop_assert_eq!(value.to_number(), Some(n as f64));
        }

        /// Numeric strings coerce to the number they spell.
        #[test]
        fn prop_numeric_strings_coerce(n in -1_000_000i64..1_000_000) {
            let value = Value::from(n.to_string());
            prop_assert_eq!(value.to_number(), Some(n as f64));
            prop_assert_eq!(value.to_integer(), Some(n));
        }

        /// The text view of an integral number re-parses to the same value.
        #[test]
        fn prop_text_view_round_trips(n in -1_000_000i64..1_000_000) {
            let text = Value::from(n).to_text();
            prop_assert_eq!(Value::from(text).to_integer(), Some(n));
        }

        /// Fractional values never silently truncate.
        #[test]
        fn prop_fractional_values_refuse_integer(n in -1000i32..1000, frac in 1u32..100) {
            let value = Value::Number(f64::from(n) + f64::from(frac) / 128.0);
            if value.to_number().map(f64::fract) != Some(0.0) {
                prop_assert_eq!(value.to_integer(), None);
            }
        }
    }
}
