//! Cell text handling for the treatment table: column metadata, sanitising
//! raw keystrokes and validating an edit against the column's limit.

use crate::config::{ANGULAR_LIMIT, DEGREE_SUFFIX, TRANSLATION_LIMIT};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// Compiled regexes for cell parsing
static NON_NUMERIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9.\-]").expect("static regex"));
static NUMERIC_PREFIX_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(?:[0-9]+\.?[0-9]*|\.[0-9]+)").expect("static regex"));

/// The six treatment parameters, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    TranEI,
    TranBL,
    TranMD,
    RotMD,
    AngMD,
    TorqBL,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::TranEI,
        Column::TranBL,
        Column::TranMD,
        Column::RotMD,
        Column::AngMD,
        Column::TorqBL,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Column::TranEI => "Tran E/I",
            Column::TranBL => "Tran B/L",
            Column::TranMD => "Tran M/D",
            Column::RotMD => "Rot M/D",
            Column::AngMD => "Ang M/D",
            Column::TorqBL => "Torq B/L",
        }
    }

    pub fn from_label(label: &str) -> Option<Column> {
        let label = label.trim();
        Column::ALL.into_iter().find(|c| c.label() == label)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Rotation, angulation and torque are entered in degrees.
    pub fn is_angular(self) -> bool {
        matches!(self, Column::RotMD | Column::AngMD | Column::TorqBL)
    }

    /// Exclusive upper bound on the magnitude a cell may hold.
    pub fn limit(self) -> f64 {
        if self.is_angular() {
            ANGULAR_LIMIT
        } else {
            TRANSLATION_LIMIT
        }
    }

    /// Text a freshly created cell starts with.
    pub fn zero_text(self) -> String {
        format_cell_value(0.0, self)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of an accepted edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellEdit {
    /// Replace the cell with this canonical text.
    Set(String),
    /// The user erased the cell.
    Clear,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CellError {
    #[error("'{0}' is not a number")]
    NotNumeric(String),
    #[error("{column} must stay below {limit} in magnitude, got {value}")]
    OutOfRange { column: Column, value: f64, limit: f64 },
}

/// Drop everything except digits, `.` and `-`, e.g. the degree suffix.
pub fn sanitize_cell_text(input: &str) -> String {
    NON_NUMERIC_REGEX.replace_all(input, "").into_owned()
}

/// Read the leading number out of a cell's text.
///
/// Behaves like a lenient float parse on the sanitised text: `"12.5°"` is
/// 12.5, `"1.2.3"` is 1.2 and text without a leading number is `None`.
pub fn parse_cell_value(input: &str) -> Option<f64> {
    let cleaned = sanitize_cell_text(input);
    let prefix = NUMERIC_PREFIX_REGEX.find(&cleaned)?;
    prefix.as_str().parse::<f64>().ok()
}

/// Canonical text for a value in the given column.
pub fn format_cell_value(value: f64, column: Column) -> String {
    // -0 prints as "-0"
    let value = if value == 0.0 { 0.0 } else { value };
    if column.is_angular() {
        format!("{}{}", value, DEGREE_SUFFIX)
    } else {
        format!("{}", value)
    }
}

/// Validate a keystroke-level edit for a cell.
///
/// Blank input clears the cell. Anything else must parse to a number whose
/// magnitude is below the column limit.
pub fn validate_cell_input(input: &str, column: Column) -> Result<CellEdit, CellError> {
    if input.trim().is_empty() {
        return Ok(CellEdit::Clear);
    }

    let value = parse_cell_value(input).ok_or_else(|| CellError::NotNumeric(input.to_string()))?;
    if value.abs() >= column.limit() {
        return Err(CellError::OutOfRange {
            column,
            value,
            limit: column.limit(),
        });
    }

    let formatted = format_cell_value(value, column);
    debug!("{}: '{}' -> '{}'", column, input, formatted);
    Ok(CellEdit::Set(formatted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_units_and_letters() {
        assert_eq!(sanitize_cell_text("12.5°"), "12.5");
        assert_eq!(sanitize_cell_text(" -3 mm"), "-3");
        assert_eq!(sanitize_cell_text("abc"), "");
    }

    #[test]
    fn parse_takes_leading_number() {
        assert_eq!(parse_cell_value("45°"), Some(45.0));
        assert_eq!(parse_cell_value("-30°"), Some(-30.0));
        assert_eq!(parse_cell_value("1.2.3"), Some(1.2));
        assert_eq!(parse_cell_value(".5"), Some(0.5));
        assert_eq!(parse_cell_value("2."), Some(2.0));
        assert_eq!(parse_cell_value("5-3"), Some(5.0));
        assert_eq!(parse_cell_value(""), None);
        assert_eq!(parse_cell_value("°"), None);
        assert_eq!(parse_cell_value("-"), None);
        assert_eq!(parse_cell_value("--4"), None);
    }

    #[test]
    fn format_appends_degree_only_for_angular_columns() {
        assert_eq!(format_cell_value(5.0, Column::TranEI), "5");
        assert_eq!(format_cell_value(2.5, Column::RotMD), "2.5°");
        assert_eq!(format_cell_value(-0.0, Column::TorqBL), "0°");
        assert_eq!(Column::AngMD.zero_text(), "0°");
        assert_eq!(Column::TranMD.zero_text(), "0");
    }

    #[test]
    fn limits_follow_column_kind() {
        assert_eq!(Column::TranBL.limit(), 6.0);
        assert_eq!(Column::RotMD.limit(), 46.0);
    }

    #[test]
    fn validate_accepts_values_below_limit() {
        assert_eq!(
            validate_cell_input("5.5", Column::TranEI),
            Ok(CellEdit::Set("5.5".to_string()))
        );
        assert_eq!(
            validate_cell_input("45", Column::AngMD),
            Ok(CellEdit::Set("45°".to_string()))
        );
        assert_eq!(
            validate_cell_input("-45°", Column::AngMD),
            Ok(CellEdit::Set("-45°".to_string()))
        );
    }

    #[test]
    fn validate_rejects_limit_and_above() {
        assert!(matches!(
            validate_cell_input("6", Column::TranEI),
            Err(CellError::OutOfRange { column: Column::TranEI, .. })
        ));
        assert!(matches!(
            validate_cell_input("-46", Column::TorqBL),
            Err(CellError::OutOfRange { .. })
        ));
    }

    #[test]
    fn validate_handles_blank_and_garbage() {
        assert_eq!(validate_cell_input("", Column::TranEI), Ok(CellEdit::Clear));
        assert_eq!(validate_cell_input("  ", Column::RotMD), Ok(CellEdit::Clear));
        assert_eq!(
            validate_cell_input("x", Column::RotMD),
            Err(CellError::NotNumeric("x".to_string()))
        );
    }

    #[test]
    fn labels_round_trip() {
        for column in Column::ALL {
            assert_eq!(Column::from_label(column.label()), Some(column));
        }
        assert_eq!(Column::from_label("Tooth"), None);
    }
}
