//! Step bound derivation for the treatment parameter table.
//!
//! The browser widget lets users enter signed displacement and rotation values
//! per tooth. Before a playback slider can be sized, the rows are reduced to a
//! single integer bound: the first half of each row ("distance" values) is
//! scaled, the second half ("temperature" values) is taken as is, and the
//! largest magnitude is divided into steps.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod playback;
pub mod playback_handle;
pub mod table;
pub mod utils;

pub use playback::{Channel, Playback, Progression, ProgressionConfig, ProgressionError, Sample, TickMark};
pub use playback_handle::{PlaybackHandle, ProgressionHandle};
pub use table::{TableError, TableRow, TreatmentTable};
pub use utils::{CellEdit, CellError, Column};

/// Opaque row identifier. The derivation never looks at it; it only shows up
/// in log lines and error reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowKey {
    Number(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Number(n) => write!(f, "{}", n),
            RowKey::Float(x) => write!(f, "{}", x),
            RowKey::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<u8> for RowKey {
    fn from(n: u8) -> Self {
        RowKey::Number(n as i64)
    }
}

impl From<&str> for RowKey {
    fn from(s: &str) -> Self {
        RowKey::Text(s.to_string())
    }
}

/// One record of the table: a key plus its ordered numeric values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub key: RowKey,
    pub values: Vec<f64>,
}

impl Row {
    pub fn new(key: impl Into<RowKey>, values: Vec<f64>) -> Self {
        Self {
            key: key.into(),
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    #[error("cannot derive a step bound from empty input")]
    EmptyInput,
    #[error("value {value} at position {position} is not finite")]
    NonFiniteValue { position: usize, value: f64 },
    #[error("invalid step configuration: {0}")]
    InvalidConfig(String),
    #[error("derived step bound {0} does not fit the slider range")]
    BoundOverflow(f64),
}

/// Constants driving the derivation. Defaults to a scale of 10 for the
/// distance half and a divisor of 3.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    pub scale: f64,
    pub divisor: f64,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            scale: config::DEFAULT_SCALE,
            divisor: config::DEFAULT_DIVISOR,
        }
    }
}

impl StepConfig {
    pub fn new(scale: f64, divisor: f64) -> Result<Self, StepError> {
        if !scale.is_finite() || scale < 0.0 {
            return Err(StepError::InvalidConfig(format!(
                "scale must be finite and non-negative, got {}",
                scale
            )));
        }
        if !divisor.is_finite() || divisor <= 0.0 {
            return Err(StepError::InvalidConfig(format!(
                "divisor must be finite and positive, got {}",
                divisor
            )));
        }
        Ok(Self { scale, divisor })
    }

    /// Parse a JSON object such as `{"scale": 10, "divisor": 3}`.
    /// Missing fields fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self, StepError> {
        let parsed: StepConfig =
            serde_json::from_str(json).map_err(|e| StepError::InvalidConfig(e.to_string()))?;
        Self::new(parsed.scale, parsed.divisor)
    }

    /// Step bound of a single row.
    ///
    /// The split point is `len / 2` (floor), so an odd-length row puts the
    /// extra value into the unscaled half.
    ///
    /// # Errors
    /// * `EmptyInput` if `values` is empty
    /// * `NonFiniteValue` for the first NaN or infinite entry
    /// * `BoundOverflow` if the result exceeds `u32::MAX`
    pub fn derive_row_step(&self, values: &[f64]) -> Result<u32, StepError> {
        if values.is_empty() {
            return Err(StepError::EmptyInput);
        }
        if let Some((position, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(StepError::NonFiniteValue { position, value });
        }

        let (distance, temperature) = values.split_at(values.len() / 2);
        let max_value = distance
            .iter()
            .map(|v| v.abs() * self.scale)
            .chain(temperature.iter().map(|v| v.abs()))
            .fold(0.0_f64, f64::max);

        let step = (max_value / self.divisor).ceil();
        if step > u32::MAX as f64 {
            return Err(StepError::BoundOverflow(step));
        }
        Ok(step as u32)
    }

    /// Step bound of a whole table: the largest per-row bound.
    pub fn derive_collection_step(&self, rows: &[Row]) -> Result<u32, StepError> {
        if rows.is_empty() {
            return Err(StepError::EmptyInput);
        }

        let mut bound = 0;
        for row in rows {
            let step = self.derive_row_step(&row.values).map_err(|e| {
                warn!("Row {}: {}", row.key, e);
                e
            })?;
            debug!("Row {}: step {}", row.key, step);
            bound = bound.max(step);
        }

        info!("Derived step bound {} from {} rows", bound, rows.len());
        Ok(bound)
    }
}

/// [`StepConfig::derive_row_step`] with the default constants.
pub fn derive_row_step(values: &[f64]) -> Result<u32, StepError> {
    StepConfig::default().derive_row_step(values)
}

/// [`StepConfig::derive_collection_step`] with the default constants.
pub fn derive_collection_step(rows: &[Row]) -> Result<u32, StepError> {
    StepConfig::default().derive_collection_step(rows)
}

fn config_from_js(config_json: Option<String>) -> Result<StepConfig, JsValue> {
    match config_json {
        Some(json) => StepConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string())),
        None => Ok(StepConfig::default()),
    }
}

/// Installs the panic hook so Rust panics reach the browser console.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// JS entry point for a single row of already-parsed numbers.
#[wasm_bindgen(js_name = deriveRowStep)]
pub fn derive_row_step_js(values: &[f64], config_json: Option<String>) -> Result<u32, JsValue> {
    let config = config_from_js(config_json)?;
    config
        .derive_row_step(values)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// JS entry point for the table.
///
/// `rows_js` is an array of `{ key, values }` objects where `key` is a string
/// or a number.
#[wasm_bindgen(js_name = deriveCollectionStep)]
pub fn derive_collection_step_js(rows_js: JsValue, config_json: Option<String>) -> Result<u32, JsValue> {
    let rows: Vec<Row> = serde_wasm_bindgen::from_value(rows_js)
        .map_err(|e| JsValue::from_str(&format!("Failed to deserialize rows: {}", e)))?;
    let config = config_from_js(config_json)?;
    config
        .derive_collection_step(&rows)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
