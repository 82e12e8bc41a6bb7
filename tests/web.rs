//! Checks across the JS boundary. Run with `wasm-pack test --node`.
#![cfg(target_arch = "wasm32")]

use js_sys::{Array, Object, Reflect};
use treatment_step::{derive_collection_step_js, derive_row_step_js, PlaybackHandle, ProgressionHandle, Sample};
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;

/// A `{ key, values }` object as the table component sends it.
fn js_row(key: JsValue, values: &[f64]) -> JsValue {
    let row = Object::new();
    let array: Array = values.iter().map(|v| JsValue::from_f64(*v)).collect();
    Reflect::set(&row, &JsValue::from_str("key"), &key).unwrap();
    Reflect::set(&row, &JsValue::from_str("values"), &array).unwrap();
    row.into()
}

fn worked_rows() -> JsValue {
    let rows = Array::new();
    rows.push(&js_row(JsValue::from_f64(18.0), &[5.0, 3.0, 2.0, 45.0, -30.0, 10.0]));
    rows.push(&js_row(JsValue::from_f64(18.5), &[1.0, -2.0, 3.0, 45.0, 45.0, 45.0]));
    rows.push(&js_row(JsValue::from_str("lower"), &[4.0, 1.0, 2.0, 45.0, 20.0, 10.0]));
    rows.into()
}

fn to_sample(value: JsValue) -> Sample {
    serde_wasm_bindgen::from_value(value).unwrap()
}

#[wasm_bindgen_test]
fn collection_rows_cross_the_boundary() {
    assert_eq!(derive_collection_step_js(worked_rows(), None).unwrap(), 17);
}

#[wasm_bindgen_test]
fn collection_errors_become_strings() {
    let err = derive_collection_step_js(Array::new().into(), None).unwrap_err();
    assert!(err.as_string().is_some());

    let malformed = Array::new();
    malformed.push(&JsValue::from_str("not a row"));
    let err = derive_collection_step_js(malformed.into(), None).unwrap_err();
    assert!(err.as_string().unwrap().starts_with("Failed to deserialize rows"));
}

#[wasm_bindgen_test]
fn row_step_honours_config_json() {
    let values = [5.0, 3.0, 2.0, 45.0, -30.0, 10.0];
    assert_eq!(derive_row_step_js(&values, None).unwrap(), 17);
    let config = Some(r#"{"scale": 5.0}"#.to_string());
    assert_eq!(derive_row_step_js(&values, config).unwrap(), 15);
}

#[wasm_bindgen_test]
fn playback_handle_sized_from_rows() {
    let handle = PlaybackHandle::from_rows(worked_rows(), None).unwrap();
    assert_eq!(handle.duration(), 17);

    let marks = Array::from(&handle.tick_marks().unwrap());
    assert_eq!(marks.length(), 18);
}

#[wasm_bindgen_test]
fn progression_handle_navigates() {
    let mut handle = ProgressionHandle::new(3).unwrap();
    assert!(handle.at_start());
    assert!(handle.prev().unwrap().is_null());

    let second = to_sample(handle.next().unwrap());
    assert_eq!(second.time_seconds, 1.0);
    assert_eq!(handle.index(), 1);

    let last = to_sample(handle.jump_to_end().unwrap());
    assert_eq!(last.time_seconds, 3.0);
    assert_eq!(last.values, vec![4.0, 3.0]);
    assert!(handle.at_end());
    assert!(handle.next().unwrap().is_null());

    let first = to_sample(handle.reset().unwrap());
    assert_eq!(first.percent, 0.0);
    assert_eq!(handle.index(), 0);
}

#[wasm_bindgen_test]
fn progression_handle_rejects_a_zero_bound() {
    assert!(ProgressionHandle::new(0).is_err());
}
