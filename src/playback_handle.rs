//! JS-facing handles around the playback state, so the presentation layer
//! can drive the slider from its animation frames.

use crate::derive_collection_step_js;
use crate::playback::{Playback, Progression, Sample};
use log::info;
#[cfg(not(target_arch = "wasm32"))]
use once_cell::sync::Lazy;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
use wasm_bindgen::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
static CLOCK_ORIGIN: Lazy<Instant> = Lazy::new(Instant::now);

/// Milliseconds from an arbitrary fixed origin.
#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    CLOCK_ORIGIN.elapsed().as_secs_f64() * 1000.0
}

#[wasm_bindgen]
pub struct PlaybackHandle {
    inner: Playback,
}

#[wasm_bindgen]
impl PlaybackHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(duration: u32) -> PlaybackHandle {
        PlaybackHandle {
            inner: Playback::new(duration),
        }
    }

    /// Size the playback range from table rows (`[{ key, values }]`).
    #[wasm_bindgen(js_name = fromRows)]
    pub fn from_rows(rows_js: JsValue, config_json: Option<String>) -> Result<PlaybackHandle, JsValue> {
        let bound = derive_collection_step_js(rows_js, config_json)?;
        info!("Playback sized to {} steps", bound);
        Ok(PlaybackHandle::new(bound))
    }

    #[wasm_bindgen(getter)]
    pub fn duration(&self) -> u32 {
        self.inner.duration()
    }

    #[wasm_bindgen(getter)]
    pub fn position(&self) -> f64 {
        self.inner.position()
    }

    #[wasm_bindgen(getter)]
    pub fn playing(&self) -> bool {
        self.inner.is_playing()
    }

    #[wasm_bindgen(getter, js_name = progressPercent)]
    pub fn progress_percent(&self) -> f64 {
        self.inner.progress_percent()
    }

    pub fn toggle(&mut self) {
        self.inner.toggle();
    }

    pub fn play(&mut self) {
        self.inner.play();
    }

    pub fn pause(&mut self) {
        self.inner.pause();
    }

    #[wasm_bindgen(js_name = skipForward)]
    pub fn skip_forward(&mut self) {
        self.inner.skip_forward();
    }

    #[wasm_bindgen(js_name = skipBackward)]
    pub fn skip_backward(&mut self) {
        self.inner.skip_backward();
    }

    pub fn seek(&mut self, seconds: f64) {
        self.inner.seek(seconds);
    }

    /// Advance using a `requestAnimationFrame` timestamp.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        self.inner.tick(now_ms)
    }

    /// Advance using the wall clock.
    #[wasm_bindgen(js_name = tickNow)]
    pub fn tick_now(&mut self) -> f64 {
        self.inner.tick(now_ms())
    }

    #[wasm_bindgen(js_name = setDuration)]
    pub fn set_duration(&mut self, duration: u32) {
        self.inner.set_duration(duration);
    }

    #[wasm_bindgen(js_name = tickMarks)]
    pub fn tick_marks(&self) -> Result<JsValue, JsValue> {
        let marks = self
            .inner
            .tick_marks()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        serde_wasm_bindgen::to_value(&marks)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}

#[wasm_bindgen]
pub struct ProgressionHandle {
    inner: Progression,
}

fn sample_to_js(sample: &Sample) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(sample)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[wasm_bindgen]
impl ProgressionHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(bound: u32) -> Result<ProgressionHandle, JsValue> {
        let inner = Progression::for_step_bound(bound).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(ProgressionHandle { inner })
    }

    #[wasm_bindgen(getter)]
    pub fn index(&self) -> usize {
        self.inner.index()
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.inner.len()
    }

    #[wasm_bindgen(getter, js_name = atStart)]
    pub fn at_start(&self) -> bool {
        self.inner.is_at_start()
    }

    #[wasm_bindgen(getter, js_name = atEnd)]
    pub fn at_end(&self) -> bool {
        self.inner.is_at_end()
    }

    pub fn current(&self) -> Result<JsValue, JsValue> {
        sample_to_js(self.inner.current())
    }

    /// Next sample, or `null` on the last one.
    pub fn next(&mut self) -> Result<JsValue, JsValue> {
        match self.inner.next() {
            Some(sample) => sample_to_js(sample),
            None => Ok(JsValue::NULL),
        }
    }

    /// Previous sample, or `null` on the first one.
    pub fn prev(&mut self) -> Result<JsValue, JsValue> {
        match self.inner.prev() {
            Some(sample) => sample_to_js(sample),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = jumpToTime)]
    pub fn jump_to_time(&mut self, seconds: f64) -> Result<JsValue, JsValue> {
        sample_to_js(self.inner.jump_to_time(seconds))
    }

    pub fn reset(&mut self) -> Result<JsValue, JsValue> {
        sample_to_js(self.inner.reset())
    }

    #[wasm_bindgen(js_name = jumpToEnd)]
    pub fn jump_to_end(&mut self) -> Result<JsValue, JsValue> {
        sample_to_js(self.inner.jump_to_end())
    }

    pub fn samples(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.samples())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_forwards_to_playback() {
        let mut handle = PlaybackHandle::new(17);
        handle.toggle();
        assert!(handle.playing());
        handle.tick(100.0);
        assert_eq!(handle.tick(1_100.0), 1.0);
        handle.skip_backward();
        assert_eq!(handle.position(), 0.0);
        handle.set_duration(0);
        assert!(!handle.playing());
    }

    #[test]
    fn wall_clock_moves_forward() {
        let first = now_ms();
        let second = now_ms();
        assert!(second >= first);

        let mut handle = PlaybackHandle::new(1_000);
        handle.play();
        let position = handle.tick_now();
        assert!((0.0..1_000.0).contains(&position));
    }

    #[test]
    fn progression_handle_starts_at_the_first_sample() {
        // Only the getters are callable off wasm32; sample conversion needs a JS host.
        let handle = match ProgressionHandle::new(3) {
            Ok(handle) => handle,
            Err(_) => panic!("a bound of 3 builds a progression"),
        };
        assert_eq!(handle.length(), 4);
        assert_eq!(handle.index(), 0);
        assert!(handle.at_start());
        assert!(!handle.at_end());
    }
}
