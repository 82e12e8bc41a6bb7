//! Playback state for the step slider and the sampled progression it drives.
//!
//! Both types are plain state machines. Timestamps come from the caller (the
//! browser's animation frame or a test), so nothing here reads a clock.

use crate::config::{
    DEFAULT_CHANNEL_A, DEFAULT_CHANNEL_B, DEFAULT_PROGRESSION_SECONDS, DEFAULT_PROGRESSION_STEP,
    MAJOR_TICK_INTERVAL, MAX_SAMPLES, SKIP_SECONDS,
};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One tick under the slider track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickMark {
    pub step: u32,
    pub offset_percent: f64,
    pub major: bool,
}

/// Where the play position was when the current run of frames started.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Anchor {
    started_ms: f64,
    from_position: f64,
}

/// Play/pause cursor over `0..=duration` seconds, one second per step.
#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    duration: u32,
    position: f64,
    playing: bool,
    // None until the first frame after play or after a manual move
    anchor: Option<Anchor>,
}

impl Playback {
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            position: 0.0,
            playing: false,
            anchor: None,
        }
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Start playing. A zero-length range has nothing to play.
    pub fn play(&mut self) {
        if self.duration == 0 {
            return;
        }
        self.playing = true;
        self.anchor = None;
    }

    pub fn pause(&mut self) {
        self.playing = false;
        self.anchor = None;
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Advance to the frame at `now_ms`.
    ///
    /// The first frame after `play` or a manual move only records the anchor.
    /// Reaching the end rewinds to 0 and stops.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        if !self.playing {
            return self.position;
        }

        let anchor = *self.anchor.get_or_insert(Anchor {
            started_ms: now_ms,
            from_position: self.position,
        });
        let elapsed = (now_ms - anchor.started_ms).max(0.0) / 1000.0;
        let next = anchor.from_position + elapsed;

        if next >= self.duration as f64 {
            debug!("Playback reached the end at step {}", self.duration);
            self.position = 0.0;
            self.pause();
        } else {
            self.position = next;
        }
        self.position
    }

    pub fn skip_forward(&mut self) {
        self.seek(self.position + SKIP_SECONDS);
    }

    pub fn skip_backward(&mut self) {
        self.seek(self.position - SKIP_SECONDS);
    }

    /// Move to `seconds`, clamped to the range. Non-finite input is ignored.
    pub fn seek(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        self.position = seconds.clamp(0.0, self.duration as f64);
        self.anchor = None;
    }

    /// Resize the range after the table changed.
    pub fn set_duration(&mut self, duration: u32) {
        self.duration = duration;
        self.position = self.position.min(duration as f64);
        self.anchor = None;
        if duration == 0 {
            self.pause();
        }
    }

    pub fn progress_percent(&self) -> f64 {
        if self.duration == 0 {
            0.0
        } else {
            self.position / self.duration as f64 * 100.0
        }
    }

    /// One tick per whole step; every fifth and the last one are major.
    ///
    /// # Errors
    /// `TooManySamples` if the range needs more than `MAX_SAMPLES` ticks.
    pub fn tick_marks(&self) -> Result<Vec<TickMark>, ProgressionError> {
        // u64 so u32::MAX + 1 cannot wrap on 32-bit targets
        let needed = u64::from(self.duration) + 1;
        if needed > MAX_SAMPLES as u64 {
            return Err(ProgressionError::TooManySamples {
                needed: needed as f64,
                limit: MAX_SAMPLES,
            });
        }

        Ok((0..=self.duration)
            .map(|step| TickMark {
                step,
                offset_percent: if self.duration == 0 {
                    0.0
                } else {
                    step as f64 / self.duration as f64 * 100.0
                },
                major: step % MAJOR_TICK_INTERVAL == 0 || step == self.duration,
            })
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProgressionError {
    #[error("total duration must be finite and positive, got {0}")]
    InvalidDuration(f64),
    #[error("step size must be finite and positive, got {0}")]
    InvalidStep(f64),
    #[error("a progression needs at least one channel")]
    NoChannels,
    #[error("{needed} samples requested, the limit is {limit}")]
    TooManySamples { needed: f64, limit: usize },
}

/// A value moving linearly from `start` to `end` over the progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub start: f64,
    pub end: f64,
}

impl Channel {
    pub fn new(name: &str, start: f64, end: f64) -> Self {
        Self {
            name: name.to_string(),
            start,
            end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    pub channels: Vec<Channel>,
    pub total_seconds: f64,
    pub step_seconds: f64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            channels: vec![
                Channel::new("a", DEFAULT_CHANNEL_A.0, DEFAULT_CHANNEL_A.1),
                Channel::new("b", DEFAULT_CHANNEL_B.0, DEFAULT_CHANNEL_B.1),
            ],
            total_seconds: DEFAULT_PROGRESSION_SECONDS,
            step_seconds: DEFAULT_PROGRESSION_STEP,
        }
    }
}

/// Channel values at one point in time, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time_seconds: f64,
    pub percent: f64,
    pub values: Vec<f64>,
}

#[inline]
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Precomputed samples with a cursor for step-wise navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct Progression {
    config: ProgressionConfig,
    samples: Vec<Sample>,
    index: usize,
}

impl Progression {
    pub fn new(config: ProgressionConfig) -> Result<Self, ProgressionError> {
        if !config.total_seconds.is_finite() || config.total_seconds <= 0.0 {
            return Err(ProgressionError::InvalidDuration(config.total_seconds));
        }
        if !config.step_seconds.is_finite() || config.step_seconds <= 0.0 {
            return Err(ProgressionError::InvalidStep(config.step_seconds));
        }
        if config.channels.is_empty() {
            return Err(ProgressionError::NoChannels);
        }

        // one per step, plus the closing sample when the step is uneven
        let needed = (config.total_seconds / config.step_seconds).floor() + 2.0;
        if needed > MAX_SAMPLES as f64 {
            return Err(ProgressionError::TooManySamples {
                needed,
                limit: MAX_SAMPLES,
            });
        }

        let mut progression = Self {
            config,
            samples: Vec::new(),
            index: 0,
        };

        let total = progression.config.total_seconds;
        let step = progression.config.step_seconds;
        for i in 0..MAX_SAMPLES {
            let t = i as f64 * step;
            if t > total {
                break;
            }
            let sample = progression.sample_at(t);
            progression.samples.push(sample);
        }
        // The step may not divide the duration evenly
        if progression.samples.last().map(|s| s.time_seconds) < Some(total) {
            let sample = progression.sample_at(total);
            progression.samples.push(sample);
        }

        debug!(
            "Progression over {}s built with {} samples",
            total,
            progression.samples.len()
        );
        Ok(progression)
    }

    /// Default two channels spanning the given step bound, one sample per
    /// second. The second channel tracks the step itself.
    pub fn for_step_bound(bound: u32) -> Result<Self, ProgressionError> {
        let mut config = ProgressionConfig {
            total_seconds: bound as f64,
            ..ProgressionConfig::default()
        };
        if let Some(channel) = config.channels.get_mut(1) {
            channel.end = bound as f64;
        }
        Self::new(config)
    }

    fn sample_at(&self, seconds: f64) -> Sample {
        let total = self.config.total_seconds;
        let clamped = seconds.clamp(0.0, total);
        let fraction = clamped / total;
        Sample {
            time_seconds: clamped,
            percent: round2(fraction * 100.0),
            values: self
                .config
                .channels
                .iter()
                .map(|c| round2(c.start + (c.end - c.start) * fraction))
                .collect(),
        }
    }

    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &Sample {
        &self.samples[self.index]
    }

    pub fn is_at_start(&self) -> bool {
        self.index == 0
    }

    pub fn is_at_end(&self) -> bool {
        self.index + 1 == self.samples.len()
    }

    /// Step forward; `None` when already on the last sample.
    pub fn next(&mut self) -> Option<&Sample> {
        if self.is_at_end() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    /// Step back; `None` when already on the first sample.
    pub fn prev(&mut self) -> Option<&Sample> {
        if self.is_at_start() {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    /// Move to the sample closest to `seconds` (clamped to the duration).
    /// Ties go to the earlier sample.
    pub fn jump_to_time(&mut self, seconds: f64) -> &Sample {
        let target = if seconds.is_finite() {
            seconds.clamp(0.0, self.config.total_seconds)
        } else {
            0.0
        };

        let mut closest = 0;
        let mut smallest = f64::MAX;
        for (i, sample) in self.samples.iter().enumerate() {
            let diff = (sample.time_seconds - target).abs();
            if diff < smallest {
                smallest = diff;
                closest = i;
            }
        }
        self.index = closest;
        self.current()
    }

    pub fn reset(&mut self) -> &Sample {
        self.index = 0;
        self.current()
    }

    pub fn jump_to_end(&mut self) -> &Sample {
        self.index = self.samples.len() - 1;
        self.current()
    }
}
