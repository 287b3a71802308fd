//! Turning a noisy per-frame face signal into a discrete "blink-hold" trigger.
//!
//! The signal source (a face landmarker, a recorded session, a test script)
//! hands over one [`SignalFrame`] per frame. [`GestureHoldDetector`] watches
//! the two eye-blink channels and fires once when both stay closed for the
//! required duration.
//!
//! # Example
//!
//! ```ignore
//! let mut detector = GestureHoldDetector::new();
//!
//! // In frame loop:
//! if detector.sample(&frame) {
//!     // both eyes held closed for 3 seconds
//! }
//! ```

use crate::config::GestureConfig;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

pub const EYE_BLINK_LEFT: &str = "eyeBlinkLeft";
pub const EYE_BLINK_RIGHT: &str = "eyeBlinkRight";
pub const EYE_LOOK_IN_LEFT: &str = "eyeLookInLeft";
pub const EYE_LOOK_IN_RIGHT: &str = "eyeLookInRight";
pub const EYE_LOOK_OUT_LEFT: &str = "eyeLookOutLeft";
pub const EYE_LOOK_OUT_RIGHT: &str = "eyeLookOutRight";
pub const EYE_LOOK_UP_LEFT: &str = "eyeLookUpLeft";
pub const EYE_LOOK_UP_RIGHT: &str = "eyeLookUpRight";
pub const EYE_LOOK_DOWN_LEFT: &str = "eyeLookDownLeft";
pub const EYE_LOOK_DOWN_RIGHT: &str = "eyeLookDownRight";

/// Named channel scores for a single frame, each nominally in `[0, 1]`.
///
/// Channels that were never set read as `0.0`.
#[derive(Clone, Debug, Default)]
pub struct SignalFrame {
    scores: HashMap<String, f32>,
}

impl SignalFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style channel assignment.
    pub fn with(mut self, channel: impl Into<String>, score: f32) -> Self {
        self.set(channel, score);
        self
    }

    pub fn set(&mut self, channel: impl Into<String>, score: f32) {
        self.scores.insert(channel.into(), score);
    }

    pub fn score(&self, channel: &str) -> f32 {
        self.scores.get(channel).copied().unwrap_or(0.0)
    }

    /// Shorthand for a frame carrying only the two blink channels.
    pub fn blink(left: f32, right: f32) -> Self {
        Self::new()
            .with(EYE_BLINK_LEFT, left)
            .with(EYE_BLINK_RIGHT, right)
    }
}

impl<K: Into<String>> FromIterator<(K, f32)> for SignalFrame {
    fn from_iter<I: IntoIterator<Item = (K, f32)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Edge-triggered detector for a sustained two-eye blink.
///
/// A hold begins on the first frame where both blink channels are strictly
/// above the threshold. It fires exactly once when the hold has lasted at
/// least the required duration, then resets; another trigger needs the eyes
/// to open and close again. Opening early cancels the hold without firing.
///
/// Samples must arrive at most once per frame with non-decreasing timestamps.
#[derive(Clone, Debug)]
pub struct GestureHoldDetector {
    threshold: f32,
    required_duration: Duration,
    /// `Some` exactly while a hold is in progress.
    hold_start: Option<Instant>,
}

impl Default for GestureHoldDetector {
    fn default() -> Self {
        Self::from_config(&GestureConfig::default())
    }
}

impl GestureHoldDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        let mut detector = Self {
            threshold: 0.5,
            required_duration: config.required_duration(),
            hold_start: None,
        };
        detector.set_threshold(config.threshold);
        detector
    }

    /// Set the closed-eye threshold, clamped to `[0, 1]`.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold.clamp(0.0, 1.0);
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn set_required_duration(&mut self, duration: Duration) {
        self.required_duration = duration;
    }

    pub fn required_duration(&self) -> Duration {
        self.required_duration
    }

    pub fn is_holding(&self) -> bool {
        self.hold_start.is_some()
    }

    /// Feed the current frame. Returns `true` on the frame the hold completes.
    pub fn sample(&mut self, frame: &SignalFrame) -> bool {
        self.sample_at(frame, Instant::now())
    }

    /// Feed a frame captured at `now`.
    pub fn sample_at(&mut self, frame: &SignalFrame, now: Instant) -> bool {
        let left_closed = frame.score(EYE_BLINK_LEFT) > self.threshold;
        let right_closed = frame.score(EYE_BLINK_RIGHT) > self.threshold;

        match (left_closed && right_closed, self.hold_start) {
            (true, None) => {
                log::debug!("Blink hold started");
                self.hold_start = Some(now);
                false
            }
            (true, Some(start)) => {
                let held = now.saturating_duration_since(start);
                if held >= self.required_duration {
                    log::info!("Blink held for {}ms, triggering", held.as_millis());
                    self.reset();
                    true
                } else {
                    false
                }
            }
            (false, Some(start)) => {
                let held = now.saturating_duration_since(start);
                log::debug!("Blink released early after {}ms", held.as_millis());
                self.reset();
                false
            }
            (false, None) => false,
        }
    }

    /// Drop any hold in progress.
    pub fn reset(&mut self) {
        self.hold_start = None;
    }

    /// Hold completion in `[0, 1]`; `0` when not holding.
    pub fn progress(&self) -> f32 {
        self.progress_at(Instant::now())
    }

    pub fn progress_at(&self, now: Instant) -> f32 {
        let Some(start) = self.hold_start else {
            return 0.0;
        };
        if self.required_duration.is_zero() {
            return 1.0;
        }
        let held = now.saturating_duration_since(start);
        (held.as_secs_f32() / self.required_duration.as_secs_f32()).min(1.0)
    }
}
