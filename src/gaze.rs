use glam::Vec2;

use crate::camera::CameraRotation;
use crate::config::GazeConfig;
use crate::gesture::{
    EYE_LOOK_DOWN_LEFT, EYE_LOOK_DOWN_RIGHT, EYE_LOOK_IN_LEFT, EYE_LOOK_IN_RIGHT,
    EYE_LOOK_OUT_LEFT, EYE_LOOK_OUT_RIGHT, EYE_LOOK_UP_LEFT, EYE_LOOK_UP_RIGHT, SignalFrame,
};

/// Nudges the camera away from a scene's base orientation following where
/// the viewer looks.
///
/// The offset eases toward its target a fixed fraction per frame, so the
/// response is tied to frame rate rather than wall time.
///
/// # Example
/// ```ignore
/// let mut gaze = GazeCameraRig::new();
///
/// // In frame loop:
/// let rotation = gaze.update(&signals, registry.base_rotation());
/// stage.set_camera_rotation(rotation);
/// ```
#[derive(Clone, Debug)]
pub struct GazeCameraRig {
    /// Fraction of the remaining distance covered per update, in `[0, 1]`.
    pub smoothing: f32,
    /// Radians of offset per unit of gaze score.
    pub multiplier: f32,
    /// Current smoothed offset: `x` is pitch, `y` is yaw.
    offset: Vec2,
}

impl Default for GazeCameraRig {
    fn default() -> Self {
        Self::from_config(&GazeConfig::default())
    }
}

impl GazeCameraRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &GazeConfig) -> Self {
        Self {
            smoothing: config.smoothing.clamp(0.0, 1.0),
            multiplier: config.multiplier,
            offset: Vec2::ZERO,
        }
    }

    /// Set the per-frame smoothing factor, clamped to `[0, 1]`.
    pub fn smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing.clamp(0.0, 1.0);
        self
    }

    pub fn multiplier(mut self, multiplier: f32) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Offset the rig is easing toward for this frame's gaze.
    pub fn target_offset(&self, frame: &SignalFrame) -> Vec2 {
        let look_left = (frame.score(EYE_LOOK_IN_LEFT) + frame.score(EYE_LOOK_OUT_RIGHT)) / 2.0;
        let look_right = (frame.score(EYE_LOOK_OUT_LEFT) + frame.score(EYE_LOOK_IN_RIGHT)) / 2.0;
        let look_up = (frame.score(EYE_LOOK_UP_LEFT) + frame.score(EYE_LOOK_UP_RIGHT)) / 2.0;
        let look_down = (frame.score(EYE_LOOK_DOWN_LEFT) + frame.score(EYE_LOOK_DOWN_RIGHT)) / 2.0;

        Vec2::new(look_down - look_up, look_right - look_left) * self.multiplier
    }

    /// Advance one frame and return `base` with the smoothed offset applied.
    pub fn update(&mut self, frame: &SignalFrame, base: CameraRotation) -> CameraRotation {
        let target = self.target_offset(frame);
        self.offset += (target - self.offset) * self.smoothing;
        self.rotation(base)
    }

    /// `base` with the current offset applied, without advancing.
    pub fn rotation(&self, base: CameraRotation) -> CameraRotation {
        base.offset(self.offset.y, self.offset.x)
    }

    /// Current `(pitch, yaw)` offset.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
    }
}
