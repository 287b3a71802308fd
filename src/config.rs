//! Static experience configuration: the scene list plus gesture, fade and
//! gaze tuning.
//!
//! Configuration is authored in RON and loaded once at startup. It is never
//! hot-reloaded.
//!
//! ```ignore
//! let config = ExperienceConfig::load("experience.ron")?;
//! let scenes = config.scenes.clone();
//! ```

use crate::camera::{CameraPose, CameraRotation};
use crate::error::ConfigError;
use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build an opaque color from a `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }

    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
}

/// Background applied when a scene becomes active.
///
/// The core never interprets it; it is handed to the stage as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Background {
    /// Solid clear color.
    Color(Color),
    /// Stage-defined background such as a skybox or environment map.
    Named(String),
}

/// Placement applied to a freshly loaded scene asset.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneTransform {
    pub position: Vec3,
    pub scale: Vec3,
    /// Euler angles in radians, applied in X, Y, Z order.
    pub rotation: Vec3,
}

impl Default for SceneTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
        }
    }
}

impl SceneTransform {
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.position)
    }
}

/// Where the camera goes when a scene becomes active.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPlacement {
    pub position: Vec3,
    #[serde(default)]
    pub look_at: Option<Vec3>,
}

impl CameraPlacement {
    /// Resolve into a pose. Without a look-at target the orientation resets.
    pub fn pose(&self) -> CameraPose {
        let rotation = match self.look_at {
            Some(target) => CameraRotation::facing(self.position, target),
            None => CameraRotation::ZERO,
        };
        CameraPose {
            position: self.position,
            rotation,
        }
    }
}

/// Static description of one loadable scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneDescriptor {
    pub id: String,
    pub name: String,
    /// Opaque asset locator handed to the [`AssetLoader`](crate::AssetLoader).
    pub locator: String,
    #[serde(default)]
    pub transform: SceneTransform,
    #[serde(default)]
    pub camera: Option<CameraPlacement>,
    #[serde(default)]
    pub background: Option<Background>,
}

impl SceneDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            locator: locator.into(),
            transform: SceneTransform::default(),
            camera: None,
            background: None,
        }
    }

    pub fn with_transform(mut self, transform: SceneTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_camera(mut self, camera: CameraPlacement) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = Some(background);
        self
    }
}

/// Blink-hold detector tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// A channel counts as closed when its score is strictly above this.
    pub threshold: f32,
    pub required_duration_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            required_duration_ms: 3000,
        }
    }
}

impl GestureConfig {
    pub fn required_duration(&self) -> Duration {
        Duration::from_millis(self.required_duration_ms)
    }
}

/// Gaze-driven camera offset tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Fraction of the remaining distance covered each frame. Lower is smoother.
    pub smoothing: f32,
    /// Radians of camera offset per unit of gaze score.
    pub multiplier: f32,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.05,
            multiplier: 3.0,
        }
    }
}

/// Everything the experience needs at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperienceConfig {
    #[serde(default)]
    pub initial_scene: usize,
    #[serde(default = "default_fade_ms")]
    pub fade_duration_ms: u64,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub gaze: GazeConfig,
    pub scenes: Vec<SceneDescriptor>,
}

fn default_fade_ms() -> u64 {
    1000
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        let camera = CameraPlacement {
            position: Vec3::new(0.0, 2.0, 3.0),
            look_at: None,
        };
        Self {
            initial_scene: 0,
            fade_duration_ms: default_fade_ms(),
            gesture: GestureConfig::default(),
            gaze: GazeConfig::default(),
            scenes: vec![
                SceneDescriptor::new(
                    "greenhouse",
                    "Mangrove Greenhouse",
                    "stylized_mangrove_greenhouse.glb",
                )
                .with_camera(camera),
                SceneDescriptor::new("scene2", "Second Dimension", "scene2.glb").with_camera(camera),
                SceneDescriptor::new("scene3", "Third Dimension", "scene3.glb").with_camera(camera),
            ],
        }
    }
}

impl ExperienceConfig {
    /// Parse and validate a RON document.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: ExperienceConfig = ron::from_str(source)?;
        config.validated()
    }

    /// Read, parse and validate a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_ron_str(&source)
    }

    /// Check structural requirements and clamp tuning values into range.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.scenes.is_empty() {
            return Err(ConfigError::NoScenes);
        }
        if self.initial_scene >= self.scenes.len() {
            return Err(ConfigError::InitialSceneOutOfRange {
                index: self.initial_scene,
                count: self.scenes.len(),
            });
        }
        self.gesture.threshold = self.gesture.threshold.clamp(0.0, 1.0);
        self.gaze.smoothing = self.gaze.smoothing.clamp(0.0, 1.0);
        Ok(self)
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }
}
