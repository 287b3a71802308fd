//! # Blinkshift
//!
//! **Hands-free scene switching driven by a held blink.**
//!
//! A face tracker feeds per-frame blendshape scores into a
//! [`GestureHoldDetector`]. When both eyes stay closed long enough the
//! [`Experience`] fades to the next scene, which a [`SceneRegistry`] has
//! usually preloaded in the background. Rendering, asset decoding and audio
//! stay behind small traits ([`Stage`], [`AssetLoader`], [`FadeOverlay`],
//! [`TransitionCue`]) so the core runs headless.
//!
//! ## Quick Start
//!
//! ```no_run
//! use blinkshift::*;
//! use tokio::task::LocalSet;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), SceneError> {
//!     let config = ExperienceConfig::default();
//!     let registry = SceneRegistry::new(
//!         config.scenes.clone(),
//!         FileAssetLoader::new("assets"),
//!         HeadlessStage::new(),
//!     );
//!     let overlay = FadeCurtain::new(config.fade_duration());
//!
//!     LocalSet::new()
//!         .run_until(async {
//!             let mut experience = Experience::new(&config, registry, overlay);
//!             experience.start().await?;
//!
//!             let report = experience.frame(&SignalFrame::blink(0.9, 0.9));
//!             println!("hold {:.0}%", report.hold_progress * 100.0);
//!             Ok::<_, SceneError>(())
//!         })
//!         .await
//! }
//! ```
//!
//! Everything here is single-threaded: shared state lives in `Rc` and
//! `Cell`/`RefCell`, and background work uses `spawn_local`.

mod assets;
mod camera;
mod config;
mod error;
mod experience;
mod gaze;
mod gesture;
pub mod scene;
mod stage;

#[cfg(test)]
mod testing;

pub use assets::{AssetLoader, BlobAsset, FileAssetLoader, LoadProgress, SceneAsset};
pub use camera::{CameraPose, CameraRotation};
pub use config::{
    Background, CameraPlacement, Color, ExperienceConfig, GazeConfig, GestureConfig,
    SceneDescriptor, SceneTransform,
};
pub use error::{ConfigError, CueError, LoadError, OverlayError, SceneError, TransitionError};
pub use experience::{Experience, ExperienceEvent, FrameReport};
pub use gaze::GazeCameraRig;
pub use gesture::{GestureHoldDetector, SignalFrame};
pub use scene::{
    Easing, FadeCurtain, FadeOverlay, PreloadReport, SceneRegistry, TransitionController,
    TransitionPhase,
};
pub use stage::{HeadlessStage, LogCue, Stage, StageSnapshot, TransitionCue};

/// Blendshape channel names read from a [`SignalFrame`].
pub mod channels {
    pub use crate::gesture::{
        EYE_BLINK_LEFT, EYE_BLINK_RIGHT, EYE_LOOK_DOWN_LEFT, EYE_LOOK_DOWN_RIGHT,
        EYE_LOOK_IN_LEFT, EYE_LOOK_IN_RIGHT, EYE_LOOK_OUT_LEFT, EYE_LOOK_OUT_RIGHT,
        EYE_LOOK_UP_LEFT, EYE_LOOK_UP_RIGHT,
    };
}

// Re-export glam types for convenience
pub use glam::{Quat, Vec2, Vec3};
