//! Error types shared across the crate.

use thiserror::Error;

/// Errors produced by an [`AssetLoader`](crate::AssetLoader) fetch.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The asset could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// No asset exists at the given locator.
    #[error("asset not found: '{0}'")]
    NotFound(String),
    /// The asset was fetched but could not be turned into a scene.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Errors surfaced by [`SceneRegistry`](crate::scene::SceneRegistry) loads.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The index does not name a configured scene.
    #[error("scene index {index} out of range (have {count} scenes)")]
    OutOfRange { index: usize, count: usize },
    /// The external fetch failed. The slot stays empty and may be retried.
    #[error("failed to load scene {index} ('{name}')")]
    Load {
        index: usize,
        name: String,
        #[source]
        source: LoadError,
    },
}

/// Failure reported by a [`FadeOverlay`](crate::scene::FadeOverlay).
#[derive(Debug, Error)]
#[error("fade overlay error: {0}")]
pub struct OverlayError(pub String);

/// Failure reported by a [`TransitionCue`](crate::TransitionCue).
#[derive(Debug, Error)]
#[error("transition cue error: {0}")]
pub struct CueError(pub String);

/// Why a transition request did not complete.
#[derive(Debug, Error)]
pub enum TransitionError {
    /// Another transition is already running; the request is dropped.
    #[error("a transition is already in flight")]
    InFlight,
    /// The target scene has not finished loading.
    #[error("scene {0} is not loaded yet")]
    NotLoaded(usize),
    /// The registry refused the switch after fade-out.
    #[error("switch to scene {0} was rejected")]
    SwitchRejected(usize),
    /// The fade overlay failed.
    #[error(transparent)]
    Overlay(#[from] OverlayError),
}

/// Errors reading an [`ExperienceConfig`](crate::ExperienceConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("config declares no scenes")]
    NoScenes,
    #[error("initial scene {index} out of range (have {count} scenes)")]
    InitialSceneOutOfRange { index: usize, count: usize },
}
