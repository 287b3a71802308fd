//! Scene loading and switching.
//!
//! Scenes are described up front by [`SceneDescriptor`](crate::SceneDescriptor)s
//! and fetched lazily. The [`SceneRegistry`] owns the loaded assets and the
//! active scene; the [`TransitionController`] wraps a switch in a fade.
//!
//! # Example
//!
//! ```ignore
//! use blinkshift::*;
//! use std::rc::Rc;
//!
//! let registry = Rc::new(SceneRegistry::new(
//!     config.scenes.clone(),
//!     FileAssetLoader::new("assets"),
//!     HeadlessStage::new(),
//! ));
//!
//! registry.load_scene(0).await?;
//! registry.switch_to_scene(0);
//!
//! let controller = TransitionController::new(
//!     Rc::clone(&registry),
//!     FadeCurtain::new(config.fade_duration()),
//! );
//!
//! registry.load_scene(1).await?;
//! if controller.transition_to(1).await {
//!     println!("now showing {}", registry.descriptor_at(1).unwrap().name);
//! }
//! ```

mod registry;
mod transition;

pub use registry::{PreloadReport, SceneRegistry};
pub use transition::{Easing, FadeCurtain, FadeOverlay, TransitionController, TransitionPhase};
