//! Test doubles shared by the unit tests.

use crate::assets::{AssetLoader, LoadProgress, SceneAsset};
use crate::config::{Background, CameraPlacement, Color, SceneDescriptor, SceneTransform};
use crate::error::{CueError, LoadError, OverlayError};
use crate::scene::{FadeOverlay, SceneRegistry};
use crate::stage::{HeadlessStage, TransitionCue};
use async_trait::async_trait;
use glam::Vec3;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug)]
pub struct TestAsset {
    pub locator: String,
    pub transform: SceneTransform,
}

impl SceneAsset for TestAsset {
    fn set_transform(&mut self, transform: &SceneTransform) {
        self.transform = *transform;
    }
}

#[derive(Default)]
struct LoaderState {
    fetches: RefCell<Vec<String>>,
    failing: RefCell<HashSet<String>>,
    delay: Cell<Duration>,
}

/// In-memory loader with scripted failures and an optional fetch delay.
#[derive(Clone, Default)]
pub struct MemoryLoader {
    state: Rc<LoaderState>,
}

impl MemoryLoader {
    pub fn fail(&self, locator: &str) {
        self.state.failing.borrow_mut().insert(locator.to_string());
    }

    pub fn recover(&self, locator: &str) {
        self.state.failing.borrow_mut().remove(locator);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state.delay.set(delay);
    }

    pub fn fetches(&self) -> Vec<String> {
        self.state.fetches.borrow().clone()
    }

    pub fn fetch_count(&self, locator: &str) -> usize {
        self.state
            .fetches
            .borrow()
            .iter()
            .filter(|l| *l == locator)
            .count()
    }
}

#[async_trait(?Send)]
impl AssetLoader for MemoryLoader {
    type Asset = TestAsset;

    async fn fetch(
        &self,
        locator: &str,
        progress: &dyn Fn(LoadProgress),
    ) -> Result<TestAsset, LoadError> {
        self.state.fetches.borrow_mut().push(locator.to_string());
        progress(LoadProgress::new(0, Some(100)));

        let delay = self.state.delay.get();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.state.failing.borrow().contains(locator) {
            return Err(LoadError::NotFound(locator.to_string()));
        }
        progress(LoadProgress::new(100, Some(100)));
        Ok(TestAsset {
            locator: locator.to_string(),
            transform: SceneTransform::default(),
        })
    }
}

/// `count` scenes named `scene{i}` at `scene{i}.glb`, each offset by `i` on X.
///
/// Scene 1 places the camera at (0, 5, 5) looking at the origin over a dark
/// blue background; every other scene uses (0, 2, 3) with no target.
pub fn test_descriptors(count: usize) -> Vec<SceneDescriptor> {
    (0..count)
        .map(|i| {
            let descriptor = SceneDescriptor::new(
                format!("scene{i}"),
                format!("Scene {i}"),
                format!("scene{i}.glb"),
            )
            .with_transform(SceneTransform {
                position: Vec3::new(i as f32, 0.0, 0.0),
                ..Default::default()
            });
            if i == 1 {
                descriptor
                    .with_camera(CameraPlacement {
                        position: Vec3::new(0.0, 5.0, 5.0),
                        look_at: Some(Vec3::ZERO),
                    })
                    .with_background(Background::Color(Color::rgb(0.1, 0.1, 0.2)))
            } else {
                descriptor.with_camera(CameraPlacement {
                    position: Vec3::new(0.0, 2.0, 3.0),
                    look_at: None,
                })
            }
        })
        .collect()
}

pub fn test_registry(
    count: usize,
) -> (
    SceneRegistry<TestAsset>,
    MemoryLoader,
    HeadlessStage<TestAsset>,
) {
    let loader = MemoryLoader::default();
    let stage = HeadlessStage::new();
    let registry = SceneRegistry::new(test_descriptors(count), loader.clone(), stage.clone());
    (registry, loader, stage)
}

/// Cue that records which scenes it played for.
#[derive(Clone, Default)]
pub struct RecordingCue {
    played: Rc<RefCell<Vec<usize>>>,
    fail_next: Rc<Cell<bool>>,
}

impl RecordingCue {
    pub fn played(&self) -> Vec<usize> {
        self.played.borrow().clone()
    }

    pub fn fail_next(&self) {
        self.fail_next.set(true);
    }
}

impl TransitionCue for RecordingCue {
    fn play(&mut self, index: usize) -> Result<(), CueError> {
        self.played.borrow_mut().push(index);
        if self.fail_next.replace(false) {
            return Err(CueError("audio device unavailable".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
struct OverlayState {
    visible: Cell<bool>,
    fail_next_show: Cell<bool>,
    fail_next_hide: Cell<bool>,
    calls: RefCell<Vec<&'static str>>,
}

/// Overlay whose next `show` or `hide` can be made to fail.
///
/// A failing `show` still raises the overlay; a failing `hide` leaves it up.
#[derive(Clone, Default)]
pub struct FlakyOverlay {
    state: Rc<OverlayState>,
}

impl FlakyOverlay {
    pub fn fail_next_show(&self) {
        self.state.fail_next_show.set(true);
    }

    pub fn fail_next_hide(&self) {
        self.state.fail_next_hide.set(true);
    }

    pub fn visible(&self) -> bool {
        self.state.visible.get()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.calls.borrow().clone()
    }
}

impl FadeOverlay for FlakyOverlay {
    fn show(&mut self) -> Result<(), OverlayError> {
        self.state.calls.borrow_mut().push("show");
        self.state.visible.set(true);
        if self.state.fail_next_show.replace(false) {
            return Err(OverlayError("show failed".into()));
        }
        Ok(())
    }

    fn hide(&mut self) -> Result<(), OverlayError> {
        self.state.calls.borrow_mut().push("hide");
        if self.state.fail_next_hide.replace(false) {
            return Err(OverlayError("hide failed".into()));
        }
        self.state.visible.set(false);
        Ok(())
    }

    fn is_visible(&self) -> bool {
        self.state.visible.get()
    }
}
