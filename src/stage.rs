//! Render-side collaborators driven by the scene registry.
//!
//! A [`Stage`] is whatever owns the visual scene graph, the camera and the
//! background. The registry attaches and detaches loaded assets and places
//! the camera through it; it never renders anything itself.

use crate::camera::{CameraPose, CameraRotation};
use crate::config::Background;
use crate::error::CueError;
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;

/// Render graph, camera handle and background setter for scene switches.
pub trait Stage<A> {
    /// Add a loaded scene's visual root to the render graph.
    fn attach(&mut self, index: usize, asset: &Rc<A>);
    /// Remove a scene's visual root from the render graph.
    fn detach(&mut self, index: usize, asset: &Rc<A>);
    fn set_camera_position(&mut self, position: Vec3);
    fn set_camera_rotation(&mut self, rotation: CameraRotation);
    fn set_background(&mut self, background: &Background);
}

/// Fire-and-forget flourish played after a successful switch.
///
/// Failures are logged by the caller and never undo the switch.
pub trait TransitionCue {
    fn play(&mut self, index: usize) -> Result<(), CueError>;
}

/// A cue that only logs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogCue;

impl TransitionCue for LogCue {
    fn play(&mut self, index: usize) -> Result<(), CueError> {
        log::info!("Transition cue for scene {}", index);
        Ok(())
    }
}

/// Point-in-time copy of a [`HeadlessStage`].
#[derive(Clone, Debug, PartialEq)]
pub struct StageSnapshot {
    /// Scene indices currently attached, in attach order.
    pub attached: Vec<usize>,
    pub camera: CameraPose,
    pub background: Option<Background>,
}

struct StageState<A> {
    attached: Vec<(usize, Rc<A>)>,
    camera: CameraPose,
    background: Option<Background>,
}

/// A stage that keeps its render state in memory.
///
/// Cloning yields another handle to the same state, so the caller can keep
/// one to read the camera and attached scenes while the registry owns the
/// other.
pub struct HeadlessStage<A> {
    state: Rc<RefCell<StageState<A>>>,
}

impl<A> Clone for HeadlessStage<A> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<A> Default for HeadlessStage<A> {
    fn default() -> Self {
        Self {
            state: Rc::new(RefCell::new(StageState {
                attached: Vec::new(),
                camera: CameraPose::default(),
                background: None,
            })),
        }
    }
}

impl<A> HeadlessStage<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StageSnapshot {
        let state = self.state.borrow();
        StageSnapshot {
            attached: state.attached.iter().map(|(index, _)| *index).collect(),
            camera: state.camera,
            background: state.background.clone(),
        }
    }

    pub fn camera(&self) -> CameraPose {
        self.state.borrow().camera
    }

    /// Assets currently attached, in attach order.
    pub fn attached_assets(&self) -> Vec<Rc<A>> {
        self.state
            .borrow()
            .attached
            .iter()
            .map(|(_, asset)| Rc::clone(asset))
            .collect()
    }
}

impl<A> Stage<A> for HeadlessStage<A> {
    fn attach(&mut self, index: usize, asset: &Rc<A>) {
        self.state.borrow_mut().attached.push((index, Rc::clone(asset)));
    }

    fn detach(&mut self, index: usize, asset: &Rc<A>) {
        self.state
            .borrow_mut()
            .attached
            .retain(|(i, a)| !(*i == index && Rc::ptr_eq(a, asset)));
    }

    fn set_camera_position(&mut self, position: Vec3) {
        self.state.borrow_mut().camera.position = position;
    }

    fn set_camera_rotation(&mut self, rotation: CameraRotation) {
        self.state.borrow_mut().camera.rotation = rotation;
    }

    fn set_background(&mut self, background: &Background) {
        self.state.borrow_mut().background = Some(background.clone());
    }
}
