//! Scene registry: loading, caching and activating scene assets.

use crate::assets::{AssetLoader, LoadProgress, SceneAsset};
use crate::camera::CameraRotation;
use crate::config::SceneDescriptor;
use crate::error::SceneError;
use crate::stage::{Stage, TransitionCue};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Outcome of a [`SceneRegistry::preload_from`] batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreloadReport {
    /// Indices fetched by this batch.
    pub loaded: Vec<usize>,
    /// Indices whose fetch failed. They stay unloaded and can be retried.
    pub failed: Vec<usize>,
    /// Indices that were already cached when the batch reached them.
    pub skipped: Vec<usize>,
}

/// Holds the configured scenes and the assets loaded for them.
///
/// The registry is responsible for:
/// - Fetching scene assets on demand and caching them forever
/// - Preloading the remaining scenes in the background
/// - Swapping the active scene on the stage and placing the camera
///
/// All methods take `&self` so the registry can be shared through an `Rc`
/// between a background preload and the transition controller on the same
/// thread. No borrow is held across a suspension point.
///
/// The registry does no locking of its own: [`switch_to_scene`](Self::switch_to_scene)
/// must not be called directly while a
/// [`TransitionController`](super::TransitionController) transition is in flight.
pub struct SceneRegistry<A> {
    descriptors: Vec<SceneDescriptor>,
    loader: Box<dyn AssetLoader<Asset = A>>,
    stage: RefCell<Box<dyn Stage<A>>>,
    cue: RefCell<Option<Box<dyn TransitionCue>>>,

    /// Loaded asset per descriptor index. Each slot is written at most once.
    slots: RefCell<Vec<Option<Rc<A>>>>,

    /// Index of the scene attached to the stage. Always a filled slot.
    active: Cell<Option<usize>>,

    /// Camera orientation set by the last switch.
    base_rotation: Cell<CameraRotation>,
}

impl<A: SceneAsset + 'static> SceneRegistry<A> {
    pub fn new(
        descriptors: Vec<SceneDescriptor>,
        loader: impl AssetLoader<Asset = A> + 'static,
        stage: impl Stage<A> + 'static,
    ) -> Self {
        let slots = vec![None; descriptors.len()];
        Self {
            descriptors,
            loader: Box::new(loader),
            stage: RefCell::new(Box::new(stage)),
            cue: RefCell::new(None),
            slots: RefCell::new(slots),
            active: Cell::new(None),
            base_rotation: Cell::new(CameraRotation::ZERO),
        }
    }

    /// Play `cue` after every successful switch.
    pub fn with_cue(self, cue: impl TransitionCue + 'static) -> Self {
        *self.cue.borrow_mut() = Some(Box::new(cue));
        self
    }

    /// Load a scene, or return the cached asset if it is already loaded.
    pub async fn load_scene(&self, index: usize) -> Result<Rc<A>, SceneError> {
        self.load_scene_with_progress(index, &|_| {}).await
    }

    /// Like [`load_scene`](Self::load_scene), reporting fetch progress.
    ///
    /// A failed fetch leaves the slot empty so a later call can retry. If two
    /// loads of the same index overlap, the first to finish is kept and the
    /// other resolves to that same handle.
    pub async fn load_scene_with_progress(
        &self,
        index: usize,
        on_progress: &dyn Fn(LoadProgress),
    ) -> Result<Rc<A>, SceneError> {
        let descriptor = self.descriptor_at(index).ok_or(SceneError::OutOfRange {
            index,
            count: self.total_count(),
        })?;

        if let Some(asset) = self.cached(index) {
            return Ok(asset);
        }

        log::info!("Loading scene {}: {}", index, descriptor.name);

        let mut asset = match self.loader.fetch(&descriptor.locator, on_progress).await {
            Ok(asset) => asset,
            Err(source) => {
                log::error!("Error loading scene {} ({}): {}", index, descriptor.name, source);
                return Err(SceneError::Load {
                    index,
                    name: descriptor.name.clone(),
                    source,
                });
            }
        };
        asset.set_transform(&descriptor.transform);

        let mut slots = self.slots.borrow_mut();
        if let Some(existing) = &slots[index] {
            log::debug!("Scene {} finished loading twice, keeping first copy", index);
            return Ok(Rc::clone(existing));
        }
        let asset = Rc::new(asset);
        slots[index] = Some(Rc::clone(&asset));
        log::info!("Scene {} loaded successfully: {}", index, descriptor.name);
        Ok(asset)
    }

    /// Make a loaded scene the active one.
    ///
    /// Never loads anything: returns `false` without touching any state if
    /// the index is out of range or the scene is not cached yet.
    pub fn switch_to_scene(&self, index: usize) -> bool {
        let Some(descriptor) = self.descriptors.get(index) else {
            log::error!("Invalid scene index: {}", index);
            return false;
        };
        let Some(asset) = self.cached(index) else {
            log::warn!("Scene {} not loaded yet", index);
            return false;
        };

        let rotation = {
            let mut stage = self.stage.borrow_mut();

            if let Some(previous) = self.active.get() {
                if let Some(previous_asset) = self.cached(previous) {
                    stage.detach(previous, &previous_asset);
                    log::debug!("Removed scene {} from stage", previous);
                }
            }

            stage.attach(index, &asset);
            self.active.set(Some(index));

            let rotation = match descriptor.camera {
                Some(placement) => {
                    let pose = placement.pose();
                    stage.set_camera_position(pose.position);
                    pose.rotation
                }
                None => CameraRotation::ZERO,
            };
            stage.set_camera_rotation(rotation);

            if let Some(background) = &descriptor.background {
                stage.set_background(background);
            }
            rotation
        };
        self.base_rotation.set(rotation);

        log::info!("Switched to scene {}: {}", index, descriptor.name);

        if let Some(cue) = self.cue.borrow_mut().as_mut() {
            if let Err(e) = cue.play(index) {
                log::warn!("Transition cue failed for scene {}: {}", index, e);
            }
        }

        true
    }

    /// Load every scene from `start` onwards that is not cached yet, one at
    /// a time in index order.
    ///
    /// `on_each_loaded` is called with each index this batch fetched. A
    /// failure is logged and the batch moves on to the next index; the batch
    /// itself never fails.
    pub async fn preload_from(
        &self,
        start: usize,
        mut on_each_loaded: impl FnMut(usize),
    ) -> PreloadReport {
        log::info!("Preloading scenes starting from {}", start);
        let mut report = PreloadReport::default();

        for index in start..self.total_count() {
            if self.is_loaded(index) {
                report.skipped.push(index);
                continue;
            }
            match self.load_scene(index).await {
                Ok(_) => {
                    log::info!("Preloaded scene {}", index);
                    report.loaded.push(index);
                    on_each_loaded(index);
                }
                Err(e) => {
                    log::warn!("Failed to preload scene {}: {}", index, e);
                    report.failed.push(index);
                }
            }
        }

        log::info!(
            "Finished preloading: {} loaded, {} failed",
            report.loaded.len(),
            report.failed.len()
        );
        report
    }

    /// Point the camera without changing the recorded base rotation.
    pub fn orient_camera(&self, rotation: CameraRotation) {
        self.stage.borrow_mut().set_camera_rotation(rotation);
    }
}

impl<A> SceneRegistry<A> {
    pub fn is_loaded(&self, index: usize) -> bool {
        self.slots
            .borrow()
            .get(index)
            .is_some_and(|slot| slot.is_some())
    }

    /// The cached asset for `index`, if loaded.
    pub fn cached(&self, index: usize) -> Option<Rc<A>> {
        self.slots.borrow().get(index).and_then(|slot| slot.clone())
    }

    pub fn current_index(&self) -> Option<usize> {
        self.active.get()
    }

    pub fn total_count(&self) -> usize {
        self.descriptors.len()
    }

    pub fn descriptor_at(&self, index: usize) -> Option<&SceneDescriptor> {
        self.descriptors.get(index)
    }

    pub fn descriptors(&self) -> &[SceneDescriptor] {
        &self.descriptors
    }

    /// Camera orientation chosen by the last switch, before any gaze offset.
    pub fn base_rotation(&self) -> CameraRotation {
        self.base_rotation.get()
    }
}
