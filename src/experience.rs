//! Per-frame glue between the signal source, the gesture detector and the
//! scene machinery.

use crate::assets::{LoadProgress, SceneAsset};
use crate::camera::CameraRotation;
use crate::config::{ExperienceConfig, SceneDescriptor};
use crate::error::SceneError;
use crate::gaze::GazeCameraRig;
use crate::gesture::{GestureHoldDetector, SignalFrame};
use crate::scene::{FadeOverlay, PreloadReport, SceneRegistry, TransitionController};
use std::cell::RefCell;
use std::rc::Rc;
use tokio::task::JoinHandle;

/// Something the host may want to surface, such as a loading bar or a toast.
#[derive(Clone, Debug, PartialEq)]
pub enum ExperienceEvent {
    /// Fetch progress for the initial scene.
    LoadProgress { index: usize, progress: LoadProgress },
    SceneLoaded(usize),
    /// The background preload has visited every scene.
    PreloadFinished(PreloadReport),
    /// A gesture fired but the next scene is still loading.
    SceneNotReady { index: usize, name: String },
    TransitionStarted(usize),
    TransitionFinished { index: usize, switched: bool },
}

/// What happened during one [`Experience::frame`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    /// The blink hold completed on this frame.
    pub triggered: bool,
    /// Hold completion in `[0, 1]` after this frame.
    pub hold_progress: f32,
    /// Camera orientation pushed to the stage this frame.
    pub camera_rotation: CameraRotation,
}

type EventQueue = Rc<RefCell<Vec<ExperienceEvent>>>;

/// Drives the blink-to-advance loop.
///
/// Background work is started with `spawn_local`, so every method that
/// starts work must be called from inside a [`tokio::task::LocalSet`].
///
/// # Example
///
/// ```ignore
/// let local = tokio::task::LocalSet::new();
/// local.run_until(async {
///     let mut experience = Experience::new(&config, registry, FadeCurtain::new(fade));
///     experience.start().await?;
///     loop {
///         let report = experience.frame(&tracker.next_frame());
///         for event in experience.drain_events() {
///             ui.show(event);
///         }
///         tokio::time::sleep(frame_time).await;
///     }
/// }).await
/// ```
pub struct Experience<A> {
    registry: Rc<SceneRegistry<A>>,
    controller: Rc<TransitionController<A>>,
    detector: GestureHoldDetector,
    gaze: GazeCameraRig,
    initial_scene: usize,
    events: EventQueue,
    preload: Option<JoinHandle<()>>,
}

impl<A: SceneAsset + 'static> Experience<A> {
    pub fn new(
        config: &ExperienceConfig,
        registry: SceneRegistry<A>,
        overlay: impl FadeOverlay + 'static,
    ) -> Self {
        let registry = Rc::new(registry);
        let controller = TransitionController::new(Rc::clone(&registry), overlay);
        controller.set_fade_duration(config.fade_duration());

        Self {
            registry,
            controller: Rc::new(controller),
            detector: GestureHoldDetector::from_config(&config.gesture),
            gaze: GazeCameraRig::from_config(&config.gaze),
            initial_scene: config.initial_scene,
            events: Rc::new(RefCell::new(Vec::new())),
            preload: None,
        }
    }

    /// Load and show the initial scene, then preload the rest in the background.
    pub async fn start(&mut self) -> Result<(), SceneError> {
        let index = self.initial_scene;
        let events = Rc::clone(&self.events);
        self.registry
            .load_scene_with_progress(index, &|progress| {
                events
                    .borrow_mut()
                    .push(ExperienceEvent::LoadProgress { index, progress })
            })
            .await?;
        self.push(ExperienceEvent::SceneLoaded(index));
        self.registry.switch_to_scene(index);
        self.gaze.reset();

        let registry = Rc::clone(&self.registry);
        let events = Rc::clone(&self.events);
        self.preload = Some(tokio::task::spawn_local(async move {
            let report = registry
                .preload_from(0, |loaded| {
                    events.borrow_mut().push(ExperienceEvent::SceneLoaded(loaded))
                })
                .await;
            events
                .borrow_mut()
                .push(ExperienceEvent::PreloadFinished(report));
        }));

        Ok(())
    }

    /// Process one frame of signals.
    pub fn frame(&mut self, frame: &SignalFrame) -> FrameReport {
        let triggered = self.detector.sample(frame);
        if triggered {
            self.advance();
        }

        let camera_rotation = self.gaze.update(frame, self.registry.base_rotation());
        self.registry.orient_camera(camera_rotation);

        FrameReport {
            triggered,
            hold_progress: self.detector.progress(),
            camera_rotation,
        }
    }

    fn advance(&self) {
        if self.controller.is_transitioning() {
            log::debug!("Gesture ignored, transition in progress");
            return;
        }
        let Some(current) = self.registry.current_index() else {
            log::warn!("Gesture ignored, no active scene");
            return;
        };

        let next = (current + 1) % self.registry.total_count();
        if !self.registry.is_loaded(next) {
            let name = self
                .registry
                .descriptor_at(next)
                .map(|d| d.name.clone())
                .unwrap_or_default();
            log::info!("Scene still loading: {}", name);
            self.push(ExperienceEvent::SceneNotReady { index: next, name });
            return;
        }

        self.push(ExperienceEvent::TransitionStarted(next));
        let controller = Rc::clone(&self.controller);
        let events = Rc::clone(&self.events);
        tokio::task::spawn_local(async move {
            let switched = controller.transition_to(next).await;
            events.borrow_mut().push(ExperienceEvent::TransitionFinished {
                index: next,
                switched,
            });
        });
    }
}

impl<A> Experience<A> {
    fn push(&self, event: ExperienceEvent) {
        self.events.borrow_mut().push(event);
    }

    /// Take every event queued since the last call.
    pub fn drain_events(&self) -> Vec<ExperienceEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn registry(&self) -> &Rc<SceneRegistry<A>> {
        &self.registry
    }

    pub fn controller(&self) -> &Rc<TransitionController<A>> {
        &self.controller
    }

    pub fn current_scene(&self) -> Option<&SceneDescriptor> {
        self.registry
            .current_index()
            .and_then(|index| self.registry.descriptor_at(index))
    }

    pub fn detector(&self) -> &GestureHoldDetector {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut GestureHoldDetector {
        &mut self.detector
    }

    pub fn gaze_mut(&mut self) -> &mut GazeCameraRig {
        &mut self.gaze
    }

    pub fn is_transitioning(&self) -> bool {
        self.controller.is_transitioning()
    }

    /// Whether the background preload started by `start` is still running.
    pub fn is_preloading(&self) -> bool {
        self.preload
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{EYE_LOOK_UP_LEFT, EYE_LOOK_UP_RIGHT};
    use crate::stage::HeadlessStage;
    use crate::testing::{FlakyOverlay, MemoryLoader, TestAsset, test_descriptors, test_registry};
    use std::time::Duration;
    use tokio::task::LocalSet;
    use tokio::time::sleep;

    const FRAME: Duration = Duration::from_millis(16);

    fn setup() -> (Experience<TestAsset>, MemoryLoader, HeadlessStage<TestAsset>) {
        let config = ExperienceConfig {
            scenes: test_descriptors(3),
            ..Default::default()
        };
        let (registry, loader, stage) = test_registry(3);
        let experience = Experience::new(&config, registry, FlakyOverlay::default());
        (experience, loader, stage)
    }

    async fn run_frames(
        experience: &mut Experience<TestAsset>,
        frame: &SignalFrame,
        count: usize,
    ) -> Vec<FrameReport> {
        let mut reports = Vec::with_capacity(count);
        for _ in 0..count {
            reports.push(experience.frame(frame));
            sleep(FRAME).await;
        }
        reports
    }

    #[tokio::test(start_paused = true)]
    async fn start_shows_initial_scene_and_preloads_rest() {
        LocalSet::new()
            .run_until(async {
                let (mut experience, loader, stage) = setup();
                experience.start().await.unwrap();

                assert_eq!(experience.registry().current_index(), Some(0));
                assert_eq!(stage.snapshot().attached, vec![0]);
                assert_eq!(experience.current_scene().unwrap().id, "scene0");

                sleep(FRAME).await;
                assert!(!experience.is_preloading());

                let events = experience.drain_events();
                assert!(matches!(
                    events[0],
                    ExperienceEvent::LoadProgress { index: 0, .. }
                ));
                assert!(events.contains(&ExperienceEvent::SceneLoaded(0)));
                assert!(events.contains(&ExperienceEvent::SceneLoaded(1)));
                assert!(events.contains(&ExperienceEvent::SceneLoaded(2)));
                assert_eq!(
                    events.last(),
                    Some(&ExperienceEvent::PreloadFinished(PreloadReport {
                        loaded: vec![1, 2],
                        failed: vec![],
                        skipped: vec![0],
                    }))
                );
                assert_eq!(loader.fetch_count("scene0.glb"), 1);
                assert!(experience.drain_events().is_empty());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn held_blink_advances_to_next_scene() {
        LocalSet::new()
            .run_until(async {
                let (mut experience, _loader, stage) = setup();
                experience.start().await.unwrap();
                sleep(FRAME).await;
                experience.drain_events();

                let closed = SignalFrame::blink(0.9, 0.9);
                let reports = run_frames(&mut experience, &closed, 200).await;

                let triggers = reports.iter().filter(|r| r.triggered).count();
                assert_eq!(triggers, 1);
                assert!(experience.is_transitioning());

                // Two one-second fades.
                run_frames(&mut experience, &SignalFrame::blink(0.0, 0.0), 150).await;
                assert!(!experience.is_transitioning());
                assert_eq!(experience.registry().current_index(), Some(1));
                assert_eq!(stage.snapshot().attached, vec![1]);

                let events = experience.drain_events();
                assert_eq!(
                    events,
                    vec![
                        ExperienceEvent::TransitionStarted(1),
                        ExperienceEvent::TransitionFinished {
                            index: 1,
                            switched: true
                        },
                    ]
                );
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn gesture_on_unloaded_scene_reports_not_ready() {
        LocalSet::new()
            .run_until(async {
                let (mut experience, loader, _stage) = setup();
                experience.start().await.unwrap();
                loader.set_delay(Duration::from_secs(60));
                experience.drain_events();

                let reports = run_frames(&mut experience, &SignalFrame::blink(1.0, 1.0), 200).await;

                assert!(reports.iter().any(|r| r.triggered));
                assert!(experience.is_preloading());
                assert!(!experience.is_transitioning());
                assert_eq!(experience.registry().current_index(), Some(0));
                assert_eq!(
                    experience.drain_events(),
                    vec![ExperienceEvent::SceneNotReady {
                        index: 1,
                        name: "Scene 1".into()
                    }]
                );
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn hold_progress_is_reported() {
        LocalSet::new()
            .run_until(async {
                let (mut experience, _loader, _stage) = setup();
                experience.start().await.unwrap();

                let closed = SignalFrame::blink(0.8, 0.8);
                let first = experience.frame(&closed);
                assert_eq!(first.hold_progress, 0.0);

                sleep(Duration::from_millis(1500)).await;
                let halfway = experience.frame(&closed);
                assert!(!halfway.triggered);
                assert!((halfway.hold_progress - 0.5).abs() < 1e-3);

                let open = experience.frame(&SignalFrame::blink(0.1, 0.1));
                assert_eq!(open.hold_progress, 0.0);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn gaze_offsets_the_scene_camera() {
        LocalSet::new()
            .run_until(async {
                let (mut experience, _loader, stage) = setup();
                experience.start().await.unwrap();

                let looking_up = SignalFrame::new()
                    .with(EYE_LOOK_UP_LEFT, 1.0)
                    .with(EYE_LOOK_UP_RIGHT, 1.0);
                let report = experience.frame(&looking_up);

                assert!(report.camera_rotation.pitch < 0.0);
                assert_eq!(report.camera_rotation.yaw, 0.0);
                assert_eq!(stage.camera().rotation, report.camera_rotation);
                assert_eq!(
                    experience.registry().base_rotation(),
                    CameraRotation::ZERO
                );
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_initial_load_is_returned() {
        LocalSet::new()
            .run_until(async {
                let (mut experience, loader, _stage) = setup();
                loader.fail("scene0.glb");

                let err = experience.start().await.unwrap_err();

                assert!(matches!(err, SceneError::Load { index: 0, .. }));
                assert_eq!(experience.registry().current_index(), None);
                assert!(!experience.is_preloading());
            })
            .await;
    }
}
