//! Fade transitions between scenes.

use super::registry::SceneRegistry;
use crate::assets::SceneAsset;
use crate::config::Color;
use crate::error::{OverlayError, TransitionError};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use tokio::time::Instant;

/// Easing functions for the fade curtain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed throughout.
    #[default]
    Linear,
    /// Start slow, accelerate.
    EaseIn,
    /// Start fast, decelerate.
    EaseOut,
    /// Start slow, speed up, then slow down.
    EaseInOut,
}

impl Easing {
    /// Apply the easing function to a linear progress value (0.0 to 1.0).
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Full-screen overlay that hides the scene swap.
///
/// `show` starts fading the overlay in and `hide` starts fading it out. The
/// controller waits out the fade itself, so both calls return immediately.
pub trait FadeOverlay {
    fn show(&mut self) -> Result<(), OverlayError>;
    fn hide(&mut self) -> Result<(), OverlayError>;
    /// Whether the overlay is raised (or being raised).
    fn is_visible(&self) -> bool;

    /// Overlay opacity at `now`, for renderers that draw the fade.
    fn alpha_at(&self, _now: Instant) -> f32 {
        if self.is_visible() { 1.0 } else { 0.0 }
    }

    /// Called whenever the controller's fade duration changes.
    fn set_fade_duration(&mut self, _duration: Duration) {}
}

/// A solid-color fade overlay that tracks its own opacity over time.
///
/// # Example
///
/// ```ignore
/// let curtain = FadeCurtain::new(Duration::from_secs(1)).easing(Easing::EaseInOut);
/// let controller = TransitionController::new(registry, curtain);
///
/// // In frame loop:
/// draw_fullscreen(Color { a: controller.overlay_alpha(), ..Color::BLACK });
/// ```
#[derive(Clone, Debug)]
pub struct FadeCurtain {
    pub color: Color,
    pub easing: Easing,
    duration: Duration,
    visible: bool,
    /// When the last show/hide started.
    changed_at: Option<Instant>,
}

impl FadeCurtain {
    pub fn new(duration: Duration) -> Self {
        Self {
            color: Color::BLACK,
            easing: Easing::EaseInOut,
            duration,
            visible: false,
            changed_at: None,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    fn fade_progress(&self, now: Instant) -> f32 {
        match self.changed_at {
            None => 1.0,
            Some(_) if self.duration.is_zero() => 1.0,
            Some(start) => {
                let elapsed = now.saturating_duration_since(start);
                self.easing
                    .apply(elapsed.as_secs_f32() / self.duration.as_secs_f32())
            }
        }
    }
}

impl FadeOverlay for FadeCurtain {
    fn show(&mut self) -> Result<(), OverlayError> {
        self.visible = true;
        self.changed_at = Some(Instant::now());
        Ok(())
    }

    fn hide(&mut self) -> Result<(), OverlayError> {
        self.visible = false;
        self.changed_at = Some(Instant::now());
        Ok(())
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn alpha_at(&self, now: Instant) -> f32 {
        let progress = self.fade_progress(now);
        if self.visible { progress } else { 1.0 - progress }
    }

    fn set_fade_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }
}

/// Where an in-flight transition currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionPhase {
    #[default]
    Idle,
    /// Overlay fading in over the old scene.
    FadingOut,
    /// Overlay fading out over the new scene.
    FadingIn,
}

/// Clears the in-flight state however the transition exits, including when
/// its future is dropped part way through.
struct InFlight<'a> {
    flag: &'a Cell<bool>,
    phase: &'a Cell<TransitionPhase>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
        self.phase.set(TransitionPhase::Idle);
    }
}

/// Runs fade-out, switch, fade-in with at most one transition in flight.
///
/// Requests made while a transition is running are rejected, not queued.
pub struct TransitionController<A> {
    registry: Rc<SceneRegistry<A>>,
    overlay: RefCell<Box<dyn FadeOverlay>>,
    in_flight: Cell<bool>,
    phase: Cell<TransitionPhase>,
    fade_duration: Cell<Duration>,
}

impl<A: SceneAsset + 'static> TransitionController<A> {
    pub fn new(registry: Rc<SceneRegistry<A>>, overlay: impl FadeOverlay + 'static) -> Self {
        let controller = Self {
            registry,
            overlay: RefCell::new(Box::new(overlay)),
            in_flight: Cell::new(false),
            phase: Cell::new(TransitionPhase::Idle),
            fade_duration: Cell::new(Duration::from_millis(1000)),
        };
        controller.set_fade_duration(controller.fade_duration.get());
        controller
    }

    /// Fade to `next_index`. Returns `true` once the new scene has faded in.
    ///
    /// Returns `false` straight away if a transition is already running or
    /// the scene is not loaded, and `false` after cleanup if a step fails.
    pub async fn transition_to(&self, next_index: usize) -> bool {
        match self.try_transition_to(next_index).await {
            Ok(()) => true,
            Err(TransitionError::InFlight) => {
                log::info!("Transition already in progress, ignoring");
                false
            }
            Err(TransitionError::NotLoaded(index)) => {
                log::warn!("Scene {} not loaded yet, cannot transition", index);
                false
            }
            Err(e) => {
                log::error!("Transition error: {}", e);
                false
            }
        }
    }

    /// [`transition_to`](Self::transition_to) with the reason for failure.
    pub async fn try_transition_to(&self, next_index: usize) -> Result<(), TransitionError> {
        if self.in_flight.get() {
            return Err(TransitionError::InFlight);
        }
        if !self.registry.is_loaded(next_index) {
            return Err(TransitionError::NotLoaded(next_index));
        }

        log::info!("Starting transition to scene {}", next_index);
        self.in_flight.set(true);
        let _in_flight = InFlight {
            flag: &self.in_flight,
            phase: &self.phase,
        };

        let was_visible = self.overlay.borrow().is_visible();
        let result = self.run(next_index).await;
        if result.is_err() {
            self.restore_overlay(was_visible);
        }
        result
    }

    async fn run(&self, next_index: usize) -> Result<(), TransitionError> {
        let fade = self.fade_duration.get();

        self.phase.set(TransitionPhase::FadingOut);
        self.overlay.borrow_mut().show()?;
        tokio::time::sleep(fade).await;

        // Loaded scenes are never evicted, so this only trips if the
        // registry changes underneath an accepted request.
        if !self.registry.switch_to_scene(next_index) {
            return Err(TransitionError::SwitchRejected(next_index));
        }

        self.phase.set(TransitionPhase::FadingIn);
        self.overlay.borrow_mut().hide()?;
        tokio::time::sleep(fade).await;

        log::info!("Transition complete");
        Ok(())
    }

    fn restore_overlay(&self, was_visible: bool) {
        let mut overlay = self.overlay.borrow_mut();
        if overlay.is_visible() == was_visible {
            return;
        }
        let restored = if was_visible {
            overlay.show()
        } else {
            overlay.hide()
        };
        if let Err(e) = restored {
            log::error!("Could not restore fade overlay: {}", e);
        }
    }
}

impl<A> TransitionController<A> {
    /// Set how long each half of the fade lasts.
    pub fn set_fade_duration(&self, duration: Duration) {
        self.fade_duration.set(duration);
        self.overlay.borrow_mut().set_fade_duration(duration);
    }

    pub fn fade_duration(&self) -> Duration {
        self.fade_duration.get()
    }

    pub fn is_transitioning(&self) -> bool {
        self.in_flight.get()
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase.get()
    }

    pub fn registry(&self) -> &Rc<SceneRegistry<A>> {
        &self.registry
    }

    /// Current overlay opacity, for drawing the fade.
    pub fn overlay_alpha(&self) -> f32 {
        self.overlay.borrow().alpha_at(Instant::now())
    }
}
