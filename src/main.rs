use std::time::Duration;

use anyhow::{Context, Result};
use blinkshift::channels::{EYE_LOOK_IN_RIGHT, EYE_LOOK_OUT_LEFT};
use blinkshift::{
    Experience, ExperienceConfig, ExperienceEvent, FadeCurtain, FileAssetLoader, HeadlessStage,
    LogCue, SceneRegistry, SignalFrame,
};
use tokio::task::LocalSet;
use tokio::time::{Instant, MissedTickBehavior};

const FRAME_TIME: Duration = Duration::from_micros(16_667);
const RUN_TIME: Duration = Duration::from_secs(24);

/// Scripted tracker: eyes shut for 3.5s out of every 8s, gaze drifting side to side.
fn scripted_frame(elapsed: Duration) -> SignalFrame {
    let t = elapsed.as_secs_f32();
    let closed = (1.0..4.5).contains(&(t % 8.0));
    let blink = if closed { 0.9 } else { 0.05 };
    let look = (t * 0.5).sin().max(0.0) * 0.4;

    SignalFrame::blink(blink, blink)
        .with(EYE_LOOK_OUT_LEFT, look)
        .with(EYE_LOOK_IN_RIGHT, look)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => ExperienceConfig::load(&path)
            .with_context(|| format!("failed to load config from '{}'", path))?,
        None => ExperienceConfig::default(),
    };
    let asset_root = args.next().unwrap_or_else(|| "assets".to_string());

    let stage = HeadlessStage::new();
    let registry = SceneRegistry::new(
        config.scenes.clone(),
        FileAssetLoader::new(&asset_root),
        stage.clone(),
    )
    .with_cue(LogCue);
    let overlay = FadeCurtain::new(config.fade_duration());

    LocalSet::new()
        .run_until(async move {
            let mut experience = Experience::new(&config, registry, overlay);
            experience
                .start()
                .await
                .with_context(|| format!("failed to start with assets from '{}'", asset_root))?;

            let started = Instant::now();
            let mut ticker = tokio::time::interval(FRAME_TIME);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut last_percent = 0;

            while started.elapsed() < RUN_TIME {
                ticker.tick().await;
                let report = experience.frame(&scripted_frame(started.elapsed()));

                let percent = (report.hold_progress * 4.0) as u32 * 25;
                if percent != last_percent && percent > 0 {
                    log::info!("Hold {}%", percent);
                }
                last_percent = percent;

                for event in experience.drain_events() {
                    match event {
                        ExperienceEvent::LoadProgress { index, progress } => {
                            log::debug!("Scene {} loading: {:.0}%", index, progress.percent());
                        }
                        ExperienceEvent::SceneNotReady { name, .. } => {
                            log::warn!("{} is still loading, try again shortly", name);
                        }
                        other => log::info!("{:?}", other),
                    }
                }
            }

            let snapshot = stage.snapshot();
            log::info!(
                "Finished on {:?} with camera at {:?}",
                experience.current_scene().map(|scene| &scene.name),
                snapshot.camera.position
            );
            Ok::<_, anyhow::Error>(())
        })
        .await
}
