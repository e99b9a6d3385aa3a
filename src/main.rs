pub mod config;
pub mod gesture;
pub mod input;
pub mod keymap;
pub mod pipeline;
pub mod vision;

use crate::config::GesturepilotConfig;
use crate::gesture::GestureClassifier;
use crate::input::XdotoolInjector;
use crate::keymap::bindings::BindingConfig;
use crate::keymap::controller::{ControllerSettings, KeyHoldController};
use crate::pipeline::ControlEngineHandle;
use crate::vision::detector::{DetectorHandle, DetectorSettings};
use color_eyre::{eyre::eyre, Result};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    if let Err(e) = GesturepilotConfig::ensure_default_config() {
        warn!("Could not write default configuration: {}", e);
    }
    let config = GesturepilotConfig::load_or_default();

    let bindings = BindingConfig::default_config();
    bindings
        .validate()
        .map_err(|e| eyre!("Invalid binding configuration: {}", e))?;
    print_gesture_guide(&bindings);

    let controller_settings = ControllerSettings {
        gesture_cooldown: Duration::from_millis(config.gesture_cooldown_ms),
    };
    let injector = XdotoolInjector::new(Duration::from_millis(config.key_event_pause_ms));
    let controller = KeyHoldController::new(controller_settings, bindings, Box::new(injector));

    let detector_settings = DetectorSettings {
        command: config.detector.command.clone(),
        args: config.detector.args.clone(),
        min_detection_confidence: config.detector.min_detection_confidence,
    };

    let (frame_sender, frame_receiver) = mpsc::channel(100);
    let detector = DetectorHandle::spawn(Some(detector_settings), frame_sender)
        .map_err(|e| eyre!("Failed to spawn detector: {}", e))?;

    let mut engine = ControlEngineHandle::new("gesture-control".to_string());
    engine.start(frame_receiver, GestureClassifier::new(), controller);

    // Forward ctrl-c as the quit signal; the engine drains held keys before
    // its task finishes, on this path and on capture loss alike.
    if let Some(quit_tx) = engine.take_quit_sender() {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Quit signal received");
                let _ = quit_tx.send(());
            }
        });
    }

    engine
        .join()
        .await
        .map_err(|e| eyre!("Engine failed: {}", e))?;

    // Keys are released at this point; capture resources go last.
    detector.shutdown().await;

    info!("Gesturepilot stopped");
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

fn print_gesture_guide(bindings: &BindingConfig) {
    info!("Gesture recognition started. Press ctrl-c to quit.");
    info!("Mapped gestures:");
    for line in bindings.describe() {
        info!("- {}", line);
    }
    info!("Gesture guide:");
    info!("- Forward: closed fist");
    info!("- Stop: open palm with all fingers extended");
    info!("- Attack: closed fist with thumb extended");
    info!("- Move Forward: only index finger extended");
    info!("- Enemy Spotted: index and middle fingers extended");
    info!("- Cover: middle, ring and pinky fingers extended");
    info!("- Rally: index and pinky fingers extended");
}
