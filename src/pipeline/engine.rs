//! Control engine driving the classify-and-inject frame loop.
//!
//! Implements a 4-state lifecycle with compile-time state safety:
//!
//! ```text
//! Initializing ──► Active ──► Draining ──► Drained
//! ```
//!
//! The engine task is the single writer of the controller state and of the
//! key-injection boundary, so gesture order matches frame order and the
//! release-all-before-exit ordering holds on every path out of the loop.

use crate::gesture::{GestureClassifier, GestureLabel};
use crate::keymap::controller::KeyHoldController;
use crate::vision::detector::FrameEvent;
use crate::vision::landmarks::PoseSnapshot;
use statum::{machine, state};
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

// Engine errors
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("Thread error: {0}")]
    ThreadError(String),
}

/// States for the control engine lifecycle using statum
#[state]
#[derive(Debug, Clone)]
pub enum EngineState {
    Initializing, // Wiring channels and state
    Active,       // Frame loop running
    Draining,     // Releasing held keys
    Drained,      // All keys released, safe to exit
}

#[machine]
pub struct ControlEngine<S: EngineState> {
    frame_receiver: mpsc::Receiver<FrameEvent>,
    classifier: GestureClassifier,
    controller: KeyHoldController,
    name: String,
}

impl<S: EngineState> ControlEngine<S> {
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

impl ControlEngine<Initializing> {
    pub fn create(
        frame_receiver: mpsc::Receiver<FrameEvent>,
        classifier: GestureClassifier,
        controller: KeyHoldController,
        name: String,
    ) -> Self {
        info!("Initializing control engine: {}", name);
        Self::new(frame_receiver, classifier, controller, name)
    }

    pub fn activate(self) -> ControlEngine<Active> {
        info!("Activating control engine: {}", self.name);
        self.transition()
    }
}

impl ControlEngine<Active> {
    /// Handles one frame worth of detected hands.
    ///
    /// Every hand is classified in detection order and the last hand's label
    /// is the one fed to the controller. Last-write-wins is a known
    /// multi-hand ambiguity and is kept deliberately; see DESIGN.md.
    fn process_hands(&mut self, hands: Vec<PoseSnapshot>) {
        if hands.is_empty() {
            // No hand, no state change: the controller holds as-is.
            return;
        }

        let mut label = GestureLabel::Unknown;
        for hand in &hands {
            label = self.classifier.classify(hand);
        }
        debug!("Frame with {} hand(s), detected: {}", hands.len(), label);

        self.controller.on_gesture(label, Instant::now());
    }

    /// Main frame loop with graceful shutdown support.
    ///
    /// Runs until the shutdown signal arrives or the capture is lost; both
    /// paths end in the Draining state, never around it.
    pub async fn run_until_shutdown(
        mut self,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) -> ControlEngine<Draining> {
        info!("Starting frame loop for: {}", self.name);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    info!("Shutdown signal received for: {}", self.name);
                    break;
                }

                maybe_event = self.frame_receiver.recv() => {
                    match maybe_event {
                        Some(FrameEvent::Hands(hands)) => self.process_hands(hands),
                        Some(FrameEvent::CaptureLost) => {
                            warn!("Capture lost, stopping frame loop");
                            break;
                        }
                        None => {
                            warn!("Frame channel closed, stopping frame loop");
                            break;
                        }
                    }
                }
            }
        }

        info!("Transitioning to Draining state: {}", self.name);
        self.transition()
    }
}

impl ControlEngine<Draining> {
    /// Releases every held key and completes the lifecycle.
    pub fn drain(mut self) -> ControlEngine<Drained> {
        self.controller.drain();
        info!("Engine drained: {}", self.name);
        self.transition()
    }
}

impl ControlEngine<Drained> {}

/// Handle for running the control engine in a tokio task.
///
/// The spawned task owns controller and injector for its whole life and
/// drains held keys before finishing, on both the quit signal and capture
/// loss.
pub struct ControlEngineHandle {
    pub name: String,

    task_handle: Option<JoinHandle<()>>,

    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ControlEngineHandle {
    pub fn new(name: String) -> Self {
        Self {
            name,
            task_handle: None,
            shutdown_tx: None,
        }
    }

    /// Spawns the engine task.
    pub fn start(
        &mut self,
        frame_receiver: mpsc::Receiver<FrameEvent>,
        classifier: GestureClassifier,
        controller: KeyHoldController,
    ) {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        let name = self.name.clone();
        let engine =
            ControlEngine::create(frame_receiver, classifier, controller, name.clone()).activate();

        let task_handle = tokio::spawn(async move {
            let draining = engine.run_until_shutdown(shutdown_rx).await;
            let _ = draining.drain();
            info!("Engine task finished: {}", name);
        });
        self.task_handle = Some(task_handle);

        info!("Control engine started: {}", self.name);
    }

    /// Takes the quit sender so an external signal task can stop the loop.
    pub fn take_quit_sender(&mut self) -> Option<oneshot::Sender<()>> {
        self.shutdown_tx.take()
    }

    /// Waits for the engine task to finish draining.
    pub async fn join(&mut self) -> Result<(), ControlError> {
        if let Some(handle) = self.task_handle.take() {
            handle.await.map_err(|e| {
                error!("Engine task panicked: {} - {}", self.name, e);
                ControlError::ThreadError(format!("Engine task panicked: {}", e))
            })
        } else {
            debug!("Engine already joined: {}", self.name);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InjectorError, KeyInjector};
    use crate::keymap::bindings::{BindingConfig, KeyId};
    use crate::keymap::controller::ControllerSettings;
    use crate::vision::landmarks::{HandLandmark, Landmark, LANDMARK_COUNT};
    use chrono::Local;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl KeyInjector for Recorder {
        fn key_down(&mut self, key: KeyId) -> Result<(), InjectorError> {
            self.calls.lock().unwrap().push(format!("down {}", key));
            Ok(())
        }

        fn key_up(&mut self, key: KeyId) -> Result<(), InjectorError> {
            self.calls.lock().unwrap().push(format!("up {}", key));
            Ok(())
        }

        fn press(&mut self, key: KeyId) -> Result<(), InjectorError> {
            self.calls.lock().unwrap().push(format!("press {}", key));
            Ok(())
        }
    }

    // Closed fist, thumb tucked: classifies as Forward.
    fn fist() -> PoseSnapshot {
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        points[HandLandmark::Wrist as usize] = Landmark {
            x: 0.5,
            y: 0.9,
            z: 0.0,
        };
        let pairs = [
            (HandLandmark::IndexFingerTip, HandLandmark::IndexFingerDip),
            (HandLandmark::MiddleFingerTip, HandLandmark::MiddleFingerDip),
            (HandLandmark::RingFingerTip, HandLandmark::RingFingerDip),
            (HandLandmark::PinkyTip, HandLandmark::PinkyDip),
        ];
        for (tip, dip) in pairs {
            points[dip as usize] = Landmark {
                x: 0.4,
                y: 0.5,
                z: 0.0,
            };
            points[tip as usize] = Landmark {
                x: 0.4,
                y: 0.6,
                z: 0.0,
            };
        }
        points[HandLandmark::ThumbIp as usize] = Landmark {
            x: 0.6,
            y: 0.7,
            z: 0.0,
        };
        points[HandLandmark::ThumbTip as usize] = Landmark {
            x: 0.55,
            y: 0.65,
            z: 0.0,
        };
        PoseSnapshot::new(points, Local::now())
    }

    #[tokio::test]
    async fn engine_drains_held_keys_on_shutdown() {
        let recorder = Recorder::default();
        let controller = KeyHoldController::new(
            ControllerSettings::default(),
            BindingConfig::default_config(),
            Box::new(recorder.clone()),
        );

        let (frame_tx, frame_rx) = mpsc::channel(10);
        let mut handle = ControlEngineHandle::new("test-engine".to_string());
        handle.start(frame_rx, GestureClassifier::new(), controller);

        frame_tx
            .send(FrameEvent::Hands(vec![fist()]))
            .await
            .unwrap();
        // Empty frame must not disturb the held state.
        frame_tx.send(FrameEvent::Hands(vec![])).await.unwrap();

        if let Some(quit_tx) = handle.take_quit_sender() {
            // Give the engine a chance to process the frames first.
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            quit_tx.send(()).unwrap();
        }
        handle.join().await.unwrap();

        assert_eq!(
            recorder.calls(),
            vec!["down shift", "down w", "up shift", "up w"]
        );
    }

    #[tokio::test]
    async fn capture_loss_also_drains() {
        let recorder = Recorder::default();
        let controller = KeyHoldController::new(
            ControllerSettings::default(),
            BindingConfig::default_config(),
            Box::new(recorder.clone()),
        );

        let (frame_tx, frame_rx) = mpsc::channel(10);
        let mut handle = ControlEngineHandle::new("test-engine".to_string());
        handle.start(frame_rx, GestureClassifier::new(), controller);

        frame_tx
            .send(FrameEvent::Hands(vec![fist()]))
            .await
            .unwrap();
        frame_tx.send(FrameEvent::CaptureLost).await.unwrap();

        handle.join().await.unwrap();

        assert_eq!(
            recorder.calls(),
            vec!["down shift", "down w", "up shift", "up w"]
        );
    }
}
