//! The router: forwards every message from one input port to one output port
//! on a dedicated worker thread, under explicit start/stop control.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Sender, TrySendError};

use crate::error::OpenError;
use crate::port::{InputPort, MidiSubsystem, OutputPort, PortId};

/// Default sleep between two polls of the input.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Consecutive failed polls after which the worker gives up on the input.
pub const MAX_CONSECUTIVE_POLL_FAILURES: u32 = 50;

/// Receives the human-readable lines the router produces.
pub trait LogSink: Send + Sync {
    fn record(&self, line: &str);
}

/// Never blocks the worker: with a bounded channel, lines are dropped while
/// the receiver is behind.
impl LogSink for Sender<String> {
    fn record(&self, line: &str) {
        match self.try_send(line.to_string()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => log::trace!("[Router] Log channel full, line dropped"),
            // Receiver gone means the window has shut down.
            Err(TrySendError::Disconnected(_)) => {
                log::trace!("[Router] Log receiver gone, line dropped")
            }
        }
    }
}

/// Discards lines; they still reach the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnly;

impl LogSink for LogOnly {
    fn record(&self, _line: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    Idle,
    Running,
}

/// How the worker ended, as seen by [`Router::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Nothing was running.
    WasIdle,
    /// The worker observed the stop flag.
    Stopped,
    /// The worker gave up after repeated poll failures.
    InputLost,
    /// The worker panicked; its ports were released during unwind.
    Panicked,
}

/// What the worker hands back when it exits.
struct Finished<I, O> {
    input: I,
    output: O,
    input_lost: bool,
}

/// Everything that only exists while routing.
struct ActiveRoute<I, O> {
    input_id: PortId,
    output_id: PortId,
    stop: Arc<AtomicBool>,
    worker: JoinHandle<Finished<I, O>>,
}

pub struct Router<S: MidiSubsystem> {
    subsystem: S,
    sink: Arc<dyn LogSink>,
    poll_interval: Duration,
    active: Option<ActiveRoute<S::Input, S::Output>>,
}

impl<S: MidiSubsystem> Router<S> {
    pub fn new(subsystem: S, sink: Arc<dyn LogSink>) -> Self {
        Self {
            subsystem,
            sink,
            poll_interval: DEFAULT_POLL_INTERVAL,
            active: None,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn subsystem(&self) -> &S {
        &self.subsystem
    }

    pub fn state(&self) -> RouterState {
        if self.active.is_some() {
            RouterState::Running
        } else {
            RouterState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// The `(input, output)` pair currently being routed.
    pub fn ports(&self) -> Option<(&str, &str)> {
        self.active
            .as_ref()
            .map(|a| (a.input_id.as_str(), a.output_id.as_str()))
    }

    /// Running, but the worker exited on its own (input lost or panic).
    /// Call [`stop`](Self::stop) to release the ports and learn which.
    pub fn is_halted(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.worker.is_finished())
    }

    /// Open both ports and start forwarding. Restarts if already running.
    pub fn start(&mut self, input_id: &str, output_id: &str) -> Result<(), OpenError> {
        self.stop();

        // Input is dropped (released) if the output fails to open.
        let opened = self.subsystem.open_input(input_id).and_then(|input| {
            let output = self.subsystem.open_output(output_id)?;
            Ok((input, output))
        });
        let (input, output) = match opened {
            Ok(ports) => ports,
            Err(e) => {
                self.emit_error(&format!("Failed to open ports: {e}"));
                return Err(e);
            }
        };

        self.emit_info(&format!("Listening on {input_id}, sending to {output_id}..."));

        let stop = Arc::new(AtomicBool::new(false));
        let worker = {
            let stop = Arc::clone(&stop);
            let sink = Arc::clone(&self.sink);
            let interval = self.poll_interval;
            thread::spawn(move || forward_loop(input, output, &stop, sink.as_ref(), interval))
        };

        self.active = Some(ActiveRoute {
            input_id: input_id.to_string(),
            output_id: output_id.to_string(),
            stop,
            worker,
        });
        Ok(())
    }

    /// Stop forwarding and release both ports. No-op when idle.
    pub fn stop(&mut self) -> StopOutcome {
        let Some(active) = self.active.take() else {
            return StopOutcome::WasIdle;
        };

        active.stop.store(true, Ordering::Release);
        let outcome = match active.worker.join() {
            Ok(finished) => {
                let outcome = if finished.input_lost {
                    StopOutcome::InputLost
                } else {
                    StopOutcome::Stopped
                };
                drop(finished.input);
                drop(finished.output);
                outcome
            }
            Err(_) => {
                self.emit_error("Routing worker panicked");
                StopOutcome::Panicked
            }
        };
        self.emit_info("MIDI routing stopped.");
        outcome
    }

    fn emit_info(&self, line: &str) {
        log::info!("[Router] {line}");
        self.sink.record(line);
    }

    fn emit_error(&self, line: &str) {
        log::error!("[Router] {line}");
        self.sink.record(line);
    }
}

impl<S: MidiSubsystem> Drop for Router<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Worker body. Returns the ports so the router can release them after join.
fn forward_loop<I: InputPort, O: OutputPort>(
    mut input: I,
    mut output: O,
    stop: &AtomicBool,
    sink: &dyn LogSink,
    interval: Duration,
) -> Finished<I, O> {
    let mut poll_failures = 0u32;
    let mut input_lost = false;

    while !stop.load(Ordering::Acquire) {
        match input.poll_pending() {
            Ok(messages) => {
                poll_failures = 0;
                for message in &messages {
                    let line = format!("Received: {message}");
                    log::debug!("[Router] {line}");
                    sink.record(&line);

                    if let Err(e) = output.send(message) {
                        let line = format!("Error: {e}");
                        log::warn!("[Router] {line}");
                        sink.record(&line);
                    }
                }
            }
            Err(e) => {
                poll_failures += 1;
                if poll_failures == 1 {
                    let line = format!("Error: {e}");
                    log::warn!("[Router] {line}");
                    sink.record(&line);
                }
                if poll_failures >= MAX_CONSECUTIVE_POLL_FAILURES {
                    let line = format!("Input lost, routing halted: {e}");
                    log::error!("[Router] {line}");
                    sink.record(&line);
                    input_lost = true;
                    break;
                }
            }
        }
        thread::sleep(interval);
    }

    Finished {
        input,
        output,
        input_lost,
    }
}
