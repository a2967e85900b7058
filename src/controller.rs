//! Window-independent application state: port selection, the router, the
//! event log, status alerts and configuration persistence.

use std::collections::VecDeque;
use std::sync::Arc;

use crossbeam_channel::Receiver;

use crate::config::{AppConfig, ConfigLoad, ConfigStore};
use crate::port::MidiSubsystem;
use crate::router::{Router, StopOutcome};
use crate::theme::Theme;

/// Oldest lines are discarded past this. Also bounds the worker's channel.
pub const MAX_LOG_LINES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

pub struct RouteController<S: MidiSubsystem> {
    router: Router<S>,
    log_rx: Receiver<String>,
    log_lines: VecDeque<String>,
    inputs: Vec<String>,
    outputs: Vec<String>,
    pub selected_input: String,
    pub selected_output: String,
    pub theme: Theme,
    store: ConfigStore,
    status: Option<Status>,
}

impl<S: MidiSubsystem> RouteController<S> {
    pub fn new(subsystem: S, store: ConfigStore) -> Self {
        let (log_tx, log_rx) = crossbeam_channel::bounded::<String>(MAX_LOG_LINES);
        let router = Router::new(subsystem, Arc::new(log_tx));

        Self {
            inputs: router.subsystem().list_input_ports(),
            outputs: router.subsystem().list_output_ports(),
            router,
            log_rx,
            log_lines: VecDeque::new(),
            selected_input: String::new(),
            selected_output: String::new(),
            theme: Theme::default(),
            store,
            status: None,
        }
    }

    pub fn router(&self) -> &Router<S> {
        &self.router
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn log_lines(&self) -> &VecDeque<String> {
        &self.log_lines
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        let text = text.into();
        match kind {
            StatusKind::Info => log::info!("[App] {text}"),
            StatusKind::Warning => log::warn!("[App] {text}"),
            StatusKind::Error => log::error!("[App] {text}"),
        }
        self.status = Some(Status { kind, text });
    }

    /// Restore the saved selection and start routing if both ports exist.
    pub fn load_config(&mut self) {
        let config = match self.store.load() {
            Ok(Some(config)) => config,
            Ok(None) => {
                self.set_status(
                    StatusKind::Info,
                    "No configuration found. Please set up input and output ports.",
                );
                return;
            }
            Err(e) => {
                self.set_status(StatusKind::Error, format!("Could not read configuration: {e}"));
                return;
            }
        };

        self.theme = Theme::from_name_or_default(&config.theme);

        match config.resolve(&self.inputs, &self.outputs) {
            ConfigLoad::Ready { input, output } => {
                self.selected_input = input;
                self.selected_output = output;
                self.start_routing();
            }
            ConfigLoad::StalePorts => {
                self.set_status(
                    StatusKind::Warning,
                    "Saved ports not available. Please select new ports.",
                );
            }
        }
    }

    pub fn save_config(&mut self) {
        let config = AppConfig {
            input_port: self.selected_input.clone(),
            output_port: self.selected_output.clone(),
            theme: self.theme.name().to_string(),
        };
        match self.store.save(&config) {
            Ok(()) => self.set_status(StatusKind::Info, "Configuration saved!"),
            Err(e) => {
                self.set_status(StatusKind::Error, format!("Could not save configuration: {e}"))
            }
        }
    }

    pub fn start_routing(&mut self) {
        if self.selected_input.is_empty() || self.selected_output.is_empty() {
            self.set_status(StatusKind::Warning, "Please select both input and output ports.");
            return;
        }

        match self.router.start(&self.selected_input, &self.selected_output) {
            Ok(()) => self.status = None,
            Err(e) => self.set_status(StatusKind::Error, format!("Failed to open ports: {e}")),
        }
    }

    pub fn stop_routing(&mut self) {
        self.router.stop();
    }

    pub fn refresh_ports(&mut self) {
        self.inputs = self.router.subsystem().list_input_ports();
        self.outputs = self.router.subsystem().list_output_ports();
    }

    /// Periodic housekeeping: pull new log lines and release the ports of a
    /// worker that exited on its own.
    pub fn tick(&mut self) {
        self.drain_log();

        if self.router.is_halted() {
            let message = match self.router.stop() {
                StopOutcome::Panicked => "Routing worker crashed, routing stopped.",
                _ => "MIDI input lost, routing stopped.",
            };
            self.drain_log();
            self.set_status(StatusKind::Error, message);
        }
    }

    fn drain_log(&mut self) {
        self.log_lines.extend(self.log_rx.try_iter());
        while self.log_lines.len() > MAX_LOG_LINES {
            self.log_lines.pop_front();
        }
    }
}
