//! The eframe window: port pickers, start/stop, event log, themes and the
//! tray, drawn over a shared [`RouteController`].

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender};
use eframe::egui;
use parking_lot::Mutex;

use crate::backend::MidirSubsystem;
use crate::config::ConfigStore;
use crate::controller::{RouteController, StatusKind};
use crate::port::MidiSubsystem;
use crate::theme::Theme;
use crate::tray::Tray;

/// Keeps the event log moving while the window is visible.
const REPAINT_INTERVAL: Duration = Duration::from_millis(50);

/// How often the log is drained and a halted router reaped, visible or not.
const HOUSEKEEPING_INTERVAL: Duration = Duration::from_millis(100);

type SharedController<S> = Arc<Mutex<RouteController<S>>>;

/// Run the application until the window is closed.
pub fn run(start_minimized: bool) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([460.0, 420.0])
            .with_min_inner_size([360.0, 300.0])
            .with_title("RIDI"),
        ..Default::default()
    };

    eframe::run_native(
        "RIDI",
        options,
        Box::new(move |cc| {
            let store = ConfigStore::default_location();
            Ok(Box::new(RouterApp::new(&cc.egui_ctx, store, start_minimized)))
        }),
    )
}

/// User actions collected while drawing, handled afterwards.
enum Action {
    Start,
    Stop,
    SaveConfig,
    RefreshPorts,
    SetTheme(Theme),
    HideToTray,
    Quit,
}

/// Ticks the controller off the UI thread, so a hidden window neither piles
/// up log lines nor leaves a halted router holding its ports.
struct Housekeeping {
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Housekeeping {
    fn spawn<S>(controller: SharedController<S>) -> Self
    where
        S: MidiSubsystem + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
        let spawned = thread::Builder::new()
            .name("ridi-housekeeping".to_string())
            .spawn(move || {
                loop {
                    match shutdown_rx.recv_timeout(HOUSEKEEPING_INTERVAL) {
                        Err(RecvTimeoutError::Timeout) => controller.lock().tick(),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            });

        match spawned {
            Ok(handle) => Self {
                shutdown: Some(shutdown_tx),
                handle: Some(handle),
            },
            Err(e) => {
                log::error!("[App] Failed to spawn housekeeping thread: {e}");
                Self {
                    shutdown: None,
                    handle: None,
                }
            }
        }
    }
}

impl Drop for Housekeeping {
    fn drop(&mut self) {
        // Disconnecting wakes the thread.
        self.shutdown.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

struct RouterApp {
    controller: SharedController<MidirSubsystem>,
    tray: Option<Tray>,
    _housekeeping: Housekeeping,
}

impl RouterApp {
    fn new(ctx: &egui::Context, store: ConfigStore, start_minimized: bool) -> Self {
        let mut controller = RouteController::new(MidirSubsystem::new(), store);
        controller.load_config();
        controller.theme.apply(ctx);

        let tray = match Tray::create(ctx) {
            Ok(tray) => Some(tray),
            Err(e) => {
                log::warn!("[App] {e}");
                None
            }
        };

        if let Some(command) = startup_command(start_minimized, tray.is_some()) {
            ctx.send_viewport_cmd(command);
        }

        let controller = Arc::new(Mutex::new(controller));
        Self {
            _housekeeping: Housekeeping::spawn(Arc::clone(&controller)),
            controller,
            tray,
        }
    }

    fn handle(&mut self, ctx: &egui::Context, action: Action) {
        let mut ctl = self.controller.lock();
        match action {
            Action::Start => ctl.start_routing(),
            Action::Stop => ctl.stop_routing(),
            Action::SaveConfig => ctl.save_config(),
            Action::RefreshPorts => ctl.refresh_ports(),
            Action::SetTheme(theme) => {
                ctl.theme = theme;
                theme.apply(ctx);
            }
            Action::HideToTray => ctx.send_viewport_cmd(egui::ViewportCommand::Visible(false)),
            Action::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }
    }
}

/// Hiding without a tray would leave no way back, so fall back to minimizing.
fn startup_command(start_minimized: bool, has_tray: bool) -> Option<egui::ViewportCommand> {
    match (start_minimized, has_tray) {
        (false, _) => None,
        (true, true) => Some(egui::ViewportCommand::Visible(false)),
        (true, false) => Some(egui::ViewportCommand::Minimized(true)),
    }
}

impl Drop for RouterApp {
    fn drop(&mut self) {
        self.controller.lock().stop_routing();
    }
}

fn draw_menu_bar<S: MidiSubsystem>(
    ctl: &mut RouteController<S>,
    ui: &mut egui::Ui,
    actions: &mut Vec<Action>,
) {
    let inputs = ctl.inputs().to_vec();
    let outputs = ctl.outputs().to_vec();

    egui::menu::bar(ui, |ui| {
        ui.menu_button("File", |ui| {
            if ui.button("Save Configuration").clicked() {
                actions.push(Action::SaveConfig);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Quit").clicked() {
                actions.push(Action::Quit);
                ui.close_menu();
            }
        });

        ui.menu_button("MIDI", |ui| {
            ui.menu_button("Select MIDI Input", |ui| {
                port_radio_list(ui, &inputs, &mut ctl.selected_input);
            });
            ui.menu_button("Select MIDI Output", |ui| {
                port_radio_list(ui, &outputs, &mut ctl.selected_output);
            });
            ui.separator();
            if ui.button("Refresh Ports").clicked() {
                actions.push(Action::RefreshPorts);
                ui.close_menu();
            }
        });

        ui.menu_button("Themes", |ui| {
            for theme in Theme::ALL {
                if ui.radio(ctl.theme == theme, theme.name()).clicked() {
                    actions.push(Action::SetTheme(theme));
                    ui.close_menu();
                }
            }
        });
    });
}

fn draw_body<S: MidiSubsystem>(
    ctl: &mut RouteController<S>,
    has_tray: bool,
    ui: &mut egui::Ui,
    actions: &mut Vec<Action>,
) {
    let inputs = ctl.inputs().to_vec();
    let outputs = ctl.outputs().to_vec();

    egui::Grid::new("ports")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("MIDI Input Port:");
            port_combo(ui, "input_port", &inputs, &mut ctl.selected_input);
            ui.end_row();

            ui.label("MIDI Output Port:");
            port_combo(ui, "output_port", &outputs, &mut ctl.selected_output);
            ui.end_row();
        });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        if ui.button("Start").clicked() {
            actions.push(Action::Start);
        }
        if ui
            .add_enabled(ctl.router().is_running(), egui::Button::new("Stop"))
            .clicked()
        {
            actions.push(Action::Stop);
        }
        if ui.button("Save Configuration").clicked() {
            actions.push(Action::SaveConfig);
        }
        if has_tray && ui.button("Minimize to Tray").clicked() {
            actions.push(Action::HideToTray);
        }
    });
    match ctl.router().ports() {
        Some((input, output)) => ui.label(format!("Routing {input} → {output}")),
        None => ui.weak("Idle"),
    };

    if let Some(status) = ctl.status() {
        let color = match status.kind {
            StatusKind::Info => ui.visuals().text_color(),
            StatusKind::Warning => ui.visuals().warn_fg_color,
            StatusKind::Error => ui.visuals().error_fg_color,
        };
        ui.add_space(4.0);
        ui.colored_label(color, status.text.as_str());
    }

    ui.add_space(8.0);
    ui.separator();
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for line in ctl.log_lines() {
                ui.monospace(line.as_str());
            }
        });
}

fn port_radio_list(ui: &mut egui::Ui, ports: &[String], selected: &mut String) {
    if ports.is_empty() {
        ui.weak("No ports");
    }
    for port in ports {
        if ui.radio_value(selected, port.clone(), port.as_str()).clicked() {
            ui.close_menu();
        }
    }
}

fn port_combo(ui: &mut egui::Ui, id: &str, ports: &[String], selected: &mut String) {
    egui::ComboBox::from_id_salt(id)
        .width(240.0)
        .selected_text(selected.as_str())
        .show_ui(ui, |ui| {
            for port in ports {
                ui.selectable_value(selected, port.clone(), port.as_str());
            }
        });
}

impl eframe::App for RouterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut actions = Vec::new();
        {
            let mut ctl = self.controller.lock();
            ctl.tick();

            egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
                draw_menu_bar(&mut ctl, ui, &mut actions);
            });
            let has_tray = self.tray.is_some();
            egui::CentralPanel::default().show(ctx, |ui| {
                draw_body(&mut ctl, has_tray, ui, &mut actions);
            });
        }

        for action in actions {
            self.handle(ctx, action);
        }

        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}
