//! System tray icon with Show / Quit, the way back to a hidden window.
//!
//! On Linux the tray needs a running GTK main loop, so the icon is built and
//! kept on its own thread. Elsewhere it lives alongside the eframe window.

use eframe::egui;
use tray_icon::menu::{Menu, MenuEvent, MenuId, MenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

use crate::error::TrayError;

const ICON_SIZE: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayCommand {
    Show,
    Quit,
}

impl TrayCommand {
    fn from_menu_id(id: &MenuId, show: &MenuId, quit: &MenuId) -> Option<Self> {
        if id == show {
            Some(TrayCommand::Show)
        } else if id == quit {
            Some(TrayCommand::Quit)
        } else {
            None
        }
    }

    /// Issued from the tray thread; the window may be hidden and not drawing.
    fn apply(self, ctx: &egui::Context) {
        match self {
            TrayCommand::Show => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Visible(true));
                ctx.send_viewport_cmd(egui::ViewportCommand::Minimized(false));
                ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
            }
            TrayCommand::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }
        ctx.request_repaint();
    }
}

/// Keeps the tray icon alive for as long as the window runs.
pub struct Tray {
    /// `None` on Linux, where the icon is owned by the GTK thread.
    _icon: Option<TrayIcon>,
}

impl Tray {
    #[cfg(target_os = "linux")]
    pub fn create(ctx: &egui::Context) -> Result<Self, TrayError> {
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<(), TrayError>>(1);
        let ctx = ctx.clone();

        std::thread::Builder::new()
            .name("ridi-tray".to_string())
            .spawn(move || {
                if let Err(e) = gtk::init() {
                    let _ = ready_tx.send(Err(TrayError(e.to_string())));
                    return;
                }
                match build_icon(ctx) {
                    Ok(_icon) => {
                        let _ = ready_tx.send(Ok(()));
                        gtk::main();
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                    }
                }
            })
            .map_err(|e| TrayError(e.to_string()))?;

        ready_rx.recv().map_err(|e| TrayError(e.to_string()))??;
        log::info!("[Tray] Icon created");
        Ok(Self { _icon: None })
    }

    #[cfg(not(target_os = "linux"))]
    pub fn create(ctx: &egui::Context) -> Result<Self, TrayError> {
        let icon = build_icon(ctx.clone())?;
        log::info!("[Tray] Icon created");
        Ok(Self { _icon: Some(icon) })
    }
}

fn build_icon(ctx: egui::Context) -> Result<TrayIcon, TrayError> {
    let show = MenuItem::new("Show", true, None);
    let quit = MenuItem::new("Quit", true, None);
    let menu = Menu::new();
    menu.append(&show).map_err(|e| TrayError(e.to_string()))?;
    menu.append(&quit).map_err(|e| TrayError(e.to_string()))?;

    let show_id = show.id().clone();
    let quit_id = quit.id().clone();
    MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
        if let Some(command) = TrayCommand::from_menu_id(&event.id, &show_id, &quit_id) {
            log::debug!("[Tray] {command:?}");
            command.apply(&ctx);
        }
    }));

    let icon = Icon::from_rgba(icon_rgba(), ICON_SIZE, ICON_SIZE)
        .map_err(|e| TrayError(e.to_string()))?;

    TrayIconBuilder::new()
        .with_menu(Box::new(menu))
        .with_tooltip("RIDI")
        .with_icon(icon)
        .build()
        .map_err(|e| TrayError(e.to_string()))
}

/// White square with a blue inner square.
fn icon_rgba() -> Vec<u8> {
    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    let inner = ICON_SIZE / 4..=ICON_SIZE * 3 / 4;

    let mut rgba = Vec::with_capacity((ICON_SIZE * ICON_SIZE * 4) as usize);
    for y in 0..ICON_SIZE {
        for x in 0..ICON_SIZE {
            let pixel = if inner.contains(&x) && inner.contains(&y) {
                BLUE
            } else {
                WHITE
            };
            rgba.extend_from_slice(&pixel);
        }
    }
    rgba
}
