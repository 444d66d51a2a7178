//! Desktop window
//!
//! The main window shows the three result cards and the controls; the update
//! loop drains the controller every frame so a finished run lands without
//! blocking the UI thread.

mod history_window;
pub mod theme;

pub use history_window::{HistoryWindow, HISTORY_WINDOW_TITLE};

use crate::controller::{AppController, RunCompletion};
use crate::error::Result;
use crate::logging::Logger;
use crate::models::Config;
use crate::types::AppearanceMode;
use eframe::egui::{self, RichText};
use std::time::Duration;

pub const MAIN_WINDOW_TITLE: &str = "Modern Wi-Fi Speed Tester";
const MAIN_WINDOW_SIZE: [f32; 2] = [500.0, 400.0];
const RUNNING_REPAINT_INTERVAL: Duration = Duration::from_millis(100);

pub struct SpeedCheckApp {
    controller: AppController,
    history_window: HistoryWindow,
    appearance: AppearanceMode,
    logger: Logger,
}

impl SpeedCheckApp {
    pub fn new(cc: &eframe::CreationContext<'_>, controller: AppController, config: &Config) -> Self {
        cc.egui_ctx.set_theme(theme::theme_preference(config.appearance));

        Self {
            controller,
            history_window: HistoryWindow::default(),
            appearance: config.appearance,
            logger: Logger::with_config("GUI", config),
        }
    }

    fn start_run(&mut self, ctx: &egui::Context) {
        let repaint = ctx.clone();
        if !self.controller.trigger(move || repaint.request_repaint()) {
            self.logger.debug("Run request ignored").log();
        }
    }

    fn set_appearance(&mut self, ctx: &egui::Context, mode: AppearanceMode) {
        if self.appearance == mode {
            return;
        }
        self.appearance = mode;
        ctx.set_theme(theme::theme_preference(mode));
        self.logger
            .debug("Appearance changed")
            .field("appearance", mode.label())
            .log();
    }

    fn result_card(ui: &mut egui::Ui, icon: &str, title: &str, value: &str) {
        let color = if value == crate::presenter::ERROR_INDICATOR {
            theme::ERROR_COLOR
        } else {
            ui.visuals().strong_text_color()
        };

        ui.group(|ui| {
            ui.set_min_width(theme::CARD_WIDTH);
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(format!("{} {}", icon, title)).size(theme::CARD_TITLE_SIZE));
                ui.add_space(6.0);
                ui.label(RichText::new(value).size(theme::CARD_VALUE_SIZE).color(color).strong());
            });
        });
    }

    fn main_panel(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(12.0);
            ui.heading(RichText::new(MAIN_WINDOW_TITLE).size(22.0).color(theme::ACCENT));
        });
        ui.add_space(16.0);

        let presenter = self.controller.presenter().clone();

        ui.columns(3, |cols| {
            Self::result_card(&mut cols[0], "📍", "Ping", presenter.ping_text());
            Self::result_card(&mut cols[1], "⬇️", "Download", presenter.download_text());
            Self::result_card(&mut cols[2], "⬆️", "Upload", presenter.upload_text());
        });

        ui.add_space(20.0);

        let mut run_clicked = false;
        ui.vertical_centered(|ui| {
            if presenter.progress_visible() {
                ui.spinner();
            } else {
                ui.add_space(ui.spacing().interact_size.y);
            }
            ui.add_space(8.0);

            let button = egui::Button::new(RichText::new(presenter.trigger_label()).size(16.0))
                .min_size(egui::vec2(180.0, 36.0));
            run_clicked = ui.add_enabled(presenter.trigger_enabled(), button).clicked();
        });

        if run_clicked {
            self.start_run(ctx);
        }

        ui.add_space(20.0);
        ui.separator();

        let mut selected = self.appearance;
        let mut show_history = false;
        ui.horizontal(|ui| {
            ui.label("Appearance:");
            for mode in AppearanceMode::ALL {
                ui.selectable_value(&mut selected, mode, mode.label());
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                show_history = ui.button("Show History").clicked();
            });
        });

        self.set_appearance(ctx, selected);
        if show_history {
            self.history_window.open(&self.controller);
        }
    }
}

impl eframe::App for SpeedCheckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(done) = self.controller.poll() {
            let outcome = match done {
                RunCompletion::Succeeded(_) => "succeeded",
                RunCompletion::Failed(_) => "failed",
            };
            self.logger.debug("Run applied to window").field("outcome", outcome).log();
        }

        if self.controller.state().is_running() {
            ctx.request_repaint_after(RUNNING_REPAINT_INTERVAL);
        }

        egui::CentralPanel::default().show(ctx, |ui| self.main_panel(ctx, ui));

        self.history_window.show(ctx, &self.controller);
    }
}

/// Open the main window and block until it is closed
pub fn run(config: Config) -> Result<()> {
    let controller = AppController::from_config(&config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(MAIN_WINDOW_TITLE)
            .with_inner_size(MAIN_WINDOW_SIZE)
            .with_min_inner_size([420.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        MAIN_WINDOW_TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(SpeedCheckApp::new(cc, controller, &config)))),
    )?;

    Ok(())
}
