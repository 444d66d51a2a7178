//! "Speed Test History" secondary window with the trend chart

use super::theme;
use crate::chart::{TrendSeries, CHART_TITLE, DOWNLOAD_SERIES, UPLOAD_SERIES, X_AXIS_LABEL, Y_AXIS_LABEL};
use crate::controller::AppController;
use crate::output::NO_HISTORY_MESSAGE;
use eframe::egui::{self, Id, LayerId, Order, ViewportBuilder, ViewportClass, ViewportCommand, ViewportId};
use egui_plot::{GridMark, Legend, Line, MarkerShape, Plot, PlotPoints, Points};
use std::ops::RangeInclusive;

pub const HISTORY_WINDOW_TITLE: &str = "Speed Test History";
const HISTORY_WINDOW_SIZE: [f32; 2] = [600.0, 400.0];

/// Id of the in-window fallback used when the backend has no extra viewports
fn embedded_window_id() -> Id {
    Id::new("speed_test_history_embedded")
}

/// How to bring an already-open history window forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Raise {
    /// Ask the OS window to take focus
    Viewport,
    /// Move the embedded window's layer above the main panel's windows
    Layer(LayerId),
}

fn raise_for(class: ViewportClass) -> Raise {
    if class == ViewportClass::Embedded {
        Raise::Layer(LayerId::new(Order::Middle, embedded_window_id()))
    } else {
        Raise::Viewport
    }
}

/// Open/closed state of the history window and the series it draws
pub struct HistoryWindow {
    id: ViewportId,
    open: bool,
    focus_requested: bool,
    series: TrendSeries,
    seen_revision: u64,
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self {
            id: ViewportId::from_hash_of("speed_test_history"),
            open: false,
            focus_requested: false,
            series: TrendSeries::default(),
            seen_revision: 0,
        }
    }
}

impl HistoryWindow {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open the window, or bring it forward if it is already showing
    pub fn open(&mut self, controller: &AppController) {
        if self.open {
            self.focus_requested = true;
            return;
        }

        self.open = true;
        self.refresh(controller);
    }

    fn refresh(&mut self, controller: &AppController) {
        self.series = controller.trend();
        self.seen_revision = controller.history_revision();
    }

    pub fn show(&mut self, ctx: &egui::Context, controller: &AppController) {
        if !self.open {
            return;
        }

        if controller.history_revision() != self.seen_revision {
            self.refresh(controller);
        }

        let focus = std::mem::take(&mut self.focus_requested);

        let builder = ViewportBuilder::default()
            .with_title(HISTORY_WINDOW_TITLE)
            .with_inner_size(HISTORY_WINDOW_SIZE);

        let series = &self.series;
        let still_open = ctx.show_viewport_immediate(self.id, builder, |ctx, class| {
            if focus {
                match raise_for(class) {
                    Raise::Viewport => ctx.send_viewport_cmd(ViewportCommand::Focus),
                    Raise::Layer(layer) => ctx.move_to_top(layer),
                }
            }

            if class == ViewportClass::Embedded {
                // No multi-window support; fall back to an in-window panel
                let mut open = true;
                egui::Window::new(HISTORY_WINDOW_TITLE)
                    .id(embedded_window_id())
                    .open(&mut open)
                    .default_size(HISTORY_WINDOW_SIZE)
                    .show(ctx, |ui| draw_chart(ui, series));
                return open;
            }

            egui::CentralPanel::default().show(ctx, |ui| draw_chart(ui, series));
            !ctx.input(|i| i.viewport().close_requested())
        });

        self.open = still_open;
    }
}

fn draw_chart(ui: &mut egui::Ui, series: &TrendSeries) {
    ui.vertical_centered(|ui| ui.heading(CHART_TITLE));

    if series.is_empty() {
        ui.centered_and_justified(|ui| ui.weak(NO_HISTORY_MESSAGE));
        return;
    }

    let labels = series.clone();
    let download = PlotPoints::from(series.download_points().to_vec());
    let download_markers = PlotPoints::from(series.download_points().to_vec());
    let upload = PlotPoints::from(series.upload_points().to_vec());
    let upload_markers = PlotPoints::from(series.upload_points().to_vec());

    Plot::new("speed_trend")
        .legend(Legend::default())
        .x_axis_label(X_AXIS_LABEL)
        .y_axis_label(Y_AXIS_LABEL)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            labels.label_at(mark.value).unwrap_or_default().to_string()
        })
        .include_y(0.0)
        .include_y(series.max_speed() * 1.1)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(download).color(theme::DOWNLOAD_COLOR).name(DOWNLOAD_SERIES));
            plot_ui.points(
                Points::new(download_markers)
                    .shape(MarkerShape::Circle)
                    .radius(4.0)
                    .color(theme::DOWNLOAD_COLOR)
                    .name(DOWNLOAD_SERIES),
            );
            plot_ui.line(Line::new(upload).color(theme::UPLOAD_COLOR).name(UPLOAD_SERIES));
            plot_ui.points(
                Points::new(upload_markers)
                    .shape(MarkerShape::Square)
                    .radius(4.0)
                    .color(theme::UPLOAD_COLOR)
                    .name(UPLOAD_SERIES),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_fallback_raises_its_own_layer() {
        let raise = raise_for(ViewportClass::Embedded);
        assert_eq!(raise, Raise::Layer(LayerId::new(Order::Middle, embedded_window_id())));
    }

    #[test]
    fn test_native_window_asks_for_focus() {
        assert_eq!(raise_for(ViewportClass::Immediate), Raise::Viewport);
    }

    #[test]
    fn test_reopen_requests_focus_instead_of_duplicating() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = crate::models::Config {
            history_file: dir.path().join("history.json"),
            ..crate::models::Config::default()
        };
        let controller = AppController::from_config(&config);

        let mut window = HistoryWindow::default();
        window.open(&controller);
        assert!(window.is_open());
        assert!(!window.focus_requested);

        window.open(&controller);
        assert!(window.is_open());
        assert!(window.focus_requested);
    }
}
