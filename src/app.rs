use eframe::egui;

use crate::dashboard::Dashboard;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct IrisExplorerApp {
    pub dashboard: Dashboard,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl IrisExplorerApp {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            status_message: None,
        }
    }
}

impl eframe::App for IrisExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.dashboard, &mut self.status_message);
        });

        // ---- Left side panel: controls ----
        egui::SidePanel::left("control_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.dashboard);
            });

        // ---- Central panel: render slots ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::central_panel(ui, &self.dashboard);
        });
    }
}
