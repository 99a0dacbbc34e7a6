use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::artifact::Artifact;
use crate::dashboard::derive::title_case;
use crate::dashboard::{
    Dashboard, GROUP_BY_CLASS, HISTOGRAM_FEATURE, HISTOGRAM_SLOT, SCATTER_SLOT, STATISTICS_SLOT,
    TABLE_ROWS, TABLE_SLOT, X_FEATURE, Y_FEATURE,
};
use crate::reactive::controls::{Control, ControlValue, Domain};

use super::{plot, table, text, to_color32};

/// Control groups shown in the side panel, in display order.
const CONTROL_SECTIONS: [(&str, &[&str]); 3] = [
    ("Scatter Plot", &[X_FEATURE, Y_FEATURE]),
    ("Feature Distribution", &[HISTOGRAM_FEATURE, GROUP_BY_CLASS]),
    ("Dataset Preview", &[TABLE_ROWS]),
];

// ---------------------------------------------------------------------------
// Left side panel – control widgets
// ---------------------------------------------------------------------------

/// Render every control; at most one change per frame is forwarded to the
/// dashboard, after all widgets are drawn.
pub fn side_panel(ui: &mut Ui, dashboard: &mut Dashboard) {
    ui.heading("Controls");
    ui.separator();

    let mut change: Option<(String, ControlValue)> = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (title, ids) in CONTROL_SECTIONS {
                ui.add_space(6.0);
                ui.label(RichText::new(title).strong().size(15.0));
                for id in ids {
                    let Some(control) = dashboard.controls().control(id) else {
                        continue;
                    };
                    if let Some(value) = control_widget(ui, control) {
                        change = Some((control.id.clone(), value));
                    }
                    ui.add_space(4.0);
                }
                ui.separator();
            }
        });

    if let Some((id, value)) = change {
        dashboard.set(&id, value);
    }
}

/// Draw the widget matching a control's domain. Returns the new value when
/// the user changed it this frame.
fn control_widget(ui: &mut Ui, control: &Control) -> Option<ControlValue> {
    ui.label(control.label.as_str());
    match (&control.domain, control.value()) {
        (Domain::OneOf { options }, ControlValue::One(current)) => {
            let mut picked = None;
            egui::ComboBox::from_id_salt(&control.id)
                .selected_text(current.as_str())
                .width(ui.available_width() - 8.0)
                .show_ui(ui, |ui: &mut Ui| {
                    for option in options {
                        if ui
                            .selectable_label(option == current, option.as_str())
                            .clicked()
                            && option != current
                        {
                            picked = Some(ControlValue::One(option.clone()));
                        }
                    }
                });
            picked
        }
        (Domain::SubsetOf { options }, ControlValue::Many(selected)) => {
            let mut next = selected.clone();
            for option in options {
                let mut checked = selected.contains(option);
                if ui.checkbox(&mut checked, title_case(option)).changed() {
                    if checked {
                        next.insert(option.clone());
                    } else {
                        next.remove(option);
                    }
                }
            }
            (next != *selected).then_some(ControlValue::Many(next))
        }
        (Domain::Range { min, max }, ControlValue::Number(current)) => {
            let mut value = *current;
            ui.add(egui::DragValue::new(&mut value).range(*min..=*max));
            (value != *current).then_some(ControlValue::Number(value))
        }
        _ => {
            ui.label(RichText::new("unsupported control").color(Color32::RED));
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Central panel – render slots
// ---------------------------------------------------------------------------

/// Draw every render slot, top to bottom.
pub fn central_panel(ui: &mut Ui, dashboard: &Dashboard) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            intro(ui, dashboard);

            section(ui, "Scatter Plot");
            if let Some(spec) = dashboard.slot(SCATTER_SLOT).and_then(Artifact::as_chart) {
                plot::chart(ui, spec);
            }

            section(ui, "Feature Distribution");
            if let Some(spec) = dashboard.slot(HISTOGRAM_SLOT).and_then(Artifact::as_chart) {
                plot::chart(ui, spec);
            }

            section(ui, "Dataset Preview");
            if let Some(rows) = dashboard.slot(TABLE_SLOT).and_then(Artifact::as_table) {
                table::data_table(ui, rows);
            }

            section(ui, "Dataset Statistics");
            if let Some(tree) = dashboard.slot(STATISTICS_SLOT).and_then(Artifact::as_text) {
                text::text_tree(ui, tree);
            }
        });
}

fn intro(ui: &mut Ui, dashboard: &Dashboard) {
    let ds = dashboard.dataset();
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new("Iris Dataset Explorer").size(26.0));
        ui.label(format!(
            "The dataset contains {} observations from {} classes: {}.",
            ds.len(),
            ds.classes().len(),
            ds.classes().join(", ")
        ));
        ui.horizontal_wrapped(|ui: &mut Ui| {
            for (class, rgb) in dashboard.colors().legend_entries() {
                ui.label(RichText::new(format!("● {class}")).color(to_color32(*rgb, 1.0)));
            }
        });
    });
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(16.0);
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(title).size(19.0).strong());
    });
    ui.add_space(6.0);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, dashboard: &Dashboard, status_message: &mut Option<String>) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export snapshot…").clicked() {
                export_dialog(dashboard, status_message);
                ui.close_menu();
            }
        });

        ui.separator();

        let ds = dashboard.dataset();
        ui.label(format!(
            "{} rows, {} features, {} classes",
            ds.len(),
            ds.features().len(),
            ds.classes().len()
        ));

        if let Some(msg) = status_message.as_deref() {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn export_dialog(dashboard: &Dashboard, status_message: &mut Option<String>) {
    let file = rfd::FileDialog::new()
        .set_title("Export dashboard snapshot")
        .set_file_name("dashboard.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match dashboard.snapshot().write(&path) {
            Ok(()) => *status_message = None,
            Err(e) => {
                log::error!("Failed to export snapshot: {e:#}");
                *status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
