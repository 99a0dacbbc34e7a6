use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::artifact::TableArtifact;

/// Striped table of the leading rows, with a row-number column.
pub fn data_table(ui: &mut Ui, artifact: &TableArtifact) {
    ui.push_id("data_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(32.0))
            .columns(Column::auto().at_least(110.0), artifact.columns.len())
            .header(24.0, |mut header| {
                header.col(|ui| {
                    ui.strong("#");
                });
                for name in &artifact.columns {
                    header.col(|ui| {
                        ui.strong(name.as_str());
                    });
                }
            })
            .body(|body| {
                body.rows(20.0, artifact.rows.len(), |mut row| {
                    let i = row.index();
                    let record = &artifact.rows[i];
                    row.col(|ui| {
                        ui.label(i.to_string());
                    });
                    for value in &record.values {
                        row.col(|ui| {
                            ui.label(format!("{value}"));
                        });
                    }
                    row.col(|ui| {
                        ui.label(record.label.as_str());
                    });
                });
            });
    });
}
