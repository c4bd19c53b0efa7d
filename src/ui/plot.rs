use eframe::egui::{self, Color32, Stroke, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points};

use banking_dashboard::analytics::assemble::{Panel, PanelData, PanelKey};
use banking_dashboard::data::model::{CategoryField, JOIN_YEAR_HEADER};
use banking_dashboard::data::view::View;
use banking_dashboard::state::AppState;

const PLOT_HEIGHT: f32 = 260.0;
const HISTOGRAM_COLOR: Color32 = Color32::from_rgb(0x63, 0x6E, 0xFA);
const OCCUPATION_COLOR: Color32 = Color32::from_rgb(0xEF, 0x55, 0x3B);
const SCATTER_COLOR: Color32 = Color32::from_rgb(0x00, 0xCC, 0x96);

// ---------------------------------------------------------------------------
// Panel plots
// ---------------------------------------------------------------------------

/// Category field whose palette colours a panel's bars, if any.
fn color_field(key: PanelKey) -> Option<CategoryField> {
    match key {
        PanelKey::NationalityDistribution => Some(CategoryField::Nationality),
        PanelKey::LoyaltyDistribution | PanelKey::RiskByLoyalty => {
            Some(CategoryField::LoyaltyClassification)
        }
        _ => None,
    }
}

/// Render one assembled panel. `page` keeps plot ids unique across pages.
pub fn panel_plot(ui: &mut Ui, state: &AppState, page: &str, panel: &Panel) {
    ui.strong(panel.title);
    if panel.data.is_empty() {
        ui.label("No data for the current selection.");
        return;
    }

    let field = color_field(panel.key);
    let color = |label: &str, fallback: Color32| {
        field
            .and_then(|f| state.color_for(f, label))
            .unwrap_or(fallback)
    };

    let plot = Plot::new(format!("{page}_{:?}", panel.key))
        .height(PLOT_HEIGHT)
        .x_axis_label(panel.x_label)
        .y_axis_label(panel.y_label)
        .allow_scroll(false);

    match &panel.data {
        PanelData::Categories(values) => {
            let bars: Vec<Bar> = values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    Bar::new(i as f64, v.value)
                        .name(&v.label)
                        .width(0.8)
                        .fill(color(&v.label, OCCUPATION_COLOR))
                })
                .collect();
            plot.show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars)));
        }
        PanelData::Bins(bins) => {
            let bars: Vec<Bar> = bins
                .iter()
                .map(|b| {
                    Bar::new((b.start + b.end) / 2.0, b.count as f64)
                        .width((b.end - b.start) * 0.9)
                        .name(format!("{:.0} – {:.0}", b.start, b.end))
                })
                .collect();
            plot.show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(HISTOGRAM_COLOR))
            });
        }
        PanelData::Points(points) => {
            let series: PlotPoints = points.iter().map(|p| [p.x, p.y]).collect();
            plot.show(ui, |plot_ui| {
                plot_ui.points(Points::new(series).radius(2.5).color(SCATTER_COLOR))
            });
        }
        PanelData::Boxes(boxes) => {
            let elems: Vec<BoxElem> = boxes
                .iter()
                .enumerate()
                .map(|(i, b)| {
                    let c = color(&b.category, HISTOGRAM_COLOR);
                    BoxElem::new(
                        i as f64,
                        BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker),
                    )
                    .name(&b.category)
                    .box_width(0.6)
                    .fill(c.gamma_multiply(0.4))
                    .stroke(Stroke::new(1.5, c))
                })
                .collect();
            plot.legend(Legend::default())
                .show(ui, |plot_ui| plot_ui.box_plot(BoxPlot::new(elems)));
        }
        PanelData::Years(years) => {
            let series: Vec<[f64; 2]> = years
                .iter()
                .map(|y| [f64::from(y.year), y.count as f64])
                .collect();
            plot.show(ui, |plot_ui| {
                plot_ui.line(Line::new(PlotPoints::from(series.clone())).width(2.0));
                plot_ui.points(Points::new(PlotPoints::from(series)).radius(3.5));
            });
        }
        PanelData::NoData => {}
    }
}

/// Render the panel with `key` from a dashboard, if present.
pub fn keyed_plot(ui: &mut Ui, state: &AppState, page: &str, panels: &[Panel], key: PanelKey) {
    if let Some(panel) = panels.iter().find(|p| p.key == key) {
        panel_plot(ui, state, page, panel);
    }
}

// ---------------------------------------------------------------------------
// Data table
// ---------------------------------------------------------------------------

/// Row-per-record table of a view, columns in source order.
pub fn data_table(ui: &mut Ui, view: &View<'_>) {
    let store = view.store();
    let schema = store.schema();
    let all = store.all();
    let indices = view.indices();

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(320.0)
            .columns(TableColumn::auto().at_least(60.0), schema.len() + 1)
            .header(22.0, |mut header| {
                for column in schema {
                    header.col(|ui| {
                        ui.strong(column.header());
                    });
                }
                header.col(|ui| {
                    ui.strong(JOIN_YEAR_HEADER);
                });
            })
            .body(|body| {
                body.rows(18.0, indices.len(), |mut row| {
                    let record = &all[indices[row.index()]];
                    for &column in schema {
                        row.col(|ui| {
                            ui.label(record.cell(column));
                        });
                    }
                    row.col(|ui| {
                        ui.label(record.join_year.to_string());
                    });
                });
            });
    });
}
