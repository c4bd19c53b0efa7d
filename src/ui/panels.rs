use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use banking_dashboard::analytics::aggregate::SummaryMetrics;
use banking_dashboard::analytics::assemble::PanelKey;
use banking_dashboard::data::model::CategoryField;
use banking_dashboard::state::{AppState, Page, Status};

use super::plot::{data_table, keyed_plot};

// ---------------------------------------------------------------------------
// Left side panel – navigation and filter widgets
// ---------------------------------------------------------------------------

/// A filter edit requested by the side panel, applied after rendering.
enum FilterAction {
    Toggle(CategoryField, String),
    All(CategoryField),
    None(CategoryField),
}

/// Render the left navigation / filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Navigation");
    ui.radio_value(&mut state.page, Page::Home, "Home");
    ui.radio_value(&mut state.page, Page::Explorer, "Data Explorer");
    ui.separator();

    if state.page != Page::Explorer {
        return;
    }

    ui.heading("Filters");
    ui.separator();

    let Some(store) = &state.store else {
        ui.label("No dataset loaded.");
        return;
    };

    let mut actions = Vec::new();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for field in CategoryField::ALL {
                let all_values = store.distinct_values(field);
                let selected = state.selection.selected(field);

                // Show count of selected / total in the header
                let n_selected = all_values.iter().filter(|v| selected.contains(*v)).count();
                let header_text = format!("{}  ({n_selected}/{})", field.label(), all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(field.label())
                    .default_open(field != CategoryField::Occupation)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                actions.push(FilterAction::All(field));
                            }
                            if ui.small_button("None").clicked() {
                                actions.push(FilterAction::None(field));
                            }
                        });

                        for value in all_values {
                            let mut text = RichText::new(value);
                            if let Some(c) = state.color_for(field, value) {
                                if field != CategoryField::Occupation {
                                    text = text.color(c);
                                }
                            }

                            let mut checked = selected.contains(value);
                            if ui.checkbox(&mut checked, text).changed() {
                                actions.push(FilterAction::Toggle(field, value.clone()));
                            }
                        }
                    });
            }
        });

    for action in actions {
        match action {
            FilterAction::Toggle(field, value) => state.toggle_filter_value(field, &value),
            FilterAction::All(field) => state.select_all(field),
            FilterAction::None(field) => state.select_none(field),
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export filtered data…").clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(store) = &state.store {
            ui.label(format!(
                "{} customers loaded, {} pass the filters",
                store.len(),
                state.visible_indices.len()
            ));
        }

        match &state.status {
            Some(Status::Info(msg)) => {
                ui.separator();
                ui.label(msg);
            }
            Some(Status::Error(msg)) => {
                ui.separator();
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// Four headline metric cards.
fn metric_cards(ui: &mut Ui, metrics: &SummaryMetrics) {
    ui.columns(4, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Total Customers", thousands(metrics.count as f64));
        metric(
            &mut cols[1],
            "Average Age",
            metrics
                .mean_age
                .map_or_else(no_data, |v| format!("{v:.1} years")),
        );
        metric(
            &mut cols[2],
            "Average Income",
            metrics.mean_income.map_or_else(no_data, dollars),
        );
        metric(
            &mut cols[3],
            "Avg. Credit Card Balance",
            metrics.mean_credit_card_balance.map_or_else(no_data, dollars),
        );
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        ui.label(RichText::new(value).size(26.0).strong());
    });
}

fn no_data() -> String {
    "No data".to_string()
}

fn dollars(v: f64) -> String {
    format!("${}", thousands(v))
}

/// Round to a whole number and group digits by thousands.
fn thousands(v: f64) -> String {
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        grouped.insert(0, '-');
    }
    grouped
}

/// The overview page over the whole store.
pub fn home_page(ui: &mut Ui, state: &AppState) {
    let Some(dashboard) = state.home() else {
        welcome(ui);
        return;
    };
    let panels = &dashboard.panels;
    let page = "home";

    ui.heading("🏦 Banking Analytics Dashboard");
    ui.separator();

    ui.heading("Key Metrics");
    metric_cards(ui, &dashboard.metrics);
    ui.separator();

    ui.heading("Customer Demographics");
    ui.columns(2, |cols: &mut [Ui]| {
        keyed_plot(&mut cols[0], state, page, panels, PanelKey::AgeDistribution);
        keyed_plot(&mut cols[1], state, page, panels, PanelKey::NationalityDistribution);
    });
    keyed_plot(ui, state, page, panels, PanelKey::TopOccupations);
    ui.separator();

    ui.heading("Financial Insights");
    ui.columns(2, |cols: &mut [Ui]| {
        keyed_plot(&mut cols[0], state, page, panels, PanelKey::IncomeDistribution);
        keyed_plot(&mut cols[1], state, page, panels, PanelKey::CreditCardBalanceDistribution);
    });
    ui.columns(2, |cols: &mut [Ui]| {
        keyed_plot(&mut cols[0], state, page, panels, PanelKey::DepositsVsIncome);
        keyed_plot(&mut cols[1], state, page, panels, PanelKey::LoanDistribution);
    });
    ui.separator();

    ui.heading("Loyalty & Risk Analysis");
    keyed_plot(ui, state, page, panels, PanelKey::LoyaltyDistribution);
    keyed_plot(ui, state, page, panels, PanelKey::RiskByLoyalty);
    ui.separator();

    ui.heading("Banking Products Analysis");
    ui.columns(3, |cols: &mut [Ui]| {
        keyed_plot(&mut cols[0], state, page, panels, PanelKey::CreditCards);
        keyed_plot(&mut cols[1], state, page, panels, PanelKey::CheckingAccounts);
        keyed_plot(&mut cols[2], state, page, panels, PanelKey::SavingAccounts);
    });
    ui.columns(3, |cols: &mut [Ui]| {
        keyed_plot(&mut cols[0], state, page, panels, PanelKey::ForeignCurrencyAccounts);
        keyed_plot(&mut cols[1], state, page, panels, PanelKey::BusinessLending);
        keyed_plot(&mut cols[2], state, page, panels, PanelKey::PropertiesOwned);
    });
    ui.separator();

    ui.heading("Time Series Analysis");
    keyed_plot(ui, state, page, panels, PanelKey::CustomersByYear);
}

/// The data explorer page over the filtered view.
pub fn explorer_page(ui: &mut Ui, state: &mut AppState) {
    let mut download = false;
    {
        let state: &AppState = state;
        let (Some(dashboard), Some(view)) = (state.explorer(), state.filtered_view()) else {
            welcome(ui);
            return;
        };
        let panels = &dashboard.panels;
        let page = "explorer";

        ui.heading("🔍 Data Explorer");
        ui.separator();

        ui.heading("Key Metrics (Filtered Data)");
        metric_cards(ui, &dashboard.metrics);
        ui.separator();

        ui.heading("Filtered Data");
        data_table(ui, &view);
        if ui.button("Download Filtered Data as CSV").clicked() {
            download = true;
        }
        ui.separator();

        ui.heading("Filtered Data Visualizations");
        keyed_plot(ui, state, page, panels, PanelKey::AgeDistribution);
        keyed_plot(ui, state, page, panels, PanelKey::NationalityDistribution);
    }

    if download {
        save_file_dialog(state);
    }
}

fn welcome(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Open a customer table to begin  (File → Open…)");
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open customer data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq", "xlsx"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    if state.store.is_none() {
        return;
    }
    let file = rfd::FileDialog::new()
        .set_title("Download filtered data")
        .set_file_name(&state.config.export_file_name)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export(&path);
    }
}
