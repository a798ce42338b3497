use std::sync::Arc;

use polars::prelude::PolarsResult;

use crate::color::ColorMap;
use crate::data::filter::Selection;
use crate::data::model::{columns, text_values, SalesDataset};
use crate::report::{build_dashboard, DashboardView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The four dashboard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Sales,
    Customers,
    Insights,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Sales, Tab::Customers, Tab::Insights];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Sales => "Sales Analysis",
            Tab::Customers => "Customers",
            Tab::Insights => "Insights",
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded once at startup, never mutated.
    pub dataset: Arc<SalesDataset>,

    /// Ticked years and brands.
    pub selection: Selection,

    /// Everything drawn on screen for the current selection (cached).
    pub view: DashboardView,

    pub active_tab: Tab,

    /// Fuel type colours, shared by the heatmap legend and the box plot.
    pub fuel_colors: ColorMap,

    /// Client type colours, shared by the donut, stacked bars and scatter.
    pub client_colors: ColorMap,
}

impl AppState {
    /// Start with everything selected.
    pub fn new(dataset: Arc<SalesDataset>) -> PolarsResult<Self> {
        let selection = Selection::all(&dataset);
        let view = build_dashboard(&dataset, &selection)?;
        let fuels = text_values(dataset.frame(), columns::FUEL_TYPE)?;
        let clients = text_values(dataset.frame(), columns::CLIENT_TYPE)?;

        Ok(Self {
            fuel_colors: ColorMap::new(fuels.iter().map(String::as_str)),
            client_colors: ColorMap::new(clients.iter().map(String::as_str)),
            dataset,
            selection,
            view,
            active_tab: Tab::Overview,
        })
    }

    /// Rebuild the view after a selection change. On failure the previous
    /// view stays on screen.
    pub fn refresh(&mut self) {
        match build_dashboard(&self.dataset, &self.selection) {
            Ok(view) => {
                self.view = view;
                log::debug!(
                    "Selection changed: {} years, {} brands -> {} sales",
                    self.selection.years.len(),
                    self.selection.brands.len(),
                    self.view.kpis.sale_count
                );
            }
            Err(e) => log::error!("Failed to rebuild the dashboard: {e}"),
        }
    }

    /// Tick or untick one year.
    pub fn set_year(&mut self, year: i32, selected: bool) {
        let changed = if selected {
            self.selection.years.insert(year)
        } else {
            self.selection.years.remove(&year)
        };
        if changed {
            self.refresh();
        }
    }

    /// Tick or untick one brand.
    pub fn set_brand(&mut self, brand: &str, selected: bool) {
        let changed = if selected {
            self.selection.brands.insert(brand.to_string())
        } else {
            self.selection.brands.remove(brand)
        };
        if changed {
            self.refresh();
        }
    }

    pub fn select_all_years(&mut self) {
        self.selection.years = self.dataset.years().clone();
        self.refresh();
    }

    pub fn select_no_years(&mut self) {
        self.selection.years.clear();
        self.refresh();
    }

    pub fn select_all_brands(&mut self) {
        self.selection.brands = self.dataset.brands().clone();
        self.refresh();
    }

    pub fn select_no_brands(&mut self) {
        self.selection.brands.clear();
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::three_sales;

    #[test]
    fn starts_with_everything_selected() {
        let state = AppState::new(Arc::new(three_sales())).unwrap();
        assert_eq!(state.view.kpis.sale_count, 3);
        assert_eq!(state.active_tab, Tab::Overview);
        assert_eq!(state.selection, Selection::all(&state.dataset));
    }

    #[test]
    fn toggles_rebuild_the_view() {
        let mut state = AppState::new(Arc::new(three_sales())).unwrap();

        state.set_brand("B", false);
        assert_eq!(state.view.kpis.sale_count, 2);
        state.set_year(2021, false);
        assert_eq!(state.view.kpis.total_revenue, 15_000.0);

        state.select_no_brands();
        assert_eq!(state.view.kpis.sale_count, 0);
        assert!(state.view.overview.top_brands.is_empty());

        state.select_all_brands();
        state.select_all_years();
        assert_eq!(state.view.kpis.sale_count, 3);
        // The shared dataset never changes.
        assert_eq!(state.dataset.len(), 3);
    }
}
