// Headline metrics for the filtered tables
use demandas_shared::models::columns;
use demandas_shared::utils::brazilian_format;
use demandas_shared::Table;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub open_count: usize,
    pub closed_count: usize,
    pub total_cost: f64,
    /// `None` when there are no closed demands.
    pub mean_cost: Option<f64>,
}

impl DashboardSummary {
    pub fn compute(open: &Table, closed: &Table) -> Self {
        let costs: Vec<f64> = closed
            .column(columns::VLR_TOTAL)
            .map(|cells| cells.filter_map(|c| c.as_number()).collect())
            .unwrap_or_default();

        let total_cost: f64 = costs.iter().sum();
        let mean_cost = if costs.is_empty() {
            None
        } else {
            Some(total_cost / costs.len() as f64)
        };

        DashboardSummary {
            open_count: open.len(),
            closed_count: closed.len(),
            total_cost,
            mean_cost,
        }
    }

    pub fn total_cost_display(&self) -> String {
        brazilian_format::format_currency(self.total_cost)
    }

    pub fn mean_cost_display(&self) -> String {
        self.mean_cost
            .map(brazilian_format::format_currency)
            .unwrap_or_else(|| "-".to_string())
    }
}
