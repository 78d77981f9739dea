// Computations the dashboard performs over the cleaned tables: filtering,
// lookup and summary metrics. Pure functions, no presentation.
pub mod filters;
pub mod summary;

pub use filters::{
    date_bounds, delay_days, filter_options, find_demand, situation_options, DemandFilter,
    ALL_OPTION, TERMINAL_SITUATIONS,
};
pub use summary::DashboardSummary;
