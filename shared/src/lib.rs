pub mod models;
pub mod utils;

pub use models::{Cell, Table, TableKind, NOT_INFORMED, NULL_SENTINEL};
