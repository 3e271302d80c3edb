//! Pages of the dashboard
//!
//! Each view owns its load slots and charts. Dropping a view aborts its
//! fetches and drops what it drew.

pub mod detail;
pub mod list;
pub mod quarterly;
pub mod quick;

pub use detail::{DetailView, prediction_lines};
pub use list::{DEFAULT_SP500_LIMIT, ListEntry, ListSource, ListView, filter_entries};
pub use quarterly::{QuarterlyView, SavedChart, save_chart};
pub use quick::{EMPTY_INPUT_MESSAGE, QuickPredictView};
