pub mod filter;
pub mod models;
pub mod presentation;
pub mod session;
pub mod table;

pub use filter::{Band, RateQuery, SupplyWindow, filter, filter_query};
pub use models::*;
pub use presentation::{Download, Presenter};
pub use session::{DateSelection, Event, EventOutcome, SelectionState, SessionPhase};
pub use table::RateTable;
