//! State sample input

mod loader;
mod state_record;

pub use loader::{load_records, parse_records};
pub use state_record::{ApiResponse, PositionDocument, PositionRecord};
