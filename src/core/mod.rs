pub mod errors;
pub mod types;

pub use errors::{ChurnError, Result};
pub use types::{Changeset, ChurnRecord, ChurnReport, ChurnTable, DailyCodeChurn, FileChange};
