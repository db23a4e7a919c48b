mod engine;
mod error;
mod types;
pub mod well_known;

pub use engine::{Engine, Session};
pub use error::{CoreError, CoreErrorCode};
pub use types::{Capabilities, CapabilityIssue, CellEntry, Snapshot};
