pub mod bom;
pub mod cell;
pub mod checklist;
pub mod mapping;
pub mod result;
pub mod stats;

pub use bom::BomRecord;
pub use cell::{Cell, Grid};
pub use checklist::ChecklistRecord;
pub use mapping::{MappingConfig, ParseDiagnostics, ParseMode, SheetKind};
pub use result::{CompareRecord, CompareRow, MatchStatus};
pub use stats::{RunStats, RunSummary, SummaryRow};
