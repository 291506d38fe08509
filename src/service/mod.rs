pub mod aggregate;
pub mod checker;
pub mod matcher;
pub mod report;
pub mod validate;

pub use aggregate::{compute_stats, summarize, summary_rows};
pub use checker::{CheckReport, CheckRequest, CheckService, ChecklistReport, SheetInput};
pub use matcher::{classify, PartLookup, ReconEngine};
pub use report::{abnormal_rows, compare_rows, export_compare_csv, export_summary_csv, ok_rows};
pub use validate::{validate_inputs, DataWarning};
