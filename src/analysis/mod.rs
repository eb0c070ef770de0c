//! One Analyze run: encoding → pair grid → forest importances →
//! relationship plots, collected into an ordered [`AnalysisReport`].
//!
//! Plot builders here only prepare data; `ui::plot` draws it.

pub mod pipeline;
pub mod plots;

pub use pipeline::{run_analysis, AnalysisReport, Notice, ReportItem, Severity};
