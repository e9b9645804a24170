//! District market reports (tabular + chart HTML artifacts)

pub mod generator;
pub mod html;

pub use generator::{
    BudgetReportRow, PriceReportRow, ReportError, ReportGenerator, ReportStats,
};
