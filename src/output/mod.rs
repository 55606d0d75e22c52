//! Consumers fed by the monitor after every refresh cycle.

pub mod format;
mod json;
mod notify;
mod table;

pub use json::JsonExport;
pub use notify::CrashNotifier;
pub use table::TableReport;
