//! Data models for WOS result pages, records and batch options.

mod enums;
mod page;
mod record;

pub use enums::{BatchMode, MatchField, OutputFormat};
pub use page::SearchPage;
pub use record::{IdMapping, Record, strip_wos_prefix};
