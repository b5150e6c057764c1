//! UI components.

mod converter;
mod downloader;
mod header;
mod status_line;

pub use converter::Converter;
pub use downloader::Downloader;
pub use header::Header;
pub use status_line::{BusyLabel, StatusLine};
