pub mod json;
pub mod xml;

pub use json::{JsonFormatter, MonitoringReport};
pub use xml::XmlFormatter;

use clap::ValueEnum;

/// Output representations of a result record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Xml,
}
