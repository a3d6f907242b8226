//! Format-specific collaborators used by the pretty printer.
//!
//! Each trait takes the decoded body as `&str` and either returns the
//! reformatted text or a [`FormatError`]. The default implementations are
//! [`QuickXmlFormatter`], [`SerdeJsonFormatter`] and [`ScraperTidy`].

pub mod json;
pub mod tidy;
pub mod xml;

pub use json::SerdeJsonFormatter;
pub use tidy::{
    ScraperTidy,
    TidyOptions,
};
pub use xml::QuickXmlFormatter;

use crate::error::FormatResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedXml {
    pub body: String,
    /// The `<?xml ...?>` declaration exactly as it appeared in the input.
    pub declaration: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
pub trait XmlFormatter: Send + Sync {
    fn format(&self, content: &str) -> FormatResult<FormattedXml>;
}

#[cfg_attr(test, mockall::automock)]
pub trait JsonFormatter: Send + Sync {
    fn format(&self, content: &str) -> FormatResult<String>;
}

#[cfg_attr(test, mockall::automock)]
pub trait HtmlTidy: Send + Sync {
    fn tidy(&self, content: &str, options: &TidyOptions) -> FormatResult<String>;
}
