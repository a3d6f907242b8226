use std::path::PathBuf;

use tracing::debug;

use crate::category::Category;
use crate::config::FormatConfig;
use crate::extension::infer_extension;
use crate::media_type::NormalizedContentType;
use crate::pretty::PrettyPrinter;
use crate::sink::WarnSink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedBody {
    pub content_type: NormalizedContentType,
    pub body: String,
    pub extension: String,
}

impl FormattedBody {
    pub fn category(&self) -> Category {
        self.content_type.category()
    }
}

/// Runs a captured body through classification, pretty printing and
/// extension inference.
pub struct BodyFormatter {
    config: FormatConfig,
    printer: PrettyPrinter,
}

impl BodyFormatter {
    pub fn new(config: FormatConfig) -> Self {
        let printer = PrettyPrinter::new(&config);
        Self { config, printer }
    }

    pub fn with_printer(config: FormatConfig, printer: PrettyPrinter) -> Self {
        Self { config, printer }
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    pub fn format(
        &self, content_type_header: &str, body: &str, request_uri: &str, sink: &dyn WarnSink,
    ) -> FormattedBody {
        let content_type = NormalizedContentType::parse(content_type_header);
        debug!(
            "Formatting body as {} ({})",
            content_type.category(),
            content_type
        );

        let body = self
            .printer
            .pretty_print(content_type.category(), body, sink);
        let extension = infer_extension(
            content_type.category(),
            content_type.media_type(),
            request_uri,
        );

        FormattedBody {
            content_type,
            body,
            extension,
        }
    }

    /// Where [`BodyFormatter::format`] output for `stem` should be written.
    pub fn output_path(&self, stem: &str, formatted: &FormattedBody) -> PathBuf {
        self.config.body_file_path(stem, &formatted.extension)
    }
}

impl Default for BodyFormatter {
    fn default() -> Self {
        Self::new(FormatConfig::default())
    }
}
