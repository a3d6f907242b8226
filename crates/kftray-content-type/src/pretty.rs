use tracing::debug;

use crate::category::Category;
use crate::config::{
    FormatConfig,
    DEFAULT_MAX_BODY_SIZE,
};
use crate::error::FormatResult;
use crate::formatters::{
    HtmlTidy,
    JsonFormatter,
    QuickXmlFormatter,
    ScraperTidy,
    SerdeJsonFormatter,
    TidyOptions,
    XmlFormatter,
};
use crate::sink::WarnSink;

pub const LINE_SEPARATOR: &str = "\n";

/// Dispatches a body to the formatter for its category.
///
/// Printing is best effort: whenever a formatter rejects the body, the
/// failure goes to the [`WarnSink`] and the body comes back untouched.
pub struct PrettyPrinter {
    xml: Box<dyn XmlFormatter>,
    json: Box<dyn JsonFormatter>,
    html: Box<dyn HtmlTidy>,
    tidy_options: TidyOptions,
    max_body_size: usize,
}

impl PrettyPrinter {
    pub fn new(config: &FormatConfig) -> Self {
        Self::with_limits(config.tidy_options().clone(), config.max_body_size())
    }

    fn with_limits(tidy_options: TidyOptions, max_body_size: usize) -> Self {
        Self {
            xml: Box::new(QuickXmlFormatter),
            json: Box::new(SerdeJsonFormatter),
            html: Box::new(ScraperTidy),
            tidy_options,
            max_body_size,
        }
    }

    pub fn with_xml_formatter(mut self, formatter: impl XmlFormatter + 'static) -> Self {
        self.xml = Box::new(formatter);
        self
    }

    pub fn with_json_formatter(mut self, formatter: impl JsonFormatter + 'static) -> Self {
        self.json = Box::new(formatter);
        self
    }

    pub fn with_html_tidy(mut self, tidy: impl HtmlTidy + 'static) -> Self {
        self.html = Box::new(tidy);
        self
    }

    pub fn tidy_options(&self) -> &TidyOptions {
        &self.tidy_options
    }

    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    pub fn pretty_print(&self, category: Category, content: &str, sink: &dyn WarnSink) -> String {
        if content.len() > self.max_body_size {
            debug!(
                "Skipping pretty print of {} body: {} bytes exceeds limit of {}",
                category,
                content.len(),
                self.max_body_size
            );
            return content.to_string();
        }

        let formatted = match category {
            Category::Xml => self.format_xml(content),
            Category::Json | Category::Javascript => self.json.format(content),
            Category::Html => self.html.tidy(content, &self.tidy_options),
            Category::Text | Category::Application | Category::Other => {
                return content.to_string();
            }
        };

        match formatted {
            Ok(formatted) => {
                debug!(
                    "Pretty printed {} body: {} -> {} bytes",
                    category,
                    content.len(),
                    formatted.len()
                );
                formatted
            }
            Err(e) => {
                sink.warn(&format!("Failed to pretty print {category} content"), &e);
                content.to_string()
            }
        }
    }

    fn format_xml(&self, content: &str) -> FormatResult<String> {
        let formatted = self.xml.format(content)?;

        Ok(match formatted.declaration {
            Some(declaration) => format!("{declaration}{LINE_SEPARATOR}{}", formatted.body),
            None => formatted.body,
        })
    }
}

impl Default for PrettyPrinter {
    fn default() -> Self {
        Self::with_limits(TidyOptions::default(), DEFAULT_MAX_BODY_SIZE)
    }
}

/// Pretty prints with the default formatters and limits.
pub fn pretty_print(category: Category, content: &str, sink: &dyn WarnSink) -> String {
    PrettyPrinter::default().pretty_print(category, content, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use crate::formatters::{
        FormattedXml,
        MockHtmlTidy,
        MockJsonFormatter,
        MockXmlFormatter,
    };
    use crate::sink::{
        MockWarnSink,
        NoopSink,
    };

    fn silent_sink() -> MockWarnSink {
        let mut sink = MockWarnSink::new();
        sink.expect_warn().never();
        sink
    }

    #[test]
    fn test_json_is_indented() {
        let output = pretty_print(Category::Json, "{\"a\":1,\"b\":[1,2]}", &silent_sink());
        assert_eq!(output, "{\n  \"a\": 1,\n  \"b\": [\n    1,\n    2\n  ]\n}");
    }

    #[test]
    fn test_javascript_takes_json_path() {
        let output = pretty_print(Category::Javascript, "{\"a\":true}", &silent_sink());
        assert_eq!(output, "{\n  \"a\": true\n}");
    }

    #[test]
    fn test_invalid_json_returns_original_and_warns() {
        let mut sink = MockWarnSink::new();
        sink.expect_warn()
            .withf(|message, cause| {
                message.contains("json") && matches!(cause, FormatError::Json(_))
            })
            .times(1)
            .return_const(());

        let output = pretty_print(Category::Json, "{not valid json", &sink);
        assert_eq!(output, "{not valid json");
    }

    #[test]
    fn test_plain_javascript_returns_original_and_warns() {
        let mut sink = MockWarnSink::new();
        sink.expect_warn().times(1).return_const(());

        let script = "function test() { console.log('hello'); }";
        assert_eq!(pretty_print(Category::Javascript, script, &sink), script);
    }

    #[test]
    fn test_xml_without_declaration() {
        let output = pretty_print(Category::Xml, "<a><b/></a>", &silent_sink());
        assert_eq!(output, "<a>\n  <b/>\n</a>");
    }

    #[test]
    fn test_xml_with_declaration() {
        let output = pretty_print(Category::Xml, "<?xml version=\"1.0\"?><a/>", &silent_sink());
        assert_eq!(output, "<?xml version=\"1.0\"?>\n<a/>");
    }

    #[test]
    fn test_xml_declaration_is_joined_with_line_separator() {
        let mut xml = MockXmlFormatter::new();
        xml.expect_format().times(1).returning(|_| {
            Ok(FormattedXml {
                body: "<r/>".to_string(),
                declaration: Some("<?xml version='1.1'?>".to_string()),
            })
        });

        let printer = PrettyPrinter::default().with_xml_formatter(xml);
        assert_eq!(
            printer.pretty_print(Category::Xml, "<r></r>", &silent_sink()),
            "<?xml version='1.1'?>\n<r/>"
        );
    }

    #[test]
    fn test_malformed_xml_returns_original() {
        let mut sink = MockWarnSink::new();
        sink.expect_warn()
            .withf(|_, cause| matches!(cause, FormatError::Xml(_)))
            .times(1)
            .return_const(());

        assert_eq!(pretty_print(Category::Xml, "<a><b></a>", &sink), "<a><b></a>");
    }

    #[test]
    fn test_passthrough_categories() {
        let body = "  {\"a\":1}  <b>raw</b>\n";
        for category in [Category::Text, Category::Application, Category::Other] {
            assert_eq!(pretty_print(category, body, &silent_sink()), body);
        }
    }

    #[test]
    fn test_html_uses_configured_tidy_options() {
        let mut tidy = MockHtmlTidy::new();
        tidy.expect_tidy()
            .withf(|content, options| {
                content == "<p>x</p>"
                    && options.wrap == 120
                    && options.indent_spaces == 2
                    && options.force_output
                    && !options.merge_divs
                    && !options.merge_spans
                    && !options.output_xhtml
            })
            .times(1)
            .returning(|_, _| Ok("tidied".to_string()));

        let printer = PrettyPrinter::default().with_html_tidy(tidy);
        assert_eq!(
            printer.pretty_print(Category::Html, "<p>x</p>", &silent_sink()),
            "tidied"
        );
    }

    #[test]
    fn test_html_tidy_failure_returns_original() {
        let mut tidy = MockHtmlTidy::new();
        tidy.expect_tidy()
            .times(1)
            .returning(|_, _| Err(FormatError::Html("boom".to_string())));

        let mut sink = MockWarnSink::new();
        sink.expect_warn()
            .withf(|message, cause| {
                message.contains("html") && cause.to_string() == "HTML tidy error: boom"
            })
            .times(1)
            .return_const(());

        let printer = PrettyPrinter::default().with_html_tidy(tidy);
        assert_eq!(printer.pretty_print(Category::Html, "<p>", &sink), "<p>");
    }

    #[test]
    fn test_json_formatter_can_be_replaced() {
        let mut json = MockJsonFormatter::new();
        json.expect_format()
            .returning(|content| Ok(content.to_uppercase()));

        let printer = PrettyPrinter::default().with_json_formatter(json);
        assert_eq!(
            printer.pretty_print(Category::Json, "{}", &NoopSink),
            "{}".to_uppercase()
        );
    }

    #[test]
    fn test_oversized_body_is_left_alone() {
        let config = FormatConfig::builder()
            .body_dir(std::env::temp_dir())
            .max_body_size(4)
            .build();
        let printer = PrettyPrinter::new(&config);
        assert_eq!(
            printer.pretty_print(Category::Json, "{\"a\":1}", &silent_sink()),
            "{\"a\":1}"
        );
    }

    #[test]
    fn test_body_size_limit_boundary() {
        let body = "{\"a\":1}";
        let at_limit = PrettyPrinter::with_limits(TidyOptions::default(), body.len());
        assert_eq!(
            at_limit.pretty_print(Category::Json, body, &silent_sink()),
            "{\n  \"a\": 1\n}"
        );

        let below_body = PrettyPrinter::with_limits(TidyOptions::default(), body.len() - 1);
        assert_eq!(
            below_body.pretty_print(Category::Json, body, &silent_sink()),
            body
        );
    }

    #[test]
    fn test_default_printer_uses_default_limits() {
        let printer = PrettyPrinter::default();
        assert_eq!(printer.max_body_size(), DEFAULT_MAX_BODY_SIZE);
        assert_eq!(printer.tidy_options(), &TidyOptions::default());
    }

    #[test]
    fn test_deep_html_returns_original_and_warns() {
        let body = "<div>".repeat(20_000);
        let mut sink = MockWarnSink::new();
        sink.expect_warn()
            .withf(|message, cause| {
                message.contains("html") && matches!(cause, FormatError::Html(_))
            })
            .times(1)
            .return_const(());

        assert_eq!(pretty_print(Category::Html, &body, &sink), body);
    }

    #[test]
    fn test_xml_with_byte_order_mark_keeps_declaration_intact() {
        let output = pretty_print(
            Category::Xml,
            "\u{feff}<?xml version=\"1.0\" encoding=\"UTF-8\"?><a><b/></a>",
            &silent_sink(),
        );
        assert_eq!(
            output,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<a>\n  <b/>\n</a>"
        );
    }

    #[test]
    fn test_output_is_stable_for_xml_and_json() {
        let json = pretty_print(Category::Json, "{\"a\":{\"b\":[1,2]}}", &NoopSink);
        assert_eq!(pretty_print(Category::Json, &json, &NoopSink), json);

        let xml = pretty_print(
            Category::Xml,
            "<?xml version=\"1.0\"?><r><c k=\"v\">t</c></r>",
            &NoopSink,
        );
        assert_eq!(pretty_print(Category::Xml, &xml, &NoopSink), xml);
    }
}
