use quick_xml::events::Event;
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use super::{
    FormattedXml,
    XmlFormatter,
};
use crate::error::{
    FormatError,
    FormatResult,
};

pub const XML_INDENT_SIZE: usize = 2;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Streams the document through quick-xml, dropping whitespace-only text
/// and re-emitting every other event with two-space indentation.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuickXmlFormatter;

impl XmlFormatter for QuickXmlFormatter {
    fn format(&self, content: &str) -> FormatResult<FormattedXml> {
        // The reader skips a byte order mark, which would shift every
        // buffer position against `content`.
        let content = content.strip_prefix(BYTE_ORDER_MARK).unwrap_or(content);
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', XML_INDENT_SIZE);
        let mut declaration = None;
        let mut depth = 0usize;
        let mut has_root = false;

        loop {
            let start = reader.buffer_position() as usize;
            let event = reader
                .read_event()
                .map_err(|e| FormatError::Xml(format!("at position {start}: {e}")))?;

            match event {
                Event::Eof => break,
                Event::Decl(_) => {
                    let end = reader.buffer_position() as usize;
                    let raw = content
                        .get(start..end)
                        .map(str::trim)
                        .ok_or_else(|| FormatError::Xml("declaration out of range".to_string()))?;
                    declaration = Some(raw.to_string());
                    continue;
                }
                Event::Start(_) => {
                    if depth == 0 {
                        ensure_single_root(has_root)?;
                        has_root = true;
                    }
                    depth += 1;
                }
                Event::Empty(_) => {
                    if depth == 0 {
                        ensure_single_root(has_root)?;
                        has_root = true;
                    }
                }
                Event::End(_) => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| FormatError::Xml("unexpected closing tag".to_string()))?;
                }
                Event::Text(_) | Event::CData(_) if depth == 0 => {
                    return Err(FormatError::Xml(
                        "character data outside of the root element".to_string(),
                    ));
                }
                _ => {}
            }

            writer
                .write_event(event)
                .map_err(|e| FormatError::Xml(e.to_string()))?;
        }

        if depth != 0 {
            return Err(FormatError::Xml(format!("{depth} unclosed element(s)")));
        }
        if !has_root {
            return Err(FormatError::Xml("document has no root element".to_string()));
        }

        let body = String::from_utf8(writer.into_inner())
            .map_err(|e| FormatError::Xml(e.to_string()))?;

        Ok(FormattedXml { body, declaration })
    }
}

fn ensure_single_root(has_root: bool) -> FormatResult<()> {
    if has_root {
        return Err(FormatError::Xml(
            "document has more than one root element".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_without_declaration() {
        let formatted = QuickXmlFormatter.format("<a><b/></a>").unwrap();
        assert_eq!(formatted.body, "<a>\n  <b/>\n</a>");
        assert_eq!(formatted.declaration, None);
    }

    #[test]
    fn test_format_keeps_declaration_verbatim() {
        let formatted = QuickXmlFormatter
            .format("<?xml version=\"1.0\" encoding='UTF-8'?><root><item>value</item></root>")
            .unwrap();
        assert_eq!(
            formatted.declaration.as_deref(),
            Some("<?xml version=\"1.0\" encoding='UTF-8'?>")
        );
        assert_eq!(formatted.body, "<root>\n  <item>value</item>\n</root>");
    }

    #[test]
    fn test_format_is_stable() {
        let once = QuickXmlFormatter
            .format("<feed><entry id=\"1\"><title>x</title></entry><entry/></feed>")
            .unwrap();
        let twice = QuickXmlFormatter.format(&once.body).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_format_keeps_comments_and_cdata() {
        let formatted = QuickXmlFormatter
            .format("<a><!-- note --><b><![CDATA[1 < 2]]></b></a>")
            .unwrap();
        assert!(formatted.body.contains("<!-- note -->"));
        assert!(formatted.body.contains("<![CDATA[1 < 2]]>"));
    }

    #[test]
    fn test_format_rejects_malformed() {
        assert!(QuickXmlFormatter.format("<a><b></a>").is_err());
        assert!(QuickXmlFormatter.format("<a>").is_err());
        assert!(QuickXmlFormatter.format("</a>").is_err());
        assert!(QuickXmlFormatter.format("just text").is_err());
        assert!(QuickXmlFormatter.format("").is_err());
        assert!(QuickXmlFormatter.format("<a/><b/>").is_err());
    }

    #[test]
    fn test_format_declaration_after_byte_order_mark() {
        let formatted = QuickXmlFormatter
            .format("\u{feff}<?xml version=\"1.0\" encoding=\"UTF-8\"?><a><b/></a>")
            .unwrap();
        assert_eq!(
            formatted.declaration.as_deref(),
            Some("<?xml version=\"1.0\" encoding=\"UTF-8\"?>")
        );
        assert_eq!(formatted.body, "<a>\n  <b/>\n</a>");
    }

    #[test]
    fn test_format_byte_order_mark_without_declaration() {
        let formatted = QuickXmlFormatter.format("\u{feff}<a><b/></a>").unwrap();
        assert_eq!(formatted.declaration, None);
        assert_eq!(formatted.body, "<a>\n  <b/>\n</a>");
    }

    #[test]
    fn test_format_deeply_nested_document() {
        let depth = 1_000;
        let input = format!("{}{}", "<n>".repeat(depth), "</n>".repeat(depth));
        let formatted = QuickXmlFormatter.format(&input).unwrap();
        assert_eq!(formatted.body.matches("<n>").count(), depth);
        assert_eq!(formatted.body.lines().last(), Some("</n>"));
        assert!(formatted
            .body
            .contains(&format!("\n{}<n>", " ".repeat((depth - 1) * XML_INDENT_SIZE))));

        let unclosed = "<n>".repeat(depth);
        assert!(QuickXmlFormatter.format(&unclosed).is_err());
    }
}
