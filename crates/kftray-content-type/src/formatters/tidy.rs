use std::mem;

use ego_tree::iter::Edge;
use ego_tree::NodeRef;
use scraper::node::{
    Doctype,
    Node,
};
use scraper::Html;
use tracing::debug;

use super::HtmlTidy;
use crate::error::{
    FormatError,
    FormatResult,
};

pub const DEFAULT_INDENT_SPACES: usize = 2;

pub const DEFAULT_WRAP_COLUMN: usize = 120;

/// Deepest DOM the serializer will lay out. html5ever builds arbitrarily deep
/// trees, but the layout recursion runs on the caller's stack.
pub const MAX_NESTING_DEPTH: usize = 256;

const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "audio",
    "base",
    "blockquote",
    "body",
    "canvas",
    "caption",
    "center",
    "col",
    "colgroup",
    "dd",
    "details",
    "dialog",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "frame",
    "frameset",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "head",
    "header",
    "hgroup",
    "hr",
    "html",
    "iframe",
    "legend",
    "li",
    "link",
    "main",
    "menu",
    "meta",
    "nav",
    "noscript",
    "object",
    "ol",
    "optgroup",
    "option",
    "p",
    "param",
    "pre",
    "script",
    "section",
    "select",
    "source",
    "style",
    "summary",
    "table",
    "tbody",
    "td",
    "template",
    "tfoot",
    "th",
    "thead",
    "title",
    "tr",
    "track",
    "ul",
    "video",
];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

const PRESERVED_ELEMENTS: &[&str] = &["pre", "textarea"];

/// Layout switches for [`ScraperTidy`]. The defaults are what captured
/// bodies are rendered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TidyOptions {
    /// Keep parse diagnostics out of the log.
    pub quiet: bool,
    /// Close void elements XHTML style (`<br />`).
    pub output_xhtml: bool,
    pub indent_spaces: usize,
    /// Put each attribute of a multi-attribute block start tag on its own line.
    pub indent_attributes: bool,
    /// Blank line between consecutive block elements.
    pub vertical_space: bool,
    /// Wrap column for inline content; 0 disables wrapping.
    pub wrap: usize,
    pub merge_divs: bool,
    pub merge_spans: bool,
    /// Emit output even when the markup had parse errors.
    pub force_output: bool,
}

impl Default for TidyOptions {
    fn default() -> Self {
        Self {
            quiet: true,
            output_xhtml: false,
            indent_spaces: DEFAULT_INDENT_SPACES,
            indent_attributes: false,
            vertical_space: true,
            wrap: DEFAULT_WRAP_COLUMN,
            merge_divs: false,
            merge_spans: false,
            force_output: true,
        }
    }
}

/// Parses with html5ever (through scraper), which repairs broken markup the
/// way browsers do, then lays the tree out again with [`TidyOptions`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ScraperTidy;

impl HtmlTidy for ScraperTidy {
    fn tidy(&self, content: &str, options: &TidyOptions) -> FormatResult<String> {
        let document = Html::parse_document(content);

        if !document.errors.is_empty() {
            if !options.quiet {
                for error in &document.errors {
                    debug!("HTML parse error: {}", error);
                }
            }

            if !options.force_output {
                return Err(FormatError::Html(format!(
                    "{} parse error(s), first: {}",
                    document.errors.len(),
                    document.errors[0]
                )));
            }
        }

        let depth = nesting_depth(document.tree.root());
        if depth > MAX_NESTING_DEPTH {
            return Err(FormatError::Html(format!(
                "nesting depth {depth} exceeds limit of {MAX_NESTING_DEPTH}"
            )));
        }

        let mut serializer = TidySerializer::new(options);
        serializer.children(document.tree.root(), 0);
        Ok(serializer.finish())
    }
}

type Attributes = Vec<(String, String)>;

#[derive(Debug)]
struct Piece {
    text: String,
    space_before: bool,
}

/// Inline content split into pieces that may only be broken where the
/// source had whitespace.
#[derive(Debug, Default)]
struct InlineRun {
    pieces: Vec<Piece>,
    pending_space: bool,
}

impl InlineRun {
    fn push(&mut self, text: String) {
        let space_before = self.pending_space && !self.pieces.is_empty();
        self.pieces.push(Piece { text, space_before });
        self.pending_space = false;
    }

    fn push_glued(&mut self, text: String) {
        self.pieces.push(Piece {
            text,
            space_before: false,
        });
    }

    fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    fn joined(&self) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            if piece.space_before {
                out.push(' ');
            }
            out.push_str(&piece.text);
        }
        out
    }
}

struct TidySerializer<'o> {
    options: &'o TidyOptions,
    lines: Vec<String>,
}

impl<'o> TidySerializer<'o> {
    fn new(options: &'o TidyOptions) -> Self {
        Self {
            options,
            lines: Vec::new(),
        }
    }

    fn finish(mut self) -> String {
        while self.lines.last().is_some_and(|line| line.trim().is_empty()) {
            self.lines.pop();
        }
        self.lines.join("\n")
    }

    fn indent(&self, depth: usize) -> String {
        " ".repeat(depth * self.options.indent_spaces)
    }

    fn push_line(&mut self, depth: usize, text: &str) {
        let line = format!("{}{}", self.indent(depth), text);
        self.lines.push(line);
    }

    fn fits(&self, depth: usize, text: &str) -> bool {
        self.options.wrap == 0
            || depth * self.options.indent_spaces + text.chars().count() <= self.options.wrap
    }

    fn children(&mut self, parent: NodeRef<'_, Node>, depth: usize) {
        let mut run = InlineRun::default();
        let mut previous_spaced = false;

        for child in parent.children() {
            if !is_block_node(child) {
                self.inline_node(child, &mut run);
                continue;
            }

            if !run.is_empty() {
                self.flush_run(&mut run, depth);
                previous_spaced = false;
            }
            run.pending_space = false;

            let spaced = is_spaced_block(child);
            if self.options.vertical_space && previous_spaced && spaced {
                self.lines.push(String::new());
            }
            self.block_node(child, depth);
            previous_spaced = spaced;
        }

        self.flush_run(&mut run, depth);
    }

    fn flush_run(&mut self, run: &mut InlineRun, depth: usize) {
        let run = mem::take(run);
        for line in self.wrap(&run.pieces, depth) {
            self.push_line(depth, &line);
        }
    }

    fn wrap(&self, pieces: &[Piece], depth: usize) -> Vec<String> {
        let indent_width = depth * self.options.indent_spaces;
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut width = 0;

        for piece in pieces {
            let piece_width = piece.text.chars().count();
            if piece.space_before && !current.is_empty() {
                if self.options.wrap > 0
                    && indent_width + width + 1 + piece_width > self.options.wrap
                {
                    lines.push(mem::take(&mut current));
                    width = 0;
                } else {
                    current.push(' ');
                    width += 1;
                }
            }
            current.push_str(&piece.text);
            width += piece_width;
        }

        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    fn block_node(&mut self, node: NodeRef<'_, Node>, depth: usize) {
        match node.value() {
            Node::Doctype(doctype) => self.push_line(depth, &doctype_tag(doctype)),
            Node::Comment(comment) => {
                let text = format!("<!--{}-->", &**comment);
                self.push_line(depth, &text);
            }
            Node::Element(_) => self.element(node, depth),
            Node::Document | Node::Fragment => self.children(node, depth),
            _ => {}
        }
    }

    fn element(&mut self, node: NodeRef<'_, Node>, depth: usize) {
        let (node, attrs) = self.merge_chain(node);
        let Some(element) = node.value().as_element() else {
            return;
        };
        let name = element.name();
        let start = self.block_start_tag(name, &attrs);

        if is_void(name) {
            for line in &start {
                self.push_line(depth, line);
            }
            return;
        }

        let end = format!("</{name}>");

        if PRESERVED_ELEMENTS.contains(&name) {
            let mut whole = self.inline_start_tag(name, &attrs);
            self.verbatim_children(node, &mut whole);
            whole.push_str(&end);
            let mut lines = whole.split('\n');
            if let Some(first) = lines.next() {
                self.push_line(depth, first);
            }
            self.lines.extend(lines.map(str::to_string));
            return;
        }

        if RAW_TEXT_ELEMENTS.contains(&name) {
            let text = raw_text(node);
            if text.trim().is_empty() && start.len() == 1 {
                let line = format!("{}{end}", start[0]);
                self.push_line(depth, &line);
                return;
            }

            for line in &start {
                self.push_line(depth, line);
            }
            for line in text.trim_matches(|c: char| c == '\n' || c == '\r').lines() {
                self.lines.push(line.trim_end().to_string());
            }
            self.push_line(depth, &end);
            return;
        }

        if node.children().any(is_block_node) {
            for line in &start {
                self.push_line(depth, line);
            }
            self.children(node, depth + 1);
            self.push_line(depth, &end);
            return;
        }

        let mut run = InlineRun::default();
        for child in node.children() {
            self.inline_node(child, &mut run);
        }

        if start.len() == 1 {
            let line = format!("{}{}{end}", start[0], run.joined());
            if run.is_empty() || self.fits(depth, &line) {
                self.push_line(depth, &line);
                return;
            }
        }

        for line in &start {
            self.push_line(depth, line);
        }
        self.flush_run(&mut run, depth + 1);
        self.push_line(depth, &end);
    }

    fn inline_node(&self, node: NodeRef<'_, Node>, run: &mut InlineRun) {
        match node.value() {
            Node::Text(text) => {
                let text: &str = text;
                if text.starts_with(|c: char| c.is_ascii_whitespace()) {
                    run.pending_space = true;
                }
                for (i, word) in text
                    .split(|c: char| c.is_ascii_whitespace())
                    .filter(|word| !word.is_empty())
                    .enumerate()
                {
                    if i > 0 {
                        run.pending_space = true;
                    }
                    run.push(escape_text(word));
                }
                if text.ends_with(|c: char| c.is_ascii_whitespace()) {
                    run.pending_space = true;
                }
            }
            Node::Comment(comment) => run.push(format!("<!--{}-->", &**comment)),
            Node::Element(_) => {
                let (node, attrs) = self.merge_chain(node);
                let Some(element) = node.value().as_element() else {
                    return;
                };
                let name = element.name();

                if PRESERVED_ELEMENTS.contains(&name) || RAW_TEXT_ELEMENTS.contains(&name) {
                    let mut whole = self.inline_start_tag(name, &attrs);
                    self.verbatim_children(node, &mut whole);
                    whole.push_str(&format!("</{name}>"));
                    run.push(whole);
                    return;
                }

                run.push(self.inline_start_tag(name, &attrs));
                if is_void(name) {
                    return;
                }
                for child in node.children() {
                    self.inline_node(child, run);
                }
                run.push_glued(format!("</{name}>"));
            }
            _ => {}
        }
    }

    fn verbatim_children(&self, node: NodeRef<'_, Node>, out: &mut String) {
        let raw = node
            .value()
            .as_element()
            .is_some_and(|element| RAW_TEXT_ELEMENTS.contains(&element.name()));

        for child in node.children() {
            match child.value() {
                Node::Text(text) if raw => out.push_str(text),
                Node::Text(text) => out.push_str(&escape_text(text)),
                Node::Comment(comment) => {
                    out.push_str("<!--");
                    out.push_str(comment);
                    out.push_str("-->");
                }
                Node::Element(element) => {
                    let name = element.name();
                    out.push_str(&self.inline_start_tag(name, &element_attrs(child)));
                    if !is_void(name) {
                        self.verbatim_children(child, out);
                        out.push_str(&format!("</{name}>"));
                    }
                }
                _ => {}
            }
        }
    }

    fn merge_chain<'a>(&self, node: NodeRef<'a, Node>) -> (NodeRef<'a, Node>, Attributes) {
        let mut current = node;
        let mut attrs = element_attrs(current);

        while let Some(child) = self.mergeable_child(current) {
            merge_attrs(&mut attrs, element_attrs(child));
            current = child;
        }

        (current, attrs)
    }

    fn mergeable_child<'a>(&self, node: NodeRef<'a, Node>) -> Option<NodeRef<'a, Node>> {
        let name = node.value().as_element()?.name();
        let enabled = match name {
            "div" => self.options.merge_divs,
            "span" => self.options.merge_spans,
            _ => false,
        };
        if !enabled {
            return None;
        }

        let mut significant = node.children().filter(|child| !is_whitespace_text(*child));
        let only = significant.next()?;
        if significant.next().is_some() {
            return None;
        }

        (only.value().as_element()?.name() == name).then_some(only)
    }

    fn block_start_tag(&self, name: &str, attrs: &Attributes) -> Vec<String> {
        if !self.options.indent_attributes || attrs.len() < 2 {
            return vec![self.inline_start_tag(name, attrs)];
        }

        let pad = " ".repeat(self.options.indent_spaces);
        let close = self.tag_close(name);
        let mut lines = vec![format!("<{name}")];
        for (i, (key, value)) in attrs.iter().enumerate() {
            let mut line = format!("{pad}{}", self.attribute(key, value));
            if i + 1 == attrs.len() {
                line.push_str(close);
            }
            lines.push(line);
        }
        lines
    }

    fn inline_start_tag(&self, name: &str, attrs: &Attributes) -> String {
        let mut tag = format!("<{name}");
        for (key, value) in attrs {
            tag.push(' ');
            tag.push_str(&self.attribute(key, value));
        }
        tag.push_str(self.tag_close(name));
        tag
    }

    fn tag_close(&self, name: &str) -> &'static str {
        if self.options.output_xhtml && is_void(name) {
            " />"
        } else {
            ">"
        }
    }

    fn attribute(&self, key: &str, value: &str) -> String {
        if value.is_empty() && !self.options.output_xhtml {
            key.to_string()
        } else {
            format!("{key}=\"{}\"", escape_attribute(value))
        }
    }
}

fn nesting_depth(root: NodeRef<'_, Node>) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0usize;
    for edge in root.traverse() {
        match edge {
            Edge::Open(_) => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            Edge::Close(_) => depth = depth.saturating_sub(1),
        }
    }
    deepest
}

fn element_attrs(node: NodeRef<'_, Node>) -> Attributes {
    node.value()
        .as_element()
        .map(|element| {
            element
                .attrs()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn merge_attrs(outer: &mut Attributes, inner: Attributes) {
    for (key, value) in inner {
        match outer.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, existing)) if key == "class" => {
                existing.push(' ');
                existing.push_str(&value);
            }
            Some((_, existing)) => *existing = value,
            None => outer.push((key, value)),
        }
    }
}

fn raw_text(node: NodeRef<'_, Node>) -> String {
    node.children()
        .filter_map(|child| child.value().as_text().map(|text| String::from(&**text)))
        .collect()
}

fn is_block_node(node: NodeRef<'_, Node>) -> bool {
    match node.value() {
        Node::Element(element) => BLOCK_ELEMENTS.contains(&element.name()),
        Node::Doctype(_) | Node::Document | Node::Fragment => true,
        Node::Comment(_) => node
            .parent()
            .is_some_and(|parent| matches!(parent.value(), Node::Document)),
        _ => false,
    }
}

fn is_spaced_block(node: NodeRef<'_, Node>) -> bool {
    node.value()
        .as_element()
        .is_some_and(|element| !is_void(element.name()))
}

fn is_whitespace_text(node: NodeRef<'_, Node>) -> bool {
    node.value()
        .as_text()
        .is_some_and(|text| text.chars().all(|c| c.is_ascii_whitespace()))
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

fn doctype_tag(doctype: &Doctype) -> String {
    let mut tag = format!("<!DOCTYPE {}", doctype.name());
    let public_id = doctype.public_id();
    let system_id = doctype.system_id();

    if !public_id.is_empty() {
        tag.push_str(&format!(" PUBLIC \"{public_id}\""));
        if !system_id.is_empty() {
            tag.push_str(&format!(" \"{system_id}\""));
        }
    } else if !system_id.is_empty() {
        tag.push_str(&format!(" SYSTEM \"{system_id}\""));
    }

    tag.push('>');
    tag
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
