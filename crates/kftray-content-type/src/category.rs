use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Xml,
    Html,
    Json,
    Javascript,
    Text,
    Application,
    Other,
}

impl Category {
    /// Classifies an already normalized (lowercase `type/subtype`) media type.
    ///
    /// Rules from [`CLASSIFICATION_RULES`] are tried in order and the first
    /// match wins; anything left over is [`Category::Other`].
    pub fn from_media_type(media_type: &str) -> Self {
        CLASSIFICATION_RULES
            .iter()
            .find(|(predicate, _)| predicate(media_type))
            .map(|(_, category)| *category)
            .unwrap_or(Category::Other)
    }

    pub fn is_textual(&self) -> bool {
        !matches!(self, Category::Application)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Xml => "xml",
            Category::Html => "html",
            Category::Json => "json",
            Category::Javascript => "javascript",
            Category::Text => "text",
            Category::Application => "application",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type ClassificationRule = (fn(&str) -> bool, Category);

/// Evaluated top to bottom. Html must stay ahead of Xml so that
/// `application/xhtml+xml` never reaches the `+xml` suffix rule.
pub const CLASSIFICATION_RULES: &[ClassificationRule] = &[
    (is_html, Category::Html),
    (is_xml, Category::Xml),
    (is_json, Category::Json),
    (is_javascript, Category::Javascript),
    (is_text, Category::Text),
    (is_application, Category::Application),
];

fn is_html(media_type: &str) -> bool {
    matches!(media_type, "text/html" | "application/xhtml+xml")
}

fn is_xml(media_type: &str) -> bool {
    matches!(media_type, "text/xml" | "application/xml") || media_type.ends_with("+xml")
}

fn is_json(media_type: &str) -> bool {
    matches!(media_type, "text/json" | "application/json")
}

fn is_javascript(media_type: &str) -> bool {
    matches!(
        media_type,
        "text/javascript" | "application/javascript" | "application/x-javascript"
    )
}

fn is_text(media_type: &str) -> bool {
    media_type == "text/plain"
}

fn is_application(media_type: &str) -> bool {
    ["image/", "video/", "audio/"]
        .iter()
        .any(|prefix| media_type.starts_with(prefix))
        || matches!(media_type, "application/zip" | "application/octet-stream")
}
