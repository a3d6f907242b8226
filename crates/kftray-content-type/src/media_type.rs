use std::fmt;

use tracing::debug;

use crate::category::Category;
use crate::error::MediaTypeError;

pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// A content-type header reduced to its lowercase `type/subtype` and the
/// category derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedContentType {
    media_type: String,
    category: Category,
}

impl NormalizedContentType {
    /// Parses a raw header value, substituting `application/octet-stream`
    /// for anything that is not a valid media type.
    pub fn parse(raw_header: &str) -> Self {
        match Self::try_parse(raw_header) {
            Ok(content_type) => content_type,
            Err(e) => {
                debug!("Falling back to {} for '{}': {}", FALLBACK_MEDIA_TYPE, raw_header, e);
                Self::fallback()
            }
        }
    }

    /// Only the first comma-separated declaration is considered; parameters
    /// after `;` are dropped without validation.
    pub fn try_parse(raw_header: &str) -> Result<Self, MediaTypeError> {
        let first_declaration = raw_header.split(',').next().unwrap_or_default();
        let media_type = parse_media_type(first_declaration)?;

        Ok(Self::from_normalized(media_type))
    }

    pub fn fallback() -> Self {
        Self::from_normalized(FALLBACK_MEDIA_TYPE.to_string())
    }

    fn from_normalized(media_type: String) -> Self {
        let category = Category::from_media_type(&media_type);
        Self {
            media_type,
            category,
        }
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn top_level_type(&self) -> &str {
        split_media_type(&self.media_type).0
    }

    pub fn subtype(&self) -> &str {
        split_media_type(&self.media_type).1
    }

    pub fn is_fallback(&self) -> bool {
        self.media_type == FALLBACK_MEDIA_TYPE
    }
}

impl Default for NormalizedContentType {
    fn default() -> Self {
        Self::fallback()
    }
}

impl From<&str> for NormalizedContentType {
    fn from(raw_header: &str) -> Self {
        Self::parse(raw_header)
    }
}

impl fmt::Display for NormalizedContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.media_type)
    }
}

/// Parses and classifies a raw content-type header. Never fails.
pub fn classify(raw_header: &str) -> NormalizedContentType {
    NormalizedContentType::parse(raw_header)
}

/// Returns `(type, subtype)`; the subtype is empty when there is no `/`.
pub fn split_media_type(media_type: &str) -> (&str, &str) {
    media_type.split_once('/').unwrap_or((media_type, ""))
}

fn parse_media_type(declaration: &str) -> Result<String, MediaTypeError> {
    let essence = declaration.split(';').next().unwrap_or_default().trim();
    if essence.is_empty() {
        return Err(MediaTypeError::Empty);
    }

    let (top_level, subtype) = essence
        .split_once('/')
        .ok_or_else(|| MediaTypeError::MissingSeparator(essence.to_string()))?;

    if !is_token(top_level) || !is_token(subtype) {
        return Err(MediaTypeError::InvalidToken(essence.to_string()));
    }

    Ok(essence.to_ascii_lowercase())
}

fn is_token(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(is_tchar)
}

fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}
