use url::Url;

use crate::category::Category;
use crate::media_type::split_media_type;

/// Picks a file extension (without the leading dot) for a captured body.
///
/// The category decides first; for binary and unrecognised types the
/// media type's subtype or the request path's extension is used instead.
/// An empty string means no extension could be inferred.
pub fn infer_extension(category: Category, media_type: &str, request_uri: &str) -> String {
    match category {
        Category::Html => "html".to_string(),
        Category::Json => "json".to_string(),
        Category::Text => "txt".to_string(),
        Category::Xml => "xml".to_string(),
        Category::Application => match split_media_type(media_type).1 {
            "octet-stream" | "" => extension_from_uri(request_uri),
            subtype => subtype.to_string(),
        },
        Category::Javascript | Category::Other => match media_type {
            "text/csv" => "csv".to_string(),
            "text/css" => "css".to_string(),
            "text/ecmascript"
            | "text/javascript"
            | "application/javascript"
            | "application/x-javascript" => "js".to_string(),
            _ => extension_from_uri(request_uri),
        },
    }
}

/// Extension of the last path segment of `request_uri`, ignoring query and
/// fragment. Accepts absolute URIs and bare request targets.
pub fn extension_from_uri(request_uri: &str) -> String {
    let path = match Url::parse(request_uri) {
        Ok(url) => url.path().to_string(),
        Err(_) => request_uri
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let file_name = path.rsplit('/').next().unwrap_or_default();
    file_name
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_string())
        .unwrap_or_default()
}
