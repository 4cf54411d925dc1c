//! MIME type detection module
//!
//! Returns the Content-Type served for each document extension.

/// Get MIME Content-Type based on file extension
///
/// # Examples
/// ```
/// use namespace_server::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("jsonld")), "application/ld+json");
/// assert_eq!(get_content_type(Some("html")), "text/html; charset=utf-8");
/// assert_eq!(get_content_type(None), "application/octet-stream");
/// ```
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        Some("jsonld") => "application/ld+json",
        Some("json") => "application/json",
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_types() {
        assert_eq!(get_content_type(Some("jsonld")), "application/ld+json");
        assert_eq!(get_content_type(Some("html")), "text/html; charset=utf-8");
        assert_eq!(get_content_type(Some("json")), "application/json");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(get_content_type(Some("xyz")), "application/octet-stream");
        assert_eq!(get_content_type(None), "application/octet-stream");
    }
}
