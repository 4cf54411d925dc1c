//! HTTP response building module
//!
//! Provides builders for the responses the document server emits,
//! decoupled from dispatch logic.

use super::cache::CachePolicy;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

pub type HttpResponse = Response<Full<Bytes>>;

/// JSON body of every 404
pub const NOT_FOUND_MESSAGE: &str = "Document not found";
/// JSON body of every 500
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Build 200 response for a document with `ETag` and cache control
pub fn build_document_response(
    data: Bytes,
    content_type: &str,
    etag: &str,
    cache: CachePolicy,
    is_head: bool,
) -> HttpResponse {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("ETag", etag)
        .header("Cache-Control", cache.to_header_value())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, cache: CachePolicy) -> HttpResponse {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header("ETag", etag)
        .header("Cache-Control", cache.to_header_value())
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build JSON error response: `{"error": "<message>"}`
pub fn build_json_error(status: StatusCode, message: &str, is_head: bool) -> HttpResponse {
    let json = serde_json::json!({ "error": message }).to_string();
    let content_length = json.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(json)
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Content-Length", content_length)
        .header("Cache-Control", CachePolicy::NoStore.to_header_value())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            let mut fallback = Response::new(Full::new(Bytes::new()));
            *fallback.status_mut() = status;
            fallback
        })
}

/// Build 404 Not Found response
pub fn build_404_response(is_head: bool) -> HttpResponse {
    build_json_error(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE, is_head)
}

/// Build 500 Internal Server Error response
pub fn build_500_response(is_head: bool) -> HttpResponse {
    build_json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        INTERNAL_ERROR_MESSAGE,
        is_head,
    )
}

/// Build 302 redirect response
pub fn build_redirect_response(target: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::FOUND)
        .header("Location", target)
        .header("Content-Length", 0)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("302", &e);
            build_500_response(false)
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> HttpResponse {
    let mut response =
        build_json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", false);
    response
        .headers_mut()
        .insert("Allow", hyper::header::HeaderValue::from_static(ALLOW));
    response
}

const ALLOW: &str = "GET, HEAD, OPTIONS";

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> HttpResponse {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", ALLOW);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Methods", ALLOW)
            .header("Access-Control-Allow-Headers", "Accept, If-None-Match")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_bytes(response: HttpResponse) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_json_error_body() {
        let response = build_404_response(false);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["Content-Type"], "application/json");
        assert_eq!(response.headers()["Cache-Control"], "no-store");
        assert_eq!(
            &body_bytes(response).await[..],
            br#"{"error":"Document not found"}"#
        );
    }

    #[tokio::test]
    async fn test_head_keeps_content_length() {
        let response = build_document_response(
            Bytes::from_static(b"<p>term</p>"),
            "text/html; charset=utf-8",
            "\"e\"",
            CachePolicy::Public(60),
            true,
        );
        assert_eq!(response.headers()["Content-Length"], "11");
        assert_eq!(response.headers()["Cache-Control"], "public, max-age=60");
        assert!(body_bytes(response).await.is_empty());
    }

    #[test]
    fn test_redirect_has_no_cache_header() {
        let response = build_redirect_response("/contexts/org.jsonld");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()["Location"], "/contexts/org.jsonld");
        assert!(response.headers().get("Cache-Control").is_none());
    }

    #[test]
    fn test_options_and_405() {
        let response = build_options_response(true);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["Access-Control-Allow-Methods"], ALLOW);

        let response = build_405_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["Allow"], ALLOW);
    }
}
