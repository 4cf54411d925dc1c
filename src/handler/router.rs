//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, route
//! matching (`/`, `/contexts/*`, `/*`), response finalization and access logging.

use crate::config::AppState;
use crate::handler::dispatch::{self, Resolution, Scope};
use crate::handler::landing::LANDING_PAGE;
use crate::http::{self, cache, mime, CachePolicy, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use crate::store::Namespace;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue};
use hyper::http::request::Parts;
use hyper::{Method, Request, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

const CONTEXTS_PREFIX: &str = "/contexts/";

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
    pub cache: CachePolicy,
}

/// Main entry point for HTTP request handling
///
/// Request bodies are never read; the body is dropped before dispatch.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<HttpResponse, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();
    let http_config = &state.config.http;

    let mut response = match check_http_method(&parts.method, http_config.enable_cors) {
        Some(resp) => resp,
        None => {
            let ctx = RequestContext {
                path: parts.uri.path(),
                is_head: parts.method == Method::HEAD,
                if_none_match: header_str(&parts.headers, "if-none-match"),
                cache: CachePolicy::Public(http_config.cache_max_age),
            };
            route_request(&ctx, &state).await
        }
    };

    decorate(&mut response, &http_config.server_name, http_config.enable_cors);

    if state.access_log_enabled() {
        log_access(&parts, &response, peer_addr, started, &state);
    }

    Ok(response)
}

/// Return a response for anything other than GET/HEAD
fn check_http_method(method: &Method, enable_cors: bool) -> Option<HttpResponse> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Route request to the landing page or a document scope
async fn route_request(ctx: &RequestContext<'_>, state: &AppState) -> HttpResponse {
    if ctx.path == "/" {
        let page = Bytes::from_static(LANDING_PAGE.as_bytes());
        return serve_document(ctx, page, Namespace::Vocab);
    }

    let (scope, raw_path) = match ctx.path.strip_prefix(CONTEXTS_PREFIX) {
        Some(rest) => (Scope::Contexts, rest),
        None => (Scope::Root, ctx.path.strip_prefix('/').unwrap_or(ctx.path)),
    };

    let Some(path) = decode_path(raw_path) else {
        logger::log_debug(&format!("Undecodable request path: {}", ctx.path));
        return http::build_404_response(ctx.is_head);
    };

    let store = state.store().await;
    match dispatch::resolve(&store, scope, &path, raw_path).await {
        Resolution::Context(document) => serve_document(ctx, document, Namespace::Contexts),
        Resolution::Vocab(page) => serve_document(ctx, page, Namespace::Vocab),
        Resolution::Redirect(target) => http::build_redirect_response(&target),
        Resolution::NotFound => http::build_404_response(ctx.is_head),
        Resolution::Failed => http::build_500_response(ctx.is_head),
    }
}

/// 200 with `ETag`, or 304 when the client already holds this version
fn serve_document(ctx: &RequestContext<'_>, data: Bytes, namespace: Namespace) -> HttpResponse {
    let etag = cache::generate_etag(&data);
    if cache::check_etag_match(ctx.if_none_match, &etag) {
        return http::build_304_response(&etag, ctx.cache);
    }

    let content_type = mime::get_content_type(Some(namespace.extension()));
    http::build_document_response(data, content_type, &etag, ctx.cache, ctx.is_head)
}

/// Headers shared by every response
fn decorate(response: &mut HttpResponse, server_name: &str, enable_cors: bool) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(server_name) {
        headers.insert("Server", value);
    }
    if enable_cors {
        headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    }
}

/// Percent-decode a URI path; `None` for malformed escapes or non-UTF-8 results
pub fn decode_path(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            let hex = std::str::from_utf8(hex).ok()?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn log_access(
    req: &Parts,
    response: &HttpResponse,
    peer_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method.to_string(),
        req.uri.path().to_string(),
    );
    entry.query = req.uri.query().map(ToString::to_string);
    entry.http_version = version_label(req.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = header_str(response.headers(), "content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.location = header_str(response.headers(), "location").map(ToString::to_string);
    entry.referer = header_str(&req.headers, "referer").map(ToString::to_string);
    entry.user_agent = header_str(&req.headers, "user-agent").map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
