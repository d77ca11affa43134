//! The `laf` custom protocol
//!
//! Content reaches the host synchronously through this protocol: a blocking
//! `XMLHttpRequest` waits while the host parks the responder and answers
//! later from the event loop.

use laf_shell::PanelView;
use std::borrow::Cow;
use std::fmt;
use wry::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use wry::http::{Response, StatusCode};
use wry::RequestAsyncResponder;

pub const SCHEME: &str = "laf";

/// Base URL content uses to reach the protocol
#[cfg(target_os = "windows")]
pub const BASE_URL: &str = "https://laf.localhost/";
#[cfg(not(target_os = "windows"))]
pub const BASE_URL: &str = "laf://localhost/";

/// A decoded protocol request
#[derive(Debug, Clone, PartialEq)]
pub enum LafRequest {
    /// `GET /prompt?message=&value=`
    Prompt { message: String, value: String },
    /// `GET /settings?active=&own=&q=`
    Settings(PanelView),
}

/// Decode the path and query of a protocol request
pub fn parse(path: &str, query: Option<&str>) -> Result<LafRequest, String> {
    let params: Vec<(String, String)> = url::form_urlencoded::parse(query.unwrap_or("").as_bytes())
        .into_owned()
        .collect();
    let param = |name: &str| {
        params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    };

    match path.trim_matches('/') {
        "prompt" => Ok(LafRequest::Prompt {
            message: param("message").unwrap_or_default().to_string(),
            value: param("value").unwrap_or_default().to_string(),
        }),
        "settings" => {
            let index = |name: &str| -> Result<usize, String> {
                param(name)
                    .unwrap_or("0")
                    .parse::<usize>()
                    .map_err(|e| format!("Invalid {}: {}", name, e))
            };
            Ok(LafRequest::Settings(PanelView {
                active_tab: index("active")?,
                own_tab: index("own")?,
                query: param("q").filter(|q| !q.is_empty()).map(str::to_string),
            }))
        }
        other => Err(format!("Unknown endpoint: {}", other)),
    }
}

fn response(status: StatusCode, content_type: &str, body: Vec<u8>) -> Response<Cow<'static, [u8]>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .body(Cow::Owned(body))
        .unwrap_or_else(|_| Response::new(Cow::Borrowed(&[][..])))
}

pub fn json_response(body: String) -> Response<Cow<'static, [u8]>> {
    response(StatusCode::OK, "application/json", body.into_bytes())
}

pub fn html_response(body: String) -> Response<Cow<'static, [u8]>> {
    response(StatusCode::OK, "text/html; charset=utf-8", body.into_bytes())
}

pub fn error_response(status: StatusCode, message: &str) -> Response<Cow<'static, [u8]>> {
    response(status, "text/plain; charset=utf-8", message.as_bytes().to_vec())
}

/// A parked protocol responder
pub struct PendingResponse(RequestAsyncResponder);

impl PendingResponse {
    pub fn new(responder: RequestAsyncResponder) -> Self {
        Self(responder)
    }

    pub fn json(self, body: String) {
        self.0.respond(json_response(body));
    }

    pub fn html(self, body: String) {
        self.0.respond(html_response(body));
    }

    pub fn error(self, status: StatusCode, message: &str) {
        self.0.respond(error_response(status, message));
    }
}

impl fmt::Debug for PendingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PendingResponse")
    }
}
