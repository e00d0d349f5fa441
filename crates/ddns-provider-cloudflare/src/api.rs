//! Cloudflare API v4 response envelope
//!
//! Every v4 endpoint wraps its payload as
//! `{ "success": bool, "errors": [...], "messages": [...], "result": ..., "result_info": {...} }`.

use serde::Deserialize;

/// Response envelope around a typed `result`
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub success: bool,

    pub result: Option<T>,

    #[serde(default)]
    pub errors: Vec<ApiMessage>,

    #[serde(default)]
    pub result_info: Option<ResultInfo>,
}

/// Envelope read from a failed response, where `result` is usually null
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
}

/// One entry of `errors`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiMessage {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}

/// Pagination block of list endpoints
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub(crate) struct ResultInfo {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total_count: u32,
}

impl ResultInfo {
    /// Whether the listing was cut off by the page size
    pub fn is_truncated(&self) -> bool {
        self.total_count > self.count
    }
}

/// First upstream error, formatted for an error message
pub(crate) fn first_error(errors: &[ApiMessage]) -> Option<String> {
    errors
        .first()
        .map(|e| format!("{} (code {})", e.message, e.code))
}
