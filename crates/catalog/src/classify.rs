//! Mapping of terminal fetch outcomes onto the caller-facing error taxonomy

use crate::client::UpstreamResponse;
use crate::error::{truncate, CatalogError, CatalogResult};
use crate::upstream::UpstreamPage;
use serde_json::Value;

/// Classify a final upstream response
///
/// Status is checked first, then the content type, then the body. Only a
/// 2xx JSON object becomes an [`UpstreamPage`].
pub fn classify(response: &UpstreamResponse) -> CatalogResult<UpstreamPage> {
    match response.status {
        401 => return Err(CatalogError::Auth),
        429 => return Err(CatalogError::RateLimited),
        status @ 400..=499 => return Err(CatalogError::upstream_client(status, &response.body)),
        status if !response.is_success() => {
            return Err(CatalogError::upstream_server(status, &response.body));
        }
        _ => {}
    }

    if let Some(content_type) = response.content_type.as_deref() {
        if !is_json_content_type(content_type) {
            return Err(CatalogError::InvalidContentType {
                content_type: content_type.to_string(),
                body: truncate(&response.body),
            });
        }
    }

    let parse_error = || CatalogError::Parse {
        body: truncate(&response.body),
    };

    let value: Value = serde_json::from_str(&response.body).map_err(|_| parse_error())?;
    UpstreamPage::from_value(value).ok_or_else(parse_error)
}

/// Whether a `Content-Type` value denotes JSON
///
/// Accepts `application/json` and any `+json` structured suffix, ignoring
/// parameters and case.
#[must_use]
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json" || essence.ends_with("+json")
}
