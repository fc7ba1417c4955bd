//! Bearer credential extraction from a WebSocket upgrade request
//!
//! Precedence: `Authorization: Bearer` header, then `token` / `access_token` query parameter,
//! then a `bearer.<token>` entry in `Sec-WebSocket-Protocol`.

use actix_web::http::header::{AUTHORIZATION, HeaderMap, SEC_WEBSOCKET_PROTOCOL};

const PROTOCOL_PREFIX: &str = "bearer.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Header,
    Query,
    Subprotocol,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCredential {
    pub token: String,
    pub source: CredentialSource,
}

/// Pull the bearer token out of the upgrade request, if one is present anywhere
pub fn extract_credential(headers: &HeaderMap, query: &str) -> Option<ExtractedCredential> {
    from_header(headers)
        .map(|token| ExtractedCredential {
            token,
            source: CredentialSource::Header,
        })
        .or_else(|| {
            from_query(query).map(|token| ExtractedCredential {
                token,
                source: CredentialSource::Query,
            })
        })
        .or_else(|| {
            from_subprotocol(headers).map(|token| ExtractedCredential {
                token,
                source: CredentialSource::Subprotocol,
            })
        })
}

fn from_header(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

fn from_query(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, value)| (key == "token" || key == "access_token") && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

fn offered_protocols(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SEC_WEBSOCKET_PROTOCOL)
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

fn from_subprotocol(headers: &HeaderMap) -> Option<String> {
    offered_protocols(headers).into_iter().find_map(|p| {
        p.strip_prefix(PROTOCOL_PREFIX)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    })
}

/// Protocol to echo back in the handshake response: the first application protocol the client
/// offered, or the bearer entry itself when that is all it offered
pub fn select_protocol(headers: &HeaderMap) -> Option<String> {
    let offered = offered_protocols(headers);
    offered
        .iter()
        .find(|p| !p.starts_with(PROTOCOL_PREFIX))
        .or_else(|| offered.first())
        .cloned()
}
