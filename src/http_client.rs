//! Shared HTTP plumbing for the remote collaborators.

use std::time::Duration;

use reqwest::{Client, Response};

use crate::services::UpstreamError;

/// User agent sent with every outbound request.
pub const USER_AGENT: &str = concat!("textlens/", env!("CARGO_PKG_VERSION"));

/// Build a client with the given request timeout.
pub fn build_client(timeout: Duration) -> Result<Client, UpstreamError> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?)
}

/// Turn a non-2xx response into [`UpstreamError::Status`].
pub fn ensure_success(response: Response) -> Result<Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(UpstreamError::Status {
        url: response.url().to_string(),
        status: status.as_u16(),
    })
}

/// Join a base endpoint and a path without doubling or dropping slashes.
pub fn join_url(endpoint: &str, path: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// File name from a `Content-Disposition` value.
///
/// An RFC 5987 `filename*=charset''value` parameter is preferred over a plain
/// `filename=` one. Blank names count as missing.
pub fn parse_content_disposition_filename(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in header.split(';').map(str::trim) {
        let Some((name, value)) = param.split_once('=') else {
            continue;
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                extended = value
                    .split_once("''")
                    .and_then(|(_, encoded)| urlencoding::decode(encoded.trim()).ok())
                    .map(|decoded| decoded.into_owned());
            }
            "filename" => plain = Some(value.trim().trim_matches('"').to_string()),
            _ => {}
        }
    }

    extended
        .into_iter()
        .chain(plain)
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_disposition_quoted() {
        let header = r#"attachment; filename="notes.txt""#;
        assert_eq!(
            parse_content_disposition_filename(header),
            Some("notes.txt".to_string())
        );
    }

    #[test]
    fn test_parse_content_disposition_unquoted() {
        let header = "attachment; filename=notes.txt; size=10";
        assert_eq!(
            parse_content_disposition_filename(header),
            Some("notes.txt".to_string())
        );
    }

    #[test]
    fn test_parse_content_disposition_encoded() {
        let header = "attachment; filename*=UTF-8''%D0%BE%D1%82%D1%87%D0%B5%D1%82.txt";
        assert_eq!(
            parse_content_disposition_filename(header),
            Some("отчет.txt".to_string())
        );
    }

    #[test]
    fn test_parse_content_disposition_missing() {
        assert_eq!(parse_content_disposition_filename("inline"), None);
        assert_eq!(parse_content_disposition_filename("attachment; filename=\"\""), None);
    }

    #[test]
    fn test_parse_content_disposition_prefers_extended() {
        let header = "attachment; filename=\"fallback.txt\"; FILENAME*=utf-8''real%20name.txt";
        assert_eq!(
            parse_content_disposition_filename(header),
            Some("real name.txt".to_string())
        );
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://host:1/", "/api/x"), "http://host:1/api/x");
        assert_eq!(join_url("http://host:1", "api/x"), "http://host:1/api/x");
    }
}
