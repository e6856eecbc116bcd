use thiserror::Error;

/// Errors that can be returned by a [`crate::Provider`] call.
///
/// The `Display` text is what ends up in front of API callers, so every
/// variant renders as a single human-readable line.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// The request never produced a response (DNS, TLS, connection reset, ...).
    ///
    /// Rendered with its whole source chain; reqwest's own `Display` stops at
    /// the outermost layer and hides the OS-level cause.
    #[error("{}", error_chain(.0))]
    Http(#[from] reqwest::Error),

    /// The model name cannot be placed in a `generateContent` URL.
    #[error("invalid model name: {0:?}")]
    InvalidModel(String),

    /// The provider answered with a non-2xx status.
    ///
    /// `status` is the provider's symbolic status (`INVALID_ARGUMENT`, ...)
    /// when it sent its standard error envelope.
    #[error("{}", api_text(*code, status.as_deref(), message))]
    Api {
        code: u16,
        status: Option<String>,
        message: String,
    },

    /// The 2xx response body did not decode as a `generateContent` response.
    #[error("invalid provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

fn error_chain(e: &dyn std::error::Error) -> String {
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

fn api_text(code: u16, status: Option<&str>, message: &str) -> String {
    match status {
        Some(status) => format!("{code} {status}. {message}"),
        None => format!("{code}. {message}"),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn api_error_with_status_matches_provider_format() {
        let e = GeminiError::Api {
            code: 400,
            status: Some("INVALID_ARGUMENT".into()),
            message: "API key not valid.".into(),
        };
        assert_eq!(e.to_string(), "400 INVALID_ARGUMENT. API key not valid.");
    }

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, Error)]
    #[error("Connection refused (os error 111)")]
    struct Inner;

    #[test]
    fn error_chain_joins_sources() {
        assert_eq!(
            error_chain(&Outer(Inner)),
            "outer: Connection refused (os error 111)"
        );
    }

    #[test]
    fn invalid_model_quotes_the_name() {
        let e = GeminiError::InvalidModel("a#b".into());
        assert_eq!(e.to_string(), "invalid model name: \"a#b\"");
    }

    #[test]
    fn api_error_without_status_uses_raw_body() {
        let e = GeminiError::Api {
            code: 502,
            status: None,
            message: "upstream unavailable".into(),
        };
        assert_eq!(e.to_string(), "502. upstream unavailable");
    }
}
