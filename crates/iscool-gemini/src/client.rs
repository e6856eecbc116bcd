use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::GeminiError;
use crate::types::{
    ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, Part, SystemInstruction, Turn,
};

/// Public Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A text-generation backend.
///
/// Implementors own transport and vendor details. The returned string is the
/// provider's aggregated reply text, empty when the provider produced none.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        system_instruction: Option<&str>,
        turns: &[Turn],
    ) -> Result<String, GeminiError>;
}

/// [`Provider`] backed by the Gemini `generateContent` REST call.
///
/// Holds one pooled [`reqwest::Client`]; clone-free sharing behind an `Arc`
/// is safe across concurrent requests.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client against [`DEFAULT_BASE_URL`].
    pub fn new(api_key: impl Into<String>) -> Result<Self, GeminiError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint (proxies, local stubs).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, GeminiError> {
        let client = Client::builder()
            .user_agent(concat!("iscool-gemini/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            client,
        })
    }

    /// `{base}/models/{id}:generateContent`.
    ///
    /// `models/{id}` and `tunedModels/{id}` resource names are accepted as
    /// given. The id must not contain characters that would change the URL
    /// path or method (`/ ? # : %`, whitespace).
    pub fn endpoint(&self, model: &str) -> Result<String, GeminiError> {
        let (collection, id) = match model.split_once('/') {
            Some((c @ ("models" | "tunedModels"), id)) => (c, id),
            _ => ("models", model),
        };
        let unsafe_char =
            |c: char| matches!(c, '/' | '?' | '#' | ':' | '%') || c.is_whitespace() || c.is_control();
        if id.is_empty() || id.chars().any(unsafe_char) {
            return Err(GeminiError::InvalidModel(model.to_owned()));
        }
        Ok(format!("{}/{collection}/{id}:generateContent", self.base_url))
    }

    /// Issue one `generateContent` call and decode the full response.
    pub async fn generate_content(
        &self,
        model: &str,
        system_instruction: Option<&str>,
        turns: &[Turn],
    ) -> Result<GenerateContentResponse, GeminiError> {
        let body = GenerateContentRequest {
            contents: turns,
            system_instruction: system_instruction
                .filter(|s| !s.is_empty())
                .map(|s| SystemInstruction {
                    parts: vec![Part::text(s)],
                }),
        };

        let url = self.endpoint(model)?;
        debug!(%url, turns = turns.len(), "calling generateContent");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &bytes));
        }

        let resp: GenerateContentResponse = serde_json::from_slice(&bytes)?;
        debug!(
            model_version = resp.model_version.as_deref().unwrap_or("-"),
            finish_reason = resp
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("-"),
            candidates = resp.candidates.len(),
            "generateContent finished"
        );
        Ok(resp)
    }
}

#[async_trait]
impl Provider for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        system_instruction: Option<&str>,
        turns: &[Turn],
    ) -> Result<String, GeminiError> {
        let resp = self
            .generate_content(model, system_instruction, turns)
            .await?;
        Ok(resp.text().unwrap_or_default())
    }
}

fn api_error(code: u16, body: &[u8]) -> GeminiError {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(env) => GeminiError::Api {
            code,
            status: env.error.status,
            message: env.error.message,
        },
        Err(_) => GeminiError::Api {
            code,
            status: None,
            message: String::from_utf8_lossy(body).into_owned(),
        },
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode, Uri};
    use serde_json::{Value, json};

    use super::*;
    use crate::types::TurnRole;

    #[derive(Debug, Clone)]
    struct Captured {
        path: String,
        api_key: Option<String>,
        body: Value,
    }

    #[derive(Clone)]
    struct Stub {
        status: StatusCode,
        reply: String,
        seen: Arc<Mutex<Vec<Captured>>>,
    }

    async fn stub_handler(
        State(stub): State<Stub>,
        uri: Uri,
        headers: HeaderMap,
        body: String,
    ) -> (StatusCode, String) {
        stub.seen.lock().unwrap().push(Captured {
            path: uri.path().to_owned(),
            api_key: headers
                .get("x-goog-api-key")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
            body: serde_json::from_str(&body).unwrap_or(Value::Null),
        });
        (stub.status, stub.reply.clone())
    }

    /// Serve `reply` with `status` on a loopback port; returns the base URL.
    async fn spawn_stub(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Captured>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let stub = Stub {
            status,
            reply: reply.to_string(),
            seen: Arc::clone(&seen),
        };
        let app = Router::new().fallback(stub_handler).with_state(stub);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/v1beta"), seen)
    }

    #[test]
    fn endpoint_accepts_bare_and_prefixed_model() {
        let c = GeminiClient::with_base_url("k", "http://localhost/v1beta/").unwrap();
        assert_eq!(
            c.endpoint("gemini-2.5-flash").unwrap(),
            "http://localhost/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            c.endpoint("models/gemini-2.5-pro").unwrap(),
            "http://localhost/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn endpoint_keeps_tuned_model_resource_names() {
        let c = GeminiClient::with_base_url("k", "http://localhost/v1beta").unwrap();
        assert_eq!(
            c.endpoint("tunedModels/my-tune").unwrap(),
            "http://localhost/v1beta/tunedModels/my-tune:generateContent"
        );
    }

    #[test]
    fn endpoint_rejects_ids_that_alter_the_url() {
        let c = GeminiClient::with_base_url("k", "http://localhost/v1beta").unwrap();
        for bad in [
            "",
            "models/",
            "gemini-2.5-flash:countTokens#",
            "gemini?alt=sse",
            "../files/x",
            "tunedModels/a/b",
            "gemini 2.5",
            "gemini%2F",
        ] {
            assert!(
                matches!(c.endpoint(bad), Err(GeminiError::InvalidModel(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn invalid_model_fails_before_any_request() {
        let (base, seen) = spawn_stub(StatusCode::OK, json!({ "candidates": [] })).await;
        let client = GeminiClient::with_base_url("k", base).unwrap();

        let err = client
            .generate("gemini-2.5-flash:countTokens#", None, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, GeminiError::InvalidModel(_)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn debug_output_hides_api_key() {
        let c = GeminiClient::new("super-secret").unwrap();
        assert!(!format!("{c:?}").contains("super-secret"));
    }

    #[tokio::test]
    async fn generate_sends_turns_and_system_instruction() {
        let (base, seen) = spawn_stub(
            StatusCode::OK,
            json!({ "candidates": [{ "content": { "parts": [{ "text": "4" }] } }] }),
        )
        .await;
        let client = GeminiClient::with_base_url("test-key", base).unwrap();

        let turns = vec![
            Turn::text(TurnRole::User, "2+2?"),
            Turn::text(TurnRole::Model, "Let me think."),
        ];
        let reply = client
            .generate("gemini-2.5-flash", Some("Be concise."), &turns)
            .await
            .unwrap();
        assert_eq!(reply, "4");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let call = &seen[0];
        assert_eq!(call.path, "/v1beta/models/gemini-2.5-flash:generateContent");
        assert_eq!(call.api_key.as_deref(), Some("test-key"));
        assert_eq!(
            call.body,
            json!({
                "contents": [
                    { "role": "user", "parts": [{ "text": "2+2?" }] },
                    { "role": "model", "parts": [{ "text": "Let me think." }] }
                ],
                "systemInstruction": { "parts": [{ "text": "Be concise." }] }
            })
        );
    }

    #[tokio::test]
    async fn empty_system_instruction_is_not_sent() {
        let (base, seen) = spawn_stub(StatusCode::OK, json!({ "candidates": [] })).await;
        let client = GeminiClient::with_base_url("k", base).unwrap();

        client
            .generate("m", Some(""), &[Turn::text(TurnRole::User, "hi")])
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert!(seen[0].body.get("systemInstruction").is_none());
    }

    #[tokio::test]
    async fn missing_text_yields_empty_reply() {
        let (base, _) = spawn_stub(StatusCode::OK, json!({ "candidates": [] })).await;
        let client = GeminiClient::with_base_url("k", base).unwrap();

        let reply = client.generate("m", None, &[]).await.unwrap();
        assert_eq!(reply, "");
    }

    #[tokio::test]
    async fn provider_error_envelope_becomes_api_error() {
        let (base, _) = spawn_stub(
            StatusCode::BAD_REQUEST,
            json!({ "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }}),
        )
        .await;
        let client = GeminiClient::with_base_url("bad", base).unwrap();

        let err = client.generate("m", None, &[]).await.unwrap_err();
        assert!(matches!(err, GeminiError::Api { code: 400, .. }));
        assert_eq!(
            err.to_string(),
            "400 INVALID_ARGUMENT. API key not valid. Please pass a valid API key."
        );
    }

    #[tokio::test]
    async fn non_envelope_error_keeps_raw_body() {
        let (base, _) = spawn_stub(StatusCode::SERVICE_UNAVAILABLE, json!("overloaded")).await;
        let client = GeminiClient::with_base_url("k", base).unwrap();

        let err = client.generate("m", None, &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "503. \"overloaded\"");
    }

    #[tokio::test]
    async fn garbage_success_body_is_decode_error() {
        let (base, _) = spawn_stub(StatusCode::OK, json!([1, 2, 3])).await;
        let client = GeminiClient::with_base_url("k", base).unwrap();

        let err = client.generate("m", None, &[]).await.unwrap_err();
        assert!(matches!(err, GeminiError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_http_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GeminiClient::with_base_url("k", format!("http://{addr}")).unwrap();
        let err = client.generate("m", None, &[]).await.unwrap_err();
        assert!(matches!(err, GeminiError::Http(_)));
        assert!(
            err.to_string().contains("Connection refused"),
            "cause missing from {err}"
        );
    }
}
