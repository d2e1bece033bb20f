// Narration backend clients.
//
// Two non-streaming backends: the hosted Anthropic Messages API and a local
// Ollama-compatible chat server, selected by the narrator config. Narration is
// advisory, so every failure here (network, auth, malformed payload) is caught
// and converted into a soft `NarrationOutcome::Failed` rather than propagated.

use anyhow::{anyhow, Context};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::captain::ScoredPlayer;
use crate::config::{CredentialsConfig, NarratorConfig, NarratorMode};

use super::prompt;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// Outcome type
// ---------------------------------------------------------------------------

/// The soft result of a narration attempt. This is the one boundary where
/// failures are absorbed instead of raised.
#[derive(Debug, Clone, PartialEq)]
pub enum NarrationOutcome {
    Narrated { explanation: String, model: String },
    Failed { error: String },
}

// ---------------------------------------------------------------------------
// HostedClient (Anthropic Messages API)
// ---------------------------------------------------------------------------

pub struct HostedClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    api_url: String,
}

impl HostedClient {
    pub fn new(api_key: String, model: String, max_tokens: u32, temperature: f64) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            max_tokens,
            temperature,
            api_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    async fn complete(&self, system: &str, user_content: &str) -> anyhow::Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "system": system,
            "messages": [{ "role": "user", "content": user_content }]
        });

        let resp = self
            .http
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("request to hosted narrator failed")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("hosted narrator returned status {status}"));
        }

        let v: Value = resp
            .json()
            .await
            .context("hosted narrator response was not JSON")?;
        extract_hosted_text(&v)
            .ok_or_else(|| anyhow!("hosted narrator response had no text content"))
    }
}

// ---------------------------------------------------------------------------
// LocalClient (Ollama chat endpoint)
// ---------------------------------------------------------------------------

pub struct LocalClient {
    http: reqwest::Client,
    model: String,
    url: String,
}

impl LocalClient {
    pub fn new(model: String, url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            model,
            url,
        }
    }

    async fn complete(&self, system: &str, user_content: &str) -> anyhow::Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "stream": false,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user_content }
            ]
        });

        let url = format!("{}/api/chat", self.url.trim_end_matches('/'));
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("request to local narrator failed")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("local narrator returned status {status}"));
        }

        let v: Value = resp
            .json()
            .await
            .context("local narrator response was not JSON")?;
        extract_local_text(&v)
            .ok_or_else(|| anyhow!("local narrator response had no message content"))
    }
}

// ---------------------------------------------------------------------------
// NarratorClient
// ---------------------------------------------------------------------------

/// High-level narrator handle: a hosted backend, a local backend, or disabled
/// when the hosted mode is selected without an API key.
pub enum NarratorClient {
    Hosted(HostedClient),
    Local(LocalClient),
    Disabled,
}

impl NarratorClient {
    /// Build a narrator from the explicit mode in config.
    ///
    /// Hosted mode without a usable API key yields `Disabled`, which soft-fails
    /// at narrate time rather than erroring here.
    pub fn from_config(narrator: &NarratorConfig, credentials: &CredentialsConfig) -> Self {
        match narrator.mode {
            NarratorMode::Hosted => match &credentials.anthropic_api_key {
                Some(key) if !key.is_empty() => {
                    info!("Narrator using hosted model {}", narrator.hosted.model);
                    NarratorClient::Hosted(HostedClient::new(
                        key.clone(),
                        narrator.hosted.model.clone(),
                        narrator.max_tokens,
                        narrator.temperature,
                    ))
                }
                _ => {
                    warn!("Hosted narrator selected but no API key configured");
                    NarratorClient::Disabled
                }
            },
            NarratorMode::Local => {
                info!(
                    "Narrator using local model {} at {}",
                    narrator.local.model, narrator.local.url
                );
                NarratorClient::Local(LocalClient::new(
                    narrator.local.model.clone(),
                    narrator.local.url.clone(),
                ))
            }
        }
    }

    /// The model identifier this narrator would attribute output to.
    pub fn model(&self) -> Option<&str> {
        match self {
            NarratorClient::Hosted(c) => Some(&c.model),
            NarratorClient::Local(c) => Some(&c.model),
            NarratorClient::Disabled => None,
        }
    }

    /// Narrate the top-scored candidates for a gameweek.
    ///
    /// Never returns a hard error: any backend failure comes back as
    /// [`NarrationOutcome::Failed`].
    pub async fn narrate(&self, top: &[ScoredPlayer], gameweek: u32) -> NarrationOutcome {
        let system = prompt::system_prompt();
        let user_content = prompt::build_captain_prompt(top, gameweek);
        debug!("Narration prompt built ({} bytes)", user_content.len());

        let result = match self {
            NarratorClient::Hosted(c) => c
                .complete(&system, &user_content)
                .await
                .map(|text| (text, c.model.clone())),
            NarratorClient::Local(c) => c
                .complete(&system, &user_content)
                .await
                .map(|text| (text, c.model.clone())),
            NarratorClient::Disabled => Err(anyhow!("narrator not configured")),
        };

        match result {
            Ok((explanation, model)) => {
                info!("Narration produced by {model}");
                NarrationOutcome::Narrated { explanation, model }
            }
            Err(e) => {
                warn!("Narration failed: {e:#}");
                NarrationOutcome::Failed {
                    error: format!("{e:#}"),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response JSON parsing helpers
// ---------------------------------------------------------------------------

/// Extract the first text block from a Messages API response.
///
/// Expected shape: `{ "content": [{ "type": "text", "text": "..." }] }`
pub(crate) fn extract_hosted_text(v: &Value) -> Option<String> {
    v.get("content")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(|s| s.to_string())
}

/// Extract the reply text from an Ollama chat response.
///
/// Expected shape: `{ "message": { "role": "assistant", "content": "..." } }`
pub(crate) fn extract_local_text(v: &Value) -> Option<String> {
    v.get("message")?
        .get("content")?
        .as_str()
        .map(|s| s.to_string())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HostedModelConfig, LocalModelConfig};

    fn scored(name: &str, score: f64) -> ScoredPlayer {
        ScoredPlayer {
            id: 1,
            name: name.to_string(),
            score,
            form: "6.5".to_string(),
            points_per_game: "7.1".to_string(),
            minutes: 1170,
        }
    }

    fn narrator_config(mode: NarratorMode) -> NarratorConfig {
        NarratorConfig {
            mode,
            max_tokens: 300,
            temperature: 0.4,
            hosted: HostedModelConfig {
                model: "claude-sonnet-4-5-20250929".to_string(),
            },
            local: LocalModelConfig {
                model: "llama3.1".to_string(),
                url: "http://localhost:11434".to_string(),
            },
        }
    }

    // -- Response JSON parsing --

    #[test]
    fn parse_hosted_response_text() {
        let data = r#"{
            "id": "msg_123",
            "type": "message",
            "role": "assistant",
            "model": "claude-sonnet-4-5-20250929",
            "content": [{ "type": "text", "text": "Captain Haaland." }],
            "usage": { "input_tokens": 42, "output_tokens": 12 }
        }"#;
        let v: Value = serde_json::from_str(data).unwrap();
        assert_eq!(extract_hosted_text(&v), Some("Captain Haaland.".to_string()));
    }

    #[test]
    fn parse_hosted_response_without_content() {
        let v: Value = serde_json::from_str(r#"{ "id": "msg_1", "content": [] }"#).unwrap();
        assert_eq!(extract_hosted_text(&v), None);
    }

    #[test]
    fn parse_local_response_text() {
        let data = r#"{
            "model": "llama3.1",
            "message": { "role": "assistant", "content": "Go with Salah." },
            "done": true
        }"#;
        let v: Value = serde_json::from_str(data).unwrap();
        assert_eq!(extract_local_text(&v), Some("Go with Salah.".to_string()));
    }

    #[test]
    fn parse_local_response_without_message() {
        let v: Value = serde_json::from_str(r#"{ "model": "llama3.1", "done": true }"#).unwrap();
        assert_eq!(extract_local_text(&v), None);
    }

    // -- from_config --

    #[test]
    fn hosted_mode_with_key_is_hosted() {
        let credentials = CredentialsConfig {
            anthropic_api_key: Some("sk-ant-test".to_string()),
        };
        let client = NarratorClient::from_config(&narrator_config(NarratorMode::Hosted), &credentials);
        assert!(matches!(client, NarratorClient::Hosted(_)));
        assert_eq!(client.model(), Some("claude-sonnet-4-5-20250929"));
    }

    #[test]
    fn hosted_mode_without_key_is_disabled() {
        let client = NarratorClient::from_config(
            &narrator_config(NarratorMode::Hosted),
            &CredentialsConfig::default(),
        );
        assert!(matches!(client, NarratorClient::Disabled));
        assert_eq!(client.model(), None);
    }

    #[test]
    fn hosted_mode_with_empty_key_is_disabled() {
        let credentials = CredentialsConfig {
            anthropic_api_key: Some(String::new()),
        };
        let client = NarratorClient::from_config(&narrator_config(NarratorMode::Hosted), &credentials);
        assert!(matches!(client, NarratorClient::Disabled));
    }

    #[test]
    fn local_mode_needs_no_credentials() {
        let client = NarratorClient::from_config(
            &narrator_config(NarratorMode::Local),
            &CredentialsConfig::default(),
        );
        assert!(matches!(client, NarratorClient::Local(_)));
        assert_eq!(client.model(), Some("llama3.1"));
    }

    // -- Soft-failure paths --

    #[tokio::test]
    async fn disabled_narrator_soft_fails() {
        let client = NarratorClient::Disabled;
        let outcome = client.narrate(&[scored("Haaland", 6.8)], 12).await;
        match outcome {
            NarrationOutcome::Failed { error } => {
                assert!(error.contains("not configured"), "unexpected error: {error}");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_local_backend_soft_fails() {
        // Bind-then-drop a listener to get a port nothing is serving.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = NarratorClient::Local(LocalClient::new(
            "llama3.1".to_string(),
            format!("http://{addr}"),
        ));
        let outcome = client.narrate(&[scored("Haaland", 6.8)], 12).await;
        assert!(matches!(outcome, NarrationOutcome::Failed { .. }));
    }

    // -- Mock HTTP server tests --

    /// Serve one HTTP connection with a canned response, then exit.
    async fn spawn_one_shot_server(status_line: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            // Read until the header terminator and the declared body length
            // have both arrived (reqwest may split headers and body).
            let mut request = Vec::new();
            let mut buf = vec![0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .and_then(|v| v.trim().parse::<usize>().ok())
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\
                 \r\n\
                 {body}",
                body.len(),
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn local_backend_narrates_from_mock_server() {
        let url = spawn_one_shot_server(
            "200 OK",
            r#"{"model":"llama3.1","message":{"role":"assistant","content":"Captain Haaland: in devastating form."},"done":true}"#,
        )
        .await;

        let client = NarratorClient::Local(LocalClient::new("llama3.1".to_string(), url));
        let outcome = client.narrate(&[scored("Haaland", 6.8)], 12).await;

        assert_eq!(
            outcome,
            NarrationOutcome::Narrated {
                explanation: "Captain Haaland: in devastating form.".to_string(),
                model: "llama3.1".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn local_backend_malformed_payload_soft_fails() {
        let url = spawn_one_shot_server("200 OK", r#"{"done":true}"#).await;

        let client = NarratorClient::Local(LocalClient::new("llama3.1".to_string(), url));
        let outcome = client.narrate(&[scored("Haaland", 6.8)], 12).await;

        match outcome {
            NarrationOutcome::Failed { error } => {
                assert!(error.contains("no message content"), "unexpected error: {error}");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn hosted_backend_narrates_from_mock_server() {
        let url = spawn_one_shot_server(
            "200 OK",
            r#"{"id":"msg_1","content":[{"type":"text","text":"Haaland, easily."}],"model":"claude-sonnet-4-5-20250929"}"#,
        )
        .await;

        let hosted = HostedClient::new(
            "sk-ant-test".to_string(),
            "claude-sonnet-4-5-20250929".to_string(),
            300,
            0.4,
        )
        .with_api_url(url);
        let client = NarratorClient::Hosted(hosted);
        let outcome = client.narrate(&[scored("Haaland", 6.8)], 12).await;

        assert_eq!(
            outcome,
            NarrationOutcome::Narrated {
                explanation: "Haaland, easily.".to_string(),
                model: "claude-sonnet-4-5-20250929".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn hosted_backend_error_status_soft_fails() {
        let url = spawn_one_shot_server(
            "401 Unauthorized",
            r#"{"error":{"type":"authentication_error","message":"invalid x-api-key"}}"#,
        )
        .await;

        let hosted = HostedClient::new(
            "sk-ant-bad".to_string(),
            "claude-sonnet-4-5-20250929".to_string(),
            300,
            0.4,
        )
        .with_api_url(url);
        let outcome = NarratorClient::Hosted(hosted)
            .narrate(&[scored("Haaland", 6.8)], 12)
            .await;

        match outcome {
            NarrationOutcome::Failed { error } => {
                assert!(error.contains("401"), "unexpected error: {error}");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
