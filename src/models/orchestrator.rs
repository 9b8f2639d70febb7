use anyhow::{Context as _, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::traits::Model;
use super::types::{ChatMessage, ModelResponse};
use crate::constants::ORCHESTRATOR_LLM_PATH;
use crate::utils::CrabError;

/// Model reached through the orchestrator's internal LLM proxy.
/// The orchestrator owns provider selection, credentials and memory injection.
pub struct OrchestratorModel {
    client: Client,
    base_url: String,
    agent_id: String,
}

#[derive(Serialize)]
struct ProxyRequest<'a> {
    messages: &'a [ChatMessage],
    #[serde(rename = "agentId")]
    agent_id: &'a str,
}

#[derive(Deserialize)]
struct ProxyResponse {
    #[serde(default)]
    output: Option<String>,
}

impl OrchestratorModel {
    pub fn new(base_url: &str, agent_id: &str, request_timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(request_timeout)
                .build()
                .context("Failed to build HTTP client")?,
            base_url: base_url.trim_end_matches('/').to_string(),
            agent_id: agent_id.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, ORCHESTRATOR_LLM_PATH)
    }
}

#[async_trait]
impl Model for OrchestratorModel {
    async fn chat(&mut self, messages: &[ChatMessage]) -> Result<ModelResponse> {
        let url = self.endpoint();
        let body = ProxyRequest {
            messages,
            agent_id: &self.agent_id,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to reach orchestrator at {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CrabError::TransportError(format!(
                "orchestrator returned {}: {}",
                status, error_text
            ))
            .into());
        }

        let parsed: ProxyResponse = response
            .json()
            .await
            .context("Orchestrator reply was not valid JSON")?;

        Ok(ModelResponse {
            content: parsed.output.unwrap_or_default(),
            model_name: self.name().to_string(),
        })
    }

    fn name(&self) -> &str {
        &self.agent_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the request body
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            let request_body = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= header_end + 4 + content_length {
                        break text[header_end + 4..].to_string();
                    }
                }
                if n == 0 {
                    break String::new();
                }
            };

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request_body
        });

        (format!("http://{}", addr), handle)
    }

    #[tokio::test]
    async fn test_posts_messages_and_agent_id() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", r#"{"output": "{\"terminal\": \"ls\"}"}"#).await;
        let mut model = OrchestratorModel::new(&url, "7", Duration::from_secs(5)).unwrap();

        let response = model
            .chat(&[ChatMessage::system("sys"), ChatMessage::user("list files")])
            .await
            .unwrap();

        assert_eq!(response.content, r#"{"terminal": "ls"}"#);

        let sent: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(sent["agentId"], "7");
        assert_eq!(sent["messages"][1]["role"], "user");
        assert_eq!(sent["messages"][1]["content"], "list files");
    }

    #[tokio::test]
    async fn test_missing_output_is_empty_reply() {
        let (url, _server) = serve_once("HTTP/1.1 200 OK", "{}").await;
        let mut model = OrchestratorModel::new(&url, "0", Duration::from_secs(5)).unwrap();

        let response = model.chat(&[ChatMessage::user("hi")]).await.unwrap();
        assert_eq!(response.content, "");
    }

    #[tokio::test]
    async fn test_error_status_is_transport_error() {
        let (url, _server) = serve_once("HTTP/1.1 502 Bad Gateway", r#"{"error": "upstream"}"#).await;
        let mut model = OrchestratorModel::new(&url, "0", Duration::from_secs(5)).unwrap();

        let err = model.chat(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn test_unreachable_orchestrator_is_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut model = OrchestratorModel::new(&format!("http://{}", addr), "0", Duration::from_secs(2)).unwrap();
        assert!(model.chat(&[ChatMessage::user("hi")]).await.is_err());
    }
}
