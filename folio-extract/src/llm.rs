use anyhow::{bail, Context, Result};
use folio_core::{Credential, ExtractionFailure};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI-compatible endpoint hosted by Groq
    Groq,
    OpenAI,
    Anthropic,
}

impl Provider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai",
            Provider::OpenAI => "https://api.openai.com",
            Provider::Anthropic => "https://api.anthropic.com",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Groq => "llama3-70b-8192",
            Provider::OpenAI => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-5-sonnet-latest",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::Groq => "groq",
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
        })
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(Provider::Groq),
            "openai" => Ok(Provider::OpenAI),
            "anthropic" => Ok(Provider::Anthropic),
            other => Err(format!(
                "unknown provider '{other}' (expected groq, openai or anthropic)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub api_key: Credential,
    /// Applied to each completion call
    pub timeout: Option<Duration>,
}

/// Something that answers a single system + user prompt with text.
pub trait ChatBackend {
    fn complete(
        &self,
        system: &str,
        prompt: &str,
    ) -> std::result::Result<String, ExtractionFailure>;
}

/// Blocking chat-completion client. Owns a current-thread runtime, so it must
/// not be driven from inside another tokio runtime.
pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        Self::with_http(config, reqwest::Client::new())
    }

    pub fn with_http(config: LlmConfig, http: reqwest::Client) -> Result<Self> {
        if config.api_key.is_empty() {
            bail!("missing API key; run: folio auth paste-api-key");
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("create tokio runtime")?;
        Ok(Self {
            config,
            http,
            runtime,
        })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn complete_async(&self, system: &str, prompt: &str) -> Result<String> {
        debug!(
            provider = %self.config.provider,
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "chat completion request"
        );
        match self.config.provider {
            Provider::Groq | Provider::OpenAI => self.openai_complete(system, prompt).await,
            Provider::Anthropic => self.anthropic_complete(system, prompt).await,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn anthropic_complete(&self, system: &str, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            max_tokens: u32,
            temperature: f32,
            system: &'a str,
            messages: Vec<Msg<'a>>,
        }

        #[derive(Deserialize)]
        struct Resp {
            content: Vec<ContentBlock>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            #[serde(rename = "type")]
            t: String,
            text: Option<String>,
        }

        let body = Req {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
        };

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(self.config.api_key.expose())?);
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self
            .http
            .post(self.endpoint("/v1/messages"))
            .headers(headers)
            .json(&body)
            .send()
            .await
            .context("anthropic request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("anthropic error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse anthropic response")?;
        let mut s = String::new();
        for b in out.content {
            if b.t == "text" {
                if let Some(t) = b.text {
                    s.push_str(&t);
                }
            }
        }
        Ok(s.trim().to_string())
    }

    async fn openai_complete(&self, system: &str, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MsgOut,
        }

        #[derive(Deserialize)]
        struct MsgOut {
            content: Option<String>,
        }

        let body = Req {
            model: &self.config.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let key = self.config.api_key.expose();
        let resp = self
            .http
            .post(self.endpoint("/v1/chat/completions"))
            .header(AUTHORIZATION, format!("Bearer {key}"))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("{} request", self.config.provider))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("{} error: {status} {txt}", self.config.provider);
        }

        let out: Resp = resp
            .json()
            .await
            .with_context(|| format!("parse {} response", self.config.provider))?;
        let content = out
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}

impl ChatBackend for LlmClient {
    fn complete(
        &self,
        system: &str,
        prompt: &str,
    ) -> std::result::Result<String, ExtractionFailure> {
        let call = self.complete_async(system, prompt);
        let result = match self.config.timeout {
            Some(limit) => self
                .runtime
                .block_on(async { tokio::time::timeout(limit, call).await })
                .map_err(|_| ExtractionFailure::Timeout(limit))?,
            None => self.runtime.block_on(call),
        };
        result.map_err(|e| ExtractionFailure::Request(format!("{e:#}")))
    }
}
