use anyhow::{Context, Result};
use folio_core::{Credential, HeaderPolicy, RunConfig};
use folio_extract::{DocumentKind, LlmConfig, Provider};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::state::ensure_folio_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmSection,
    pub run: RunSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub provider: Provider,
    /// Unset or blank means the provider's default model
    pub model: Option<String>,
    /// Unset or blank means the provider's default endpoint
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSection {
    pub document: Option<PathBuf>,
    /// Unset means the kind's default output file
    pub output: Option<PathBuf>,
    /// 0 disables the per-request timeout
    pub page_timeout_secs: u64,
    pub header_policy: HeaderPolicy,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: Provider::Groq,
            model: None,
            base_url: None,
            temperature: 0.0,
            max_tokens: 4096,
        }
    }
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            document: None,
            output: None,
            page_timeout_secs: 120,
            header_policy: HeaderPolicy::FirstSuccess,
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub pdf: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn llm_config(&self, api_key: Credential, timeout: Option<Duration>) -> LlmConfig {
        let provider = self.llm.provider;
        let model = match self.llm.model.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => provider.default_model().to_string(),
        };
        let base_url = match self.llm.base_url.as_deref().map(str::trim) {
            Some(u) if !u.is_empty() => u.trim_end_matches('/').to_string(),
            _ => provider.default_base_url().to_string(),
        };
        LlmConfig {
            provider,
            model,
            base_url,
            temperature: self.llm.temperature,
            max_tokens: self.llm.max_tokens,
            api_key,
            timeout,
        }
    }

    pub fn run_config(
        &self,
        kind: DocumentKind,
        overrides: RunOverrides,
        credential: Credential,
    ) -> Result<RunConfig> {
        let document_path = overrides
            .pdf
            .or_else(|| self.run.document.clone())
            .context("no PDF given (pass --pdf <path> or set [run].document in config.toml)")?;
        let output_path = overrides
            .out
            .or_else(|| self.run.output.clone())
            .unwrap_or_else(|| PathBuf::from(kind.default_output()));
        let secs = overrides.timeout_secs.unwrap_or(self.run.page_timeout_secs);
        let page_timeout = (secs > 0).then(|| Duration::from_secs(secs));

        Ok(RunConfig {
            document_path,
            output_path,
            page_timeout,
            credential,
            header_policy: self.run.header_policy,
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_folio_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let cfg = load_config()?;
    println!("# {}", config_path()?.display());
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trips_through_toml() {
        let mut cfg = Config::default();
        cfg.llm.provider = Provider::Anthropic;
        cfg.run.document = Some("A_C Statement.pdf".into());
        cfg.run.header_policy = HeaderPolicy::WarnOnConflict;

        let s = toml::to_string_pretty(&cfg).unwrap();
        assert!(s.contains("header_policy = \"warn-on-conflict\""));
        assert_eq!(parse_config(&s).unwrap(), cfg);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg = parse_config("[run]\npage_timeout_secs = 30\n").unwrap();
        assert_eq!(cfg.run.page_timeout_secs, 30);
        assert_eq!(cfg.llm, LlmSection::default());
        let llm = cfg.llm_config(Credential::new("k"), None);
        assert_eq!(llm.model, "llama3-70b-8192");
        assert_eq!(llm.base_url, "https://api.groq.com/openai");
    }

    #[test]
    fn test_overrides_win_and_zero_disables_timeout() {
        let mut cfg = Config::default();
        cfg.run.document = Some("from_config.pdf".into());
        cfg.run.output = Some("from_config.json".into());

        let run = cfg
            .run_config(
                DocumentKind::Account,
                RunOverrides {
                    pdf: Some("cli.pdf".into()),
                    out: None,
                    timeout_secs: Some(0),
                },
                Credential::new("k"),
            )
            .unwrap();
        assert_eq!(run.document_path, PathBuf::from("cli.pdf"));
        assert_eq!(run.output_path, PathBuf::from("from_config.json"));
        assert_eq!(run.page_timeout, None);
    }

    #[test]
    fn test_output_defaults_per_kind() {
        let mut cfg = Config::default();
        cfg.run.document = Some("closing.pdf".into());
        let run = cfg
            .run_config(DocumentKind::Closing, RunOverrides::default(), Credential::default())
            .unwrap();
        assert_eq!(run.output_path, PathBuf::from("closing_data.json"));
        assert_eq!(run.page_timeout, Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_missing_document_is_an_error() {
        let err = Config::default()
            .run_config(DocumentKind::Bank, RunOverrides::default(), Credential::default())
            .unwrap_err();
        assert!(err.to_string().contains("--pdf"));
    }

    #[test]
    fn test_blank_model_falls_back_to_provider_default() {
        let mut cfg = Config::default();
        cfg.llm.provider = Provider::OpenAI;
        cfg.llm.model = Some("  ".into());
        cfg.llm.base_url = Some("https://proxy.internal/".into());
        let llm = cfg.llm_config(Credential::new("k"), None);
        assert_eq!(llm.model, "gpt-4o-mini");
        assert_eq!(llm.base_url, "https://proxy.internal");
    }

    #[test]
    fn test_provider_only_section_uses_that_providers_endpoint() {
        let cfg = parse_config("[llm]\nprovider = \"anthropic\"\n").unwrap();
        let llm = cfg.llm_config(Credential::new("k"), None);
        assert_eq!(llm.provider, Provider::Anthropic);
        assert_eq!(llm.model, Provider::Anthropic.default_model());
        assert_eq!(llm.base_url, "https://api.anthropic.com");

        let cfg = parse_config("[llm]\nprovider = \"openai\"\n").unwrap();
        let llm = cfg.llm_config(Credential::new("k"), None);
        assert_eq!(llm.model, "gpt-4o-mini");
        assert_eq!(llm.base_url, "https://api.openai.com");
    }

    #[test]
    fn test_default_file_does_not_pin_groq_endpoint() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(s.contains("provider = \"groq\""));
        assert!(!s.contains("base_url"));
        assert!(!s.contains("model"));

        let edited = s.replace("provider = \"groq\"", "provider = \"openai\"");
        let llm = parse_config(&edited).unwrap().llm_config(Credential::new("k"), None);
        assert_eq!(llm.base_url, "https://api.openai.com");
    }
}
