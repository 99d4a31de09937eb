use anyhow::{bail, Context, Result};
use folio_core::Credential;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::state::ensure_folio_home;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthState {
    pub api_key: Option<String>,
}

fn auth_path() -> Result<PathBuf> {
    Ok(ensure_folio_home()?.join("auth.json"))
}

pub fn load_auth() -> Result<AuthState> {
    let p = auth_path()?;
    if !p.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_auth(auth: &AuthState) -> Result<()> {
    let p = auth_path()?;
    let s = serde_json::to_string_pretty(auth)?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

fn prompt_secret(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn paste_api_key() -> Result<()> {
    let mut auth = load_auth()?;
    let key = prompt_secret("Paste model API key")?;
    if key.is_empty() {
        bail!("no key entered");
    }
    auth.api_key = Some(key);
    save_auth(&auth)?;
    println!("Saved API key to ~/.folio/auth.json");
    Ok(())
}

/// Stored key, or an error telling the user how to add one.
pub fn credential() -> Result<Credential> {
    credential_from(&load_auth()?)
}

fn credential_from(auth: &AuthState) -> Result<Credential> {
    match auth.api_key.as_deref().map(str::trim) {
        Some(k) if !k.is_empty() => Ok(Credential::new(k)),
        _ => bail!("no API key stored; run: folio auth paste-api-key"),
    }
}
