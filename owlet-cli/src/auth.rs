use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};

use owlet_store::ensure_owlet_home;

/// Identity and collaborator credentials. The current user keys every
/// persistence read/write; changing it re-keys everything.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthState {
    pub current_user: Option<String>,
    pub gemini_api_key: Option<String>,
}

fn auth_path() -> Result<std::path::PathBuf> {
    Ok(ensure_owlet_home()?.join("auth.json"))
}

pub fn load_auth() -> Result<AuthState> {
    let p = auth_path()?;
    if !p.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(serde_json::from_str(&s)?)
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

pub fn login(user: &str) -> Result<()> {
    let user = user.trim();
    if user.is_empty() {
        bail!("identity must not be empty");
    }
    let mut auth = load_auth()?;
    auth.current_user = Some(user.to_string());
    save_auth(&auth)?;
    println!("Signed in as {user}. Ledger and goal data are now keyed to this identity.");
    Ok(())
}

pub fn logout() -> Result<()> {
    let mut auth = load_auth()?;
    match auth.current_user.take() {
        Some(user) => {
            save_auth(&auth)?;
            println!("Signed out {user}. Subsequent commands use the anonymous local ledger.");
        }
        None => println!("Nobody is signed in."),
    }
    Ok(())
}

pub fn status() -> Result<()> {
    let auth = load_auth()?;
    match &auth.current_user {
        Some(user) => println!("Signed in as {user}"),
        None => println!("Not signed in (anonymous local ledger)"),
    }
    if auth.gemini_api_key.is_some() || std::env::var("GEMINI_API_KEY").is_ok() {
        println!("Gemini API key: configured");
    } else {
        println!("Gemini API key: missing (run: owlet auth set-key)");
    }
    Ok(())
}

pub fn paste_gemini_key() -> Result<()> {
    let mut auth = load_auth()?;
    let key = prompt_secret("Paste Gemini API key (starts with AIza)")?;
    if !key.starts_with("AIza") {
        bail!("key didn't look like a Gemini API key (expected prefix AIza)");
    }
    auth.gemini_api_key = Some(key);
    save_auth(&auth)?;
    println!("Saved Gemini API key to ~/.owlet/auth.json");
    Ok(())
}

/// Env var wins over the stored key.
pub fn resolve_api_key() -> Result<Option<String>> {
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.trim().is_empty() {
            return Ok(Some(key));
        }
    }
    Ok(load_auth()?.gemini_api_key)
}
