use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use owlet_advisor::GeminiConfig;
use owlet_store::ensure_owlet_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmSection,
    pub profile: ProfileSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSection {
    pub base_url: String,
    pub fast_model: String,
    pub pro_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSection {
    /// IANA timezone used for day-boundary math (streaks).
    pub timezone: String,
    /// Balance assumed for an identity with no persisted state yet.
    pub opening_balance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmSection {
                base_url: owlet_advisor::gemini::DEFAULT_BASE_URL.to_string(),
                fast_model: owlet_advisor::FAST_MODEL.to_string(),
                pro_model: owlet_advisor::PRO_MODEL.to_string(),
            },
            profile: ProfileSection {
                timezone: "America/Chicago".to_string(),
                opening_balance: owlet_core::DEFAULT_BALANCE,
            },
        }
    }
}

impl Config {
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.profile
            .timezone
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone: {}", self.profile.timezone))
    }

    /// Collaborator config with the resolved API key.
    pub fn gemini(&self, api_key: String) -> GeminiConfig {
        GeminiConfig {
            api_key,
            base_url: self.llm.base_url.clone(),
            fast_model: self.llm.fast_model.clone(),
            pro_model: self.llm.pro_model.clone(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_owlet_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
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
