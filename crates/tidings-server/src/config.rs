use std::path::PathBuf;

use anyhow::Context;
use tidings_render::Localization;

/// Server settings, read from the environment after `.env` is loaded.
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub default_language: String,
    pub supported_languages: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.into());

        let port = var("TIDINGS_PORT", "3000")
            .parse()
            .context("TIDINGS_PORT must be a port number")?;

        let supported_languages: Vec<String> = var("TIDINGS_SUPPORTED_LANGS", "en,de")
            .split(',')
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .collect();
        let default_language = var("TIDINGS_DEFAULT_LANG", "en");

        Ok(Self {
            db_path: PathBuf::from(var("TIDINGS_DB_PATH", "tidings.db")),
            host: var("TIDINGS_HOST", "0.0.0.0"),
            port,
            jwt_secret: var("TIDINGS_JWT_SECRET", "dev-secret-change-me"),
            default_language,
            supported_languages,
        })
    }

    /// The default language always counts as supported.
    pub fn localization(&self) -> Localization {
        Localization::new(self.supported_languages.iter().cloned(), &self.default_language)
    }
}
