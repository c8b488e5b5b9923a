use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Transcript fetcher settings
    pub fetcher: FetcherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to listen on (`PORT` overrides)
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Root of the YouTube web endpoints
    pub base_url: String,

    /// Preferred caption languages, most preferred first
    pub languages: Vec<String>,

    /// HTTP timeout for each request in seconds
    pub timeout_secs: u64,

    /// User agent sent to YouTube
    pub user_agent: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            languages: vec!["en".to_string()],
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file (or defaults) and apply environment overrides
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            serde_yaml::from_str(&content).context("Failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_fetcher_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration for the HTTP server, which also honours `PORT`
    /// and `TRANSCRIPT_SERVICE_HOST`
    pub async fn load_for_server() -> Result<Self> {
        let mut config = Self::load().await?;
        config.apply_server_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(&config_path, content).context("Failed to write config file")?;

        Ok(config_path)
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // Current directory wins so deployments can ship a config next to the binary
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("transcript-service").join("config.yaml"))
    }

    /// Apply `PORT` and `TRANSCRIPT_SERVICE_HOST`
    pub fn apply_server_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").filter(|v| !v.trim().is_empty()) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {}", port))?;
        }

        if let Some(host) = lookup("TRANSCRIPT_SERVICE_HOST").filter(|v| !v.trim().is_empty()) {
            self.server.host = host.trim().to_string();
        }

        Ok(())
    }

    /// Apply `TRANSCRIPT_LANGUAGES` and `YOUTUBE_BASE_URL`
    pub fn apply_fetcher_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(languages) = lookup("TRANSCRIPT_LANGUAGES") {
            let parsed: Vec<String> = languages
                .split(',')
                .map(|lang| lang.trim().to_string())
                .filter(|lang| !lang.is_empty())
                .collect();
            if !parsed.is_empty() {
                self.fetcher.languages = parsed;
            }
        }

        if let Some(base_url) = lookup("YOUTUBE_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.fetcher.base_url = base_url.trim().trim_end_matches('/').to_string();
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.fetcher.languages.is_empty() {
            anyhow::bail!("At least one caption language must be configured");
        }

        if self.fetcher.timeout_secs == 0 {
            anyhow::bail!("Fetcher timeout must be greater than zero");
        }

        let base = Url::parse(&self.fetcher.base_url)
            .with_context(|| format!("Invalid fetcher base_url: {}", self.fetcher.base_url))?;
        if !matches!(base.scheme(), "http" | "https") {
            anyhow::bail!("Fetcher base_url must use HTTP or HTTPS protocol");
        }

        Ok(())
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Server Host: {}", self.server.host);
        println!("  Server Port: {}", self.server.port);
        println!("  YouTube URL: {}", self.fetcher.base_url);
        println!("  Languages: {}", self.fetcher.languages.join(", "));
        println!("  Timeout: {}s", self.fetcher.timeout_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.fetcher.languages, vec!["en".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_port_override() {
        let mut config = Config::default();
        config
            .apply_server_env_overrides(env(&[
                ("PORT", "9090"),
                ("TRANSCRIPT_SERVICE_HOST", "127.0.0.1"),
            ]))
            .unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:9090");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut config = Config::default();
        assert!(config.apply_server_env_overrides(env(&[("PORT", "eighty")])).is_err());
    }

    #[test]
    fn test_fetcher_overrides_ignore_server_variables() {
        let mut config = Config::default();
        config.apply_fetcher_env_overrides(env(&[
            ("PORT", "eighty"),
            ("TRANSCRIPT_SERVICE_HOST", "127.0.0.1"),
        ]));
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_language_and_base_url_overrides() {
        let mut config = Config::default();
        config.apply_fetcher_env_overrides(env(&[
            ("TRANSCRIPT_LANGUAGES", "de, en ,"),
            ("YOUTUBE_BASE_URL", "http://127.0.0.1:9000/"),
        ]));
        assert_eq!(config.fetcher.languages, vec!["de".to_string(), "en".to_string()]);
        assert_eq!(config.fetcher.base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("server:\n  port: 3000\n").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.fetcher.timeout_secs, 30);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.fetcher.languages.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.fetcher.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.fetcher.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
