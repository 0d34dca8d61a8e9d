//! Configuration loader for SparkAI.
//!
//! Reads `config.toml` from the data directory (`~/.sparkai/` in production)
//! and deserializes it into [`SparkConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;

use sparkai_types::config::SparkConfig;

/// File name of the configuration inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable that overrides `[provider] base_url`.
pub const BASE_URL_ENV: &str = "DEEPSEEK_BASE_URL";

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`SparkConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - `DEEPSEEK_BASE_URL`, when set and non-empty, replaces the configured base URL.
pub async fn load_config(data_dir: &Path) -> SparkConfig {
    let mut config = read_config_file(data_dir).await;

    if let Ok(url) = std::env::var(BASE_URL_ENV) {
        apply_base_url_override(&mut config, &url);
    }

    config
}

async fn read_config_file(data_dir: &Path) -> SparkConfig {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return SparkConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return SparkConfig::default();
        }
    };

    match toml::from_str::<SparkConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            SparkConfig::default()
        }
    }
}

fn apply_base_url_override(config: &mut SparkConfig, url: &str) {
    let url = url.trim();
    if !url.is_empty() {
        tracing::debug!(base_url = url, "base URL overridden from {BASE_URL_ENV}");
        config.provider.base_url = url.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn read_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = read_config_file(tmp.path()).await;
        assert_eq!(config.provider.base_url, "https://api.deepseek.com");
        assert_eq!(config.provider.generation.max_tokens, 2048);
        assert_eq!(config.storage.snapshot_debounce_ms, 500);
    }

    #[tokio::test]
    async fn read_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
[provider]
model = "deepseek-reasoner"
max_tokens = 4096
api_key_env = "MY_KEY"

[storage]
snapshot_debounce_ms = 100
"#,
        )
        .await
        .unwrap();

        let config = read_config_file(tmp.path()).await;
        assert_eq!(config.provider.generation.model, "deepseek-reasoner");
        assert_eq!(config.provider.generation.max_tokens, 4096);
        assert_eq!(config.provider.api_key_env, "MY_KEY");
        assert_eq!(config.storage.snapshot_debounce_ms, 100);
    }

    #[tokio::test]
    async fn read_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(CONFIG_FILE), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = read_config_file(tmp.path()).await;
        assert_eq!(config.provider.generation.model, "deepseek-chat");
    }

    #[test]
    fn base_url_override_ignores_blank() {
        let mut config = SparkConfig::default();
        apply_base_url_override(&mut config, "   ");
        assert_eq!(config.provider.base_url, "https://api.deepseek.com");

        apply_base_url_override(&mut config, "http://localhost:8000/v1 ");
        assert_eq!(config.provider.base_url, "http://localhost:8000/v1");
    }
}
