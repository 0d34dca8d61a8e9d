//! Data directory resolution.
//!
//! Everything SparkAI stores lives under one directory: `config.toml` and
//! the SQLite database.

use std::path::{Path, PathBuf};

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "SPARKAI_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `SPARKAI_DATA_DIR` environment variable
/// 2. `~/.sparkai`
/// 3. `.sparkai` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    resolve_from(std::env::var(DATA_DIR_ENV).ok(), dirs::home_dir())
}

fn resolve_from(env_dir: Option<String>, home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = env_dir.filter(|d| !d.trim().is_empty()) {
        return PathBuf::from(dir);
    }

    if let Some(home) = home {
        return home.join(".sparkai");
    }

    PathBuf::from(".sparkai")
}

/// Create the data directory if it does not exist yet.
pub async fn ensure_data_dir(data_dir: &Path) -> Result<(), std::io::Error> {
    tokio::fs::create_dir_all(data_dir).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_dir_wins() {
        let dir = resolve_from(Some("/srv/spark".into()), Some(PathBuf::from("/home/u")));
        assert_eq!(dir, PathBuf::from("/srv/spark"));
    }

    #[test]
    fn test_home_fallback() {
        let dir = resolve_from(None, Some(PathBuf::from("/home/u")));
        assert_eq!(dir, PathBuf::from("/home/u/.sparkai"));

        let blank = resolve_from(Some("  ".into()), Some(PathBuf::from("/home/u")));
        assert_eq!(blank, PathBuf::from("/home/u/.sparkai"));
    }

    #[test]
    fn test_last_resort_is_relative() {
        assert_eq!(resolve_from(None, None), PathBuf::from(".sparkai"));
    }

    #[tokio::test]
    async fn test_ensure_data_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_data_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
    }
}
