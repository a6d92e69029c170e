//! Configuration loading with env-var overrides.
//!
//! Reads a TOML file and applies `SARAH_WORK_DIR` and `SARAH_LOG_LEVEL`
//! env overrides. Without a file, a hardcoded minimal default is used.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::AppError;

use super::raw::{self, RawConfig};
use super::types::*;

/// Load config from the given path, or `config/default.toml`, then apply
/// env-var overrides. If no path is given and `config/default.toml` does not
/// exist, returns a hardcoded minimal default.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let work_dir_override = env::var("SARAH_WORK_DIR").ok();
    let log_level_override = env::var("SARAH_LOG_LEVEL").ok();

    if let Some(path) = config_path {
        return load_from(
            Path::new(path),
            work_dir_override.as_deref(),
            log_level_override.as_deref(),
        );
    }

    let default_path = Path::new("config/default.toml");
    if default_path.exists() {
        load_from(
            default_path,
            work_dir_override.as_deref(),
            log_level_override.as_deref(),
        )
    } else {
        // Hardcoded minimal default
        let work_dir_str = work_dir_override.unwrap_or_else(|| "~/.sarah-bot".to_string());
        let work_dir = expand_home(&work_dir_str);
        let log_level = log_level_override.unwrap_or_else(|| "info".to_string());

        Ok(Config {
            assistant: AssistantConfig {
                bot_name: "sarah".to_string(),
                work_dir,
                log_level,
            },
            comms: CommsConfig {
                axum_channel: AxumChannelConfig {
                    enabled: true,
                    bind: raw::default_http_bind(),
                },
            },
            memory: MemoryConfig {
                db_file: PathBuf::from(raw::default_db_file()),
            },
            documents: DocumentsConfig {
                dir: PathBuf::from(raw::default_documents_dir()),
            },
        })
    }
}

/// Internal loader — accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    work_dir_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&text)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let a = parsed.assistant;

    let work_dir_str = work_dir_override.unwrap_or(&a.work_dir).to_string();
    let work_dir = expand_home(&work_dir_str);
    let log_level = log_level_override.unwrap_or(&a.log_level).to_string();

    Ok(Config {
        assistant: AssistantConfig {
            bot_name: a.bot_name,
            work_dir,
            log_level,
        },
        comms: CommsConfig {
            axum_channel: AxumChannelConfig {
                enabled: parsed.comms.axum_channel.enabled,
                bind: parsed.comms.axum_channel.bind,
            },
        },
        memory: MemoryConfig {
            db_file: PathBuf::from(parsed.memory.db_file),
        },
        documents: DocumentsConfig {
            dir: PathBuf::from(parsed.documents.dir),
        },
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("test.toml");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn full_config_parses() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            r#"
            [assistant]
            bot_name = "sarah"
            work_dir = "/tmp/sarah-test"
            log_level = "debug"

            [comms.axum_channel]
            enabled = true
            bind = "127.0.0.1:9999"

            [memory]
            db_file = "chat.db"

            [documents]
            dir = "sheets"
            "#,
        );

        let config = load_from(&path, None, None).unwrap();
        assert_eq!(config.assistant.bot_name, "sarah");
        assert_eq!(config.assistant.log_level, "debug");
        assert_eq!(config.comms.axum_channel.bind, "127.0.0.1:9999");
        assert!(config.comms_axum_should_load());
        assert_eq!(config.db_path(), PathBuf::from("/tmp/sarah-test/chat.db"));
        assert_eq!(config.downloads_dir(), PathBuf::from("/tmp/sarah-test/sheets"));
    }

    #[test]
    fn sections_default_when_omitted() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            r#"
            [assistant]
            bot_name = "sarah"
            work_dir = "/tmp/sarah-test"
            log_level = "info"
            "#,
        );

        let config = load_from(&path, None, None).unwrap();
        assert!(config.comms.axum_channel.enabled);
        assert_eq!(config.comms.axum_channel.bind, "127.0.0.1:8000");
        assert_eq!(config.memory.db_file, PathBuf::from("chat_history.db"));
        assert_eq!(config.documents.dir, PathBuf::from("downloads"));
    }

    #[test]
    fn overrides_take_precedence() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            r#"
            [assistant]
            bot_name = "sarah"
            work_dir = "/tmp/from-file"
            log_level = "info"
            "#,
        );

        let config = load_from(&path, Some("/tmp/from-override"), Some("trace")).unwrap();
        assert_eq!(config.assistant.work_dir, PathBuf::from("/tmp/from-override"));
        assert_eq!(config.assistant.log_level, "trace");
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/sarah.toml"), None, None);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_home("rel/path"), PathBuf::from("rel/path"));
    }
}
