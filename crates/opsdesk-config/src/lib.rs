use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

const APP_DIR: &str = "opsdesk";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DIRECTORY_TOKEN_ENV: &str = "OPSDESK_DIRECTORY_TOKEN";
pub const MAX_DIRECTORY_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub directory: Option<DirectoryConfig>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub location_id: Option<String>,
    pub api_version: Option<String>,
    pub page_size: Option<u32>,
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind: default_bind(),
            },
            store: StoreConfig::default(),
            directory: None,
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid server.bind value: {0}")]
    InvalidBind(String),
    #[error("invalid store.path value: {0}")]
    InvalidStorePath(PathBuf),
    #[error("invalid directory.{field} value: {message}")]
    InvalidDirectoryField {
        field: &'static str,
        message: String,
    },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    server: Option<ServerFile>,
    store: Option<StoreFile>,
    directory: Option<DirectoryFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerFile {
    bind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoreFile {
    path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DirectoryFile {
    base_url: String,
    token: Option<String>,
    location_id: Option<String>,
    api_version: Option<String>,
    page_size: Option<u32>,
    user_agent: Option<String>,
    timeout_secs: Option<u64>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let env_token = env::var(DIRECTORY_TOKEN_ENV).ok();
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    let mut config = load_at_path(&path, required)?.unwrap_or_default();
    apply_token_override(&mut config, env_token);
    Ok(config)
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(bind) = parsed.server.and_then(|server| server.bind) {
        config.server.bind = bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind.clone()))?;
    }

    if let Some(path) = parsed.store.and_then(|store| store.path) {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidStorePath(path));
        }
        config.store.path = Some(path);
    }

    if let Some(directory) = parsed.directory {
        config.directory = Some(validate_directory(directory)?);
    }

    Ok(config)
}

fn validate_directory(file: DirectoryFile) -> Result<DirectoryConfig> {
    let base_url = file.base_url.trim().to_string();
    let parsed = Url::parse(&base_url).map_err(|err| ConfigError::InvalidDirectoryField {
        field: "base_url",
        message: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidDirectoryField {
            field: "base_url",
            message: "must use http or https".to_string(),
        });
    }

    if let Some(page_size) = file.page_size {
        if page_size == 0 || page_size > MAX_DIRECTORY_PAGE_SIZE {
            return Err(ConfigError::InvalidDirectoryField {
                field: "page_size",
                message: format!("must be between 1 and {MAX_DIRECTORY_PAGE_SIZE}"),
            });
        }
    }

    if file.timeout_secs == Some(0) {
        return Err(ConfigError::InvalidDirectoryField {
            field: "timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    Ok(DirectoryConfig {
        base_url,
        token: non_blank(file.token),
        location_id: non_blank(file.location_id),
        api_version: non_blank(file.api_version),
        page_size: file.page_size,
        user_agent: non_blank(file.user_agent),
        timeout_secs: file.timeout_secs,
    })
}

fn apply_token_override(config: &mut AppConfig, token: Option<String>) {
    let Some(token) = non_blank(token) else {
        return;
    };
    if let Some(directory) = config.directory.as_mut() {
        directory.token = Some(token);
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        apply_token_override, load_at_path, merge_config, AppConfig, ConfigError, ConfigFile,
        DirectoryFile, ServerFile, DEFAULT_BIND,
    };
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn restrict_permissions(path: &Path) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path).expect("metadata").permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).expect("chmod");
        }
    }

    fn directory(base_url: &str) -> DirectoryFile {
        DirectoryFile {
            base_url: base_url.to_string(),
            token: None,
            location_id: None,
            api_version: None,
            page_size: None,
            user_agent: None,
            timeout_secs: None,
        }
    }

    #[test]
    fn defaults_have_no_sources() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind.to_string(), DEFAULT_BIND);
        assert!(config.store.path.is_none());
        assert!(config.directory.is_none());
    }

    #[test]
    fn merge_config_applies_values() {
        let parsed = ConfigFile {
            server: Some(ServerFile {
                bind: Some("0.0.0.0:9000".to_string()),
            }),
            store: None,
            directory: Some(DirectoryFile {
                token: Some("  tok ".to_string()),
                page_size: Some(50),
                user_agent: Some("   ".to_string()),
                ..directory("https://crm.example.com/contacts/")
            }),
        };
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged.server.bind.port(), 9000);
        let directory = merged.directory.expect("directory");
        assert_eq!(directory.token.as_deref(), Some("tok"));
        assert_eq!(directory.page_size, Some(50));
        assert!(directory.user_agent.is_none());
    }

    #[test]
    fn merge_config_rejects_bad_values() {
        let bad_bind = ConfigFile {
            server: Some(ServerFile {
                bind: Some("localhost".to_string()),
            }),
            ..Default::default()
        };
        assert!(matches!(
            merge_config(bad_bind),
            Err(ConfigError::InvalidBind(_))
        ));

        for file in [
            directory("ftp://crm.example.com/"),
            directory("not a url"),
            DirectoryFile {
                page_size: Some(0),
                ..directory("https://crm.example.com/")
            },
            DirectoryFile {
                page_size: Some(101),
                ..directory("https://crm.example.com/")
            },
            DirectoryFile {
                timeout_secs: Some(0),
                ..directory("https://crm.example.com/")
            },
        ] {
            let parsed = ConfigFile {
                directory: Some(file),
                ..Default::default()
            };
            assert!(matches!(
                merge_config(parsed),
                Err(ConfigError::InvalidDirectoryField { .. })
            ));
        }
    }

    #[test]
    fn token_override_only_applies_to_configured_directory() {
        let mut config = AppConfig::default();
        apply_token_override(&mut config, Some("env-token".to_string()));
        assert!(config.directory.is_none());

        let parsed = ConfigFile {
            directory: Some(DirectoryFile {
                token: Some("file-token".to_string()),
                ..directory("https://crm.example.com/")
            }),
            ..Default::default()
        };
        let mut config = merge_config(parsed).expect("merge");
        apply_token_override(&mut config, Some(" ".to_string()));
        assert_eq!(
            config.directory.as_ref().and_then(|d| d.token.as_deref()),
            Some("file-token")
        );
        apply_token_override(&mut config, Some("env-token".to_string()));
        assert_eq!(
            config.directory.as_ref().and_then(|d| d.token.as_deref()),
            Some("env-token")
        );
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("config file not found"));
        assert!(load_at_path(&missing, false).expect("optional").is_none());
    }

    #[test]
    fn load_at_path_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[server]\nbind = \"127.0.0.1:9090\"\n\n[store]\npath = \"/tmp/opsdesk.sqlite3\"\n\n[directory]\nbase_url = \"https://crm.example.com/contacts/\"\nlocation_id = \"loc_1\"\ntimeout_secs = 15\n",
        )
        .expect("write config");
        restrict_permissions(&path);

        let config = load_at_path(&path, true).expect("load").expect("config");
        assert_eq!(config.server.bind.port(), 9090);
        assert_eq!(
            config.store.path.as_deref(),
            Some(Path::new("/tmp/opsdesk.sqlite3"))
        );
        let directory = config.directory.expect("directory");
        assert_eq!(directory.location_id.as_deref(), Some("loc_1"));
        assert_eq!(directory.timeout_secs, Some(15));
    }

    #[test]
    fn load_at_path_rejects_unknown_keys() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "[server]\nport = 8080\n").expect("write config");
        restrict_permissions(&path);

        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn load_at_path_rejects_world_readable_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "").expect("write config");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("chmod");

        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::InsecurePermissions(_)));
    }
}
