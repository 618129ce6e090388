//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! A missing config file is not an error; every field has a usable
//! default, so `internctl login <user>` works out of the box against
//! the deployed backend.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Deployed backend origin, API prefix included.
const DEFAULT_BASE_URL: &str = "https://aau-intern-b.vercel.app/aau_api/";

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Where the session's token pair is persisted between runs.
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_credentials_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("internctl")
        .join("auth_tokens.json")
}

fn default_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            credentials_path: default_credentials_path(),
            request_timeout_secs: default_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment
    /// variables.
    ///
    /// A path that does not exist yields pure defaults; a file that
    /// exists but does not parse is an error, silence there would hide a
    /// typo until a request went to the wrong place.
    pub fn load(path: &Path) -> common::Result<Self> {
        let mut config: Config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            Config::default()
        };

        if let Ok(url) = std::env::var("INTERN_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(p) = std::env::var("INTERN_CREDENTIALS_PATH") {
            config.credentials_path = PathBuf::from(p);
        }
        if let Ok(t) = std::env::var("INTERN_TIMEOUT_SECS") {
            config.request_timeout_secs = t.parse().map_err(|_| {
                common::Error::Config(format!(
                    "INTERN_TIMEOUT_SECS must be a whole number of seconds, got: {t}"
                ))
            })?;
        }

        // Validate base_url is a valid URL with http(s) scheme
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                config.base_url
            )));
        }

        // Validate request_timeout_secs is non-zero
        if config.request_timeout_secs == 0 {
            return Err(common::Error::Config(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or INTERNCTL_CONFIG env var.
    pub fn resolve_path(cli_path: Option<&Path>) -> PathBuf {
        if let Some(p) = cli_path {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("INTERNCTL_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("internctl.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that mutate environment variables,
    /// preventing data races when tests run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn clear_intern_env() {
        unsafe {
            remove_env("INTERN_BASE_URL");
            remove_env("INTERN_CREDENTIALS_PATH");
            remove_env("INTERN_TIMEOUT_SECS");
        }
    }

    fn valid_toml() -> &'static str {
        r#"
base_url = "https://tracker.example.edu/aau_api/"
credentials_path = "/var/lib/internctl/auth_tokens.json"
request_timeout_secs = 10
"#
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_intern_env();

        let config = Config::load(Path::new("/nonexistent/internctl.toml")).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.credentials_path.ends_with("internctl/auth_tokens.json"));
    }

    #[test]
    fn test_load_valid_config() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_intern_env();
        let dir = std::env::temp_dir().join("internctl-test-valid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, valid_toml()).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.base_url, "https://tracker.example.edu/aau_api/");
        assert_eq!(
            config.credentials_path,
            PathBuf::from("/var/lib/internctl/auth_tokens.json")
        );
        assert_eq!(config.request_timeout_secs, 10);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_partial_config_falls_back_per_field() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_intern_env();
        let dir = std::env::temp_dir().join("internctl-test-partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "base_url = \"http://localhost:8000/api/\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000/api/");
        assert_eq!(config.request_timeout_secs, 30);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_invalid_toml() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_intern_env();
        let dir = std::env::temp_dir().join("internctl-test-invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "not valid {{{{ toml").unwrap();

        let result = Config::load(&path);
        assert!(result.is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_env_overrides_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_intern_env();
        let dir = std::env::temp_dir().join("internctl-test-env");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, valid_toml()).unwrap();

        unsafe {
            set_env("INTERN_BASE_URL", "http://127.0.0.1:9000/api/");
            set_env("INTERN_CREDENTIALS_PATH", "/tmp/override-auth.json");
            set_env("INTERN_TIMEOUT_SECS", "5");
        }
        let config = Config::load(&path).unwrap();
        clear_intern_env();

        assert_eq!(config.base_url, "http://127.0.0.1:9000/api/");
        assert_eq!(config.credentials_path, PathBuf::from("/tmp/override-auth.json"));
        assert_eq!(config.request_timeout_secs, 5);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_non_numeric_timeout_env_is_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_intern_env();
        unsafe { set_env("INTERN_TIMEOUT_SECS", "soon") };

        let result = Config::load(Path::new("/nonexistent/internctl.toml"));
        clear_intern_env();

        assert!(matches!(result, Err(common::Error::Config(_))));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_intern_env();
        let dir = std::env::temp_dir().join("internctl-test-scheme");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "base_url = \"ftp://tracker.example.edu/\"\n").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(common::Error::Config(_))));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_intern_env();
        let dir = std::env::temp_dir().join("internctl-test-zero");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "request_timeout_secs = 0\n").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(common::Error::Config(_))));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_resolve_path_prefers_cli_arg() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("INTERNCTL_CONFIG", "/env/internctl.toml") };
        let path = Config::resolve_path(Some(Path::new("/cli/internctl.toml")));
        unsafe { remove_env("INTERNCTL_CONFIG") };
        assert_eq!(path, PathBuf::from("/cli/internctl.toml"));
    }

    #[test]
    fn test_resolve_path_env_fallback() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("INTERNCTL_CONFIG", "/env/internctl.toml") };
        let path = Config::resolve_path(None);
        unsafe { remove_env("INTERNCTL_CONFIG") };
        assert_eq!(path, PathBuf::from("/env/internctl.toml"));
    }

    #[test]
    fn test_resolve_path_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("INTERNCTL_CONFIG") };
        let path = Config::resolve_path(None);
        assert_eq!(path, PathBuf::from("internctl.toml"));
    }
}
