//! Runtime configuration.
//!
//! All settings come from `GLYCOCHECK_*` environment variables and are read
//! once at startup.

use std::path::PathBuf;

/// Default sanitizer input cap (16 KiB).
pub const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File when attached to a terminal, stdout otherwise
    #[default]
    Auto,
    File,
    Stdout,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value.trim() {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    /// Whether to log to a file given the terminal state.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Model directory, or the artifact file itself
    pub model_path: PathBuf,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    /// Abort startup when the model expects columns the encoder cannot produce
    pub strict_schema: bool,
    /// Refuse model directories without a signed manifest
    pub require_signed_model: bool,
    /// File holding the base64 Ed25519 verifying key
    pub model_pubkey_file: Option<PathBuf>,
    pub sanitize_max_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models"),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("glycocheck.log"),
            strict_schema: false,
            require_signed_model: false,
            model_pubkey_file: None,
            sanitize_max_bytes: DEFAULT_SANITIZE_MAX_BYTES,
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "TRUE" | "yes" | "YES")
}

impl Settings {
    /// Read settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            model_path: lookup("GLYCOCHECK_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            log_mode: lookup("GLYCOCHECK_LOG_MODE")
                .map(|v| LogMode::parse(&v))
                .unwrap_or(defaults.log_mode),
            log_file: lookup("GLYCOCHECK_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
            strict_schema: lookup("GLYCOCHECK_STRICT_SCHEMA")
                .map(|v| parse_bool(&v))
                .unwrap_or(defaults.strict_schema),
            require_signed_model: lookup("GLYCOCHECK_REQUIRE_SIGNED_MODEL")
                .map(|v| parse_bool(&v))
                .unwrap_or(defaults.require_signed_model),
            model_pubkey_file: lookup("GLYCOCHECK_MODEL_PUBKEY_B64_FILE")
                .map(|v| PathBuf::from(v.trim())),
            sanitize_max_bytes: lookup("GLYCOCHECK_SANITIZE_MAX_BYTES")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&v| v > 0)
                .unwrap_or(defaults.sanitize_max_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.model_path, PathBuf::from("models"));
        assert!(!settings.strict_schema);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("GLYCOCHECK_MODEL_PATH", "/opt/model"),
            ("GLYCOCHECK_LOG_MODE", "stdout"),
            ("GLYCOCHECK_STRICT_SCHEMA", "yes"),
            ("GLYCOCHECK_REQUIRE_SIGNED_MODEL", "1"),
            ("GLYCOCHECK_MODEL_PUBKEY_B64_FILE", " /run/secrets/key \n"),
            ("GLYCOCHECK_SANITIZE_MAX_BYTES", "2048"),
        ]));

        assert_eq!(settings.model_path, PathBuf::from("/opt/model"));
        assert_eq!(settings.log_mode, LogMode::Stdout);
        assert!(settings.strict_schema);
        assert!(settings.require_signed_model);
        assert_eq!(
            settings.model_pubkey_file,
            Some(PathBuf::from("/run/secrets/key"))
        );
        assert_eq!(settings.sanitize_max_bytes, 2048);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("GLYCOCHECK_STRICT_SCHEMA", "maybe"),
            ("GLYCOCHECK_SANITIZE_MAX_BYTES", "0"),
            ("GLYCOCHECK_LOG_MODE", "syslog"),
        ]));
        assert!(!settings.strict_schema);
        assert_eq!(settings.sanitize_max_bytes, DEFAULT_SANITIZE_MAX_BYTES);
        assert_eq!(settings.log_mode, LogMode::Auto);
    }

    #[test]
    fn test_log_mode_use_file() {
        assert!(LogMode::Auto.use_file(true));
        assert!(!LogMode::Auto.use_file(false));
        assert!(LogMode::File.use_file(false));
        assert!(!LogMode::Stdout.use_file(true));
    }
}
