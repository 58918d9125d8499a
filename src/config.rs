//! Configuration file loading and merging with CLI flags.
//!
//! Precedence: command-line flags, then the config file, then built-in defaults.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use cvjson_core::enrich::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MIN_CONFIDENCE, DEFAULT_REQUEST_DELAY, EnrichOptions,
};
use cvjson_core::parser::{ExtractOptions, SectionLabels};

use crate::cli::Args;

/// Values read from the config file; every key is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileConfig {
    /// Contact email for the DOI services.
    pub mailto: Option<String>,
    pub request_delay_ms: Option<u64>,
    pub max_attempts: Option<u32>,
    pub min_confidence: Option<f64>,
    pub publications_section: Option<String>,
    pub talks_section: Option<String>,
    pub grants_section: Option<String>,
    /// Extract contact and education by default.
    pub profile: Option<bool>,
}

impl FileConfig {
    /// Validates config values against the same ranges the CLI accepts.
    pub fn validate(&self) -> Result<()> {
        if let Some(delay) = self.request_delay_ms
            && delay > 60_000
        {
            bail!("Invalid config value for `request_delay_ms`: {delay}. Expected range: 0..=60000");
        }

        if let Some(attempts) = self.max_attempts
            && !(1..=10).contains(&attempts)
        {
            bail!("Invalid config value for `max_attempts`: {attempts}. Expected range: 1..=10");
        }

        if let Some(confidence) = self.min_confidence
            && !(0.0..=1.0).contains(&confidence)
        {
            bail!(
                "Invalid config value for `min_confidence`: {confidence}. Expected range: 0.0..=1.0"
            );
        }

        for (field, value) in [
            ("publications_section", &self.publications_section),
            ("talks_section", &self.talks_section),
            ("grants_section", &self.grants_section),
        ] {
            if value.as_deref().is_some_and(|label| label.trim().is_empty()) {
                bail!("Invalid config value for `{field}`: section label must not be empty");
            }
        }

        Ok(())
    }
}

/// Result of looking for the config file.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub path: Option<PathBuf>,
    pub config: Option<FileConfig>,
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/cvjson/config.toml`
/// 2. `$HOME/.config/cvjson/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    config_path_from(env_var_non_empty_os("XDG_CONFIG_HOME"), env_var_non_empty_os("HOME"))
}

fn config_path_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    if let Some(xdg_config_home) = xdg_config_home {
        return Some(PathBuf::from(xdg_config_home).join("cvjson").join("config.toml"));
    }

    let home = home?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("cvjson")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from `explicit` if given, else from the default path if present.
///
/// An explicit path that does not exist is an error; a missing default file
/// is not.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = load_file_config(path)?;
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config: Some(config),
        });
    }

    let path = resolve_default_config_path();
    let Some(path_ref) = path.as_deref() else {
        return Ok(LoadedConfig { path, config: None });
    };

    if !path_ref.exists() {
        return Ok(LoadedConfig { path, config: None });
    }

    let config = load_file_config(path_ref)?;
    Ok(LoadedConfig {
        path,
        config: Some(config),
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "mailto" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `mailto` value on line {line_no}"))?;
                cfg.mailto = Some(parsed);
            }
            "request_delay_ms" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `request_delay_ms` value on line {line_no}")
                })?;
                cfg.request_delay_ms = Some(parsed);
            }
            "max_attempts" => {
                let parsed = parse_integer_u64(value)
                    .with_context(|| format!("Invalid `max_attempts` value on line {line_no}"))?;
                let n = u32::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("max_attempts out of range for u32"))?;
                cfg.max_attempts = Some(n);
            }
            "min_confidence" => {
                let parsed = parse_float(value).with_context(|| {
                    format!("Invalid `min_confidence` value on line {line_no}")
                })?;
                cfg.min_confidence = Some(parsed);
            }
            "publications_section" => {
                let parsed = parse_string_literal(value).with_context(|| {
                    format!("Invalid `publications_section` value on line {line_no}")
                })?;
                cfg.publications_section = Some(parsed);
            }
            "talks_section" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `talks_section` value on line {line_no}"))?;
                cfg.talks_section = Some(parsed);
            }
            "grants_section" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `grants_section` value on line {line_no}"))?;
                cfg.grants_section = Some(parsed);
            }
            "profile" => {
                let parsed = parse_boolean(value)
                    .with_context(|| format!("Invalid `profile` value on line {line_no}"))?;
                cfg.profile = Some(parsed);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_float(raw_value: &str) -> Result<f64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected numeric value");
    }
    let value = token.parse::<f64>()?;
    if !value.is_finite() {
        bail!("Expected a finite number");
    }
    Ok(value)
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}

/// Effective settings after merging CLI flags with the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub extract: ExtractOptions,
    pub enrich: EnrichOptions,
}

impl Settings {
    /// Merges CLI flags over file values over defaults.
    #[must_use]
    pub fn resolve(args: &Args, file: Option<&FileConfig>) -> Self {
        let file = file.cloned().unwrap_or_default();
        let defaults = SectionLabels::default();

        let sections = SectionLabels {
            publications: args
                .publications_section
                .clone()
                .or(file.publications_section)
                .unwrap_or(defaults.publications),
            talks: args
                .talks_section
                .clone()
                .or(file.talks_section)
                .unwrap_or(defaults.talks),
            grants: args
                .grants_section
                .clone()
                .or(file.grants_section)
                .unwrap_or(defaults.grants),
        };

        let request_delay = args
            .request_delay_ms
            .or(file.request_delay_ms)
            .map_or(DEFAULT_REQUEST_DELAY, Duration::from_millis);

        Self {
            extract: ExtractOptions {
                sections,
                include_profile: args.profile || file.profile.unwrap_or(false),
            },
            enrich: EnrichOptions {
                mailto: args.mailto.clone().or(file.mailto),
                request_delay,
                max_attempts: args
                    .max_attempts
                    .or(file.max_attempts)
                    .unwrap_or(DEFAULT_MAX_ATTEMPTS),
                min_confidence: args
                    .min_confidence
                    .or(file.min_confidence)
                    .unwrap_or(DEFAULT_MIN_CONFIDENCE),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
# cvjson settings
mailto = "me@example.edu"
request_delay_ms = 250
max_attempts = 5
min_confidence = 0.9
publications_section = "Papers"   # trailing comment
talks_section = "Talks"
grants_section = "Funding"
profile = true
"#,
        )
        .unwrap();

        assert_eq!(cfg.mailto.as_deref(), Some("me@example.edu"));
        assert_eq!(cfg.request_delay_ms, Some(250));
        assert_eq!(cfg.max_attempts, Some(5));
        assert_eq!(cfg.min_confidence, Some(0.9));
        assert_eq!(cfg.publications_section.as_deref(), Some("Papers"));
        assert_eq!(cfg.talks_section.as_deref(), Some("Talks"));
        assert_eq!(cfg.grants_section.as_deref(), Some("Funding"));
        assert_eq!(cfg.profile, Some(true));
    }

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str("max_attempts = 2\n").unwrap();
        assert_eq!(cfg.max_attempts, Some(2));
        assert!(cfg.mailto.is_none());
        assert!(cfg.profile.is_none());
    }

    #[test]
    fn test_parse_config_hash_inside_string_is_kept() {
        let cfg = parse_config_str(r#"talks_section = "Talks #1""#).unwrap();
        assert_eq!(cfg.talks_section.as_deref(), Some("Talks #1"));
    }

    #[test]
    fn test_parse_config_unknown_key_fails() {
        let err = parse_config_str("concurrency = 4").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_parse_config_invalid_syntax_fails() {
        let err = parse_config_str("\nmailto").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_config_invalid_values_fail() {
        assert!(parse_config_str("mailto = me@example.edu").is_err());
        assert!(parse_config_str("profile = yes").is_err());
        assert!(parse_config_str("request_delay_ms = -1").is_err());
        assert!(parse_config_str("min_confidence = high").is_err());
    }

    #[test]
    fn test_parse_config_out_of_range_values_fail() {
        let err = parse_config_str("max_attempts = 0").unwrap_err();
        assert!(err.to_string().contains("max_attempts"));

        let err = parse_config_str("request_delay_ms = 60001").unwrap_err();
        assert!(err.to_string().contains("request_delay_ms"));

        let err = parse_config_str("min_confidence = 1.2").unwrap_err();
        assert!(err.to_string().contains("min_confidence"));

        let err = parse_config_str(r#"grants_section = " ""#).unwrap_err();
        assert!(err.to_string().contains("grants_section"));
    }

    #[test]
    fn test_config_path_prefers_xdg() {
        let path = config_path_from(Some("/xdg".into()), Some("/home/me".into())).unwrap();
        assert_eq!(path, PathBuf::from("/xdg/cvjson/config.toml"));

        let path = config_path_from(None, Some("/home/me".into())).unwrap();
        assert_eq!(path, PathBuf::from("/home/me/.config/cvjson/config.toml"));

        assert!(config_path_from(None, None).is_none());
    }

    #[test]
    fn test_load_config_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "profile = true\n").unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
        assert_eq!(loaded.config.unwrap().profile, Some(true));
    }

    #[test]
    fn test_load_config_explicit_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_settings_defaults_without_file() {
        let args = Args::try_parse_from(["cv-to-json"]).unwrap();
        let settings = Settings::resolve(&args, None);

        assert_eq!(settings.extract, ExtractOptions::default());
        assert_eq!(settings.enrich, EnrichOptions::default());
    }

    #[test]
    fn test_settings_file_overrides_defaults() {
        let args = Args::try_parse_from(["cv-to-json"]).unwrap();
        let file = FileConfig {
            talks_section: Some("Talks".to_string()),
            request_delay_ms: Some(0),
            profile: Some(true),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(&args, Some(&file));

        assert_eq!(settings.extract.sections.talks, "Talks");
        assert_eq!(settings.extract.sections.publications, "Publications");
        assert!(settings.extract.include_profile);
        assert_eq!(settings.enrich.request_delay, Duration::ZERO);
    }

    #[test]
    fn test_settings_cli_overrides_file() {
        let args = Args::try_parse_from([
            "cv-to-json",
            "--talks-section",
            "Invited",
            "--mailto",
            "cli@example.edu",
            "--min-confidence",
            "0.5",
        ])
        .unwrap();
        let file = FileConfig {
            talks_section: Some("Talks".to_string()),
            mailto: Some("file@example.edu".to_string()),
            min_confidence: Some(0.95),
            max_attempts: Some(7),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(&args, Some(&file));

        assert_eq!(settings.extract.sections.talks, "Invited");
        assert_eq!(settings.enrich.mailto.as_deref(), Some("cli@example.edu"));
        assert!((settings.enrich.min_confidence - 0.5).abs() < f64::EPSILON);
        assert_eq!(settings.enrich.max_attempts, 7);
    }
}
