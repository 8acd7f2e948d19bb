use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};
use url::Url;

use crate::errors::{IntakeError, Result};
use crate::profiles::{Profile, DEFAULT_PROFILE};

pub const ENDPOINT_ENV: &str = "W3_INTAKE_ENDPOINT";
pub const PROFILE_ENV: &str = "W3_INTAKE_PROFILE";

const APP_DIR: &str = "w3-intake";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Deployment settings for the intake wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeConfig {
    #[serde(default = "IntakeConfig::default_profile")]
    pub profile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "IntakeConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra request headers, e.g. `apikey` for Supabase.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl IntakeConfig {
    fn default_profile() -> String {
        DEFAULT_PROFILE.to_string()
    }

    fn default_timeout_secs() -> u64 {
        DEFAULT_TIMEOUT_SECS
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Applies environment overrides using `lookup` as the variable source.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|value| !value.trim().is_empty()) {
            self.endpoint = Some(endpoint.trim().to_string());
        }
        if let Some(profile) = lookup(PROFILE_ENV).filter(|value| !value.trim().is_empty()) {
            self.profile = profile.trim().to_string();
        }
    }

    /// Endpoint from configuration, falling back to the profile default.
    pub fn resolve_endpoint(&self, profile: &Profile) -> Result<Url> {
        let raw = self
            .endpoint
            .as_deref()
            .or(profile.default_endpoint)
            .ok_or_else(|| {
                IntakeError::Config(format!(
                    "profile `{}` has no default endpoint; set {} or `endpoint` in the config file",
                    profile.name, ENDPOINT_ENV
                ))
            })?;
        parse_endpoint(raw)
    }

    /// Profile defaults overlaid with configured headers.
    pub fn merged_headers(&self, profile: &Profile) -> BTreeMap<String, String> {
        let mut headers: BTreeMap<String, String> = profile
            .default_headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        headers.extend(self.headers.clone());
        headers
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            profile: Self::default_profile(),
            endpoint: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            headers: BTreeMap::new(),
        }
    }
}

/// Only absolute `http`/`https` URLs are accepted.
pub fn parse_endpoint(raw: &str) -> Result<Url> {
    let invalid = |reason: String| IntakeError::InvalidEndpoint {
        endpoint: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme `{}`", other))),
    }
}

/// Loads and persists [`IntakeConfig`] as JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Uses `<platform config dir>/w3-intake/config.json`.
    pub fn new() -> Result<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| IntakeError::Config("no configuration directory available".into()))?;
        Ok(Self::with_base_dir(base.join(APP_DIR)))
    }

    pub fn with_base_dir(base: PathBuf) -> Self {
        Self {
            path: base.join(CONFIG_FILE),
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the config file, or returns defaults when it does not exist.
    pub fn load(&self) -> Result<IntakeConfig> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data).map_err(|err| {
                IntakeError::Config(format!("{}: {}", self.path.display(), err))
            })
        } else {
            Ok(IntakeConfig::default())
        }
    }

    /// [`load`](Self::load) followed by process environment overrides.
    pub fn load_with_env(&self) -> Result<IntakeConfig> {
        let mut config = self.load()?;
        config.apply_overrides(|name| env::var(name).ok());
        Ok(config)
    }

    pub fn save(&self, config: &IntakeConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles;

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("/a/config.json")),
            PathBuf::from("/a/config.json.tmp")
        );
        assert_eq!(tmp_path(Path::new("/a/config")), PathBuf::from("/a/config.tmp"));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = IntakeConfig {
            endpoint: Some("http://file.example/hook".into()),
            ..IntakeConfig::default()
        };
        config.apply_overrides(|name| match name {
            ENDPOINT_ENV => Some(" https://env.example/hook ".into()),
            PROFILE_ENV => Some("instant-demo".into()),
            _ => None,
        });
        assert_eq!(config.endpoint.as_deref(), Some("https://env.example/hook"));
        assert_eq!(config.profile, "instant-demo");
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let mut config = IntakeConfig::default();
        config.apply_overrides(|_| Some("   ".into()));
        assert_eq!(config, IntakeConfig::default());
    }

    #[test]
    fn endpoint_falls_back_to_profile_default() {
        let profile = profiles::find("research").unwrap();
        let url = IntakeConfig::default().resolve_endpoint(&profile).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/research/start");

        let speed = profiles::find("speed-to-lead").unwrap();
        assert!(matches!(
            IntakeConfig::default().resolve_endpoint(&speed),
            Err(IntakeError::Config(_))
        ));
    }

    #[test]
    fn non_http_endpoints_are_rejected() {
        assert!(matches!(
            parse_endpoint("ftp://example.com/upload"),
            Err(IntakeError::InvalidEndpoint { .. })
        ));
        assert!(parse_endpoint("not a url").is_err());
    }

    #[test]
    fn configured_headers_win_over_profile_defaults() {
        let profile = profiles::find("discovery").unwrap();
        let mut config = IntakeConfig::default();
        config
            .headers
            .insert("Prefer".into(), "return=minimal".into());
        config.headers.insert("apikey".into(), "anon".into());

        let headers = config.merged_headers(&profile);
        assert_eq!(headers["Prefer"], "return=minimal");
        assert_eq!(headers["apikey"], "anon");
    }
}
