use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: ProviderSelection,
    pub openai: ProviderSettings,
    pub gemini: ProviderSettings,
    pub huggingface: ProviderSettings,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_new_tokens: u32,
}

#[derive(Clone, Debug)]
pub struct ProviderSettings {
    pub api_key: Option<SecretString>,
    pub model: String,
    pub base_url: String,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Hosted or offline text-generation backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Mock,
    OpenAi,
    Gemini,
    HuggingFace,
}

/// Provider as written in configuration; `auto` defers the choice to the
/// credentials that are actually present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderSelection {
    Auto,
    Explicit(LlmProvider),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub llm_provider: Option<ProviderSelection>,
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("unsupported llm provider `{0}` (expected auto|mock|openai|gemini|huggingface)")]
    UnsupportedProvider(String),
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_HUGGINGFACE_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                provider: ProviderSelection::Auto,
                openai: ProviderSettings {
                    api_key: None,
                    model: DEFAULT_OPENAI_MODEL.to_string(),
                    base_url: "https://api.openai.com/v1".to_string(),
                },
                gemini: ProviderSettings {
                    api_key: None,
                    model: DEFAULT_GEMINI_MODEL.to_string(),
                    base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                },
                huggingface: ProviderSettings {
                    api_key: None,
                    model: DEFAULT_HUGGINGFACE_MODEL.to_string(),
                    base_url: "https://api-inference.huggingface.co/models".to_string(),
                },
                timeout_secs: 60,
                temperature: 0.7,
                max_new_tokens: 500,
            },
            storage: StorageConfig { data_dir: PathBuf::from(".") },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl LlmProvider {
    pub const ALL: [LlmProvider; 4] =
        [LlmProvider::Mock, LlmProvider::OpenAi, LlmProvider::Gemini, LlmProvider::HuggingFace];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::HuggingFace => "huggingface",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Mock => "Mock (offline)",
            Self::OpenAi => "OpenAI",
            Self::Gemini => "Google Gemini",
            Self::HuggingFace => "Hugging Face",
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            "huggingface" => Ok(Self::HuggingFace),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

impl std::str::FromStr for ProviderSelection {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        value.parse().map(Self::Explicit)
    }
}

impl std::fmt::Display for ProviderSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Explicit(provider) => provider.fmt(f),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl ProviderSettings {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().map(|key| !key.expose_secret().trim().is_empty()).unwrap_or(false)
    }
}

impl LlmConfig {
    /// Resolves `auto` to the first hosted provider with a credential, in the
    /// order openai, gemini, huggingface, and to `mock` when none is present.
    pub fn resolve_provider(&self) -> LlmProvider {
        match self.provider {
            ProviderSelection::Explicit(provider) => provider,
            ProviderSelection::Auto => [
                (LlmProvider::OpenAi, &self.openai),
                (LlmProvider::Gemini, &self.gemini),
                (LlmProvider::HuggingFace, &self.huggingface),
            ]
            .into_iter()
            .find(|(_, settings)| settings.has_api_key())
            .map(|(provider, _)| provider)
            .unwrap_or(LlmProvider::Mock),
        }
    }

    pub fn settings_for(&self, provider: LlmProvider) -> Option<&ProviderSettings> {
        match provider {
            LlmProvider::Mock => None,
            LlmProvider::OpenAi => Some(&self.openai),
            LlmProvider::Gemini => Some(&self.gemini),
            LlmProvider::HuggingFace => Some(&self.huggingface),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("inboxpilot.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider.parse()?;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
            if let Some(temperature) = llm.temperature {
                self.llm.temperature = temperature;
            }
            if let Some(max_new_tokens) = llm.max_new_tokens {
                self.llm.max_new_tokens = max_new_tokens;
            }
            if let Some(openai) = llm.openai {
                openai.apply_to(&mut self.llm.openai);
            }
            if let Some(gemini) = llm.gemini {
                gemini.apply_to(&mut self.llm.gemini);
            }
            if let Some(huggingface) = llm.huggingface {
                huggingface.apply_to(&mut self.llm.huggingface);
            }
        }

        if let Some(storage) = patch.storage {
            if let Some(data_dir) = storage.data_dir {
                self.storage.data_dir = data_dir;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("INBOXPILOT_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = read_env("INBOXPILOT_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("INBOXPILOT_LLM_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("INBOXPILOT_LLM_TEMPERATURE") {
            self.llm.temperature = parse_f32("INBOXPILOT_LLM_TEMPERATURE", &value)?;
        }
        if let Some(value) = read_env("INBOXPILOT_LLM_MAX_NEW_TOKENS") {
            self.llm.max_new_tokens = parse_u32("INBOXPILOT_LLM_MAX_NEW_TOKENS", &value)?;
        }

        apply_provider_env(&mut self.llm.openai, "OPENAI");
        apply_provider_env(&mut self.llm.gemini, "GEMINI");
        apply_provider_env(&mut self.llm.huggingface, "HUGGINGFACE");

        if let Some(value) = read_env("INBOXPILOT_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(value);
        }

        let log_level =
            read_env("INBOXPILOT_LOGGING_LEVEL").or_else(|| read_env("INBOXPILOT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("INBOXPILOT_LOGGING_FORMAT").or_else(|| read_env("INBOXPILOT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(provider) = overrides.llm_provider {
            self.llm.provider = provider;
        }
        if let Some(data_dir) = overrides.data_dir {
            self.storage.data_dir = data_dir;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_llm(&self.llm)?;
        validate_storage(&self.storage)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn apply_provider_env(settings: &mut ProviderSettings, prefix: &str) {
    if let Some(value) = read_env(&format!("{prefix}_API_KEY")) {
        settings.api_key = Some(secret_value(value));
    }
    if let Some(value) = read_env(&format!("{prefix}_MODEL")) {
        settings.model = value;
    }
    if let Some(value) = read_env(&format!("{prefix}_BASE_URL")) {
        settings.base_url = value;
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("inboxpilot.toml"), PathBuf::from("config/inboxpilot.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if !(0.0..=2.0).contains(&llm.temperature) {
        return Err(ConfigError::Validation(
            "llm.temperature must be in range 0.0..=2.0".to_string(),
        ));
    }

    if llm.max_new_tokens == 0 {
        return Err(ConfigError::Validation(
            "llm.max_new_tokens must be greater than zero".to_string(),
        ));
    }

    // Missing API keys are deliberately not checked here: they surface as
    // backend call errors when a request is made.
    for (name, settings) in
        [("openai", &llm.openai), ("gemini", &llm.gemini), ("huggingface", &llm.huggingface)]
    {
        if settings.model.trim().is_empty() {
            return Err(ConfigError::Validation(format!("llm.{name}.model must not be empty")));
        }
        let base_url = settings.base_url.trim();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "llm.{name}.base_url must start with http:// or https://"
            )));
        }
    }

    Ok(())
}

fn validate_storage(storage: &StorageConfig) -> Result<(), ConfigError> {
    if storage.data_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("storage.data_dir must not be empty".to_string()));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f32(key: &str, value: &str) -> Result<f32, ConfigError> {
    value.parse::<f32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    llm: Option<LlmPatch>,
    storage: Option<StoragePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<String>,
    timeout_secs: Option<u64>,
    temperature: Option<f32>,
    max_new_tokens: Option<u32>,
    openai: Option<ProviderPatch>,
    gemini: Option<ProviderPatch>,
    huggingface: Option<ProviderPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderPatch {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
}

impl ProviderPatch {
    fn apply_to(self, settings: &mut ProviderSettings) {
        if let Some(api_key) = self.api_key {
            settings.api_key = Some(secret_value(api_key));
        }
        if let Some(model) = self.model {
            settings.model = model;
        }
        if let Some(base_url) = self.base_url {
            settings.base_url = base_url;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct StoragePatch {
    data_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
