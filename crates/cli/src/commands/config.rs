use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use inboxpilot_core::config::{AppConfig, LoadOptions, ProviderSettings};
use secrecy::ExposeSecret;
use toml::Value;

struct Field {
    key: String,
    value: String,
    env_keys: Vec<String>,
    overridden: bool,
}

/// Renders the effective configuration with the source of every value.
pub fn run(options: LoadOptions) -> String {
    let config_file_path = detect_config_path(options.config_path.as_deref());
    let provider_flag = options.overrides.llm_provider.is_some();
    let data_dir_flag = options.overrides.data_dir.is_some();
    let log_level_flag = options.overrides.log_level.is_some();

    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut fields = vec![
        field("llm.provider", config.llm.provider.to_string(), &["INBOXPILOT_LLM_PROVIDER"], provider_flag),
        field(
            "llm.timeout_secs",
            config.llm.timeout_secs.to_string(),
            &["INBOXPILOT_LLM_TIMEOUT_SECS"],
            false,
        ),
        field(
            "llm.temperature",
            config.llm.temperature.to_string(),
            &["INBOXPILOT_LLM_TEMPERATURE"],
            false,
        ),
        field(
            "llm.max_new_tokens",
            config.llm.max_new_tokens.to_string(),
            &["INBOXPILOT_LLM_MAX_NEW_TOKENS"],
            false,
        ),
    ];
    fields.extend(provider_fields("openai", "OPENAI", &config.llm.openai));
    fields.extend(provider_fields("gemini", "GEMINI", &config.llm.gemini));
    fields.extend(provider_fields("huggingface", "HUGGINGFACE", &config.llm.huggingface));
    fields.push(field(
        "storage.data_dir",
        config.storage.data_dir.display().to_string(),
        &["INBOXPILOT_DATA_DIR"],
        data_dir_flag,
    ));
    fields.push(field(
        "logging.level",
        config.logging.level.clone(),
        &["INBOXPILOT_LOGGING_LEVEL", "INBOXPILOT_LOG_LEVEL"],
        log_level_flag,
    ));
    fields.push(field(
        "logging.format",
        format!("{:?}", config.logging.format).to_lowercase(),
        &["INBOXPILOT_LOGGING_FORMAT", "INBOXPILOT_LOG_FORMAT"],
        false,
    ));

    let mut lines =
        vec!["effective config (source precedence: flag > env > file > default):".to_string()];
    lines.extend(fields.iter().map(|field| {
        let source = field_source(field, config_file_doc.as_ref(), config_file_path.as_deref());
        render_line(&field.key, &field.value, source)
    }));
    lines.push(format!("- llm.active_provider = {} (derived)", config.llm.resolve_provider()));

    lines.join("\n")
}

fn field(key: &str, value: String, env_keys: &[&str], overridden: bool) -> Field {
    Field {
        key: key.to_string(),
        value,
        env_keys: env_keys.iter().map(|key| key.to_string()).collect(),
        overridden,
    }
}

fn provider_fields(name: &str, env_prefix: &str, settings: &ProviderSettings) -> Vec<Field> {
    let api_key = match &settings.api_key {
        Some(key) => redact_token(key.expose_secret()),
        None => "<unset>".to_string(),
    };

    [("api_key", api_key), ("model", settings.model.clone()), ("base_url", settings.base_url.clone())]
        .into_iter()
        .map(|(suffix, value)| {
            let env_key = format!("{env_prefix}_{}", suffix.to_uppercase());
            field(&format!("llm.{name}.{suffix}"), value, &[env_key.as_str()], false)
        })
        .collect()
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("inboxpilot.toml"), PathBuf::from("config/inboxpilot.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    field: &Field,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if field.overridden {
        return "flag".to_string();
    }

    if let Some(env_key) = field.env_keys.iter().find(|key| env::var_os(key.as_str()).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, &field.key) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
