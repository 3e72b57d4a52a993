use std::fs;
use std::path::Path;

use inboxpilot_core::config::{AppConfig, LlmProvider, LoadOptions, ProviderSelection};
use inboxpilot_core::domain::draft::Draft;
use inboxpilot_core::domain::email::Email;
use inboxpilot_core::domain::prompt::PromptRegistry;
use inboxpilot_store::{DRAFTS_FILE, EMAILS_FILE, PROMPTS_FILE};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: LoadOptions, json_output: bool) -> String {
    let report = build_report(options);

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report(options: LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_provider_readiness(&config));
            checks.push(check_data_dir(&config.storage.data_dir));
            checks.push(check_documents(&config.storage.data_dir));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["provider_readiness", "data_dir", "stored_documents"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

/// An explicitly chosen hosted provider without a key would fail every call.
fn check_provider_readiness(config: &AppConfig) -> DoctorCheck {
    let provider = config.llm.resolve_provider();
    let name = "provider_readiness";

    let Some(settings) = config.llm.settings_for(provider) else {
        let details = match config.llm.provider {
            ProviderSelection::Auto => "no API key found, using the offline mock backend",
            ProviderSelection::Explicit(_) => "offline mock backend selected",
        };
        return DoctorCheck { name, status: CheckStatus::Pass, details: details.to_string() };
    };

    if settings.has_api_key() {
        DoctorCheck {
            name,
            status: CheckStatus::Pass,
            details: format!("{} ready with model `{}`", provider.label(), settings.model),
        }
    } else {
        DoctorCheck {
            name,
            status: CheckStatus::Fail,
            details: format!(
                "{} selected but {} is not set; calls will return backend errors",
                provider.label(),
                api_key_env(provider)
            ),
        }
    }
}

fn api_key_env(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::Mock => "no key",
        LlmProvider::OpenAi => "OPENAI_API_KEY",
        LlmProvider::Gemini => "GEMINI_API_KEY",
        LlmProvider::HuggingFace => "HUGGINGFACE_API_KEY",
    }
}

fn check_data_dir(data_dir: &Path) -> DoctorCheck {
    let name = "data_dir";
    match fs::metadata(data_dir) {
        Ok(metadata) if metadata.is_dir() => DoctorCheck {
            name,
            status: CheckStatus::Pass,
            details: format!("`{}` exists", data_dir.display()),
        },
        Ok(_) => DoctorCheck {
            name,
            status: CheckStatus::Fail,
            details: format!("`{}` is not a directory", data_dir.display()),
        },
        Err(_) => DoctorCheck {
            name,
            status: CheckStatus::Pass,
            details: format!("`{}` will be created on first save", data_dir.display()),
        },
    }
}

fn check_documents(data_dir: &Path) -> DoctorCheck {
    let problems: Vec<String> = [
        decode_problem::<Vec<Email>>(data_dir, EMAILS_FILE),
        decode_problem::<PromptRegistry>(data_dir, PROMPTS_FILE),
        decode_problem::<Vec<Draft>>(data_dir, DRAFTS_FILE),
    ]
    .into_iter()
    .flatten()
    .collect();

    if problems.is_empty() {
        DoctorCheck {
            name: "stored_documents",
            status: CheckStatus::Pass,
            details: "stored documents are readable or not created yet".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stored_documents",
            status: CheckStatus::Fail,
            details: format!("{} (loads will fall back to defaults)", problems.join("; ")),
        }
    }
}

fn decode_problem<T: DeserializeOwned>(data_dir: &Path, file_name: &str) -> Option<String> {
    let raw = fs::read_to_string(data_dir.join(file_name)).ok()?;
    serde_json::from_str::<T>(&raw).err().map(|error| format!("{file_name}: {error}"))
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
