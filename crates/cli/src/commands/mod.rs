pub mod categorize;
pub mod chat;
pub mod config;
pub mod doctor;
pub mod draft;
pub mod drafts;
pub mod emails;
pub mod extract;
pub mod prompts;
pub mod seed;

use std::future::Future;

use inboxpilot_agent::AgentRuntime;
use inboxpilot_core::config::{AppConfig, ConfigError, LoadOptions};
use inboxpilot_core::domain::email::{find_email_mut, Email, EmailId};
use inboxpilot_core::errors::{ApplicationError, DomainError};
use inboxpilot_store::{JsonStore, StoreError};
use serde::Serialize;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_RUNTIME: u8 = 3;
pub const EXIT_STORAGE: u8 = 4;
pub const EXIT_NOT_FOUND: u8 = 5;
pub const EXIT_BACKEND: u8 = 6;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Failure of a command body, carrying its JSON error class and exit code.
#[derive(Debug)]
pub struct CommandError {
    pub error_class: &'static str,
    pub message: String,
    pub exit_code: u8,
}

impl CommandError {
    pub fn new(error_class: &'static str, message: impl Into<String>, exit_code: u8) -> Self {
        Self { error_class, message: message.into(), exit_code }
    }

    pub fn email_not_found(id: EmailId) -> Self {
        Self::new("not_found", format!("email {id} does not exist"), EXIT_NOT_FOUND)
    }
}

impl From<ApplicationError> for CommandError {
    fn from(error: ApplicationError) -> Self {
        let exit_code = match &error {
            ApplicationError::Configuration(_) => EXIT_CONFIG,
            ApplicationError::StorageRead(_) | ApplicationError::StorageWrite(_) => EXIT_STORAGE,
            ApplicationError::Domain(_) => EXIT_NOT_FOUND,
            ApplicationError::BackendCall(_) | ApplicationError::Parse(_) => EXIT_BACKEND,
        };
        Self::new(error.error_class(), error.to_string(), exit_code)
    }
}

impl From<DomainError> for CommandError {
    fn from(error: DomainError) -> Self {
        ApplicationError::from(error).into()
    }
}

impl From<StoreError> for CommandError {
    fn from(error: StoreError) -> Self {
        ApplicationError::from(error).into()
    }
}

impl From<ConfigError> for CommandError {
    fn from(error: ConfigError) -> Self {
        ApplicationError::from(error).into()
    }
}

/// Loads configuration, then drives `body` to completion on a
/// current-thread runtime.
pub fn execute<F, Fut>(command: &str, options: LoadOptions, body: F) -> CommandResult
where
    F: FnOnce(AppConfig) -> Fut,
    Fut: Future<Output = Result<String, CommandError>>,
{
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                command,
                "config_validation",
                format!("configuration issue: {error}"),
                EXIT_CONFIG,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                EXIT_RUNTIME,
            );
        }
    };

    match runtime.block_on(body(config)) {
        Ok(message) => CommandResult::success(command, message),
        Err(error) => CommandResult::failure(command, error.error_class, error.message, error.exit_code),
    }
}

pub(crate) fn store_for(config: &AppConfig) -> JsonStore {
    JsonStore::new(&config.storage.data_dir)
}

pub(crate) fn agent_for(config: &AppConfig) -> Result<AgentRuntime, CommandError> {
    Ok(AgentRuntime::from_config(&config.llm)?)
}

pub(crate) fn email_mut(emails: &mut [Email], id: EmailId) -> Result<&mut Email, CommandError> {
    find_email_mut(emails, id).ok_or_else(|| CommandError::email_not_found(id))
}

#[cfg(test)]
mod tests {
    use inboxpilot_core::domain::draft::DraftId;
    use inboxpilot_core::errors::{ApplicationError, DomainError};
    use inboxpilot_store::StoreError;

    use super::{CommandError, CommandResult, EXIT_BACKEND, EXIT_NOT_FOUND, EXIT_STORAGE};

    #[test]
    fn failure_payload_carries_error_class() {
        let result = CommandResult::failure("draft", "backend_call", "Error calling LLM: timeout", 6);
        let payload: serde_json::Value =
            serde_json::from_str(&result.output).expect("payload is json");

        assert_eq!(result.exit_code, 6);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "backend_call");
    }

    #[test]
    fn application_errors_map_to_exit_codes() {
        let backend = CommandError::from(ApplicationError::BackendCall("503".to_string()));
        assert_eq!((backend.error_class, backend.exit_code), ("backend_call", EXIT_BACKEND));

        let missing = CommandError::from(StoreError::DraftNotFound(DraftId(9)));
        assert_eq!((missing.error_class, missing.exit_code), ("storage_read", EXIT_STORAGE));

        let domain = CommandError::from(ApplicationError::from(DomainError::UnknownPrompt(
            "Summary".to_string(),
        )));
        assert_eq!((domain.error_class, domain.exit_code), ("domain_validation", EXIT_NOT_FOUND));
    }
}
