use std::env;
use std::io::Cursor;
use std::sync::{Mutex, OnceLock};

use inboxpilot_cli::commands::chat::{self, ChatArgs};
use inboxpilot_cli::commands::draft::{self, DraftArgs};
use inboxpilot_cli::commands::drafts::{self, DraftAction};
use inboxpilot_cli::commands::emails::{self, EmailAction};
use inboxpilot_cli::commands::extract::{self, ExtractTarget};
use inboxpilot_cli::commands::prompts::{self, PromptAction};
use inboxpilot_cli::commands::{categorize, doctor, seed};
use inboxpilot_core::config::LoadOptions;
use inboxpilot_core::domain::email::EmailId;
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn seed_then_categorize_fills_categories() {
    with_inbox(|| {
        let seeded = seed::run(LoadOptions::default());
        assert_eq!(seeded.exit_code, 0, "expected seed success");
        let payload = parse_payload(&seeded.output);
        assert_eq!(payload["command"], "seed");
        assert!(message(&payload).starts_with("loaded 15 sample emails"));

        let result = categorize::run(LoadOptions::default());
        assert_eq!(result.exit_code, 0, "expected categorize success");
        let payload = parse_payload(&result.output);
        assert!(message(&payload).starts_with("categorized 15 emails using mock"));

        let listed = emails::run(
            LoadOptions::default(),
            EmailAction::List { category: Some("Important".to_string()) },
        );
        assert_eq!(listed.exit_code, 0);
        let payload = parse_payload(&listed.output);
        assert!(message(&payload).contains("#3 [Important]"));
    });
}

#[test]
fn extract_single_email_and_unknown_id() {
    with_inbox(|| {
        assert_eq!(seed::run(LoadOptions::default()).exit_code, 0);

        let result = extract::run(LoadOptions::default(), ExtractTarget::One(EmailId(3)));
        assert_eq!(result.exit_code, 0, "expected extract success");
        let payload = parse_payload(&result.output);
        assert!(message(&payload).contains("- Complete task by deadline"));

        let missing = extract::run(LoadOptions::default(), ExtractTarget::One(EmailId(999)));
        assert_eq!(missing.exit_code, 5, "expected not-found exit code");
        let payload = parse_payload(&missing.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "not_found");
    });
}

#[test]
fn saved_draft_can_be_edited_and_deleted() {
    with_inbox(|| {
        assert_eq!(seed::run(LoadOptions::default()).exit_code, 0);

        let created = draft::run(
            LoadOptions::default(),
            DraftArgs { email_id: 3, instruction: Some("confirm by noon".to_string()), save: true },
        );
        assert_eq!(created.exit_code, 0, "expected draft success");
        let payload = parse_payload(&created.output);
        let text = message(&payload);
        assert!(text.starts_with("Subject: Re: URGENT: Project Deadline Extended"));
        assert!(text.ends_with("saved as draft 1"));

        let listed = drafts::run(LoadOptions::default(), DraftAction::List);
        assert!(message(&parse_payload(&listed.output)).starts_with("#1 [draft] email 3"));

        let edited = drafts::run(
            LoadOptions::default(),
            DraftAction::Edit { id: 1, subject: Some("Re: confirmed".to_string()), body: None },
        );
        assert_eq!(edited.exit_code, 0);
        assert_eq!(message(&parse_payload(&edited.output)), "draft 1 updated: Re: confirmed");

        let deleted = drafts::run(LoadOptions::default(), DraftAction::Delete { id: 1 });
        assert_eq!(deleted.exit_code, 0);

        let again = drafts::run(LoadOptions::default(), DraftAction::Delete { id: 1 });
        assert_eq!(again.exit_code, 5);
        assert_eq!(parse_payload(&again.output)["error_class"], "not_found");
    });
}

#[test]
fn one_shot_chat_saves_generated_draft() {
    with_inbox(|| {
        assert_eq!(seed::run(LoadOptions::default()).exit_code, 0);

        let args = ChatArgs {
            email_id: 5,
            query: Some("Please draft a reply".to_string()),
            save_drafts: true,
        };
        let result = chat::run_with_io(LoadOptions::default(), args, std::io::empty(), Vec::new());
        assert_eq!(result.exit_code, 0, "expected chat success");
        let text = message(&parse_payload(&result.output)).to_string();
        assert!(text.starts_with("I've generated a draft reply for you."));
        assert!(text.ends_with("saved as draft 1"));

        let listed = emails::run(LoadOptions::default(), EmailAction::List { category: None });
        let listing = message(&parse_payload(&listed.output)).to_string();
        let row = listing.lines().find(|line| line.contains("#5 ")).expect("email 5 listed");
        assert!(row.starts_with("  #5"), "chat marks the email read: {row}");
    });
}

#[test]
fn interactive_chat_stops_on_exit() {
    with_inbox(|| {
        assert_eq!(seed::run(LoadOptions::default()).exit_code, 0);

        let input = Cursor::new("summarize this\n\nwhat are my tasks?\nexit\nignored\n");
        let mut transcript = Vec::new();
        let args = ChatArgs { email_id: 3, query: None, save_drafts: false };
        let result = chat::run_with_io(LoadOptions::default(), args, input, &mut transcript);

        assert_eq!(result.exit_code, 0, "expected chat success");
        assert_eq!(
            message(&parse_payload(&result.output)),
            "chat about email 3 ended after 2 exchanges (4 messages)"
        );
        let transcript = String::from_utf8(transcript).expect("utf8 transcript");
        assert!(transcript.starts_with("> "));
        assert!(transcript.contains("Summary: This email from client.manager@techcorp.com"));
        assert!(transcript.contains("No specific action items found."));
    });
}

#[test]
fn prompts_can_be_set_and_reset() {
    with_inbox(|| {
        let set = prompts::run(
            LoadOptions::default(),
            PromptAction::Set {
                name: "Categorization".to_string(),
                template: "Sort into categories: Work, Other.".to_string(),
            },
        );
        assert_eq!(set.exit_code, 0);

        let shown = prompts::run(
            LoadOptions::default(),
            PromptAction::Show { name: "Categorization".to_string() },
        );
        assert_eq!(message(&parse_payload(&shown.output)), "Sort into categories: Work, Other.");

        let reset = prompts::run(
            LoadOptions::default(),
            PromptAction::Reset { name: "Categorization".to_string() },
        );
        assert_eq!(reset.exit_code, 0);

        let unknown = prompts::run(
            LoadOptions::default(),
            PromptAction::Reset { name: "Signature".to_string() },
        );
        assert_eq!(unknown.exit_code, 5);
        assert_eq!(parse_payload(&unknown.output)["error_class"], "domain_validation");
    });
}

#[test]
fn invalid_provider_env_is_a_config_failure() {
    let dir = TempDir::new().expect("tempdir");
    let data_dir = dir.path().display().to_string();
    with_env(
        &[("INBOXPILOT_DATA_DIR", data_dir.as_str()), ("INBOXPILOT_LLM_PROVIDER", "bard")],
        || {
            let result = categorize::run(LoadOptions::default());
            assert_eq!(result.exit_code, 2, "expected config validation failure code");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "categorize");
            assert_eq!(payload["error_class"], "config_validation");
        },
    );
}

#[test]
fn doctor_reports_missing_key_for_explicit_provider() {
    let dir = TempDir::new().expect("tempdir");
    let data_dir = dir.path().display().to_string();
    with_env(
        &[("INBOXPILOT_DATA_DIR", data_dir.as_str()), ("INBOXPILOT_LLM_PROVIDER", "openai")],
        || {
            let output = doctor::run(LoadOptions::default(), true);
            let report = parse_payload(&output);
            assert_eq!(report["overall_status"], "fail");

            let readiness = report["checks"]
                .as_array()
                .and_then(|checks| checks.iter().find(|check| check["name"] == "provider_readiness"))
                .expect("provider check present");
            assert_eq!(readiness["status"], "fail");
            assert!(readiness["details"].as_str().unwrap_or_default().contains("OPENAI_API_KEY"));
        },
    );
}

#[test]
fn failed_chat_draft_is_not_saved() {
    let dir = TempDir::new().expect("tempdir");
    let data_dir = dir.path().display().to_string();
    with_env(
        &[("INBOXPILOT_DATA_DIR", data_dir.as_str()), ("INBOXPILOT_LLM_PROVIDER", "openai")],
        || {
            assert_eq!(seed::run(LoadOptions::default()).exit_code, 0);

            let args = ChatArgs {
                email_id: 5,
                query: Some("draft a reply".to_string()),
                save_drafts: true,
            };
            let result =
                chat::run_with_io(LoadOptions::default(), args, std::io::empty(), Vec::new());
            assert_eq!(result.exit_code, 6, "expected backend failure code");
            let payload = parse_payload(&result.output);
            assert_eq!(payload["error_class"], "backend_call");
            assert!(message(&payload).contains("OPENAI_API_KEY is not set"));

            let listed = drafts::run(LoadOptions::default(), DraftAction::List);
            assert_eq!(message(&parse_payload(&listed.output)), "no drafts saved");
        },
    );
}

fn message(payload: &Value) -> &str {
    payload["message"].as_str().unwrap_or_default()
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

/// Runs `test_fn` against an empty data directory with the offline backend.
fn with_inbox(test_fn: impl FnOnce()) {
    let dir = TempDir::new().expect("tempdir");
    let data_dir = dir.path().display().to_string();
    with_env(
        &[("INBOXPILOT_DATA_DIR", data_dir.as_str()), ("INBOXPILOT_LLM_PROVIDER", "mock")],
        test_fn,
    );
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let keys = [
        "INBOXPILOT_LLM_PROVIDER",
        "INBOXPILOT_LLM_TIMEOUT_SECS",
        "INBOXPILOT_LLM_TEMPERATURE",
        "INBOXPILOT_LLM_MAX_NEW_TOKENS",
        "INBOXPILOT_DATA_DIR",
        "INBOXPILOT_LOGGING_LEVEL",
        "INBOXPILOT_LOGGING_FORMAT",
        "INBOXPILOT_LOG_LEVEL",
        "INBOXPILOT_LOG_FORMAT",
        "OPENAI_API_KEY",
        "OPENAI_MODEL",
        "OPENAI_BASE_URL",
        "GEMINI_API_KEY",
        "GEMINI_MODEL",
        "GEMINI_BASE_URL",
        "HUGGINGFACE_API_KEY",
        "HUGGINGFACE_MODEL",
        "HUGGINGFACE_BASE_URL",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
