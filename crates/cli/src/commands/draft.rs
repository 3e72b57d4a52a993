use inboxpilot_core::config::{AppConfig, LoadOptions};
use inboxpilot_core::domain::draft::DraftReply;
use inboxpilot_core::domain::email::{find_email, EmailId};
use inboxpilot_core::errors::ApplicationError;

use crate::commands::{agent_for, execute, store_for, CommandError, CommandResult};

#[derive(Clone, Debug, Default)]
pub struct DraftArgs {
    pub email_id: u64,
    pub instruction: Option<String>,
    pub save: bool,
}

/// Generates a reply draft; `save` appends it to the stored drafts.
pub fn run(options: LoadOptions, args: DraftArgs) -> CommandResult {
    execute("draft", options, |config| draft(config, args))
}

async fn draft(config: AppConfig, args: DraftArgs) -> Result<String, CommandError> {
    let store = store_for(&config);
    let agent = agent_for(&config)?;
    let prompts = store.load_prompts().await;
    let emails = store.load_emails().await;

    let id = EmailId(args.email_id);
    let email = find_email(&emails, id).ok_or_else(|| CommandError::email_not_found(id))?;
    let outcome = agent.draft_reply(email, &prompts, args.instruction.as_deref()).await?;
    if let Some(error) = outcome.backend_error {
        return Err(ApplicationError::BackendCall(error).into());
    }

    let mut message = render_draft(&outcome.value);
    if args.save {
        let saved = store.add_draft(id, outcome.value).await?;
        message.push_str(&format!("\n\nsaved as draft {}", saved.id));
    }
    Ok(message)
}

pub(crate) fn render_draft(draft: &DraftReply) -> String {
    format!("Subject: {}\n\n{}", draft.subject, draft.body)
}
