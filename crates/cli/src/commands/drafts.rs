use inboxpilot_core::config::{AppConfig, LoadOptions};
use inboxpilot_core::domain::draft::{Draft, DraftId};
use inboxpilot_store::StoreError;

use crate::commands::{execute, store_for, CommandError, CommandResult, EXIT_NOT_FOUND};

#[derive(Clone, Debug)]
pub enum DraftAction {
    List,
    Edit { id: u64, subject: Option<String>, body: Option<String> },
    Delete { id: u64 },
}

pub fn run(options: LoadOptions, action: DraftAction) -> CommandResult {
    execute("drafts", options, |config| manage(config, action))
}

async fn manage(config: AppConfig, action: DraftAction) -> Result<String, CommandError> {
    let store = store_for(&config);

    match action {
        DraftAction::List => {
            let drafts = store.load_drafts().await;
            if drafts.is_empty() {
                return Ok("no drafts saved".to_string());
            }
            Ok(drafts.iter().map(render_row).collect::<Vec<_>>().join("\n"))
        }
        DraftAction::Edit { id, subject, body } => {
            if subject.is_none() && body.is_none() {
                return Err(CommandError::new(
                    "domain_validation",
                    "nothing to change: pass --subject and/or --body",
                    EXIT_NOT_FOUND,
                ));
            }
            let draft = store.update_draft(DraftId(id), subject, body).await.map_err(not_found)?;
            Ok(format!("draft {} updated: {}", draft.id, draft.subject))
        }
        DraftAction::Delete { id } => {
            let draft = store.delete_draft(DraftId(id)).await.map_err(not_found)?;
            Ok(format!("draft {} deleted", draft.id))
        }
    }
}

fn render_row(draft: &Draft) -> String {
    let created = draft.created_at.as_ref().map(ToString::to_string).unwrap_or_default();
    format!(
        "#{} [{}] email {} {}: {}",
        draft.id, draft.status, draft.email_id, created, draft.subject
    )
}

fn not_found(error: StoreError) -> CommandError {
    match error {
        StoreError::DraftNotFound(id) => {
            CommandError::new("not_found", format!("draft {id} does not exist"), EXIT_NOT_FOUND)
        }
        other => other.into(),
    }
}
