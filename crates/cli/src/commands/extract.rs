use inboxpilot_core::config::{AppConfig, LoadOptions};
use inboxpilot_core::domain::email::EmailId;

use crate::commands::categorize::summarize_batch;
use crate::commands::{agent_for, email_mut, execute, store_for, CommandError, CommandResult};

/// Which emails to extract action items from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractTarget {
    One(EmailId),
    All,
}

pub fn run(options: LoadOptions, target: ExtractTarget) -> CommandResult {
    execute("extract", options, |config| extract(config, target))
}

async fn extract(config: AppConfig, target: ExtractTarget) -> Result<String, CommandError> {
    let store = store_for(&config);
    let agent = agent_for(&config)?;
    let prompts = store.load_prompts().await;
    let mut emails = store.load_emails().await;

    let id = match target {
        ExtractTarget::All => {
            let report = agent.extract_all(&mut emails, &prompts).await;
            store.save_emails(&emails).await?;
            return Ok(summarize_batch("extracted action items for", &report));
        }
        ExtractTarget::One(id) => id,
    };

    let email = email_mut(&mut emails, id)?;
    let result = agent.extract_for_email(email, &prompts).await;
    let items = email.action_items.clone();
    store.save_emails(&emails).await?;
    result?;

    if items.is_empty() {
        return Ok(format!("email {id}: no action items"));
    }
    let bullets: Vec<String> = items.iter().map(|item| format!("- {item}")).collect();
    Ok(format!("email {id}: {} action items\n{}", items.len(), bullets.join("\n")))
}
