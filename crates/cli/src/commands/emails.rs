use inboxpilot_core::config::{AppConfig, LoadOptions};
use inboxpilot_core::domain::email::{distinct_categories, filter_by_category, Email};

use crate::commands::{execute, store_for, CommandError, CommandResult};

#[derive(Clone, Debug)]
pub enum EmailAction {
    List { category: Option<String> },
    Clear,
}

pub fn run(options: LoadOptions, action: EmailAction) -> CommandResult {
    execute("emails", options, |config| manage(config, action))
}

async fn manage(config: AppConfig, action: EmailAction) -> Result<String, CommandError> {
    let store = store_for(&config);

    match action {
        EmailAction::List { category } => {
            let emails = store.load_emails().await;
            let shown: Vec<&Email> = match category.as_deref() {
                Some(category) => filter_by_category(&emails, category),
                None => emails.iter().collect(),
            };

            let categories: Vec<String> =
                distinct_categories(&emails).iter().map(ToString::to_string).collect();
            let mut lines = vec![format!(
                "{} of {} emails; categories: {}",
                shown.len(),
                emails.len(),
                categories.join(", ")
            )];
            lines.extend(shown.into_iter().map(render_row));
            Ok(lines.join("\n"))
        }
        EmailAction::Clear => {
            store.clear_emails().await?;
            Ok("inbox cleared".to_string())
        }
    }
}

fn render_row(email: &Email) -> String {
    let marker = if email.is_read { " " } else { "*" };
    let timestamp = email.timestamp.as_ref().map(ToString::to_string).unwrap_or_default();
    let mut row = format!(
        "{marker} #{} [{}] {} {}: {}",
        email.id, email.category, timestamp, email.sender, email.subject
    );
    if !email.action_items.is_empty() {
        row.push_str(&format!(" ({} action items)", email.action_items.len()));
    }
    row
}
