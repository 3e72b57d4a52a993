use inboxpilot_agent::BatchReport;
use inboxpilot_core::config::{AppConfig, LoadOptions};
use inboxpilot_core::domain::email::distinct_categories;

use crate::commands::{agent_for, execute, store_for, CommandError, CommandResult};

/// Categorizes every stored email. Failed items are reported, not fatal.
pub fn run(options: LoadOptions) -> CommandResult {
    execute("categorize", options, categorize_inbox)
}

async fn categorize_inbox(config: AppConfig) -> Result<String, CommandError> {
    let store = store_for(&config);
    let agent = agent_for(&config)?;
    let prompts = store.load_prompts().await;
    let mut emails = store.load_emails().await;

    let report = agent.categorize_all(&mut emails, &prompts).await;
    store.save_emails(&emails).await?;

    let labels: Vec<String> =
        distinct_categories(&emails).iter().map(|category| category.to_string()).collect();
    let labels = if labels.is_empty() { "none".to_string() } else { labels.join(", ") };
    Ok(format!(
        "{} using {}; categories: {labels}",
        summarize_batch("categorized", &report),
        agent.provider()
    ))
}

pub(crate) fn summarize_batch(verb: &str, report: &BatchReport) -> String {
    if report.failures.is_empty() {
        return format!("{verb} {} emails", report.processed);
    }

    let failed: Vec<String> =
        report.failures.iter().map(|failure| failure.email_id.to_string()).collect();
    format!(
        "{verb} {} of {} emails (failed: {})",
        report.succeeded(),
        report.processed,
        failed.join(", ")
    )
}
