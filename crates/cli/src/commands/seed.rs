use chrono::Local;
use inboxpilot_core::config::{AppConfig, LoadOptions};
use inboxpilot_store::MockInbox;
use tracing::info;

use crate::commands::{execute, store_for, CommandError, CommandResult};

/// Replaces the stored inbox with the sample emails.
pub fn run(options: LoadOptions) -> CommandResult {
    execute("seed", options, seed_inbox)
}

async fn seed_inbox(config: AppConfig) -> Result<String, CommandError> {
    let store = store_for(&config);
    let result = MockInbox::load(&store, Local::now().naive_local()).await?;

    info!(
        event_name = "cli.seed.completed",
        emails = result.emails_seeded,
        data_dir = %store.data_dir().display(),
        "sample inbox loaded"
    );
    Ok(format!("loaded {} sample emails into {}", result.emails_seeded, store.data_dir().display()))
}
