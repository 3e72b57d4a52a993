use inboxpilot_core::config::{AppConfig, LoadOptions};
use inboxpilot_core::errors::DomainError;

use crate::commands::{execute, store_for, CommandError, CommandResult, EXIT_NOT_FOUND};

#[derive(Clone, Debug)]
pub enum PromptAction {
    List,
    Show { name: String },
    Set { name: String, template: String },
    Reset { name: String },
}

pub fn run(options: LoadOptions, action: PromptAction) -> CommandResult {
    execute("prompts", options, |config| manage(config, action))
}

async fn manage(config: AppConfig, action: PromptAction) -> Result<String, CommandError> {
    let store = store_for(&config);
    let mut prompts = store.load_prompts().await;

    match action {
        PromptAction::List => {
            let lines: Vec<String> = prompts
                .iter()
                .map(|(name, prompt)| {
                    if prompt.description.is_empty() {
                        format!("- {name}")
                    } else {
                        format!("- {name}: {}", prompt.description)
                    }
                })
                .collect();
            Ok(lines.join("\n"))
        }
        PromptAction::Show { name } => prompts.get_template(&name).map(str::to_string).ok_or_else(
            || CommandError::new("not_found", format!("prompt `{name}` does not exist"), EXIT_NOT_FOUND),
        ),
        PromptAction::Set { name, template } => {
            if template.trim().is_empty() {
                return Err(DomainError::InvariantViolation(
                    "prompt template must not be empty".to_string(),
                )
                .into());
            }
            prompts.set_template(&name, template);
            store.save_prompts(&prompts).await?;
            Ok(format!("prompt `{name}` updated"))
        }
        PromptAction::Reset { name } => {
            prompts.reset_to_default(&name)?;
            store.save_prompts(&prompts).await?;
            Ok(format!("prompt `{name}` reset to default"))
        }
    }
}
