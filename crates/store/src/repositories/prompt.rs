use tracing::warn;

use inboxpilot_core::domain::prompt::PromptRegistry;

use crate::files::{JsonStore, StoreError, PROMPTS_FILE};

impl JsonStore {
    /// Loads the prompt registry, writing the defaults out on first use.
    /// A corrupt document yields the defaults without overwriting it.
    pub async fn load_prompts(&self) -> PromptRegistry {
        match self.read_document::<PromptRegistry>(PROMPTS_FILE).await {
            Ok(Some(mut registry)) => {
                registry.ensure_defaults();
                registry
            }
            Ok(None) => {
                let registry = PromptRegistry::default();
                if let Err(error) = self.save_prompts(&registry).await {
                    warn!(
                        event_name = "store.prompts.seed_failed",
                        error = %error,
                        "could not persist default prompts"
                    );
                }
                registry
            }
            Err(error) => {
                warn!(
                    event_name = "store.load.failed",
                    file = PROMPTS_FILE,
                    error = %error,
                    "falling back to default prompts"
                );
                PromptRegistry::default()
            }
        }
    }

    pub async fn save_prompts(&self, prompts: &PromptRegistry) -> Result<(), StoreError> {
        self.write_document(PROMPTS_FILE, prompts).await
    }
}
