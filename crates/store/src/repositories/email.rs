use inboxpilot_core::domain::email::Email;

use crate::files::{JsonStore, StoreError, EMAILS_FILE};

impl JsonStore {
    pub async fn load_emails(&self) -> Vec<Email> {
        self.read_or_default(EMAILS_FILE).await
    }

    pub async fn save_emails(&self, emails: &[Email]) -> Result<(), StoreError> {
        self.write_document(EMAILS_FILE, emails).await
    }

    pub async fn clear_emails(&self) -> Result<(), StoreError> {
        self.save_emails(&[]).await
    }
}
