use inboxpilot_core::domain::draft::{Draft, DraftId, DraftReply};
use inboxpilot_core::domain::email::EmailId;

use crate::files::{JsonStore, StoreError, DRAFTS_FILE};

impl JsonStore {
    pub async fn load_drafts(&self) -> Vec<Draft> {
        self.read_or_default(DRAFTS_FILE).await
    }

    pub async fn save_drafts(&self, drafts: &[Draft]) -> Result<(), StoreError> {
        self.write_document(DRAFTS_FILE, drafts).await
    }

    /// Appends a draft with id `count + 1`. The email id is not validated.
    pub async fn add_draft(&self, email_id: EmailId, reply: DraftReply) -> Result<Draft, StoreError> {
        let mut drafts = self.load_drafts().await;
        let draft = Draft::next(&drafts, email_id, reply);
        drafts.push(draft.clone());
        self.save_drafts(&drafts).await?;
        Ok(draft)
    }

    pub async fn update_draft(
        &self,
        id: DraftId,
        subject: Option<String>,
        body: Option<String>,
    ) -> Result<Draft, StoreError> {
        let mut drafts = self.load_drafts().await;
        let draft = drafts
            .iter_mut()
            .find(|draft| draft.id == id)
            .ok_or(StoreError::DraftNotFound(id))?;
        draft.edit(subject, body);
        let updated = draft.clone();
        self.save_drafts(&drafts).await?;
        Ok(updated)
    }

    pub async fn delete_draft(&self, id: DraftId) -> Result<Draft, StoreError> {
        let mut drafts = self.load_drafts().await;
        let index = drafts
            .iter()
            .position(|draft| draft.id == id)
            .ok_or(StoreError::DraftNotFound(id))?;
        let removed = drafts.remove(index);
        self.save_drafts(&drafts).await?;
        Ok(removed)
    }
}
