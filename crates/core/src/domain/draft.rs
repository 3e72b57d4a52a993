use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::email::{EmailId, Timestamp};

pub const DRAFT_STATUS: &str = "draft";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DraftId(pub u64);

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A proposed reply as produced by draft generation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftReply {
    pub subject: String,
    pub body: String,
}

/// A reply persisted for review. `email_id` is a lookup reference only and
/// is not checked against the inbox.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub id: DraftId,
    pub email_id: EmailId,
    pub subject: String,
    pub body: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

fn default_status() -> String {
    DRAFT_STATUS.to_string()
}

impl Draft {
    /// Ids are `existing + 1`, which is not stable once drafts are deleted.
    pub fn next(existing: &[Draft], email_id: EmailId, reply: DraftReply) -> Self {
        Self {
            id: DraftId(existing.len() as u64 + 1),
            email_id,
            subject: reply.subject,
            body: reply.body,
            status: default_status(),
            created_at: Some(Timestamp::now()),
        }
    }

    pub fn edit(&mut self, subject: Option<String>, body: Option<String>) {
        if let Some(subject) = subject {
            self.subject = subject;
        }
        if let Some(body) = body {
            self.body = body;
        }
    }
}
