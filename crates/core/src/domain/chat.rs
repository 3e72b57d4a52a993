use serde::{Deserialize, Serialize};

use crate::domain::draft::DraftReply;
use crate::domain::email::EmailId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Agent,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentAction {
    #[default]
    None,
    DraftGenerated,
}

/// Result of routing one conversational query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub action: AgentAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DraftReply>,
}

impl ChatReply {
    pub fn text(response: impl Into<String>) -> Self {
        Self { response: response.into(), action: AgentAction::None, data: None }
    }

    pub fn draft(response: impl Into<String>, draft: DraftReply) -> Self {
        Self { response: response.into(), action: AgentAction::DraftGenerated, data: Some(draft) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_data: Option<DraftReply>,
}

/// Ephemeral conversation about the selected email. Never persisted.
#[derive(Clone, Debug, Default)]
pub struct ChatSession {
    selected: Option<EmailId>,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn selected(&self) -> Option<EmailId> {
        self.selected
    }

    /// Switching to a different email drops the history.
    pub fn select(&mut self, email_id: EmailId) {
        if self.selected != Some(email_id) {
            self.messages.clear();
            self.selected = Some(email_id);
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content: content.into(),
            draft_data: None,
        });
    }

    pub fn push_reply(&mut self, reply: &ChatReply) {
        self.messages.push(ChatMessage {
            role: ChatRole::Agent,
            content: reply.response.clone(),
            draft_data: reply.data.clone(),
        });
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{AgentAction, ChatReply, ChatRole, ChatSession};
    use crate::domain::draft::DraftReply;
    use crate::domain::email::EmailId;

    #[test]
    fn changing_selection_clears_history() {
        let mut session = ChatSession::default();
        session.select(EmailId(1));
        session.push_user("summarize this");
        session.push_reply(&ChatReply::text("It is about a deadline."));
        assert_eq!(session.messages().len(), 2);

        session.select(EmailId(1));
        assert_eq!(session.messages().len(), 2, "re-selecting the same email keeps history");

        session.select(EmailId(2));
        assert!(session.messages().is_empty());
        assert_eq!(session.selected(), Some(EmailId(2)));
    }

    #[test]
    fn draft_reply_is_attached_to_agent_message() {
        let mut session = ChatSession::default();
        let draft = DraftReply { subject: "Re: Lunch".to_string(), body: "Sure!".to_string() };
        session.push_reply(&ChatReply::draft("I've generated a draft reply for you.", draft.clone()));

        let message = &session.messages()[0];
        assert_eq!(message.role, ChatRole::Agent);
        assert_eq!(message.draft_data.as_ref(), Some(&draft));
    }

    #[test]
    fn action_serializes_as_snake_case() {
        let value = serde_json::to_value(AgentAction::DraftGenerated).expect("serializes");
        assert_eq!(value, "draft_generated");
        let value = serde_json::to_value(ChatReply::text("hi")).expect("serializes");
        assert_eq!(value["action"], "none");
        assert!(value.get("data").is_none());
    }
}
