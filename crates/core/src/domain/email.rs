use std::collections::BTreeSet;
use std::fmt;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::DomainError;

pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmailId(pub u64);

impl fmt::Display for EmailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Open-ended category label. Never empty: blank input resolves to
/// `Uncategorized`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Category(String);

impl Category {
    pub fn parse(label: &str) -> Result<Self, DomainError> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyCategory);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn uncategorized() -> Self {
        Self(UNCATEGORIZED.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::uncategorized()
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::parse(&value).unwrap_or_default()
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ISO-8601 timestamp as stored on disk. Values that do not parse are kept
/// verbatim so a bad record never fails a whole load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Parsed(NaiveDateTime),
    Raw(String),
}

impl Timestamp {
    pub fn now() -> Self {
        Self::Parsed(Local::now().naive_local())
    }

    pub fn as_datetime(&self) -> Option<&NaiveDateTime> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Raw(_) => None,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M")),
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub id: EmailId,
    pub sender: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    #[serde(default)]
    pub category: Category,
    #[serde(default, deserialize_with = "deserialize_action_items")]
    pub action_items: Vec<String>,
    #[serde(default)]
    pub is_read: bool,
}

impl Email {
    pub fn new(
        id: EmailId,
        sender: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        timestamp: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            sender: sender.into(),
            subject: subject.into(),
            body: body.into(),
            timestamp,
            category: Category::uncategorized(),
            action_items: Vec::new(),
            is_read: false,
        }
    }

    pub fn mark_read(&mut self) {
        self.is_read = true;
    }
}

/// Sorted, de-duplicated category labels present in `emails`.
pub fn distinct_categories(emails: &[Email]) -> Vec<Category> {
    emails.iter().map(|email| email.category.clone()).collect::<BTreeSet<_>>().into_iter().collect()
}

pub fn filter_by_category<'a>(emails: &'a [Email], category: &str) -> Vec<&'a Email> {
    emails.iter().filter(|email| email.category.as_str() == category).collect()
}

pub fn find_email(emails: &[Email], id: EmailId) -> Option<&Email> {
    emails.iter().find(|email| email.id == id)
}

pub fn find_email_mut(emails: &mut [Email], id: EmailId) -> Option<&mut Email> {
    emails.iter_mut().find(|email| email.id == id)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredActionItems {
    List(Vec<String>),
    Encoded(String),
}

// Older files carry action items as a JSON-encoded string.
fn deserialize_action_items<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = Option::<StoredActionItems>::deserialize(deserializer)?;
    Ok(match stored {
        None => Vec::new(),
        Some(StoredActionItems::List(items)) => items,
        Some(StoredActionItems::Encoded(raw)) => {
            serde_json::from_str::<Vec<String>>(&raw).unwrap_or_default()
        }
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{distinct_categories, Category, Email, EmailId, Timestamp, UNCATEGORIZED};
    use crate::errors::DomainError;

    fn email(id: u64, category: &str) -> Email {
        let mut email = Email::new(EmailId(id), "a@example.com", "Subject", "Body", None);
        email.category = Category::from(category.to_string());
        email
    }

    #[test]
    fn blank_category_resolves_to_uncategorized() {
        assert_eq!(Category::from("   ".to_string()).as_str(), UNCATEGORIZED);
        assert_eq!(Category::parse(""), Err(DomainError::EmptyCategory));
        assert_eq!(Category::parse(" Spam ").map(|c| c.to_string()), Ok("Spam".to_string()));
    }

    #[test]
    fn loads_legacy_encoded_action_items() {
        let record = json!({
            "id": 3,
            "sender": "ops@company.com",
            "subject": "Maintenance",
            "body": "Tonight",
            "action_items": "[\"Notify customers\", \"Update status page\"]"
        });

        let email: Email = serde_json::from_value(record).expect("legacy record should load");

        assert_eq!(email.action_items, vec!["Notify customers", "Update status page"]);
        assert_eq!(email.category.as_str(), UNCATEGORIZED);
        assert!(!email.is_read);
    }

    #[test]
    fn corrupt_encoded_action_items_become_empty() {
        let record = json!({
            "id": 4,
            "sender": "x@example.com",
            "subject": "s",
            "body": "b",
            "action_items": "not json"
        });

        let email: Email = serde_json::from_value(record).expect("record should still load");
        assert!(email.action_items.is_empty());
    }

    #[test]
    fn unparseable_timestamp_is_kept_verbatim() {
        let record = json!({
            "id": 5,
            "sender": "x@example.com",
            "subject": "s",
            "body": "b",
            "timestamp": "yesterday-ish"
        });

        let email: Email = serde_json::from_value(record).expect("record should still load");
        assert_eq!(email.timestamp, Some(Timestamp::Raw("yesterday-ish".to_string())));
    }

    #[test]
    fn iso_timestamp_is_parsed() {
        let record = json!({
            "id": 6,
            "sender": "x@example.com",
            "subject": "s",
            "body": "b",
            "timestamp": "2025-11-24T09:30:00.123456"
        });

        let email: Email = serde_json::from_value(record).expect("record should load");
        assert!(email.timestamp.as_ref().and_then(Timestamp::as_datetime).is_some());
    }

    #[test]
    fn distinct_categories_are_sorted_and_unique() {
        let emails = vec![email(1, "Spam"), email(2, "Important"), email(3, "Spam")];
        let labels = distinct_categories(&emails)
            .into_iter()
            .map(|category| category.to_string())
            .collect::<Vec<_>>();

        assert_eq!(labels, vec!["Important", "Spam"]);
    }
}
