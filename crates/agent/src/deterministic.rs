//! Offline backend. Keyword rules stand in for the model so the assistant
//! works without credentials and behaves identically across runs.

use inboxpilot_core::domain::draft::DraftReply;
use inboxpilot_core::domain::email::{Category, Email};

const FRIENDS_AND_FAMILY: &str = "Friends and Family";
const FRIENDS_AND_FAMILY_MARKER: &str = "friends and family";

struct CategoryRule {
    keywords: &'static [&'static str],
    label: &'static str,
    /// Whether a label listed in the template may replace `label` by position.
    positional: bool,
}

const CATEGORY_RULES: [CategoryRule; 5] = [
    CategoryRule {
        keywords: &["urgent", "important", "deadline", "critical"],
        label: "Important",
        positional: true,
    },
    CategoryRule {
        keywords: &["newsletter", "weekly", "subscribe", "unsubscribe"],
        label: "Newsletter",
        positional: true,
    },
    CategoryRule {
        keywords: &["spam", "winner", "claim", "congratulations", "lottery"],
        label: "Spam",
        positional: true,
    },
    CategoryRule {
        keywords: &["meeting", "task", "please", "review", "approve"],
        label: "To-Do",
        positional: true,
    },
    CategoryRule {
        keywords: &["birthday", "friend", "family", "lunch"],
        label: FRIENDS_AND_FAMILY,
        positional: false,
    },
];

/// Independent keyword rules over the lowercased body. Every rule that
/// matches contributes its task, in table order.
const ACTION_RULES: [(&[&str], &str); 4] = [
    (&["deadline", "by friday"], "Complete task by deadline"),
    (&["send", "submit"], "Send/submit requested items"),
    (&["meeting"], "Schedule or attend meeting"),
    (&["review"], "Review document/material"),
];

pub const SUMMARY_TEMPLATE_NOTE: &str =
    "The main points include the content shared in the email body.";
pub const NO_TASKS_TEXT: &str = "No specific action items found.";
pub const CAPABILITIES_TEXT: &str =
    "I can help you summarize this email, draft a reply, or extract tasks. What would you like?";

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicBackend;

impl DeterministicBackend {
    /// First matching rule wins. A template that lists its own categories
    /// renames the first four labels by position.
    pub fn categorize(&self, subject: &str, body: &str, template: &str) -> Category {
        let text = format!("{subject} {body}").to_lowercase();
        let listed = listed_categories(template);

        let Some((index, rule)) = CATEGORY_RULES
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.keywords.iter().any(|keyword| text.contains(keyword)))
        else {
            return Category::uncategorized();
        };

        if !rule.positional {
            return if template.to_lowercase().contains(FRIENDS_AND_FAMILY_MARKER) {
                Category::parse(rule.label).unwrap_or_default()
            } else {
                Category::uncategorized()
            };
        }

        let label = listed.get(index).map(String::as_str).unwrap_or(rule.label);
        Category::parse(label).unwrap_or_default()
    }

    pub fn extract_action_items(&self, _subject: &str, body: &str, _template: &str) -> Vec<String> {
        let body = body.to_lowercase();
        ACTION_RULES
            .iter()
            .filter(|(phrases, _)| phrases.iter().any(|phrase| body.contains(phrase)))
            .map(|(_, task)| task.to_string())
            .collect()
    }

    pub fn generate_draft(
        &self,
        subject: &str,
        _body: &str,
        sender: &str,
        _template: &str,
        instruction: Option<&str>,
    ) -> DraftReply {
        let note = instruction
            .map(str::trim)
            .filter(|note| !note.is_empty())
            .map(|note| format!("User note: {note}\n\n"))
            .unwrap_or_default();

        DraftReply {
            subject: format!("Re: {subject}"),
            body: format!(
                "Dear {sender},\n\nThank you for your email regarding '{subject}'.\n\nI have received your message and will address it accordingly.\n\n{note}Best regards,\n[Your Name]"
            ),
        }
    }

    pub fn summarize(&self, email: &Email) -> String {
        format!(
            "Summary: This email from {} discusses '{}'. {SUMMARY_TEMPLATE_NOTE}",
            email.sender, email.subject
        )
    }

    pub fn task_listing(&self, action_items: &[String]) -> String {
        if action_items.is_empty() {
            return NO_TASKS_TEXT.to_string();
        }
        let bullets: Vec<String> = action_items.iter().map(|item| format!("• {item}")).collect();
        format!("Action items:\n{}", bullets.join("\n"))
    }

    pub fn answer(&self, _email: &Email, _query: &str) -> String {
        CAPABILITIES_TEXT.to_string()
    }
}

/// Category labels named after `categories:` in a template, up to the end
/// of that sentence. Phrases are runs of capitalized words, optionally
/// joined by a lowercase `and`.
fn listed_categories(template: &str) -> Vec<String> {
    let lowered = template.to_ascii_lowercase();
    let Some(start) = lowered.find("categories:") else {
        return Vec::new();
    };

    let rest = &template[start + "categories:".len()..];
    let sentence = rest.split(['.', '!', '?', '\n']).next().unwrap_or_default();

    sentence.split([',', ';', '/']).filter_map(capitalized_phrase).collect()
}

fn capitalized_phrase(item: &str) -> Option<String> {
    let words: Vec<&str> = item
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric() && c != '-'))
        .filter(|word| !word.is_empty())
        .collect();

    let is_capitalized = |word: &str| word.chars().next().is_some_and(char::is_uppercase);
    let first = words.iter().position(|word| is_capitalized(word))?;
    let last = words.iter().rposition(|word| is_capitalized(word))?;

    let span = &words[first..=last];
    if span.iter().all(|word| is_capitalized(word) || *word == "and") {
        Some(span.join(" "))
    } else {
        Some(words[first].to_string())
    }
}
