//! Interpretation of free-form model output. Every function here is total:
//! malformed text degrades to a usable value instead of an error.

use inboxpilot_core::domain::draft::DraftReply;
use inboxpilot_core::domain::email::Category;
use serde_json::Value;
use tracing::debug;

/// Matched case-sensitively.
const CATEGORY_PREFIXES: [&str; 3] = ["Category:", "Answer:", "Response:"];

/// Reduces a categorization answer to a single label.
pub fn clean_category(response: &str) -> Category {
    let trimmed = response.trim();
    let unquoted = strip_quote_layer(trimmed);
    let mut label = unquoted.lines().next().unwrap_or_default().trim();

    for prefix in CATEGORY_PREFIXES {
        if let Some(rest) = label.strip_prefix(prefix) {
            label = rest.trim();
        }
    }

    Category::parse(label).unwrap_or_default()
}

fn strip_quote_layer(text: &str) -> &str {
    let text = text.strip_prefix(['"', '\'']).unwrap_or(text);
    text.strip_suffix(['"', '\'']).unwrap_or(text)
}

/// Pulls an action-item list out of a model answer. Tries a fenced block,
/// then the whole text when it opens with `[`, otherwise the outermost
/// bracketed span, and finally treats each non-empty line as one item.
///
/// Non-string array elements are kept as their JSON text; blank items are
/// dropped.
pub fn parse_action_items(response: &str) -> Vec<String> {
    let text = fenced_block(response).unwrap_or(response).trim();

    let structured = if text.starts_with('[') {
        json_string_array(text)
    } else {
        bracketed_span(text).and_then(json_string_array)
    };
    if let Some(items) = structured {
        return items;
    }

    debug!(
        event_name = "agent.parse.action_items_fallback",
        "model output was not a JSON array, splitting lines"
    );
    text.lines()
        .map(|line| line.trim().trim_start_matches(['-', '*']).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn fenced_block(response: &str) -> Option<&str> {
    let (marker, start) = match response.find("```json") {
        Some(index) => ("```json", index),
        None => ("```", response.find("```")?),
    };
    let after = &response[start + marker.len()..];
    let end = after.find("```").unwrap_or(after.len());
    Some(&after[..end])
}

fn bracketed_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (start < end).then(|| &text[start..=end])
}

fn json_string_array(text: &str) -> Option<Vec<String>> {
    match serde_json::from_str::<Vec<Value>>(text) {
        Ok(values) => Some(
            values
                .into_iter()
                .map(|value| match value {
                    Value::String(item) => item,
                    other => other.to_string(),
                })
                .filter(|item| !item.trim().is_empty())
                .collect(),
        ),
        Err(error) => {
            debug!(event_name = "agent.parse.json_failed", error = %error, "candidate was not a JSON array");
            None
        }
    }
}

/// Splits a generated reply into subject and body. Without a `Subject:`
/// line the subject is `Re: <original>` and the whole answer is the body.
pub fn parse_draft(response: &str, original_subject: &str) -> DraftReply {
    let lines: Vec<&str> = response.lines().collect();
    let subject_line = lines.iter().position(|line| line.to_lowercase().contains("subject:"));

    match subject_line {
        Some(index) => {
            let line = lines[index];
            let subject = line.split_once(':').map(|(_, rest)| rest.trim()).unwrap_or_default();
            DraftReply {
                subject: subject.to_string(),
                body: lines[index + 1..].join("\n").trim().to_string(),
            }
        }
        None => DraftReply {
            subject: format!("Re: {original_subject}"),
            body: response.to_string(),
        },
    }
}
