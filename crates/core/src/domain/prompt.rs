use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

pub const CATEGORIZATION: &str = "Categorization";
pub const ACTION_EXTRACTION: &str = "Action Extraction";
pub const AUTO_REPLY: &str = "Auto-Reply";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    #[serde(default)]
    pub description: String,
    pub template: String,
}

/// Named, user-editable instruction templates. Serialized as a map from
/// prompt name to `{description, template}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptRegistry {
    templates: BTreeMap<String, PromptTemplate>,
}

const DEFAULTS: &[(&str, &str, &str)] = &[
    (
        CATEGORIZATION,
        "Determines the category of incoming emails",
        "Analyze the following email and categorize it into one of these categories: Important, Newsletter, Spam, To-Do. Return only the category name.",
    ),
    (
        ACTION_EXTRACTION,
        "Extracts tasks from emails",
        "Extract any action items or tasks from the following email. Return them as a JSON list of strings. If none, return [].",
    ),
    (
        AUTO_REPLY,
        "Generates draft replies",
        "Draft a professional and polite reply to the following email. Use the context if provided. Keep it concise and professional.",
    ),
];

pub fn default_template(name: &str) -> Option<PromptTemplate> {
    DEFAULTS.iter().find(|(default_name, _, _)| *default_name == name).map(
        |(_, description, template)| PromptTemplate {
            description: description.to_string(),
            template: template.to_string(),
        },
    )
}

impl Default for PromptRegistry {
    fn default() -> Self {
        let templates = DEFAULTS
            .iter()
            .filter_map(|(name, _, _)| default_template(name).map(|t| (name.to_string(), t)))
            .collect();
        Self { templates }
    }
}

impl PromptRegistry {
    pub fn get(&self, name: &str) -> Option<&PromptTemplate> {
        self.templates.get(name)
    }

    pub fn get_template(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(|prompt| prompt.template.as_str())
    }

    /// Stores a user edit. Unknown names create a new template.
    pub fn set_template(&mut self, name: &str, template: impl Into<String>) {
        let template = template.into();
        self.templates
            .entry(name.to_string())
            .and_modify(|prompt| prompt.template = template.clone())
            .or_insert_with(|| PromptTemplate { description: String::new(), template });
    }

    pub fn reset_to_default(&mut self, name: &str) -> Result<(), DomainError> {
        let default = default_template(name)
            .ok_or_else(|| DomainError::UnknownPrompt(name.to_string()))?;
        self.templates.insert(name.to_string(), default);
        Ok(())
    }

    /// Restores any built-in template missing from a loaded registry.
    pub fn ensure_defaults(&mut self) -> bool {
        let mut changed = false;
        for (name, _, _) in DEFAULTS {
            if !self.templates.contains_key(*name) {
                if let Some(default) = default_template(name) {
                    self.templates.insert(name.to_string(), default);
                    changed = true;
                }
            }
        }
        changed
    }

    pub fn templates_by_name(&self) -> BTreeMap<String, String> {
        self.templates
            .iter()
            .map(|(name, prompt)| (name.clone(), prompt.template.clone()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PromptTemplate)> {
        self.templates.iter().map(|(name, prompt)| (name.as_str(), prompt))
    }
}
