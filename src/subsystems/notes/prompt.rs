//! Answer prompt assembly.
//!
//! The QA template carries `{{context}}` and `{{question}}` placeholders. A
//! template file named in `[query] prompt_template` replaces the built-in one.

use std::fs;
use std::path::Path;

use crate::core::error::AppError;

pub const DEFAULT_QA_TEMPLATE: &str = "Context information is below.
---------------------
{{context}}
---------------------
Given the context information and not prior knowledge, answer the query.
Query: {{question}}
Answer: ";

pub const SYSTEM_PROMPT: &str = "You are a patient teaching assistant. Answer students' \
questions using only the class notes you are given. If the notes do not cover the \
question, say so.";

/// Read the template at `path`, or fall back to [`DEFAULT_QA_TEMPLATE`].
pub fn load_template(path: Option<&Path>) -> Result<String, AppError> {
    let Some(path) = path else {
        return Ok(DEFAULT_QA_TEMPLATE.to_string());
    };
    let text = fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("cannot read prompt template {}: {e}", path.display()))
    })?;
    if !text.contains("{{question}}") {
        return Err(AppError::Config(format!(
            "prompt template {} has no {{{{question}}}} placeholder",
            path.display()
        )));
    }
    Ok(text)
}

/// Fills `{{key}}` placeholders in a template.
///
/// Substitution is a single pass over the template: text coming from a value
/// is never scanned for placeholders. Unknown placeholders are left as written.
pub struct PromptBuilder {
    template: String,
    vars: Vec<(String, String)>,
}

impl PromptBuilder {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            vars: Vec::new(),
        }
    }

    pub fn var(mut self, key: &str, value: impl Into<String>) -> Self {
        self.vars.push((key.to_string(), value.into()));
        self
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn build(self) -> String {
        let mut prompt = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some(open) = rest.find("{{") {
            prompt.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            let Some(close) = after.find("}}") else {
                prompt.push_str(&rest[open..]);
                rest = "";
                break;
            };
            match self.lookup(&after[..close]) {
                Some(value) => prompt.push_str(value),
                None => prompt.push_str(&rest[open..open + 2 + close + 2]),
            }
            rest = &after[close + 2..];
        }
        prompt.push_str(rest);
        prompt
    }
}
