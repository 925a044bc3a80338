//! Namespace keys: one vector collection per (class, subject, topic).

use serde::Deserialize;

/// Derive the collection name for a tag triple.
///
/// Each tag is trimmed and lowercased, the three are joined with `_`, and
/// every remaining whitespace character becomes `_`. Other characters pass
/// through untouched, so `"a_b" / "c"` and `"a" / "b_c"` share a key.
pub fn namespace_key(class_name: &str, subject: &str, topic: &str) -> String {
    [class_name, subject, topic]
        .iter()
        .map(|t| t.trim().to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// The three tags a teacher attaches to an upload and a student asks under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NoteTags {
    pub class_name: String,
    pub subject: String,
    pub topic: String,
}

impl NoteTags {
    pub fn new(
        class_name: impl Into<String>,
        subject: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            subject: subject.into(),
            topic: topic.into(),
        }
    }

    pub fn namespace(&self) -> String {
        namespace_key(&self.class_name, &self.subject, &self.topic)
    }
}
