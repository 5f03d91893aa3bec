//! Kubeconfig document model.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::DocumentError;

/// A named entry of `clusters`, `users` or `contexts`.
///
/// Everything besides the name (the `cluster`, `user` or `context` body and
/// any extensions) is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedEntry {
    /// Entry name, unique within its list.
    pub name: String,
    /// Remaining fields.
    #[serde(flatten)]
    pub fields: Mapping,
}

impl NamedEntry {
    /// Look up a field of the entry body, e.g. `body("user")`.
    #[must_use]
    pub fn body(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// A Kubernetes client configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Schema version, `v1` in practice.
    #[serde(rename = "apiVersion", default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    /// Known clusters.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub clusters: Vec<NamedEntry>,
    /// Known contexts.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contexts: Vec<NamedEntry>,
    /// Selected context, empty when none.
    #[serde(rename = "current-context", default)]
    pub current_context: String,
    /// Document kind, `Config` in practice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Client preferences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Value>,
    /// Known users.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub users: Vec<NamedEntry>,
    /// Top-level fields this model does not know about.
    #[serde(flatten)]
    pub extra: Mapping,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<NamedEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<NamedEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Document {
    /// Parse a document from YAML (JSON is accepted as a subset).
    ///
    /// Blank input yields an empty document.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a kubeconfig or repeats names.
    pub fn from_yaml(input: &str) -> Result<Self, DocumentError> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        let document: Self = serde_yaml::from_str(input)?;
        document.validate()?;
        Ok(document)
    }

    /// Render the document as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if a preserved value cannot be serialized.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    fn validate(&self) -> Result<(), DocumentError> {
        for (list, entries) in [
            ("clusters", &self.clusters),
            ("contexts", &self.contexts),
            ("users", &self.users),
        ] {
            let mut seen = HashSet::new();
            for entry in entries {
                if entry.name.is_empty() {
                    return Err(DocumentError::MissingName { list });
                }
                if !seen.insert(entry.name.as_str()) {
                    return Err(DocumentError::DuplicateName {
                        list,
                        name: entry.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Look up a cluster by name.
    #[must_use]
    pub fn cluster(&self, name: &str) -> Option<&NamedEntry> {
        self.clusters.iter().find(|e| e.name == name)
    }

    /// Look up a context by name.
    #[must_use]
    pub fn context(&self, name: &str) -> Option<&NamedEntry> {
        self.contexts.iter().find(|e| e.name == name)
    }

    /// Look up a user by name.
    #[must_use]
    pub fn user(&self, name: &str) -> Option<&NamedEntry> {
        self.users.iter().find(|e| e.name == name)
    }

    /// Merge `other` into this document.
    ///
    /// Clusters, users and contexts from `other` replace same-named entries in
    /// place and are appended otherwise. `current-context` follows `other` when
    /// it names one and either `switch_context` is set or this document has
    /// none. Every other field of this document is kept; `apiVersion` and
    /// `kind` are only filled in when missing.
    pub fn merge(&mut self, other: Self, switch_context: bool) {
        upsert(&mut self.clusters, other.clusters);
        upsert(&mut self.users, other.users);
        upsert(&mut self.contexts, other.contexts);

        if !other.current_context.is_empty()
            && (switch_context || self.current_context.is_empty())
        {
            self.current_context = other.current_context;
        }
        if self.api_version.is_none() {
            self.api_version = other.api_version;
        }
        if self.kind.is_none() {
            self.kind = other.kind;
        }
    }
}

fn upsert(target: &mut Vec<NamedEntry>, incoming: Vec<NamedEntry>) {
    for entry in incoming {
        match target.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => target.push(entry),
        }
    }
}
