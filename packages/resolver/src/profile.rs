//! Test profiles: the contact record previews are personalized against.

use crate::config::with_timeout;
use crate::{ResolveError, ResolverConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One contact record, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile {
    fields: Map<String, Value>,
}

impl Profile {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Builds a profile from a JSON object; anything else yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Raw field value. `null` counts as absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|value| !value.is_null())
    }

    /// Field value as substitution text.
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Contact id passed to offer decisioning (`id`, else `contact_id`).
    pub fn contact_id(&self) -> Option<String> {
        self.text("id").or_else(|| self.text("contact_id"))
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }
}

/// Looks up test profiles by id.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self, profile_id: &str) -> Result<Profile, ResolveError>;
}

/// Profiles loaded from a JSON object `{ "<profile id>": { ...fields } }`.
#[derive(Debug, Clone, Default)]
pub struct StaticProfileSource {
    profiles: BTreeMap<String, Profile>,
}

impl StaticProfileSource {
    pub fn from_json(source: &str) -> Result<Self, ResolveError> {
        let profiles = serde_json::from_str(source)?;
        Ok(Self { profiles })
    }

    pub fn insert(&mut self, profile_id: impl Into<String>, profile: Profile) {
        self.profiles.insert(profile_id.into(), profile);
    }
}

#[async_trait]
impl ProfileSource for StaticProfileSource {
    async fn fetch_profile(&self, profile_id: &str) -> Result<Profile, ResolveError> {
        self.profiles
            .get(profile_id)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(format!("profile {}", profile_id)))
    }
}

/// Fetch a profile, bounded by the configured timeout.
pub async fn load_profile(
    source: &dyn ProfileSource,
    profile_id: &str,
    config: &ResolverConfig,
) -> Result<Profile, ResolveError> {
    with_timeout(config.timeout, source.fetch_profile(profile_id)).await
}
