//! Read-only component metadata store.
//!
//! Components are loaded once from a JSON document of the form
//! `{"components": [ ... ]}` and then only queried.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::device::Device;
use crate::error::EngineError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct MetadataDocument {
    #[serde(default)]
    components: Vec<Component>,
}

/// Set of known firmware components.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    components: Vec<Component>,
}

impl MetadataStore {
    /// Build a store, rejecting duplicate component ids.
    pub fn new(components: Vec<Component>) -> Result<Self, EngineError> {
        let mut seen = HashSet::new();
        for component in &components {
            if !seen.insert(component.id.as_str()) {
                return Err(EngineError::DuplicateComponent(component.id.clone()));
            }
        }
        Ok(Self { components })
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let document: MetadataDocument = serde_json::from_str(json)?;
        Self::new(document.components)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)?;
        let store = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.display(),
            components = store.len(),
            "loaded component metadata"
        );
        Ok(store)
    }

    /// Serialize the store back into its JSON document form.
    pub fn to_json(&self) -> Result<String, EngineError> {
        let document = MetadataDocument {
            components: self.components.clone(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn get(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Components claiming a flashed GUID that `device` answers to.
    pub fn components_for_device<'s>(&'s self, device: &Device) -> Vec<&'s Component> {
        self.components
            .iter()
            .filter(|c| c.flashed_guids().any(|guid| device.has_guid(guid)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
