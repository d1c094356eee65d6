//! Selector registry: logical names to CSS selectors.
//!
//! Scenarios refer to UI fragments by human-readable names ("search bar",
//! "publication card"). The registry maps each component name to a CSS
//! selector and, per component, nested element names to their own
//! selectors. It is built once from harness configuration and read-only
//! for the life of the scenario; unknown names fail before any UI query
//! is attempted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::result::{EsperarError, EsperarResult};

/// Selector configuration for one named component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// CSS selector matching every instance of the component
    pub selector: String,
    /// Nested element names to selectors, resolved relative to one instance
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub elements: HashMap<String, String>,
}

impl ComponentSpec {
    /// Create a spec with a selector and no nested elements
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            elements: HashMap::new(),
        }
    }

    /// Add a nested element selector
    #[must_use]
    pub fn with_element(mut self, name: impl Into<String>, selector: impl Into<String>) -> Self {
        let _ = self.elements.insert(name.into(), selector.into());
        self
    }
}

/// Mapping from component name to its selector configuration.
pub type SelectorMap = HashMap<String, ComponentSpec>;

/// Mapping from standalone field name to selector.
pub type FieldMap = HashMap<String, String>;

/// Immutable name-to-selector lookup for components, nested elements and
/// standalone fields.
#[derive(Debug, Clone, Default)]
pub struct SelectorRegistry {
    components: SelectorMap,
    fields: FieldMap,
}

impl SelectorRegistry {
    /// Create a registry over a component map
    #[must_use]
    pub fn new(components: SelectorMap) -> Self {
        Self {
            components,
            fields: FieldMap::new(),
        }
    }

    /// Attach a standalone field map
    #[must_use]
    pub fn with_fields(mut self, fields: FieldMap) -> Self {
        self.fields = fields;
        self
    }

    /// Load a component map from a YAML document
    ///
    /// The document is a nested mapping:
    ///
    /// ```yaml
    /// banner:
    ///   selector: ".site-banner"
    ///   elements:
    ///     title: ".site-banner__title"
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a YAML error if the document does not deserialize into a
    /// component map.
    pub fn from_yaml_str(yaml: &str) -> EsperarResult<Self> {
        let components: SelectorMap = serde_yaml_ng::from_str(yaml)?;
        Ok(Self::new(components))
    }

    /// Load a component map from an in-memory JSON value
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the value does not deserialize into a
    /// component map.
    pub fn from_json_value(value: serde_json::Value) -> EsperarResult<Self> {
        let components: SelectorMap = serde_json::from_value(value)?;
        Ok(Self::new(components))
    }

    /// Resolve a component name to its selector
    ///
    /// # Errors
    ///
    /// Returns [`EsperarError::UndefinedComponent`] when the name is not in
    /// the map.
    pub fn resolve_component(&self, name: &str) -> EsperarResult<&str> {
        self.components
            .get(name)
            .map(|spec| spec.selector.as_str())
            .ok_or_else(|| EsperarError::UndefinedComponent {
                component: name.to_string(),
            })
    }

    /// Resolve an element name within a component to its selector
    ///
    /// # Errors
    ///
    /// Returns [`EsperarError::UndefinedElement`] when the component has no
    /// such element (or the component itself is unknown).
    pub fn resolve_element(&self, component: &str, element: &str) -> EsperarResult<&str> {
        self.components
            .get(component)
            .and_then(|spec| spec.elements.get(element))
            .map(String::as_str)
            .ok_or_else(|| EsperarError::UndefinedElement {
                component: component.to_string(),
                element: element.to_string(),
            })
    }

    /// Resolve a standalone field name, falling back to the input itself
    ///
    /// Scenario steps may name either a mapped field or a raw CSS selector;
    /// an unmapped name is returned verbatim so it can be used as a
    /// selector directly.
    #[must_use]
    pub fn resolve_field<'a>(&'a self, name_or_selector: &'a str) -> &'a str {
        self.fields
            .get(name_or_selector)
            .map_or(name_or_selector, String::as_str)
    }

    /// Check whether a component name is defined
    #[must_use]
    pub fn has_component(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Names of all configured components
    #[must_use]
    pub fn component_names(&self) -> Vec<&str> {
        self.components.keys().map(String::as_str).collect()
    }
}
