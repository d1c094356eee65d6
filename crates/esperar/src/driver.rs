//! Abstract live-UI driver boundary.
//!
//! The engine never talks to a rendering backend directly; it goes through
//! the [`UiDriver`] trait, which captures the minimum capability surface the
//! vocabulary layer needs (queries, state reads, click/fill actions). This
//! keeps the engine testable against [`MockDriver`] and lets the harness
//! swap automation backends without touching assertion logic.
//!
//! Active-element introspection is an optional capability: a backend that
//! cannot report the focused node returns
//! [`EsperarError::UnsupportedOperation`] from [`UiDriver::active_element`]
//! so focus checks fail fast instead of reporting a false negative.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

use crate::result::{EsperarError, EsperarResult};

/// Opaque reference to a single live UI node.
///
/// The handle is owned by the driver; the engine only reads through it and
/// passes it back. Handles are valid for the query that produced them;
/// re-checking state after time has passed requires a new query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeHandle {
    id: String,
}

impl NodeHandle {
    /// Create a handle from a driver-assigned id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Driver-assigned id of the node
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Minimum capability surface of a live-UI automation backend.
///
/// One call here is one query or action against the live UI; no method
/// retries internally. Retry policy lives in the poll loop, nowhere else.
pub trait UiDriver {
    /// Query all nodes matching a CSS selector, in document order
    fn find_all(&self, selector: &str) -> EsperarResult<Vec<NodeHandle>>;

    /// Query the first node matching a CSS selector
    fn find_one(&self, selector: &str) -> EsperarResult<Option<NodeHandle>>;

    /// Look a node up by id/name conventions (fallback lookup strategy)
    fn find_named(&self, name_or_id: &str) -> EsperarResult<Option<NodeHandle>>;

    /// Query the first descendant of `scope` matching a CSS selector
    fn find_in(&self, scope: &NodeHandle, selector: &str) -> EsperarResult<Option<NodeHandle>>;

    /// Whether the node is visible in the current layout
    fn is_visible(&self, node: &NodeHandle) -> EsperarResult<bool>;

    /// Rendered text content of the node
    fn text(&self, node: &NodeHandle) -> EsperarResult<String>;

    /// Attribute value, `None` when the attribute is absent
    fn attribute(&self, node: &NodeHandle, name: &str) -> EsperarResult<Option<String>>;

    /// Current form value of the node
    fn value(&self, node: &NodeHandle) -> EsperarResult<String>;

    /// Click the node
    fn click(&self, node: &NodeHandle) -> EsperarResult<()>;

    /// Set the form value of the node
    fn set_value(&self, node: &NodeHandle, value: &str) -> EsperarResult<()>;

    /// Move focus to the node
    fn focus(&self, node: &NodeHandle) -> EsperarResult<()>;

    /// The currently focused node, if any.
    ///
    /// Optional capability: backends without active-element introspection
    /// return [`EsperarError::UnsupportedOperation`].
    fn active_element(&self) -> EsperarResult<Option<NodeHandle>>;

    /// Evaluate a script in the page context.
    ///
    /// Used by callers layered on top of this engine; the engine itself
    /// never calls it.
    fn run_script(&self, source: &str) -> EsperarResult<serde_json::Value>;
}

/// One scripted node inside [`MockDriver`].
#[derive(Debug, Clone)]
pub struct MockNode {
    /// Driver-assigned id
    pub id: String,
    /// CSS selector this node matches
    pub selector: String,
    /// id/name the named fallback lookup matches on
    pub name: Option<String>,
    /// Id of the enclosing node, for scoped queries
    pub parent: Option<String>,
    /// Rendered text
    pub text: String,
    /// Form value
    pub value: String,
    /// Whether the node reports itself visible
    pub visible: bool,
    /// Attributes by name
    pub attributes: HashMap<String, String>,
    hidden_for: usize,
    absent_for: usize,
}

impl MockNode {
    /// Create a visible, empty node matching `selector`
    #[must_use]
    pub fn new(id: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            selector: selector.into(),
            name: None,
            parent: None,
            text: String::new(),
            value: String::new(),
            visible: true,
            attributes: HashMap::new(),
            hidden_for: 0,
            absent_for: 0,
        }
    }

    /// Set the rendered text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the form value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the id/name used by the named fallback lookup
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Nest the node under a parent id for scoped queries
    #[must_use]
    pub fn within(mut self, parent_id: impl Into<String>) -> Self {
        self.parent = Some(parent_id.into());
        self
    }

    /// Mark the node as hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Report hidden for the first `checks` visibility queries, then visible.
    ///
    /// Models content that renders asynchronously, for exercising waits
    /// deterministically.
    #[must_use]
    pub const fn visible_after(mut self, checks: usize) -> Self {
        self.hidden_for = checks;
        self
    }

    /// Stay out of query results for the first `queries` matching lookups.
    #[must_use]
    pub const fn appearing_after(mut self, queries: usize) -> Self {
        self.absent_for = queries;
        self
    }
}

/// In-memory [`UiDriver`] for unit tests.
///
/// Holds scripted nodes and records every action for verification, the
/// same way a scenario would observe them.
#[derive(Debug, Default)]
pub struct MockDriver {
    nodes: RefCell<Vec<MockNode>>,
    active: RefCell<Option<String>>,
    active_element_supported: bool,
    script_result: Option<serde_json::Value>,
    calls: RefCell<Vec<String>>,
}

impl MockDriver {
    /// Create an empty driver with active-element support enabled
    #[must_use]
    pub fn new() -> Self {
        Self {
            active_element_supported: true,
            ..Self::default()
        }
    }

    /// Toggle active-element introspection support
    #[must_use]
    pub fn with_active_element_support(mut self, supported: bool) -> Self {
        self.active_element_supported = supported;
        self
    }

    /// Add a scripted node (builder form)
    #[must_use]
    pub fn with_node(self, node: MockNode) -> Self {
        self.nodes.borrow_mut().push(node);
        self
    }

    /// Add a scripted node
    pub fn add_node(&mut self, node: MockNode) {
        self.nodes.get_mut().push(node);
    }

    /// Mark a node as the currently focused one
    pub fn set_active(&self, id: impl Into<String>) {
        *self.active.borrow_mut() = Some(id.into());
    }

    /// Set the value returned by `run_script`
    pub fn set_script_result(&mut self, value: serde_json::Value) {
        self.script_result = Some(value);
    }

    /// Recorded calls, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Check whether a call with the given prefix was recorded
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.starts_with(prefix))
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn matching_handles<F>(&self, mut matches: F) -> Vec<NodeHandle>
    where
        F: FnMut(&MockNode) -> bool,
    {
        let mut nodes = self.nodes.borrow_mut();
        let mut handles = Vec::new();
        for node in nodes.iter_mut() {
            if !matches(node) {
                continue;
            }
            if node.absent_for > 0 {
                node.absent_for -= 1;
                continue;
            }
            handles.push(NodeHandle::new(node.id.clone()));
        }
        handles
    }

    fn read<T, F>(&self, node: &NodeHandle, reader: F) -> EsperarResult<T>
    where
        F: FnOnce(&MockNode) -> T,
    {
        let nodes = self.nodes.borrow();
        nodes
            .iter()
            .find(|n| n.id == node.id())
            .map(reader)
            .ok_or_else(|| EsperarError::Driver {
                message: format!("unknown node {:?}", node.id()),
            })
    }
}

impl UiDriver for MockDriver {
    fn find_all(&self, selector: &str) -> EsperarResult<Vec<NodeHandle>> {
        self.record(format!("find_all:{selector}"));
        Ok(self.matching_handles(|n| n.selector == selector))
    }

    fn find_one(&self, selector: &str) -> EsperarResult<Option<NodeHandle>> {
        self.record(format!("find_one:{selector}"));
        Ok(self
            .matching_handles(|n| n.selector == selector)
            .into_iter()
            .next())
    }

    fn find_named(&self, name_or_id: &str) -> EsperarResult<Option<NodeHandle>> {
        self.record(format!("find_named:{name_or_id}"));
        Ok(self
            .matching_handles(|n| {
                n.name.as_deref() == Some(name_or_id) || n.id == name_or_id
            })
            .into_iter()
            .next())
    }

    fn find_in(&self, scope: &NodeHandle, selector: &str) -> EsperarResult<Option<NodeHandle>> {
        self.record(format!("find_in:{}:{selector}", scope.id()));
        let scope_id = scope.id().to_string();
        Ok(self
            .matching_handles(|n| {
                n.selector == selector && n.parent.as_deref() == Some(scope_id.as_str())
            })
            .into_iter()
            .next())
    }

    fn is_visible(&self, node: &NodeHandle) -> EsperarResult<bool> {
        let mut nodes = self.nodes.borrow_mut();
        let found = nodes
            .iter_mut()
            .find(|n| n.id == node.id())
            .ok_or_else(|| EsperarError::Driver {
                message: format!("unknown node {:?}", node.id()),
            })?;
        if found.hidden_for > 0 {
            found.hidden_for -= 1;
            return Ok(false);
        }
        Ok(found.visible)
    }

    fn text(&self, node: &NodeHandle) -> EsperarResult<String> {
        self.read(node, |n| n.text.clone())
    }

    fn attribute(&self, node: &NodeHandle, name: &str) -> EsperarResult<Option<String>> {
        self.read(node, |n| n.attributes.get(name).cloned())
    }

    fn value(&self, node: &NodeHandle) -> EsperarResult<String> {
        self.read(node, |n| n.value.clone())
    }

    fn click(&self, node: &NodeHandle) -> EsperarResult<()> {
        self.record(format!("click:{}", node.id()));
        Ok(())
    }

    fn set_value(&self, node: &NodeHandle, value: &str) -> EsperarResult<()> {
        self.record(format!("set_value:{}={value}", node.id()));
        let mut nodes = self.nodes.borrow_mut();
        if let Some(found) = nodes.iter_mut().find(|n| n.id == node.id()) {
            found.value = value.to_string();
        }
        Ok(())
    }

    fn focus(&self, node: &NodeHandle) -> EsperarResult<()> {
        self.record(format!("focus:{}", node.id()));
        *self.active.borrow_mut() = Some(node.id().to_string());
        Ok(())
    }

    fn active_element(&self) -> EsperarResult<Option<NodeHandle>> {
        if !self.active_element_supported {
            return Err(EsperarError::UnsupportedOperation {
                capability: "active element introspection".to_string(),
            });
        }
        Ok(self.active.borrow().clone().map(NodeHandle::new))
    }

    fn run_script(&self, source: &str) -> EsperarResult<serde_json::Value> {
        self.record(format!("run_script:{source}"));
        Ok(self.script_result.clone().unwrap_or(serde_json::Value::Null))
    }
}
