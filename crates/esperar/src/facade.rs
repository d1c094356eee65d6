//! Public operation vocabulary over named components and elements.
//!
//! [`UiAssertions`] composes the registry, locator, filter, evaluator and
//! poll loop into the operations a scenario step calls: wait for a
//! component, assert a state, count matching instances, click the first
//! match. It owns the default timeout per operation family and wires every
//! failure into the error taxonomy with the operation and subject named.
//!
//! Collaborators are injected at construction: the facade borrows the
//! driver session owned by the scenario runner and owns its registry and
//! timeouts. Nothing is discovered from ambient state.

use std::thread;
use std::time::Duration;

use crate::driver::{NodeHandle, UiDriver};
use crate::filter::{TextFilter, TextMatch};
use crate::locator::Locator;
use crate::registry::SelectorRegistry;
use crate::result::{EsperarError, EsperarResult};
use crate::retry::{
    poll, PollOptions, COMPONENT_NOT_VISIBLE_TIMEOUT_MS, COMPONENT_VISIBLE_TIMEOUT_MS,
    DEFAULT_POLL_INTERVAL_MS, ELEMENT_TIMEOUT_MS,
};
use crate::state::{ComponentState, Quantifier, StateEvaluator};

/// Default timeouts per operation family, all tunable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeouts {
    /// Deadline for component visibility waits, in milliseconds
    pub component_visible_ms: u64,
    /// Deadline for component invisibility waits, in milliseconds
    pub component_not_visible_ms: u64,
    /// Deadline for generic element waits, in milliseconds
    pub element_ms: u64,
    /// Polling interval shared by every wait, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            component_visible_ms: COMPONENT_VISIBLE_TIMEOUT_MS,
            component_not_visible_ms: COMPONENT_NOT_VISIBLE_TIMEOUT_MS,
            element_ms: ELEMENT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Timeouts {
    /// Create timeouts with the default per-family deadlines
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the component visibility deadline
    #[must_use]
    pub const fn with_component_visible(mut self, ms: u64) -> Self {
        self.component_visible_ms = ms;
        self
    }

    /// Set the component invisibility deadline
    #[must_use]
    pub const fn with_component_not_visible(mut self, ms: u64) -> Self {
        self.component_not_visible_ms = ms;
        self
    }

    /// Set the generic element deadline
    #[must_use]
    pub const fn with_element(mut self, ms: u64) -> Self {
        self.element_ms = ms;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Poll options for component visibility waits
    #[must_use]
    pub const fn component_visible(&self) -> PollOptions {
        PollOptions {
            timeout_ms: self.component_visible_ms,
            interval_ms: self.poll_interval_ms,
        }
    }

    /// Poll options for component invisibility waits
    #[must_use]
    pub const fn component_not_visible(&self) -> PollOptions {
        PollOptions {
            timeout_ms: self.component_not_visible_ms,
            interval_ms: self.poll_interval_ms,
        }
    }

    /// Poll options for generic element waits
    #[must_use]
    pub const fn element(&self) -> PollOptions {
        PollOptions {
            timeout_ms: self.element_ms,
            interval_ms: self.poll_interval_ms,
        }
    }
}

/// Quantifier pairing for positive state checks.
///
/// A component is visible or focused when ANY instance is; it is not
/// visible only when ALL instances are. The asymmetry is a domain rule,
/// not an accident.
const fn positive_quantifier(state: ComponentState) -> Quantifier {
    match state {
        ComponentState::NotVisible => Quantifier::All,
        ComponentState::Visible | ComponentState::Focused => Quantifier::Any,
    }
}

/// Assertion vocabulary bound to one driver session and one registry.
#[derive(Debug)]
pub struct UiAssertions<'d, D: UiDriver> {
    driver: &'d D,
    registry: SelectorRegistry,
    timeouts: Timeouts,
}

impl<'d, D: UiDriver> UiAssertions<'d, D> {
    /// Create the facade over a driver session and a selector registry
    #[must_use]
    pub fn new(driver: &'d D, registry: SelectorRegistry) -> Self {
        Self {
            driver,
            registry,
            timeouts: Timeouts::default(),
        }
    }

    /// Override the default timeouts
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// The configured timeouts
    #[must_use]
    pub const fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// The selector registry
    #[must_use]
    pub const fn registry(&self) -> &SelectorRegistry {
        &self.registry
    }

    const fn locator(&self) -> Locator<'d, D> {
        Locator::new(self.driver)
    }

    const fn evaluator(&self) -> StateEvaluator<'d, D> {
        StateEvaluator::new(self.driver)
    }

    const fn text_filter(&self) -> TextFilter<'d, D> {
        TextFilter::new(self.driver)
    }

    /// Fresh snapshot of every instance of a named component
    fn component_snapshot(&self, name: &str) -> EsperarResult<Vec<NodeHandle>> {
        let selector = self.registry.resolve_component(name)?;
        self.locator().find_all(selector)
    }

    // ------------------------------------------------------------------
    // Component vocabulary
    // ------------------------------------------------------------------

    /// Wait until at least one instance of the component is visible.
    ///
    /// Each poll tick issues a fresh query; the returned snapshot is the
    /// one that satisfied the wait.
    ///
    /// # Errors
    ///
    /// [`EsperarError::UndefinedComponent`] before any polling when the
    /// name is unknown; [`EsperarError::Timeout`] when the deadline passes.
    pub fn wait_until_component_visible(&self, name: &str) -> EsperarResult<Vec<NodeHandle>> {
        let selector = self.registry.resolve_component(name)?.to_string();
        let operation = format!("wait_until_component_visible({name:?})");
        tracing::debug!(component = name, selector = %selector, "waiting for component");
        poll(&operation, &self.timeouts.component_visible(), || {
            let snapshot = self.locator().find_all(&selector)?;
            if self.evaluator().evaluate_snapshot(
                &snapshot,
                ComponentState::Visible,
                Quantifier::Any,
            )? {
                Ok(Some(snapshot))
            } else {
                Ok(None)
            }
        })
    }

    /// Wait until no instance of the component is visible.
    ///
    /// Vacuously satisfied by an empty snapshot: zero instances means the
    /// component is not visible.
    ///
    /// # Errors
    ///
    /// [`EsperarError::UndefinedComponent`] before polling,
    /// [`EsperarError::Timeout`] on deadline.
    pub fn wait_until_component_not_visible(&self, name: &str) -> EsperarResult<()> {
        let selector = self.registry.resolve_component(name)?.to_string();
        let operation = format!("wait_until_component_not_visible({name:?})");
        tracing::debug!(component = name, selector = %selector, "waiting for component to leave");
        poll(&operation, &self.timeouts.component_not_visible(), || {
            let snapshot = self.locator().find_all(&selector)?;
            if self.evaluator().evaluate_snapshot(
                &snapshot,
                ComponentState::NotVisible,
                Quantifier::All,
            )? {
                Ok(Some(()))
            } else {
                Ok(None)
            }
        })
    }

    /// Single-shot check that the component is in `state`.
    ///
    /// # Errors
    ///
    /// [`EsperarError::StateMismatch`] naming the component and the
    /// expected/actual state when the check fails.
    pub fn assert_component_state(
        &self,
        name: &str,
        state: ComponentState,
    ) -> EsperarResult<()> {
        let snapshot = self.component_snapshot(name)?;
        if self
            .evaluator()
            .evaluate_snapshot(&snapshot, state, positive_quantifier(state))?
        {
            Ok(())
        } else {
            Err(EsperarError::StateMismatch {
                subject: format!("component {name:?}"),
                expected: state.as_str().to_string(),
                actual: state.opposite_str().to_string(),
            })
        }
    }

    /// Single-shot check that the component is NOT in `state`.
    ///
    /// # Errors
    ///
    /// [`EsperarError::StateMismatch`] when the component is in the state
    /// it should not be in.
    pub fn assert_component_not_state(
        &self,
        name: &str,
        state: ComponentState,
    ) -> EsperarResult<()> {
        let snapshot = self.component_snapshot(name)?;
        if self
            .evaluator()
            .evaluate_snapshot(&snapshot, state, positive_quantifier(state))?
        {
            Err(EsperarError::StateMismatch {
                subject: format!("component {name:?}"),
                expected: state.opposite_str().to_string(),
                actual: state.as_str().to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Like [`Self::assert_component_not_state`], after letting the UI
    /// settle for a fixed delay. The snapshot is taken after the delay.
    ///
    /// # Errors
    ///
    /// As [`Self::assert_component_not_state`].
    pub fn assert_component_not_state_after(
        &self,
        name: &str,
        state: ComponentState,
        settle: Duration,
    ) -> EsperarResult<()> {
        thread::sleep(settle);
        self.assert_component_not_state(name, state)
    }

    /// Assert that exactly `expected` instances match the text filter.
    ///
    /// # Errors
    ///
    /// [`EsperarError::StateMismatch`] with both counts when they differ.
    pub fn assert_component_count(
        &self,
        expected: usize,
        name: &str,
        text: &str,
        mode: TextMatch,
    ) -> EsperarResult<()> {
        let snapshot = self.component_snapshot(name)?;
        let matching = self.text_filter().filter_by_text(&snapshot, text, mode)?;
        if matching.len() == expected {
            Ok(())
        } else {
            Err(EsperarError::StateMismatch {
                subject: format!("component {name:?}"),
                expected: format!("{expected} matching instance(s)"),
                actual: matching.len().to_string(),
            })
        }
    }

    /// Assert that at least one instance contains the text.
    ///
    /// # Errors
    ///
    /// [`EsperarError::ElementNotFound`] when no instance matches.
    pub fn assert_component_contains_text(&self, name: &str, text: &str) -> EsperarResult<()> {
        let snapshot = self.component_snapshot(name)?;
        let matching =
            self.text_filter()
                .filter_by_text(&snapshot, text, TextMatch::Substring)?;
        if matching.is_empty() {
            Err(EsperarError::ElementNotFound {
                subject: format!("component {name:?} containing text {text:?}"),
            })
        } else {
            Ok(())
        }
    }

    /// Click the first instance of the component, in document order.
    ///
    /// # Errors
    ///
    /// [`EsperarError::ElementNotFound`] when the snapshot is empty.
    pub fn click_component(&self, name: &str) -> EsperarResult<()> {
        let snapshot = self.component_snapshot(name)?;
        let first = snapshot.first().ok_or_else(|| EsperarError::ElementNotFound {
            subject: format!("component {name:?}"),
        })?;
        self.driver.click(first)
    }

    /// Click the first instance whose text equals `text` exactly.
    ///
    /// # Errors
    ///
    /// [`EsperarError::ElementNotFound`] when nothing matches; no click is
    /// performed in that case.
    pub fn click_component_with_text(&self, name: &str, text: &str) -> EsperarResult<()> {
        let snapshot = self.component_snapshot(name)?;
        let matching = self
            .text_filter()
            .filter_by_text(&snapshot, text, TextMatch::Exact)?;
        let first = matching.first().ok_or_else(|| EsperarError::ElementNotFound {
            subject: format!("component {name:?} with text {text:?}"),
        })?;
        self.driver.click(first)
    }

    /// Move focus to the first instance of the component.
    ///
    /// # Errors
    ///
    /// [`EsperarError::ElementNotFound`] when the snapshot is empty.
    pub fn focus_component(&self, name: &str) -> EsperarResult<()> {
        let snapshot = self.component_snapshot(name)?;
        let first = snapshot.first().ok_or_else(|| EsperarError::ElementNotFound {
            subject: format!("component {name:?}"),
        })?;
        self.driver.focus(first)
    }

    /// Assert that the first instance carries an attribute with a value.
    ///
    /// # Errors
    ///
    /// [`EsperarError::ElementNotFound`] on an empty snapshot,
    /// [`EsperarError::StateMismatch`] when the attribute is absent or
    /// differs.
    pub fn assert_component_attribute(
        &self,
        name: &str,
        attribute: &str,
        value: &str,
    ) -> EsperarResult<()> {
        let snapshot = self.component_snapshot(name)?;
        let first = snapshot.first().ok_or_else(|| EsperarError::ElementNotFound {
            subject: format!("component {name:?}"),
        })?;
        let actual = self.driver.attribute(first, attribute)?;
        if actual.as_deref() == Some(value) {
            Ok(())
        } else {
            Err(EsperarError::StateMismatch {
                subject: format!("component {name:?} attribute {attribute:?}"),
                expected: format!("{value:?}"),
                actual: actual.map_or_else(|| "absent".to_string(), |a| format!("{a:?}")),
            })
        }
    }

    // ------------------------------------------------------------------
    // Element-of-component vocabulary
    // ------------------------------------------------------------------

    /// Wait until the named element inside the first text-matching
    /// instance of the component exists and is visible, returning it.
    ///
    /// # Errors
    ///
    /// Selector resolution errors before polling;
    /// [`EsperarError::Timeout`] on deadline.
    pub fn wait_for_component_element(
        &self,
        element: &str,
        component: &str,
        text: &str,
    ) -> EsperarResult<NodeHandle> {
        let component_selector = self.registry.resolve_component(component)?.to_string();
        let element_selector = self.registry.resolve_element(component, element)?.to_string();
        let operation = format!("wait_for_component_element({element:?}, {component:?})");
        poll(&operation, &self.timeouts.component_visible(), || {
            let snapshot = self.locator().find_all(&component_selector)?;
            let matching =
                self.text_filter()
                    .filter_by_text(&snapshot, text, TextMatch::Substring)?;
            let Some(first) = matching.first() else {
                return Ok(None);
            };
            match self.locator().find_in(first, &element_selector)? {
                Some(node) => {
                    if self.driver.is_visible(&node)? {
                        Ok(Some(node))
                    } else {
                        Ok(None)
                    }
                }
                None => Ok(None),
            }
        })
    }

    /// Wait for the nested element as above, then click it.
    ///
    /// # Errors
    ///
    /// As [`Self::wait_for_component_element`].
    pub fn click_component_element(
        &self,
        element: &str,
        component: &str,
        text: &str,
    ) -> EsperarResult<()> {
        let node = self.wait_for_component_element(element, component, text)?;
        self.driver.click(&node)
    }

    /// Single-shot state check of the named element across every
    /// text-matching instance of the component.
    ///
    /// For `Visible`/`NotVisible`, every instance whose nested element is
    /// present must satisfy the state (instances without the element are
    /// skipped). For `Focused`, one present element must be focused.
    ///
    /// # Errors
    ///
    /// [`EsperarError::StateMismatch`] naming element and component on
    /// failure.
    pub fn assert_element_of_component_state(
        &self,
        element: &str,
        component: &str,
        state: ComponentState,
        text: &str,
    ) -> EsperarResult<()> {
        let element_selector = self.registry.resolve_element(component, element)?.to_string();
        let matching = self.matching_instances(component, text)?;
        let subject = format!("element {element:?} of component {component:?}");

        match state {
            ComponentState::Visible | ComponentState::NotVisible => {
                for instance in &matching {
                    if let Some(node) = self.locator().find_in(instance, &element_selector)? {
                        if !self.evaluator().evaluate(&node, state)? {
                            return Err(EsperarError::StateMismatch {
                                subject,
                                expected: state.as_str().to_string(),
                                actual: state.opposite_str().to_string(),
                            });
                        }
                    }
                }
                Ok(())
            }
            ComponentState::Focused => {
                for instance in &matching {
                    if let Some(node) = self.locator().find_in(instance, &element_selector)? {
                        if self.evaluator().is_focused(&node)? {
                            return Ok(());
                        }
                    }
                }
                Err(EsperarError::StateMismatch {
                    subject,
                    expected: state.as_str().to_string(),
                    actual: state.opposite_str().to_string(),
                })
            }
        }
    }

    /// Single-shot check that the named element is NOT in `state` across
    /// the text-matching instances of the component.
    ///
    /// # Errors
    ///
    /// [`EsperarError::StateMismatch`] when some present element is in the
    /// state it should not be in (or, for `NotVisible`, when none is
    /// visible).
    pub fn assert_element_of_component_not_state(
        &self,
        element: &str,
        component: &str,
        state: ComponentState,
        text: &str,
    ) -> EsperarResult<()> {
        let element_selector = self.registry.resolve_element(component, element)?.to_string();
        let matching = self.matching_instances(component, text)?;
        let subject = format!("element {element:?} of component {component:?}");

        match state {
            ComponentState::Visible | ComponentState::Focused => {
                for instance in &matching {
                    if let Some(node) = self.locator().find_in(instance, &element_selector)? {
                        if self.evaluator().evaluate(&node, state)? {
                            return Err(EsperarError::StateMismatch {
                                subject,
                                expected: state.opposite_str().to_string(),
                                actual: state.as_str().to_string(),
                            });
                        }
                    }
                }
                Ok(())
            }
            // "Not not-visible" means some present element must be visible.
            ComponentState::NotVisible => {
                for instance in &matching {
                    if let Some(node) = self.locator().find_in(instance, &element_selector)? {
                        if self.driver.is_visible(&node)? {
                            return Ok(());
                        }
                    }
                }
                Err(EsperarError::StateMismatch {
                    subject,
                    expected: "visible".to_string(),
                    actual: "not visible".to_string(),
                })
            }
        }
    }

    /// Assert that the named element of every text-matching instance has
    /// exactly the given text.
    ///
    /// # Errors
    ///
    /// [`EsperarError::ElementNotFound`] when no instance matches the
    /// filter; [`EsperarError::StateMismatch`] on a text difference.
    pub fn assert_element_text(
        &self,
        element: &str,
        component: &str,
        text: &str,
    ) -> EsperarResult<()> {
        let element_selector = self.registry.resolve_element(component, element)?.to_string();
        let matching = self.matching_instances(component, text)?;
        if matching.is_empty() {
            return Err(EsperarError::ElementNotFound {
                subject: format!("component {component:?} containing text {text:?}"),
            });
        }
        for instance in &matching {
            if let Some(node) = self.locator().find_in(instance, &element_selector)? {
                let actual = self.driver.text(&node)?;
                if actual != text {
                    return Err(EsperarError::StateMismatch {
                        subject: format!("element {element:?} of component {component:?}"),
                        expected: format!("text {text:?}"),
                        actual: format!("text {actual:?}"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Resolve the named element inside the first text-matching instance.
    ///
    /// First match is first in document order, not best match.
    ///
    /// # Errors
    ///
    /// [`EsperarError::ElementNotFound`] when no instance matches the
    /// filter or the nested element is absent.
    pub fn get_first_matching_element(
        &self,
        element: &str,
        component: &str,
        text: &str,
    ) -> EsperarResult<NodeHandle> {
        let element_selector = self.registry.resolve_element(component, element)?.to_string();
        let matching = self.matching_instances(component, text)?;
        let first = matching.first().ok_or_else(|| EsperarError::ElementNotFound {
            subject: format!("component {component:?} containing text {text:?}"),
        })?;
        self.locator()
            .find_in(first, &element_selector)?
            .ok_or_else(|| EsperarError::ElementNotFound {
                subject: format!("element {element:?} of component {component:?}"),
            })
    }

    /// Fresh component snapshot narrowed by a substring text filter
    fn matching_instances(&self, component: &str, text: &str) -> EsperarResult<Vec<NodeHandle>> {
        let snapshot = self.component_snapshot(component)?;
        self.text_filter()
            .filter_by_text(&snapshot, text, TextMatch::Substring)
    }

    // ------------------------------------------------------------------
    // Standalone field vocabulary
    // ------------------------------------------------------------------

    /// Resolve a standalone field to a node, waiting for it to appear.
    ///
    /// The field name is looked up in the field map, or used verbatim as a
    /// CSS selector; the query falls back to id/name lookup on a CSS miss.
    ///
    /// # Errors
    ///
    /// [`EsperarError::ElementNotFound`] when the element never appears
    /// within the element deadline.
    pub fn element(&self, name_or_selector: &str) -> EsperarResult<NodeHandle> {
        let selector = self.registry.resolve_field(name_or_selector).to_string();
        let operation = format!("element({name_or_selector:?})");
        match poll(&operation, &self.timeouts.element(), || {
            self.locator().find_one(&selector)
        }) {
            Ok(node) => Ok(node),
            Err(EsperarError::Timeout { .. }) => Err(EsperarError::ElementNotFound {
                subject: format!("element {name_or_selector:?}"),
            }),
            Err(other) => Err(other),
        }
    }

    /// Wait for a field to reach a state, reporting whether it did.
    ///
    /// Non-asserting: a deadline miss yields `Ok(false)`, not an error. An
    /// absent node satisfies `NotVisible` and fails the other states.
    ///
    /// # Errors
    ///
    /// Driver faults and missing capabilities propagate.
    pub fn wait_for_element_state(
        &self,
        name_or_selector: &str,
        state: ComponentState,
    ) -> EsperarResult<bool> {
        self.wait_for_element_state_within(name_or_selector, state, self.timeouts.element().timeout())
    }

    /// [`Self::wait_for_element_state`] with an explicit deadline.
    ///
    /// # Errors
    ///
    /// Driver faults and missing capabilities propagate.
    pub fn wait_for_element_state_within(
        &self,
        name_or_selector: &str,
        state: ComponentState,
        timeout: Duration,
    ) -> EsperarResult<bool> {
        let selector = self.registry.resolve_field(name_or_selector).to_string();
        let operation = format!("wait_for_element_state({name_or_selector:?}, {state})");
        let options = self
            .timeouts
            .element()
            .with_timeout(timeout.as_millis() as u64);
        let outcome = poll(&operation, &options, || {
            let satisfied = match self.locator().find_one(&selector)? {
                Some(node) => self.evaluator().evaluate(&node, state)?,
                None => state == ComponentState::NotVisible,
            };
            Ok(satisfied.then_some(()))
        });
        match outcome {
            Ok(()) => Ok(true),
            Err(EsperarError::Timeout { .. }) => Ok(false),
            Err(other) => Err(other),
        }
    }

    /// Wait for a field and click it.
    ///
    /// # Errors
    ///
    /// As [`Self::element`].
    pub fn click_element(&self, name_or_selector: &str) -> EsperarResult<()> {
        let node = self.element(name_or_selector)?;
        self.driver.click(&node)
    }

    /// Wait for a field to become visible, then set its value.
    ///
    /// # Errors
    ///
    /// [`EsperarError::ElementNotFound`] when the field never appears.
    pub fn fill_element(&self, name_or_selector: &str, value: &str) -> EsperarResult<()> {
        let _ = self.wait_for_element_state(name_or_selector, ComponentState::Visible)?;
        let node = self.element(name_or_selector)?;
        self.driver.set_value(&node, value)
    }

    /// Wait for a field to become visible and assert its current value.
    ///
    /// # Errors
    ///
    /// [`EsperarError::StateMismatch`] with both values when they differ.
    pub fn assert_element_value(&self, name_or_selector: &str, value: &str) -> EsperarResult<()> {
        let _ = self.wait_for_element_state(name_or_selector, ComponentState::Visible)?;
        let node = self.element(name_or_selector)?;
        let actual = self.driver.value(&node)?;
        if actual == value {
            Ok(())
        } else {
            Err(EsperarError::StateMismatch {
                subject: format!("element {name_or_selector:?} value"),
                expected: format!("{value:?}"),
                actual: format!("{actual:?}"),
            })
        }
    }

    /// Single-shot state check of an already-resolved node.
    ///
    /// # Errors
    ///
    /// [`EsperarError::StateMismatch`] naming the node on failure.
    pub fn assert_element_state(
        &self,
        node: &NodeHandle,
        state: ComponentState,
    ) -> EsperarResult<()> {
        if self.evaluator().evaluate(node, state)? {
            Ok(())
        } else {
            Err(EsperarError::StateMismatch {
                subject: format!("element {:?}", node.id()),
                expected: state.as_str().to_string(),
                actual: state.opposite_str().to_string(),
            })
        }
    }

    /// Move focus to an already-resolved node.
    ///
    /// # Errors
    ///
    /// Driver faults propagate.
    pub fn focus_element(&self, node: &NodeHandle) -> EsperarResult<()> {
        self.driver.focus(node)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockNode};
    use crate::registry::{ComponentSpec, FieldMap, SelectorMap};
    use std::time::Instant;

    fn registry() -> SelectorRegistry {
        let mut map = SelectorMap::new();
        let _ = map.insert("banner".to_string(), ComponentSpec::new(".site-banner"));
        let _ = map.insert("popup".to_string(), ComponentSpec::new(".popup"));
        let _ = map.insert(
            "card".to_string(),
            ComponentSpec::new(".card")
                .with_element("title", ".card__title")
                .with_element("link", ".card__link"),
        );
        let mut fields = FieldMap::new();
        let _ = fields.insert("search".to_string(), "input#edit-search".to_string());
        SelectorRegistry::new(map).with_fields(fields)
    }

    fn fast() -> Timeouts {
        Timeouts::new()
            .with_component_visible(300)
            .with_component_not_visible(150)
            .with_element(150)
            .with_poll_interval(5)
    }

    fn facade(driver: &MockDriver) -> UiAssertions<'_, MockDriver> {
        UiAssertions::new(driver, registry()).with_timeouts(fast())
    }

    mod component_wait_tests {
        use super::*;

        #[test]
        fn test_visible_banner_satisfies_on_first_tick() {
            // Two visible instances: the wait returns the full snapshot at once.
            let driver = MockDriver::new()
                .with_node(MockNode::new("b1", ".site-banner"))
                .with_node(MockNode::new("b2", ".site-banner"));
            let ui = facade(&driver);

            let start = Instant::now();
            let snapshot = ui.wait_until_component_visible("banner").unwrap();
            assert_eq!(snapshot.len(), 2);
            assert!(start.elapsed() < Duration::from_millis(100));
        }

        #[test]
        fn test_wait_spans_ticks_until_component_renders() {
            let driver = MockDriver::new()
                .with_node(MockNode::new("b1", ".site-banner").visible_after(2));
            let ui = facade(&driver);

            let snapshot = ui.wait_until_component_visible("banner").unwrap();
            assert_eq!(snapshot.len(), 1);
        }

        #[test]
        fn test_wait_visible_times_out_when_all_hidden() {
            let driver = MockDriver::new().with_node(MockNode::new("b1", ".site-banner").hidden());
            let ui = facade(&driver);

            let err = ui.wait_until_component_visible("banner").unwrap_err();
            match err {
                EsperarError::Timeout { operation, ms } => {
                    assert!(operation.contains("banner"));
                    assert_eq!(ms, 300);
                }
                other => panic!("expected Timeout, got {other:?}"),
            }
        }

        #[test]
        fn test_not_visible_wait_is_vacuous_over_empty_snapshot() {
            // No popup nodes exist at all: the ALL quantifier is satisfied
            // within one poll interval.
            let driver = MockDriver::new();
            let ui = facade(&driver);

            let start = Instant::now();
            ui.wait_until_component_not_visible("popup").unwrap();
            assert!(start.elapsed() < Duration::from_millis(100));
        }

        #[test]
        fn test_not_visible_wait_times_out_while_one_instance_shows() {
            let driver = MockDriver::new()
                .with_node(MockNode::new("p1", ".popup").hidden())
                .with_node(MockNode::new("p2", ".popup"));
            let ui = facade(&driver);

            assert!(matches!(
                ui.wait_until_component_not_visible("popup"),
                Err(EsperarError::Timeout { .. })
            ));
        }

        #[test]
        fn test_unknown_component_fails_before_polling() {
            let driver = MockDriver::new();
            let ui = facade(&driver);

            let err = ui.wait_until_component_visible("ghost").unwrap_err();
            assert!(matches!(err, EsperarError::UndefinedComponent { .. }));
            // Fail-fast: no UI query was issued.
            assert!(driver.history().is_empty());
        }
    }

    mod component_state_tests {
        use super::*;

        #[test]
        fn test_visible_assertion_uses_any_quantifier() {
            let driver = MockDriver::new()
                .with_node(MockNode::new("b1", ".site-banner").hidden())
                .with_node(MockNode::new("b2", ".site-banner"));
            let ui = facade(&driver);

            ui.assert_component_state("banner", ComponentState::Visible)
                .unwrap();
        }

        #[test]
        fn test_not_visible_assertion_uses_all_quantifier() {
            // One instance still visible: "not visible" must fail even
            // though another instance is hidden.
            let driver = MockDriver::new()
                .with_node(MockNode::new("b1", ".site-banner").hidden())
                .with_node(MockNode::new("b2", ".site-banner"));
            let ui = facade(&driver);

            let err = ui
                .assert_component_state("banner", ComponentState::NotVisible)
                .unwrap_err();
            match err {
                EsperarError::StateMismatch {
                    subject,
                    expected,
                    actual,
                } => {
                    assert!(subject.contains("banner"));
                    assert_eq!(expected, "not visible");
                    assert_eq!(actual, "visible");
                }
                other => panic!("expected StateMismatch, got {other:?}"),
            }
        }

        #[test]
        fn test_focused_assertion() {
            let driver = MockDriver::new()
                .with_node(MockNode::new("b1", ".site-banner"))
                .with_node(MockNode::new("b2", ".site-banner"));
            driver.set_active("b2");
            let ui = facade(&driver);

            ui.assert_component_state("banner", ComponentState::Focused)
                .unwrap();
        }

        #[test]
        fn test_focused_assertion_without_capability() {
            let driver = MockDriver::new()
                .with_active_element_support(false)
                .with_node(MockNode::new("b1", ".site-banner"));
            let ui = facade(&driver);

            assert!(matches!(
                ui.assert_component_state("banner", ComponentState::Focused),
                Err(EsperarError::UnsupportedOperation { .. })
            ));
        }

        #[test]
        fn test_not_state_is_the_negation() {
            let driver = MockDriver::new()
                .with_node(MockNode::new("b1", ".site-banner").hidden())
                .with_node(MockNode::new("b2", ".site-banner").hidden());
            let ui = facade(&driver);

            ui.assert_component_not_state("banner", ComponentState::Visible)
                .unwrap();
            assert!(ui
                .assert_component_not_state("banner", ComponentState::NotVisible)
                .is_err());
        }

        #[test]
        fn test_not_state_after_settle_delay() {
            let driver = MockDriver::new().with_node(MockNode::new("b1", ".site-banner").hidden());
            let ui = facade(&driver);

            let start = Instant::now();
            ui.assert_component_not_state_after(
                "banner",
                ComponentState::Visible,
                Duration::from_millis(20),
            )
            .unwrap();
            assert!(start.elapsed() >= Duration::from_millis(20));
        }
    }

    mod component_count_and_text_tests {
        use super::*;

        fn card_driver() -> MockDriver {
            MockDriver::new()
                .with_node(MockNode::new("c1", ".card").with_text("A"))
                .with_node(MockNode::new("c2", ".card").with_text("B"))
                .with_node(MockNode::new("c3", ".card").with_text("A"))
        }

        #[test]
        fn test_count_with_exact_text() {
            let driver = card_driver();
            let ui = facade(&driver);
            ui.assert_component_count(2, "card", "A", TextMatch::Exact)
                .unwrap();
        }

        #[test]
        fn test_count_mismatch_reports_both_numbers() {
            let driver = card_driver();
            let ui = facade(&driver);
            let err = ui
                .assert_component_count(3, "card", "A", TextMatch::Exact)
                .unwrap_err();
            match err {
                EsperarError::StateMismatch {
                    expected, actual, ..
                } => {
                    assert!(expected.contains('3'));
                    assert_eq!(actual, "2");
                }
                other => panic!("expected StateMismatch, got {other:?}"),
            }
        }

        #[test]
        fn test_count_without_filter_counts_every_instance() {
            let driver = card_driver();
            let ui = facade(&driver);
            ui.assert_component_count(3, "card", "", TextMatch::Substring)
                .unwrap();
        }

        #[test]
        fn test_contains_text() {
            let driver = card_driver();
            let ui = facade(&driver);
            ui.assert_component_contains_text("card", "B").unwrap();
            assert!(matches!(
                ui.assert_component_contains_text("card", "Z"),
                Err(EsperarError::ElementNotFound { .. })
            ));
        }
    }

    mod component_action_tests {
        use super::*;

        #[test]
        fn test_click_first_instance_in_document_order() {
            let driver = MockDriver::new()
                .with_node(MockNode::new("b1", ".site-banner"))
                .with_node(MockNode::new("b2", ".site-banner"));
            let ui = facade(&driver);

            ui.click_component("banner").unwrap();
            assert!(driver.was_called("click:b1"));
            assert!(!driver.was_called("click:b2"));
        }

        #[test]
        fn test_click_with_text_picks_first_exact_match() {
            let driver = MockDriver::new()
                .with_node(MockNode::new("c1", ".card").with_text("Open"))
                .with_node(MockNode::new("c2", ".card").with_text("Save"))
                .with_node(MockNode::new("c3", ".card").with_text("Save"));
            let ui = facade(&driver);

            ui.click_component_with_text("card", "Save").unwrap();
            assert!(driver.was_called("click:c2"));
        }

        #[test]
        fn test_click_with_text_on_zero_matches_performs_no_click() {
            let driver = MockDriver::new().with_node(MockNode::new("c1", ".card").with_text("A"));
            let ui = facade(&driver);

            let err = ui.click_component_with_text("card", "X").unwrap_err();
            assert!(matches!(err, EsperarError::ElementNotFound { .. }));
            assert!(!driver.was_called("click"));
        }

        #[test]
        fn test_focus_component() {
            let driver = MockDriver::new().with_node(MockNode::new("b1", ".site-banner"));
            let ui = facade(&driver);

            ui.focus_component("banner").unwrap();
            assert!(driver.was_called("focus:b1"));
        }

        #[test]
        fn test_component_attribute_assertion() {
            let driver = MockDriver::new()
                .with_node(MockNode::new("b1", ".site-banner").with_attribute("role", "banner"));
            let ui = facade(&driver);

            ui.assert_component_attribute("banner", "role", "banner")
                .unwrap();
            assert!(matches!(
                ui.assert_component_attribute("banner", "role", "dialog"),
                Err(EsperarError::StateMismatch { .. })
            ));
            assert!(matches!(
                ui.assert_component_attribute("banner", "hidden", "true"),
                Err(EsperarError::StateMismatch { .. })
            ));
        }
    }

    mod component_element_tests {
        use super::*;

        fn cards_with_titles() -> MockDriver {
            MockDriver::new()
                .with_node(MockNode::new("c1", ".card").with_text("First card"))
                .with_node(MockNode::new("c2", ".card").with_text("Second card"))
                .with_node(
                    MockNode::new("t1", ".card__title")
                        .within("c1")
                        .with_text("First"),
                )
                .with_node(
                    MockNode::new("t2", ".card__title")
                        .within("c2")
                        .with_text("Second"),
                )
        }

        #[test]
        fn test_wait_for_element_of_first_matching_instance() {
            let driver = cards_with_titles();
            let ui = facade(&driver);

            let node = ui
                .wait_for_component_element("title", "card", "Second")
                .unwrap();
            assert_eq!(node.id(), "t2");
        }

        #[test]
        fn test_wait_for_element_spans_ticks_until_visible() {
            let driver = MockDriver::new()
                .with_node(MockNode::new("c1", ".card"))
                .with_node(
                    MockNode::new("t1", ".card__title")
                        .within("c1")
                        .visible_after(2),
                );
            let ui = facade(&driver);

            let node = ui.wait_for_component_element("title", "card", "").unwrap();
            assert_eq!(node.id(), "t1");
        }

        #[test]
        fn test_wait_for_element_times_out_when_absent() {
            let driver = MockDriver::new().with_node(MockNode::new("c1", ".card"));
            let ui = facade(&driver);

            assert!(matches!(
                ui.wait_for_component_element("title", "card", ""),
                Err(EsperarError::Timeout { .. })
            ));
        }

        #[test]
        fn test_unknown_element_fails_before_polling() {
            let driver = cards_with_titles();
            let ui = facade(&driver);

            let err = ui
                .wait_for_component_element("badge", "card", "")
                .unwrap_err();
            assert!(matches!(err, EsperarError::UndefinedElement { .. }));
        }

        #[test]
        fn test_click_component_element() {
            let driver = cards_with_titles();
            let ui = facade(&driver);

            ui.click_component_element("title", "card", "Second").unwrap();
            assert!(driver.was_called("click:t2"));
        }

        #[test]
        fn test_element_state_requires_every_present_element() {
            let mut driver = cards_with_titles();
            driver.add_node(MockNode::new("c3", ".card").with_text("Third card"));
            let ui = facade(&driver);

            // c3 has no title node: it is skipped, the present ones pass.
            ui.assert_element_of_component_state("title", "card", ComponentState::Visible, "")
                .unwrap();
        }

        #[test]
        fn test_element_state_fails_on_one_hidden_element() {
            let driver = MockDriver::new()
                .with_node(MockNode::new("c1", ".card"))
                .with_node(MockNode::new("c2", ".card"))
                .with_node(MockNode::new("t1", ".card__title").within("c1"))
                .with_node(MockNode::new("t2", ".card__title").within("c2").hidden());
            let ui = facade(&driver);

            assert!(matches!(
                ui.assert_element_of_component_state("title", "card", ComponentState::Visible, ""),
                Err(EsperarError::StateMismatch { .. })
            ));
        }

        #[test]
        fn test_element_focused_state_needs_one_focused() {
            let driver = cards_with_titles();
            driver.set_active("t2");
            let ui = facade(&driver);

            ui.assert_element_of_component_state("title", "card", ComponentState::Focused, "")
                .unwrap();
        }

        #[test]
        fn test_element_not_state() {
            let driver = MockDriver::new()
                .with_node(MockNode::new("c1", ".card"))
                .with_node(MockNode::new("t1", ".card__title").within("c1").hidden());
            let ui = facade(&driver);

            ui.assert_element_of_component_not_state(
                "title",
                "card",
                ComponentState::Visible,
                "",
            )
            .unwrap();
            // "Not not-visible" asks for a visible element; there is none.
            assert!(ui
                .assert_element_of_component_not_state(
                    "title",
                    "card",
                    ComponentState::NotVisible,
                    "",
                )
                .is_err());
        }

        #[test]
        fn test_element_text_assertion() {
            let driver = cards_with_titles();
            let ui = facade(&driver);

            ui.assert_element_text("title", "card", "First").unwrap();

            let err = ui.assert_element_text("title", "card", "card").unwrap_err();
            assert!(matches!(err, EsperarError::StateMismatch { .. }));
        }

        #[test]
        fn test_element_text_with_no_matching_instances() {
            let driver = cards_with_titles();
            let ui = facade(&driver);

            assert!(matches!(
                ui.assert_element_text("title", "card", "Missing"),
                Err(EsperarError::ElementNotFound { .. })
            ));
        }

        #[test]
        fn test_get_first_matching_element() {
            let driver = cards_with_titles();
            let ui = facade(&driver);

            let node = ui
                .get_first_matching_element("title", "card", "First")
                .unwrap();
            assert_eq!(node.id(), "t1");
        }

        #[test]
        fn test_get_first_matching_element_with_absent_nested_element() {
            let driver = MockDriver::new().with_node(MockNode::new("c1", ".card"));
            let ui = facade(&driver);

            let err = ui
                .get_first_matching_element("title", "card", "")
                .unwrap_err();
            assert!(matches!(err, EsperarError::ElementNotFound { .. }));
        }
    }

    mod field_tests {
        use super::*;

        #[test]
        fn test_element_resolves_mapped_field() {
            let driver = MockDriver::new().with_node(MockNode::new("s1", "input#edit-search"));
            let ui = facade(&driver);

            let node = ui.element("search").unwrap();
            assert_eq!(node.id(), "s1");
        }

        #[test]
        fn test_element_falls_back_to_named_lookup() {
            let driver =
                MockDriver::new().with_node(MockNode::new("f1", "input").with_name("username"));
            let ui = facade(&driver);

            let node = ui.element("username").unwrap();
            assert_eq!(node.id(), "f1");
        }

        #[test]
        fn test_element_not_found_after_deadline() {
            let driver = MockDriver::new();
            let ui = facade(&driver);

            let err = ui.element("#missing").unwrap_err();
            match err {
                EsperarError::ElementNotFound { subject } => assert!(subject.contains("#missing")),
                other => panic!("expected ElementNotFound, got {other:?}"),
            }
        }

        #[test]
        fn test_wait_for_state_absent_node_satisfies_not_visible() {
            let driver = MockDriver::new();
            let ui = facade(&driver);

            let start = Instant::now();
            assert!(ui
                .wait_for_element_state("#gone", ComponentState::NotVisible)
                .unwrap());
            assert!(start.elapsed() < Duration::from_millis(100));
        }

        #[test]
        fn test_wait_for_state_reports_false_on_deadline() {
            let driver = MockDriver::new();
            let ui = facade(&driver);

            assert!(!ui
                .wait_for_element_state_within(
                    "#gone",
                    ComponentState::Visible,
                    Duration::from_millis(40),
                )
                .unwrap());
        }

        #[test]
        fn test_wait_for_state_sees_late_visibility() {
            let driver = MockDriver::new()
                .with_node(MockNode::new("s1", "input#edit-search").visible_after(2));
            let ui = facade(&driver);

            assert!(ui
                .wait_for_element_state("search", ComponentState::Visible)
                .unwrap());
        }

        #[test]
        fn test_click_element() {
            let driver = MockDriver::new().with_node(MockNode::new("s1", "input#edit-search"));
            let ui = facade(&driver);

            ui.click_element("search").unwrap();
            assert!(driver.was_called("click:s1"));
        }

        #[test]
        fn test_fill_element_waits_then_sets_value() {
            let driver = MockDriver::new().with_node(MockNode::new("s1", "input#edit-search"));
            let ui = facade(&driver);

            ui.fill_element("search", "hello").unwrap();
            assert!(driver.was_called("set_value:s1=hello"));
            assert_eq!(driver.value(&NodeHandle::new("s1")).unwrap(), "hello");
        }

        #[test]
        fn test_assert_element_value() {
            let driver = MockDriver::new()
                .with_node(MockNode::new("s1", "input#edit-search").with_value("42"));
            let ui = facade(&driver);

            ui.assert_element_value("search", "42").unwrap();

            let err = ui.assert_element_value("search", "41").unwrap_err();
            match err {
                EsperarError::StateMismatch {
                    expected, actual, ..
                } => {
                    assert!(expected.contains("41"));
                    assert!(actual.contains("42"));
                }
                other => panic!("expected StateMismatch, got {other:?}"),
            }
        }

        #[test]
        fn test_assert_element_state_single_shot() {
            let driver = MockDriver::new().with_node(MockNode::new("s1", "input").hidden());
            let ui = facade(&driver);
            let node = NodeHandle::new("s1");

            ui.assert_element_state(&node, ComponentState::NotVisible)
                .unwrap();
            assert!(ui
                .assert_element_state(&node, ComponentState::Visible)
                .is_err());
        }

        #[test]
        fn test_focus_element() {
            let driver = MockDriver::new().with_node(MockNode::new("s1", "input"));
            let ui = facade(&driver);

            ui.focus_element(&NodeHandle::new("s1")).unwrap();
            let active = driver.active_element().unwrap().unwrap();
            assert_eq!(active.id(), "s1");
        }
    }
}
