//! Declarative node states and their evaluation.
//!
//! States are the closed vocabulary scenarios assert against: visible,
//! not visible, focused. Evaluation is a pure read of driver-reported
//! state; aggregation over a plural snapshot is controlled by a
//! [`Quantifier`].
//!
//! The visible/not-visible pair is asymmetric on purpose: a component is
//! visible when ANY instance is, but not visible only when ALL instances
//! are hidden. Collapsing both directions into one existence check is a
//! porting hazard; callers pick the quantifier explicitly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::driver::{NodeHandle, UiDriver};
use crate::result::{EsperarError, EsperarResult};

/// Declarative state of a UI node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentState {
    /// The node reports itself visible in the current layout
    Visible,
    /// The logical negation of visible; a present-but-hidden node qualifies
    NotVisible,
    /// The node is the UI's currently active element
    Focused,
}

impl ComponentState {
    /// Scenario vocabulary word for this state
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::NotVisible => "not visible",
            Self::Focused => "focused",
        }
    }

    /// Vocabulary word describing the opposite observation.
    ///
    /// Used for "expected X, got Y" failure messages.
    #[must_use]
    pub const fn opposite_str(&self) -> &'static str {
        match self {
            Self::Visible => "not visible",
            Self::NotVisible => "visible",
            Self::Focused => "not focused",
        }
    }
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ComponentState {
    type Err = EsperarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visible" => Ok(Self::Visible),
            "not visible" => Ok(Self::NotVisible),
            "focused" => Ok(Self::Focused),
            other => Err(EsperarError::StateMismatch {
                subject: "state word".to_string(),
                expected: r#""visible", "not visible" or "focused""#.to_string(),
                actual: format!("{other:?}"),
            }),
        }
    }
}

/// How a state check aggregates over a plural snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// At least one node must satisfy the state; false over an empty snapshot
    Any,
    /// Every node must satisfy the state; vacuously true over an empty snapshot
    All,
}

/// Pure state predicate over driver-reported node state.
#[derive(Debug)]
pub struct StateEvaluator<'d, D: UiDriver> {
    driver: &'d D,
}

impl<'d, D: UiDriver> StateEvaluator<'d, D> {
    /// Create an evaluator over a driver session
    #[must_use]
    pub const fn new(driver: &'d D) -> Self {
        Self { driver }
    }

    /// Check whether a single node satisfies a state.
    ///
    /// # Errors
    ///
    /// `Focused` requires active-element introspection; a driver without it
    /// fails with [`EsperarError::UnsupportedOperation`] rather than
    /// reporting a false negative. Driver faults propagate.
    pub fn evaluate(&self, node: &NodeHandle, state: ComponentState) -> EsperarResult<bool> {
        match state {
            ComponentState::Visible => self.driver.is_visible(node),
            ComponentState::NotVisible => Ok(!self.driver.is_visible(node)?),
            ComponentState::Focused => self.is_focused(node),
        }
    }

    /// Check a state over a snapshot under a quantifier.
    ///
    /// # Errors
    ///
    /// Propagates per-node evaluation errors.
    pub fn evaluate_snapshot(
        &self,
        nodes: &[NodeHandle],
        state: ComponentState,
        quantifier: Quantifier,
    ) -> EsperarResult<bool> {
        match quantifier {
            Quantifier::Any => {
                for node in nodes {
                    if self.evaluate(node, state)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Quantifier::All => {
                for node in nodes {
                    if !self.evaluate(node, state)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// Whether the node is the driver's active element.
    ///
    /// # Errors
    ///
    /// Fails with [`EsperarError::UnsupportedOperation`] when the driver
    /// cannot introspect the active element.
    pub fn is_focused(&self, node: &NodeHandle) -> EsperarResult<bool> {
        Ok(self
            .driver
            .active_element()?
            .is_some_and(|active| active == *node))
    }
}
