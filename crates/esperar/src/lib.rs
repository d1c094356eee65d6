//! Esperar: component vocabulary and polling assertions for browser
//! acceptance tests.
//!
//! Esperar (Spanish: "to wait") turns human-readable component and element
//! names into live DOM queries, waits for asynchronous UI state to
//! stabilize, and asserts declarative states (visible, not visible,
//! focused) with bounded timeouts.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                      ESPERAR Architecture                          │
//! ├───────────────────────────────────────────────────────────────────┤
//! │   ┌──────────────┐   ┌──────────────┐   ┌────────────────────┐   │
//! │   │ Scenario     │   │ UiAssertions │   │ UiDriver           │   │
//! │   │ step         │──►│ (vocabulary, │──►│ (live browser      │   │
//! │   │              │   │  poll loop)  │   │  session)          │   │
//! │   └──────────────┘   └──────────────┘   └────────────────────┘   │
//! │                             │                                     │
//! │          registry ── locator ── filter ── state ── retry          │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A step asks [`UiAssertions`] for an operation on a named component with
//! an optional text filter. The [`SelectorRegistry`] resolves the name to
//! a CSS selector, the [`Locator`] takes a fresh snapshot from the
//! [`UiDriver`], the [`TextFilter`] narrows it, the [`StateEvaluator`]
//! checks the state, and for wait operations [`poll`] repeats the whole
//! sequence until success or deadline.
//!
//! # Example
//!
//! ```
//! use esperar::{ComponentSpec, MockDriver, MockNode, SelectorMap,
//!               SelectorRegistry, UiAssertions};
//!
//! let mut map = SelectorMap::new();
//! map.insert("banner".to_string(), ComponentSpec::new(".site-banner"));
//!
//! let driver = MockDriver::new().with_node(MockNode::new("b1", ".site-banner"));
//! let ui = UiAssertions::new(&driver, SelectorRegistry::new(map));
//!
//! let snapshot = ui.wait_until_component_visible("banner")?;
//! assert_eq!(snapshot.len(), 1);
//! # Ok::<(), esperar::EsperarError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod driver;
mod facade;
mod filter;
mod locator;
mod registry;
mod result;
mod retry;
mod state;

pub use driver::{MockDriver, MockNode, NodeHandle, UiDriver};
pub use facade::{Timeouts, UiAssertions};
pub use filter::{TextFilter, TextMatch};
pub use locator::Locator;
pub use registry::{ComponentSpec, FieldMap, SelectorMap, SelectorRegistry};
pub use result::{EsperarError, EsperarResult};
pub use retry::{
    poll, PollOptions, COMPONENT_NOT_VISIBLE_TIMEOUT_MS, COMPONENT_VISIBLE_TIMEOUT_MS,
    DEFAULT_POLL_INTERVAL_MS, ELEMENT_TIMEOUT_MS,
};
pub use state::{ComponentState, Quantifier, StateEvaluator};
