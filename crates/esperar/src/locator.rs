//! One-shot queries against the live UI.
//!
//! A locator issues exactly one logical query per call and never retries;
//! waiting is composed around it by the poll loop. `find_one` carries the
//! dual lookup strategy the element vocabulary needs: selector maps may
//! name semantic fields rather than exact CSS locations, so a CSS miss
//! falls back to the driver's id/name lookup before giving up.
//!
//! Every returned `Vec<NodeHandle>` is a snapshot of one instant. It is
//! never refreshed behind the caller's back; checking state again after
//! time has passed means issuing a new query.

use crate::driver::{NodeHandle, UiDriver};
use crate::result::EsperarResult;

/// Query interface over a borrowed driver session.
#[derive(Debug)]
pub struct Locator<'d, D: UiDriver> {
    driver: &'d D,
}

impl<'d, D: UiDriver> Locator<'d, D> {
    /// Create a locator over a driver session
    #[must_use]
    pub const fn new(driver: &'d D) -> Self {
        Self { driver }
    }

    /// Query all nodes matching a CSS selector.
    ///
    /// Returns an empty snapshot (not an error) when nothing matches;
    /// components are inherently plural and zero instances is a valid
    /// observation.
    ///
    /// # Errors
    ///
    /// Propagates driver faults.
    pub fn find_all(&self, selector: &str) -> EsperarResult<Vec<NodeHandle>> {
        self.driver.find_all(selector)
    }

    /// Query a single node, trying CSS first and the named lookup second.
    ///
    /// # Errors
    ///
    /// Propagates driver faults.
    pub fn find_one(&self, selector: &str) -> EsperarResult<Option<NodeHandle>> {
        if let Some(node) = self.driver.find_one(selector)? {
            return Ok(Some(node));
        }
        self.driver.find_named(selector)
    }

    /// Query a single descendant of `scope` by CSS selector.
    ///
    /// # Errors
    ///
    /// Propagates driver faults.
    pub fn find_in(
        &self,
        scope: &NodeHandle,
        selector: &str,
    ) -> EsperarResult<Option<NodeHandle>> {
        self.driver.find_in(scope, selector)
    }
}
