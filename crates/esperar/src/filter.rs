//! Text narrowing of element snapshots.
//!
//! Scenario steps qualify plural components by their rendered text
//! ("the card containing text X", "5 rows with the text Y"). The filter
//! reads each node's text through the driver and keeps the matches,
//! preserving document order and duplicates. Empty filter text means "no
//! filtering requested", not "match the empty string".

use crate::driver::{NodeHandle, UiDriver};
use crate::result::EsperarResult;

/// How filter text is compared against rendered text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextMatch {
    /// Rendered text contains the filter text
    #[default]
    Substring,
    /// Rendered text equals the filter text
    Exact,
}

impl TextMatch {
    /// Map a scenario match word to a mode: "with" means exact, anything
    /// else ("containing") means substring.
    #[must_use]
    pub fn from_keyword(word: &str) -> Self {
        if word == "with" {
            Self::Exact
        } else {
            Self::Substring
        }
    }

    /// Whether `rendered` matches `text` under this mode
    #[must_use]
    pub fn matches(&self, rendered: &str, text: &str) -> bool {
        match self {
            Self::Exact => rendered == text,
            Self::Substring => rendered.contains(text),
        }
    }
}

/// Snapshot filter reading rendered text through a driver session.
#[derive(Debug)]
pub struct TextFilter<'d, D: UiDriver> {
    driver: &'d D,
}

impl<'d, D: UiDriver> TextFilter<'d, D> {
    /// Create a filter over a driver session
    #[must_use]
    pub const fn new(driver: &'d D) -> Self {
        Self { driver }
    }

    /// Keep the nodes whose rendered text matches `text`.
    ///
    /// Empty `text` returns the snapshot unchanged. Order-preserving, no
    /// deduplication.
    ///
    /// # Errors
    ///
    /// Propagates driver faults from text reads.
    pub fn filter_by_text(
        &self,
        nodes: &[NodeHandle],
        text: &str,
        mode: TextMatch,
    ) -> EsperarResult<Vec<NodeHandle>> {
        if text.is_empty() {
            return Ok(nodes.to_vec());
        }
        let mut matching = Vec::new();
        for node in nodes {
            if mode.matches(&self.driver.text(node)?, text) {
                matching.push(node.clone());
            }
        }
        Ok(matching)
    }
}
