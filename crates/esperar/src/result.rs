//! Result and error types for Esperar.

use thiserror::Error;

/// Result type for Esperar operations
pub type EsperarResult<T> = Result<T, EsperarError>;

/// Errors that can occur in Esperar
#[derive(Debug, Error)]
pub enum EsperarError {
    /// A component name is absent from the selector registry
    #[error("component {component:?} is not defined")]
    UndefinedComponent {
        /// Offending component name
        component: String,
    },

    /// An element name is absent from a component's element map
    #[error("component {component:?} element {element:?} is not defined")]
    UndefinedElement {
        /// Component the element was looked up under
        component: String,
        /// Offending element name
        element: String,
    },

    /// A query resolved to zero nodes where at least one was required
    #[error("{subject} was not found on the page")]
    ElementNotFound {
        /// What was being looked for
        subject: String,
    },

    /// A polling operation exceeded its deadline
    #[error("{operation} timed out after {ms}ms")]
    Timeout {
        /// The operation that was polling
        operation: String,
        /// Configured timeout in milliseconds
        ms: u64,
    },

    /// The UI driver lacks a required capability
    #[error("{capability} is not supported by the driver")]
    UnsupportedOperation {
        /// Missing capability
        capability: String,
    },

    /// A single-shot state assertion did not hold
    #[error("{subject}: expected {expected}, got {actual}")]
    StateMismatch {
        /// Component or element the assertion was made against
        subject: String,
        /// Expected state
        expected: String,
        /// Observed state
        actual: String,
    },

    /// Fault reported by the UI driver backend
    #[error("driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
