//! Ports to simulated external systems
//!
//! The claim workflow talks to an electronic health record system and a
//! clearinghouse. Both are mocked in-process, but the domain still speaks to
//! them through port traits so that failure handling is exercised the same
//! way a networked adapter would be.
//!
//! ```text
//! workflow_store (sync scheduler)
//!         │
//!         ▼
//!   EhrPort trait  (domain_claims::ports)
//!         │
//!         ▼
//!   MockEhrPort    (static seed data)
//! ```

use thiserror::Error;

/// Error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    /// The external system is unavailable
    #[error("Service unavailable: {service}")]
    ServiceUnavailable {
        service: String,
    },

    /// A record from the external system could not be mapped to the domain
    #[error("Transformation error: {message}")]
    Transformation {
        message: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a ServiceUnavailable error
    pub fn unavailable(service: impl Into<String>) -> Self {
        PortError::ServiceUnavailable {
            service: service.into(),
        }
    }

    /// Creates a Transformation error
    pub fn transformation(message: impl Into<String>) -> Self {
        PortError::Transformation {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, PortError::ServiceUnavailable { .. })
    }
}
