//! Port to the electronic health record system
//!
//! The EHR is the source of new claims. In this system it is always
//! simulated; [`mock::MockEhrPort`] serves a fixed set of claims.

use async_trait::async_trait;

use core_kernel::PortError;
use crate::claim::Claim;

/// Access to claims offered by the EHR
#[async_trait]
pub trait EhrPort: Send + Sync + 'static {
    /// Claims the EHR currently has available for sync
    async fn available_claims(&self) -> Result<Vec<Claim>, PortError>;
}

/// In-memory EHR for tests and local simulation
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::RwLock;

    #[derive(Debug, Default)]
    pub struct MockEhrPort {
        claims: RwLock<Vec<Claim>>,
        unavailable: AtomicBool,
    }

    impl MockEhrPort {
        pub fn new(claims: Vec<Claim>) -> Self {
            Self {
                claims: RwLock::new(claims),
                unavailable: AtomicBool::new(false),
            }
        }

        /// Makes subsequent calls fail as if the EHR were down
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::Relaxed);
        }

        /// Adds a claim to the set offered on the next sync
        pub async fn publish(&self, claim: Claim) {
            self.claims.write().await.push(claim);
        }
    }

    #[async_trait]
    impl EhrPort for MockEhrPort {
        async fn available_claims(&self) -> Result<Vec<Claim>, PortError> {
            if self.unavailable.load(Ordering::Relaxed) {
                return Err(PortError::unavailable("ehr"));
            }
            Ok(self.claims.read().await.clone())
        }
    }
}
