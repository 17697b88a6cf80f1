use std::sync::atomic::{AtomicU8, Ordering};

use crate::types::ProviderId;

/// Which provider new requests start with
///
/// A single lock-free scalar. Concurrent requests may both observe the
/// primary before either downgrades it; that only costs an extra failed call.
/// The only transition is primary to secondary, so once downgraded the
/// primary is never preferred again for the life of the value.
#[derive(Debug)]
pub struct ControllerState {
    active: AtomicU8,
}

impl ControllerState {
    pub const fn new(initial: ProviderId) -> Self {
        Self {
            active: AtomicU8::new(initial as u8),
        }
    }

    /// Currently preferred provider
    pub fn active(&self) -> ProviderId {
        ProviderId::from_u8(self.active.load(Ordering::Acquire))
    }

    /// Switch from primary to secondary
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn downgrade(&self) -> bool {
        self.active
            .compare_exchange(
                ProviderId::Primary as u8,
                ProviderId::Secondary as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}
