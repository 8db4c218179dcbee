//! Lock gate
//!
//! Tracks whether storages must be withheld from the host because the
//! device was still locked when the service came up. The transition is
//! one-way: once an unlock is observed the gate stays open; re-locking is
//! driven by the host OS outside this service.

/// Exposure suppression flag
pub struct LockGate {
    suppressed: bool,
}

impl LockGate {
    /// Create the gate with its initial suppression state
    pub fn new(suppressed: bool) -> Self {
        Self { suppressed }
    }

    /// Whether storages are currently withheld
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Record an observed unlock
    ///
    /// Returns true only on the suppressed-to-open edge; callers use this
    /// to decide whether to replay registry contents.
    pub fn unlock_observed(&mut self) -> bool {
        if self.suppressed {
            self.suppressed = false;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_open_when_not_locked() {
        let mut gate = LockGate::new(false);
        assert!(!gate.is_suppressed());
        assert!(!gate.unlock_observed());
    }

    #[test]
    fn test_unlock_edge_fires_once() {
        let mut gate = LockGate::new(true);
        assert!(gate.is_suppressed());

        assert!(gate.unlock_observed());
        assert!(!gate.is_suppressed());

        // Further unlocks are not edges
        assert!(!gate.unlock_observed());
    }
}
