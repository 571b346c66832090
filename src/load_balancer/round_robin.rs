//! Round-robin load balancing strategy.

use crate::load_balancer::{backend::BackendEntry, LoadBalancer};

/// Round-robin selector with liveness gating.
///
/// The cursor moves forward by one for every entry examined, chosen or not,
/// so a dead entry still consumes its slot in the rotation.
#[derive(Debug, Default)]
pub struct RoundRobin;

impl RoundRobin {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for RoundRobin {
    fn next_index(&self, entries: &[BackendEntry], cursor: &mut usize) -> Option<usize> {
        let len = entries.len();
        if len == 0 {
            return None;
        }
        debug_assert!(*cursor < len, "cursor {} out of range for {} entries", cursor, len);

        // A full scan of `len` steps brings the cursor back to where it started.
        for _ in 0..len {
            let index = *cursor;
            *cursor = (index + 1) % len;
            if entries[index].alive {
                return Some(index);
            }
        }
        None
    }
}
