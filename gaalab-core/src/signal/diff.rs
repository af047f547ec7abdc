//! Buy / sell / hold classification between two selections.

use std::collections::BTreeSet;

use crate::domain::CASH;

/// Classification over the distinct symbols of two selections.
///
/// Every instrument in either selection lands in exactly one of the three
/// sets. `CASH` is never bought or sold: moving into or out of cash shows up
/// as instrument sells or buys, and `CASH` is listed as a hold when both
/// selections carry it. `CASH` on one side only is left unclassified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    pub buys: BTreeSet<String>,
    pub sells: BTreeSet<String>,
    pub holds: BTreeSet<String>,
}

impl Diff {
    pub fn between<P, C>(previous: &[P], current: &[C]) -> Self
    where
        P: AsRef<str>,
        C: AsRef<str>,
    {
        let prev: BTreeSet<String> = previous.iter().map(|s| s.as_ref().to_string()).collect();
        let curr: BTreeSet<String> = current.iter().map(|s| s.as_ref().to_string()).collect();

        Self {
            buys: curr.difference(&prev).filter(|s| s.as_str() != CASH).cloned().collect(),
            sells: prev.difference(&curr).filter(|s| s.as_str() != CASH).cloned().collect(),
            holds: curr.intersection(&prev).cloned().collect(),
        }
    }

    /// True when no instrument was bought or sold.
    pub fn is_unchanged(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buys.len() + self.sells.len() + self.holds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
