//! Identity-keyed traversal bookkeeping shared by both engines.
//!
//! Neither type compares values structurally: equality is address equality
//! of the referenced allocations, which is what lets a visited set recognise
//! a cycle. Both hold `Ref` clones, so an address cannot be recycled by a new
//! allocation while it is still recorded.

use crate::reflect::Ref;
use core::hash::{Hash, Hasher};

#[inline]
fn addr(r: Option<&Ref>) -> usize {
    r.map_or(0, Ref::addr)
}

/// A comparison work item: one value from each side.
#[derive(Clone, Debug)]
pub(crate) struct DualKey {
    pub(crate) left: Option<Ref>,
    pub(crate) right: Option<Ref>,
}

impl DualKey {
    pub(crate) fn new(left: Option<Ref>, right: Option<Ref>) -> Self {
        Self { left, right }
    }
}

impl PartialEq for DualKey {
    fn eq(&self, other: &Self) -> bool {
        addr(self.left.as_ref()) == addr(other.left.as_ref())
            && addr(self.right.as_ref()) == addr(other.right.as_ref())
    }
}

impl Eq for DualKey {}

impl Hash for DualKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Sum of both identities, null counting as zero.
        addr(self.left.as_ref())
            .wrapping_add(addr(self.right.as_ref()))
            .hash(state);
    }
}

/// A single value keyed by identity.
#[derive(Clone, Debug)]
pub(crate) struct Identity(pub(crate) Ref);

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.addr().hash(state);
    }
}
