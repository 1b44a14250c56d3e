//! DeepKey: lets a reflected graph key a std or hashbrown map by structure.

use crate::reflect::Ref;
use core::hash::{Hash, Hasher};

/// `Eq`/`Hash` through `deep_equals`/`deep_hash` on the global inspector.
///
/// The graph must not change while the key sits in a map, for the same
/// reason a `HashMap` key must not change.
#[derive(Clone, Debug)]
pub struct DeepKey(Option<Ref>);

impl DeepKey {
    pub fn new(value: Option<Ref>) -> Self {
        DeepKey(value)
    }

    pub fn get(&self) -> Option<&Ref> {
        self.0.as_ref()
    }

    pub fn into_inner(self) -> Option<Ref> {
        self.0
    }
}

impl From<Ref> for DeepKey {
    fn from(r: Ref) -> Self {
        DeepKey(Some(r))
    }
}

impl PartialEq for DeepKey {
    fn eq(&self, other: &Self) -> bool {
        crate::deep_equals(self.get(), other.get())
    }
}

impl Eq for DeepKey {}

impl Hash for DeepKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        crate::deep_hash(self.get()).hash(state);
    }
}
