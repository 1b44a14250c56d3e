//! Inspector: the capability cache and the entry point to both engines.
//!
//! For each class it memoizes whether the class (or an ancestor) declares
//! its own equality and hash, and which members take part in member-wise
//! comparison. Entries depend only on the class and the inspector's member
//! filter, so they are computed lazily, never invalidated, and a race that
//! computes the same entry twice just overwrites it with an equal value.

use crate::class::{Class, ClassKey, EqualsFn, Field, HashFn, MemberKind};
use crate::reflect::Ref;
use dashmap::DashMap;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Decides whether a member takes part in comparison and hashing.
pub type MemberFilter = Arc<dyn Fn(&Field) -> bool + Send + Sync>;

/// Instance members that are not transient.
pub fn default_member_filter(field: &Field) -> bool {
    let member = field.member();
    member.kind() == MemberKind::Instance && !member.is_transient()
}

/// The default rules, additionally rejecting members tagged with `tag`.
pub fn skip_tagged(tag: &'static str) -> impl Fn(&Field) -> bool + Send + Sync + 'static {
    move |field| default_member_filter(field) && !field.member().has_tag(tag)
}

pub(crate) struct Capabilities {
    pub(crate) equals: Option<EqualsFn>,
    pub(crate) hash: Option<HashFn>,
    pub(crate) fields: Arc<[Field]>,
}

pub struct Inspector {
    filter: MemberFilter,
    classes: DashMap<ClassKey, Arc<Capabilities>>,
}

static GLOBAL: OnceLock<Inspector> = OnceLock::new();

impl Inspector {
    pub fn new() -> Self {
        Self::with_filter(default_member_filter)
    }

    pub fn with_filter<F>(filter: F) -> Self
    where
        F: Fn(&Field) -> bool + Send + Sync + 'static,
    {
        Self {
            filter: Arc::new(filter),
            classes: DashMap::new(),
        }
    }

    /// Process-wide inspector with the default member filter.
    pub fn global() -> &'static Inspector {
        GLOBAL.get_or_init(Inspector::new)
    }

    pub fn has_custom_equals(&self, class: &'static Class) -> bool {
        self.capabilities(class).equals.is_some()
    }

    pub fn has_custom_hash(&self, class: &'static Class) -> bool {
        self.capabilities(class).hash.is_some()
    }

    /// Filtered members of `class` and its ancestors, most-derived first.
    pub fn comparable_members_of(&self, class: &'static Class) -> Arc<[Field]> {
        self.capabilities(class).fields.clone()
    }

    pub fn deep_equals(&self, a: Option<&Ref>, b: Option<&Ref>) -> bool {
        crate::deep_equals::deep_equals(self, a, b)
    }

    pub fn deep_hash(&self, value: Option<&Ref>) -> u64 {
        crate::deep_hash::deep_hash(self, value)
    }

    /// Number of classes with a cached entry.
    pub fn cached_classes(&self) -> usize {
        self.classes.len()
    }

    // The map guard is released before returning so user code reached from
    // the engines may re-enter this inspector.
    pub(crate) fn capabilities(&self, class: &'static Class) -> Arc<Capabilities> {
        let key = class.key();
        if let Some(entry) = self.classes.get(&key) {
            return Arc::clone(entry.value());
        }
        let computed = Arc::new(self.compute(class));
        self.classes.insert(key, Arc::clone(&computed));
        computed
    }

    fn compute(&self, class: &'static Class) -> Capabilities {
        let equals = class.ancestry().find_map(Class::declared_equals);
        let hash = class.ancestry().find_map(Class::declared_hash);
        let fields: Arc<[Field]> = class
            .ancestry()
            .flat_map(|level| {
                level
                    .declared_members()
                    .iter()
                    .map(move |member| Field::new(level, member))
            })
            .filter(|field| (self.filter)(field))
            .collect();
        debug!(
            class = class.name(),
            members = fields.len(),
            custom_equals = equals.is_some(),
            custom_hash = hash.is_some(),
            "cached class capabilities"
        );
        Capabilities {
            equals,
            hash,
            fields,
        }
    }
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}
