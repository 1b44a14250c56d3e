//! deep-equals: structural equality and hashing for reflected object graphs,
//! including graphs with cycles.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: compare and hash arbitrary graphs of values by structure without
//!   asking their types to implement `Eq`/`Hash`, and terminate on cycles.
//! - Layers:
//!   - Class / Reflect: static descriptors (name, parent, declared members,
//!     optional own equality and hash) plus a trait through which a value
//!     reports its class, its container shape, and member values.
//!   - Inspector: per-class capability cache (own equality? own hash?
//!     which members compare?), shared across threads.
//!   - deep_equals / deep_hash: iterative work-list traversals driven by
//!     the inspector.
//!
//! Constraints
//! - Traversal is iterative: native stack use does not grow with graph
//!   depth. Only keyed and unordered containers recurse, once per nesting
//!   level of such containers.
//! - Values are shared through `Ref` (`Rc`-backed). Identity is the
//!   allocation address; graphs are built and compared on one thread.
//! - The inspector is `Send + Sync`; its entries are a pure function of the
//!   class and the member filter, so racing writers store equal values.
//!
//! Cycles
//! - Equality marks a pair visited when it is popped, before its children
//!   are explored. A pair that closes a cycle is therefore seen as visited
//!   and treated as matching without being re-checked.
//! - Hashing marks walked values visited by identity. Values with their own
//!   hash are deduplicated by value instead, so each distinct leaf value
//!   contributes once.
//! - Visited sets live for one top-level call. Nothing about a verdict is
//!   remembered across calls.
//!
//! Hash contract
//! - The digest is a wrapping sum of per-node contributions, so it does not
//!   depend on container iteration order. Equal graphs hash equally as long
//!   as every class with its own equality also has a compatible own hash.
//! - The digest is a sum over distinct leaf values, matched by class, own
//!   hash and own equality. A graph that shares a node hashes like its
//!   unshared copy, and a cycle hashes like any unrolling of it. Repeated
//!   equal values do not add up, so `[1, 1]` and `[1]` collide.
//!
//! Dispatch order
//! - Null, then class identity, then shape: indexed, unordered, ordered,
//!   keyed. Objects use their class's own equality/hash when declared on
//!   the class or an ancestor, otherwise member-wise comparison.
//!
//! Unreadable members
//! - A member whose read fails (`MemberError`) is skipped on both sides.
//!   This is silent: callers that need strict results must make every
//!   comparable member readable.

mod builtin;
pub mod class;
mod containers;
mod deep_equals;
mod deep_hash;
mod deep_key;
mod inspector;
mod pair;
pub mod reflect;

use std::sync::Arc;

// Public surface
pub use class::{Class, EqualsFn, Field, HashFn, Member, MemberKind};
pub use containers::{Array, List, Map, Record, Set};
pub use deep_key::DeepKey;
pub use inspector::{default_member_filter, skip_tagged, Inspector, MemberFilter};
pub use reflect::{MemberError, Ref, Reflect, Shape};

/// Structural equality of two possibly-null values.
pub fn deep_equals(a: Option<&Ref>, b: Option<&Ref>) -> bool {
    Inspector::global().deep_equals(a, b)
}

/// Order-independent structural hash; `None` hashes to 0.
pub fn deep_hash(value: Option<&Ref>) -> u64 {
    Inspector::global().deep_hash(value)
}

pub fn has_custom_equals(class: &'static Class) -> bool {
    Inspector::global().has_custom_equals(class)
}

pub fn has_custom_hash(class: &'static Class) -> bool {
    Inspector::global().has_custom_hash(class)
}

pub fn comparable_members_of(class: &'static Class) -> Arc<[Field]> {
    Inspector::global().comparable_members_of(class)
}
