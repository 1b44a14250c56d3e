//! Class: static type descriptors standing in for runtime type information.
//!
//! A `Class` names a type, optionally points at a parent class (single
//! inheritance is modelled by composition plus this link), lists the members
//! it declares locally, and may declare its own equality and hash functions.
//! Descriptors are meant to live in `static` items: class identity is the
//! address of the descriptor, so two distinct statics are two distinct
//! classes even if their contents match.

use crate::reflect::Reflect;
use core::fmt;
use core::ptr;

/// Locally declared equality test. Receives the two sides of a comparison;
/// both are guaranteed to report the same class.
pub type EqualsFn = fn(&dyn Reflect, &dyn Reflect) -> bool;

/// Locally declared hash function.
pub type HashFn = fn(&dyn Reflect) -> u64;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MemberKind {
    /// Per-instance data; the only kind that participates by default.
    Instance,
    /// Class-level data shared by every instance.
    Static,
    /// Synthesized back-reference to an enclosing instance.
    Outer,
}

/// A member declared by a class.
#[derive(Debug)]
pub struct Member {
    name: &'static str,
    kind: MemberKind,
    transient: bool,
    tags: &'static [&'static str],
}

impl Member {
    pub const fn field(name: &'static str) -> Self {
        Self {
            name,
            kind: MemberKind::Instance,
            transient: false,
            tags: &[],
        }
    }

    pub const fn static_field(name: &'static str) -> Self {
        Self {
            kind: MemberKind::Static,
            ..Self::field(name)
        }
    }

    pub const fn outer(name: &'static str) -> Self {
        Self {
            kind: MemberKind::Outer,
            ..Self::field(name)
        }
    }

    /// Mark the member as excluded from comparison and hashing.
    pub const fn transient(self) -> Self {
        Self {
            transient: true,
            ..self
        }
    }

    /// Attach free-form tags that member filters may inspect.
    pub const fn tagged(self, tags: &'static [&'static str]) -> Self {
        Self { tags, ..self }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn is_transient(&self) -> bool {
        self.transient
    }

    pub fn tags(&self) -> &'static [&'static str] {
        self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| *t == tag)
    }
}

pub struct Class {
    name: &'static str,
    parent: Option<&'static Class>,
    members: &'static [Member],
    equals: Option<EqualsFn>,
    hash: Option<HashFn>,
}

impl Class {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            parent: None,
            members: &[],
            equals: None,
            hash: None,
        }
    }

    pub const fn extends(self, parent: &'static Class) -> Self {
        Self {
            parent: Some(parent),
            ..self
        }
    }

    pub const fn members(self, members: &'static [Member]) -> Self {
        Self { members, ..self }
    }

    pub const fn with_equals(self, equals: EqualsFn) -> Self {
        Self {
            equals: Some(equals),
            ..self
        }
    }

    pub const fn with_hash(self, hash: HashFn) -> Self {
        Self {
            hash: Some(hash),
            ..self
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<&'static Class> {
        self.parent
    }

    /// Members declared on this level only.
    pub fn declared_members(&self) -> &'static [Member] {
        self.members
    }

    pub fn declared_equals(&self) -> Option<EqualsFn> {
        self.equals
    }

    pub fn declared_hash(&self) -> Option<HashFn> {
        self.hash
    }

    /// This class followed by each ancestor, most-derived first.
    pub fn ancestry(&'static self) -> Ancestry {
        Ancestry { next: Some(self) }
    }

    /// True if `member` is declared on this class or any ancestor.
    pub fn declares(&'static self, member: &str) -> bool {
        self.ancestry()
            .any(|c| c.members.iter().any(|m| m.name == member))
    }

    /// Identity comparison; contents are never compared.
    #[inline]
    pub fn same(&self, other: &Class) -> bool {
        ptr::eq(self, other)
    }

    #[inline]
    pub(crate) fn key(&'static self) -> ClassKey {
        ClassKey(self as *const Class as usize)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("parent", &self.parent.map(|p| p.name))
            .field("members", &self.members.len())
            .field("equals", &self.equals.is_some())
            .field("hash", &self.hash.is_some())
            .finish()
    }
}

/// Iterator returned by [`Class::ancestry`].
pub struct Ancestry {
    next: Option<&'static Class>,
}

impl Iterator for Ancestry {
    type Item = &'static Class;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent;
        Some(current)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct ClassKey(usize);

/// A member resolved against the class that declares it.
#[derive(Copy, Clone, Debug)]
pub struct Field {
    declared_by: &'static Class,
    member: &'static Member,
}

impl Field {
    pub fn new(declared_by: &'static Class, member: &'static Member) -> Self {
        Self {
            declared_by,
            member,
        }
    }

    pub fn name(&self) -> &'static str {
        self.member.name
    }

    pub fn declared_by(&self) -> &'static Class {
        self.declared_by
    }

    pub fn member(&self) -> &'static Member {
        self.member
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.declared_by.same(other.declared_by) && ptr::eq(self.member, other.member)
    }
}

impl Eq for Field {}
