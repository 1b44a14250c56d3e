//! Reflect: the capability the engines consume to look inside a value.
//!
//! Every participating value reports its static [`Class`], its container
//! [`Shape`], and how to read one of its members. Values are shared through
//! [`Ref`], an `Rc`-backed handle whose allocation address is the value's
//! identity during a traversal.

use crate::class::{Class, Field};
use core::any::Any;
use core::fmt;
use core::ops::Deref;
use std::rc::Rc;
use thiserror::Error;

/// Why a member could not be read (or written, for [`crate::Record`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemberError {
    #[error("`{class}` has no member `{member}`")]
    Unknown { class: &'static str, member: String },
    #[error("member `{member}` is mutably borrowed")]
    Busy { member: &'static str },
    #[error("member `{member}` is not readable")]
    Inaccessible { member: &'static str },
}

impl MemberError {
    pub fn unknown(class: &'static Class, field: &Field) -> Self {
        MemberError::Unknown {
            class: class.name(),
            member: field.name().to_string(),
        }
    }

    pub fn busy(field: &Field) -> Self {
        MemberError::Busy {
            member: field.name(),
        }
    }

    pub fn inaccessible(field: &Field) -> Self {
        MemberError::Inaccessible {
            member: field.name(),
        }
    }
}

/// How the engines should walk a value.
///
/// Container variants carry a snapshot of the elements taken at the time
/// `shape` was called; cloning a `Ref` keeps identity.
pub enum Shape {
    /// Array-like: compared index by index.
    Indexed(Vec<Option<Ref>>),
    /// Set-like: compared without regard to order.
    Unordered(Vec<Option<Ref>>),
    /// Sequence-like: compared position by position.
    Ordered(Vec<Option<Ref>>),
    /// Map-like: keys matched structurally, then values compared.
    Keyed(Vec<(Option<Ref>, Option<Ref>)>),
    /// A plain object: custom equality/hash or member-wise comparison.
    Object,
}

impl Shape {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Shape::Indexed(_) => "indexed",
            Shape::Unordered(_) => "unordered",
            Shape::Ordered(_) => "ordered",
            Shape::Keyed(_) => "keyed",
            Shape::Object => "object",
        }
    }
}

pub trait Reflect: Any + 'static {
    fn class(&self) -> &'static Class;

    fn shape(&self) -> Shape {
        Shape::Object
    }

    /// Read one member's current value.
    ///
    /// Members that refer to other graph nodes must return a clone of the
    /// stored `Ref` so identity survives the read; leaf values may be
    /// materialized on every call.
    fn read(&self, field: &Field) -> Result<Option<Ref>, MemberError> {
        Err(MemberError::unknown(self.class(), field))
    }
}

impl dyn Reflect {
    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref::<T>()
    }

    pub fn is<T: Reflect>(&self) -> bool {
        let any: &dyn Any = self;
        any.is::<T>()
    }
}

/// Shared handle to a reflected value.
#[derive(Clone)]
pub struct Ref(Rc<dyn Reflect>);

impl Ref {
    pub fn new<T: Reflect>(value: T) -> Self {
        Ref(Rc::new(value))
    }

    pub fn class(&self) -> &'static Class {
        self.0.class()
    }

    /// Address of the shared allocation; stable for the lifetime of any clone.
    #[inline]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Ref) -> bool {
        self.addr() == other.addr()
    }

    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        (*self.0).downcast_ref::<T>()
    }

    /// Structural equality through the global inspector.
    pub fn deep_eq(&self, other: &Ref) -> bool {
        crate::deep_equals(Some(self), Some(other))
    }

    /// Structural hash through the global inspector.
    pub fn deep_hash(&self) -> u64 {
        crate::deep_hash(Some(self))
    }
}

impl<T: Reflect> From<Rc<T>> for Ref {
    fn from(rc: Rc<T>) -> Self {
        Ref(rc)
    }
}

impl Deref for Ref {
    type Target = dyn Reflect;
    #[inline]
    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl fmt::Debug for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref({}@{:#x})", self.class().name(), self.addr())
    }
}
