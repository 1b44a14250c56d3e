//! Built-in reflected containers and a dynamic record type.
//!
//! All of them keep their contents behind a `RefCell` so graphs with cycles
//! can be wired after the nodes exist. `Set` and `Map` deduplicate through
//! the deep-equality engine rather than `Eq`/`Hash`.

use crate::class::{Class, Field};
use crate::inspector::Inspector;
use crate::reflect::{MemberError, Reflect, Ref, Shape};
use core::cell::RefCell;
use hashbrown::HashMap;

static ARRAY: Class = Class::new("Array");
static LIST: Class = Class::new("List");
static SET: Class = Class::new("Set");
static MAP: Class = Class::new("Map");

/// Fixed-length indexed sequence.
#[derive(Default)]
pub struct Array {
    items: RefCell<Vec<Option<Ref>>>,
}

impl Array {
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Option<Ref>>,
    {
        Self {
            items: RefCell::new(items.into_iter().collect()),
        }
    }

    pub fn with_len(len: usize) -> Self {
        Self::new(std::iter::repeat_with(|| None).take(len))
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// `None` when out of bounds, `Some(None)` for a null slot.
    pub fn get(&self, index: usize) -> Option<Option<Ref>> {
        self.items.borrow().get(index).cloned()
    }

    /// Replace a slot, returning the previous value; `None` when out of bounds.
    pub fn set(&self, index: usize, value: Option<Ref>) -> Option<Option<Ref>> {
        let mut items = self.items.borrow_mut();
        let slot = items.get_mut(index)?;
        Some(std::mem::replace(slot, value))
    }
}

impl Reflect for Array {
    fn class(&self) -> &'static Class {
        &ARRAY
    }

    fn shape(&self) -> Shape {
        Shape::Indexed(self.items.borrow().clone())
    }
}

/// Growable ordered sequence.
#[derive(Default)]
pub struct List {
    items: RefCell<Vec<Option<Ref>>>,
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, value: Option<Ref>) {
        self.items.borrow_mut().push(value);
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Option<Ref>> {
        self.items.borrow().get(index).cloned()
    }

    pub fn set(&self, index: usize, value: Option<Ref>) -> Option<Option<Ref>> {
        let mut items = self.items.borrow_mut();
        let slot = items.get_mut(index)?;
        Some(std::mem::replace(slot, value))
    }
}

impl FromIterator<Option<Ref>> for List {
    fn from_iter<I: IntoIterator<Item = Option<Ref>>>(items: I) -> Self {
        Self {
            items: RefCell::new(items.into_iter().collect()),
        }
    }
}

impl Reflect for List {
    fn class(&self) -> &'static Class {
        &LIST
    }

    fn shape(&self) -> Shape {
        Shape::Ordered(self.items.borrow().clone())
    }
}

/// Unordered container; elements are unique up to deep equality.
///
/// Uniqueness is decided by the global inspector, or by the one passed to
/// the `*_with` methods. A set compared under a different member filter than
/// the one that built it may hold elements that filter considers equal, and
/// its size check then disagrees with that filter.
#[derive(Default)]
pub struct Set {
    items: RefCell<Vec<Option<Ref>>>,
}

impl Set {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless a deep-equal element is already present.
    pub fn insert(&self, value: Option<Ref>) -> bool {
        self.insert_with(Inspector::global(), value)
    }

    pub fn insert_with(&self, inspector: &Inspector, value: Option<Ref>) -> bool {
        if self.contains_with(inspector, value.as_ref()) {
            return false;
        }
        self.items.borrow_mut().push(value);
        true
    }

    pub fn contains(&self, value: Option<&Ref>) -> bool {
        self.contains_with(Inspector::global(), value)
    }

    pub fn contains_with(&self, inspector: &Inspector, value: Option<&Ref>) -> bool {
        let items = self.items.borrow().clone();
        items
            .iter()
            .any(|item| inspector.deep_equals(item.as_ref(), value))
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl Reflect for Set {
    fn class(&self) -> &'static Class {
        &SET
    }

    fn shape(&self) -> Shape {
        Shape::Unordered(self.items.borrow().clone())
    }
}

/// Keyed container; keys are unique up to deep equality.
///
/// Key matching follows the same rule as [`Set`]: the global inspector
/// unless one is passed to the `*_with` methods.
#[derive(Default)]
pub struct Map {
    entries: RefCell<Vec<(Option<Ref>, Option<Ref>)>>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the previous value of a deep-equal key.
    pub fn insert(&self, key: Option<Ref>, value: Option<Ref>) -> Option<Option<Ref>> {
        self.insert_with(Inspector::global(), key, value)
    }

    pub fn insert_with(
        &self,
        inspector: &Inspector,
        key: Option<Ref>,
        value: Option<Ref>,
    ) -> Option<Option<Ref>> {
        match self.position(inspector, key.as_ref()) {
            Some(i) => {
                let mut entries = self.entries.borrow_mut();
                Some(std::mem::replace(&mut entries[i].1, value))
            }
            None => {
                self.entries.borrow_mut().push((key, value));
                None
            }
        }
    }

    /// `None` if no key matches, `Some(None)` for a null value.
    pub fn get(&self, key: Option<&Ref>) -> Option<Option<Ref>> {
        self.get_with(Inspector::global(), key)
    }

    pub fn get_with(&self, inspector: &Inspector, key: Option<&Ref>) -> Option<Option<Ref>> {
        let i = self.position(inspector, key)?;
        self.entries.borrow().get(i).map(|(_, v)| v.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    // The entries are snapshotted so the comparison never overlaps a borrow
    // of this map (keys may reach back into it).
    fn position(&self, inspector: &Inspector, key: Option<&Ref>) -> Option<usize> {
        let entries = self.entries.borrow().clone();
        entries
            .iter()
            .position(|(k, _)| inspector.deep_equals(k.as_ref(), key))
    }
}

impl Reflect for Map {
    fn class(&self) -> &'static Class {
        &MAP
    }

    fn shape(&self) -> Shape {
        Shape::Keyed(self.entries.borrow().clone())
    }
}

/// An object of a statically described class whose members are set by name.
///
/// Unset members read as null. Members are resolved by name, so a class
/// hierarchy that shadows a member name shares one slot for both levels.
pub struct Record {
    class: &'static Class,
    slots: RefCell<HashMap<&'static str, Option<Ref>>>,
}

impl Record {
    pub fn new(class: &'static Class) -> Self {
        Self {
            class,
            slots: RefCell::new(HashMap::new()),
        }
    }

    /// Set a declared member, returning its previous value.
    pub fn set(&self, member: &str, value: Option<Ref>) -> Result<Option<Ref>, MemberError> {
        let name = self
            .class
            .ancestry()
            .flat_map(|c| c.declared_members().iter())
            .find(|m| m.name() == member)
            .map(|m| m.name())
            .ok_or_else(|| MemberError::Unknown {
                class: self.class.name(),
                member: member.to_string(),
            })?;
        let mut slots = self
            .slots
            .try_borrow_mut()
            .map_err(|_| MemberError::Busy { member: name })?;
        Ok(slots.insert(name, value).flatten())
    }

    /// Current value of a member; `None` when unset, null or unreadable.
    pub fn get(&self, member: &str) -> Option<Ref> {
        self.slots.try_borrow().ok()?.get(member).cloned().flatten()
    }

    pub fn class(&self) -> &'static Class {
        self.class
    }
}

impl Reflect for Record {
    fn class(&self) -> &'static Class {
        self.class
    }

    fn read(&self, field: &Field) -> Result<Option<Ref>, MemberError> {
        if !self.class.declares(field.name()) {
            return Err(MemberError::unknown(self.class, field));
        }
        let slots = self
            .slots
            .try_borrow()
            .map_err(|_| MemberError::busy(field))?;
        Ok(slots.get(field.name()).cloned().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Member;
    use std::rc::Rc;

    fn int(v: i32) -> Option<Ref> {
        Some(Ref::new(v))
    }

    fn text(v: &str) -> Option<Ref> {
        Some(Ref::new(v.to_string()))
    }

    static PET_MEMBERS: [Member; 2] = [Member::field("name"), Member::field("type")];
    static PET: Class = Class::new("Pet").members(&PET_MEMBERS);

    #[test]
    fn array_get_and_set_respect_bounds() {
        let a = Array::with_len(2);
        assert_eq!(a.len(), 2);
        assert!(matches!(a.get(0), Some(None)));
        assert!(a.get(2).is_none());
        assert!(a.set(1, int(5)).is_some());
        assert!(a.set(2, int(5)).is_none());
        let v = a.get(1).flatten().unwrap();
        assert_eq!(v.downcast_ref::<i32>(), Some(&5));
    }

    static STAMPED_MEMBERS: [Member; 2] = [
        Member::field("value"),
        Member::field("stamp").tagged(&["volatile"]),
    ];
    static STAMPED: Class = Class::new("Stamped").members(&STAMPED_MEMBERS);

    fn stamped(stamp: i32) -> Option<Ref> {
        let r = Rc::new(Record::new(&STAMPED));
        r.set("value", int(1)).unwrap();
        r.set("stamp", int(stamp)).unwrap();
        Some(Ref::from(r))
    }

    /// Invariant: uniqueness follows the inspector the container is filled
    /// with, so its size agrees with that inspector's comparison.
    #[test]
    fn set_and_map_deduplicate_under_the_given_inspector() {
        let lenient = Inspector::with_filter(crate::skip_tagged("volatile"));

        let strict = Set::new();
        assert!(strict.insert(stamped(1)));
        assert!(strict.insert(stamped(2)));
        assert_eq!(strict.len(), 2);

        let loose = Set::new();
        assert!(loose.insert_with(&lenient, stamped(1)));
        assert!(!loose.insert_with(&lenient, stamped(2)));
        assert!(loose.contains_with(&lenient, stamped(3).as_ref()));
        assert!(!loose.contains(stamped(3).as_ref()));

        let single = Set::new();
        single.insert(stamped(4));
        let (strict, loose, single) = (Ref::new(strict), Ref::new(loose), Ref::new(single));
        assert!(lenient.deep_equals(Some(&loose), Some(&single)));
        assert!(!lenient.deep_equals(Some(&strict), Some(&single)));

        let m = Map::new();
        assert!(m.insert_with(&lenient, stamped(1), int(10)).is_none());
        let prev = m.insert_with(&lenient, stamped(2), int(20)).flatten().unwrap();
        assert_eq!(prev.downcast_ref::<i32>(), Some(&10));
        assert_eq!(m.len(), 1);
        assert!(m.get_with(&lenient, stamped(3).as_ref()).is_some());
        assert!(m.get(stamped(3).as_ref()).is_none());
    }

    /// Invariant: a set never holds two deep-equal elements.
    #[test]
    fn set_insert_deduplicates_structurally() {
        let s = Set::new();
        assert!(s.insert(text("a")));
        assert!(!s.insert(text("a")));
        assert!(s.insert(text("b")));
        assert!(s.insert(None));
        assert!(!s.insert(None));
        assert_eq!(s.len(), 3);
        assert!(s.contains(Some(&Ref::new(String::from("b")))));
        assert!(!s.contains(Some(&Ref::new(1i32))));
    }

    /// Invariant: inserting under a deep-equal key replaces the value in place.
    #[test]
    fn map_insert_replaces_structurally_equal_key() {
        let m = Map::new();
        assert!(m.insert(text("k"), int(1)).is_none());
        let prev = m.insert(text("k"), int(2)).flatten().unwrap();
        assert_eq!(prev.downcast_ref::<i32>(), Some(&1));
        assert_eq!(m.len(), 1);
        let now = m.get(Some(&Ref::new(String::from("k")))).flatten().unwrap();
        assert_eq!(now.downcast_ref::<i32>(), Some(&2));
        assert!(m.get(None).is_none());
    }

    #[test]
    fn list_preserves_push_order() {
        let l: List = [int(1), None, int(3)].into_iter().collect();
        l.push(int(4));
        assert_eq!(l.len(), 4);
        assert!(matches!(l.get(1), Some(None)));
        let last = l.get(3).flatten().unwrap();
        assert_eq!(last.downcast_ref::<i32>(), Some(&4));
    }

    #[test]
    fn record_rejects_undeclared_members() {
        let pet = Record::new(&PET);
        assert!(pet.set("name", text("Eddie")).is_ok());
        assert!(matches!(
            pet.set("owner", text("x")),
            Err(MemberError::Unknown { class: "Pet", .. })
        ));
        assert!(pet.get("type").is_none());
        assert_eq!(
            pet.get("name").unwrap().downcast_ref::<String>().map(String::as_str),
            Some("Eddie")
        );
    }

    /// Invariant: a record read while its slots are mutably borrowed reports
    /// `Busy` instead of panicking.
    #[test]
    fn record_read_while_borrowed_is_busy() {
        let pet = Rc::new(Record::new(&PET));
        let field = Field::new(&PET, &PET_MEMBERS[0]);
        let _guard = pet.slots.borrow_mut();
        assert_eq!(
            pet.read(&field).unwrap_err(),
            MemberError::Busy { member: "name" }
        );
    }
}
