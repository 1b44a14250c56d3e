//! Reflect implementations for primitive values.
//!
//! Every primitive class declares its own equality and hash, so the engines
//! never look inside them. Each Rust type is its own class: `16i32` and
//! `16i64` are never deep-equal.

use crate::class::Class;
use crate::reflect::Reflect;
use core::hash::{Hash, Hasher};
use std::collections::hash_map::DefaultHasher;

fn value_equals<T: Reflect + PartialEq>(a: &dyn Reflect, b: &dyn Reflect) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn value_hash<T: Reflect + Hash>(v: &dyn Reflect) -> u64 {
    v.downcast_ref::<T>().map(hash_one).unwrap_or(0)
}

// Floats compare by bit pattern so that equality and hash agree
// (NaN equals itself, 0.0 and -0.0 differ).
trait FloatBits: Reflect {
    fn bits(&self) -> u64;
}

impl FloatBits for f32 {
    fn bits(&self) -> u64 {
        u64::from(self.to_bits())
    }
}

impl FloatBits for f64 {
    fn bits(&self) -> u64 {
        self.to_bits()
    }
}

fn float_equals<T: FloatBits>(a: &dyn Reflect, b: &dyn Reflect) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a.bits() == b.bits(),
        _ => false,
    }
}

fn float_hash<T: FloatBits>(v: &dyn Reflect) -> u64 {
    v.downcast_ref::<T>()
        .map(|f| hash_one(&f.bits()))
        .unwrap_or(0)
}

// Fixed-key SipHash: identical across calls and threads within a process.
fn hash_one<T: Hash + ?Sized>(v: &T) -> u64 {
    let mut h = DefaultHasher::new();
    v.hash(&mut h);
    h.finish()
}

macro_rules! reflect_primitive {
    ($($ty:ty => $equals:ident, $hash:ident;)*) => {
        $(
            impl Reflect for $ty {
                fn class(&self) -> &'static Class {
                    static CLASS: Class = Class::new(stringify!($ty))
                        .with_equals($equals::<$ty>)
                        .with_hash($hash::<$ty>);
                    &CLASS
                }
            }
        )*
    };
}

reflect_primitive! {
    bool => value_equals, value_hash;
    char => value_equals, value_hash;
    i8 => value_equals, value_hash;
    i16 => value_equals, value_hash;
    i32 => value_equals, value_hash;
    i64 => value_equals, value_hash;
    isize => value_equals, value_hash;
    u8 => value_equals, value_hash;
    u16 => value_equals, value_hash;
    u32 => value_equals, value_hash;
    u64 => value_equals, value_hash;
    usize => value_equals, value_hash;
    f32 => float_equals, float_hash;
    f64 => float_equals, float_hash;
    String => value_equals, value_hash;
}
