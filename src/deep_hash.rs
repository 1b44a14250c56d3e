//! Deep-hash engine.
//!
//! Same work-list traversal as deep equality, over single values keyed by
//! identity. The digest is a wrapping sum of per-node contributions, so it
//! does not depend on the order in which containers yield their elements.
//! Only classes with their own hash contribute; everything else is walked.
//!
//! Walked nodes are deduplicated by identity. Values with their own hash are
//! deduplicated by value (own hash, then own equality), so the digest is a
//! sum over distinct leaf values: sharing a leaf or unrolling a cycle leaves
//! it unchanged.

use crate::class::ClassKey;
use crate::inspector::Inspector;
use crate::pair::Identity;
use crate::reflect::{Ref, Shape};
use hashbrown::{HashMap, HashSet};
use tracing::trace;

pub(crate) fn deep_hash(inspector: &Inspector, root: Option<&Ref>) -> u64 {
    let mut visited: HashSet<Identity> = HashSet::new();
    let mut leaves: HashMap<(ClassKey, u64), Vec<Ref>> = HashMap::new();
    let mut stack: Vec<Option<Ref>> = vec![root.cloned()];
    let mut hash = 0u64;

    while let Some(next) = stack.pop() {
        let Some(value) = next else { continue };
        if !visited.insert(Identity(value.clone())) {
            continue;
        }

        match value.shape() {
            Shape::Indexed(items) | Shape::Ordered(items) | Shape::Unordered(items) => {
                stack.extend(items);
            }
            Shape::Keyed(entries) => {
                for (k, v) in entries {
                    stack.push(k);
                    stack.push(v);
                }
            }
            Shape::Object => {
                let class = value.class();
                let caps = inspector.capabilities(class);
                if let Some(hash_fn) = caps.hash {
                    let own = hash_fn(&*value);
                    let seen = leaves.entry((class.key(), own)).or_default();
                    let duplicate = seen.iter().any(|prior| match caps.equals {
                        Some(equals) => equals(&**prior, &*value),
                        None => prior.ptr_eq(&value),
                    });
                    if !duplicate {
                        seen.push(value.clone());
                        hash = hash.wrapping_add(own);
                    }
                    continue;
                }
                for field in caps.fields.iter() {
                    match value.read(field) {
                        Ok(member) => stack.push(member),
                        Err(err) => {
                            trace!(class = class.name(), %err, "skipping unreadable member");
                        }
                    }
                }
            }
        }
    }

    hash
}
