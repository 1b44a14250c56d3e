//! Deep-equality engine.
//!
//! Iterative traversal over a stack of `DualKey` pairs. A pair is recorded
//! in the visited set as soon as it is popped, before its children are
//! explored, so a pair that closes a cycle is found already visited and is
//! not expanded again: it counts as matching. Keyed and unordered containers
//! recurse into nested comparisons that share the same visited set.

use crate::inspector::Inspector;
use crate::pair::DualKey;
use crate::reflect::{Ref, Shape};
use hashbrown::HashSet;
use tracing::trace;

type Visited = HashSet<DualKey>;

pub(crate) fn deep_equals(inspector: &Inspector, a: Option<&Ref>, b: Option<&Ref>) -> bool {
    let mut visited = Visited::new();
    compare(
        inspector,
        DualKey::new(a.cloned(), b.cloned()),
        &mut visited,
    )
}

fn schedule(stack: &mut Vec<DualKey>, visited: &Visited, left: Option<Ref>, right: Option<Ref>) {
    let pair = DualKey::new(left, right);
    if !visited.contains(&pair) {
        stack.push(pair);
    }
}

fn compare(inspector: &Inspector, start: DualKey, visited: &mut Visited) -> bool {
    let mut stack = vec![start];

    while let Some(pair) = stack.pop() {
        visited.insert(pair.clone());

        let (left, right) = match (&pair.left, &pair.right) {
            (None, None) => continue,
            (Some(left), Some(right)) => (left, right),
            _ => {
                trace!(reason = "null", "deep_equals mismatch");
                return false;
            }
        };

        let class = left.class();
        if !class.same(right.class()) {
            trace!(
                reason = "class",
                left = class.name(),
                right = right.class().name(),
                "deep_equals mismatch"
            );
            return false;
        }

        match (left.shape(), right.shape()) {
            (Shape::Indexed(l), Shape::Indexed(r)) | (Shape::Ordered(l), Shape::Ordered(r)) => {
                if l.len() != r.len() {
                    trace!(
                        reason = "length",
                        class = class.name(),
                        left = l.len(),
                        right = r.len(),
                        "deep_equals mismatch"
                    );
                    return false;
                }
                for (l, r) in l.into_iter().zip(r) {
                    schedule(&mut stack, visited, l, r);
                }
            }
            (Shape::Unordered(l), Shape::Unordered(r)) => {
                if !compare_unordered(inspector, (left, l.as_slice()), (right, r.as_slice()), visited) {
                    return false;
                }
            }
            (Shape::Keyed(l), Shape::Keyed(r)) => {
                if l.len() != r.len() {
                    trace!(reason = "size", class = class.name(), "deep_equals mismatch");
                    return false;
                }
                for (lk, lv) in l {
                    let matched = r.iter().find(|(rk, _)| {
                        compare(inspector, DualKey::new(lk.clone(), rk.clone()), visited)
                    });
                    let Some((_, rv)) = matched else {
                        trace!(reason = "key", class = class.name(), "deep_equals mismatch");
                        return false;
                    };
                    schedule(&mut stack, visited, lv, rv.clone());
                }
            }
            (Shape::Object, Shape::Object) => {
                let caps = inspector.capabilities(class);
                if let Some(equals) = caps.equals {
                    if !equals(&**left, &**right) {
                        trace!(reason = "custom", class = class.name(), "deep_equals mismatch");
                        return false;
                    }
                    continue;
                }
                for field in caps.fields.iter() {
                    match (left.read(field), right.read(field)) {
                        (Ok(l), Ok(r)) => schedule(&mut stack, visited, l, r),
                        (Err(err), _) | (_, Err(err)) => {
                            trace!(class = class.name(), %err, "skipping unreadable member");
                        }
                    }
                }
            }
            (l, r) => {
                trace!(
                    reason = "shape",
                    class = class.name(),
                    left = l.kind(),
                    right = r.kind(),
                    "deep_equals mismatch"
                );
                return false;
            }
        }
    }

    true
}

// Sizes, then whole-container deep hashes, then an element-by-element search
// that ignores order.
fn compare_unordered(
    inspector: &Inspector,
    (left, l): (&Ref, &[Option<Ref>]),
    (right, r): (&Ref, &[Option<Ref>]),
    visited: &mut Visited,
) -> bool {
    if l.len() != r.len() {
        trace!(reason = "size", class = left.class().name(), "deep_equals mismatch");
        return false;
    }
    if inspector.deep_hash(Some(left)) != inspector.deep_hash(Some(right)) {
        trace!(reason = "hash", class = left.class().name(), "deep_equals mismatch");
        return false;
    }
    for element in l {
        let found = r.iter().any(|candidate| {
            compare(
                inspector,
                DualKey::new(element.clone(), candidate.clone()),
                visited,
            )
        });
        if !found {
            trace!(reason = "element", class = left.class().name(), "deep_equals mismatch");
            return false;
        }
    }
    true
}
