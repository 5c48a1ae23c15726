use std::collections::BTreeSet;

use crate::scene::model::{ElementKind, ElementRef, SceneDocument};

impl SceneDocument {
    /// Return a copy where every element without a `zIndex` gets the next unused ascending
    /// integer.
    ///
    /// The first pass collects the used values and the `(kind, index)` slots that need a
    /// default, scanning collections in [`ElementKind::ORDER`]. The second pass hands out
    /// integers starting from 0, skipping values already taken. Running this on its own output
    /// is a no-op, so repeated saves are stable.
    pub fn with_default_z_indices(&self) -> SceneDocument {
        let mut used = BTreeSet::new();
        let mut pending = Vec::<(ElementKind, usize)>::new();
        for kind in ElementKind::ORDER {
            for (i, el) in self.elements.iter().filter(|e| e.kind() == kind).enumerate() {
                match el.base().z_index {
                    Some(z) => {
                        used.insert(z);
                    }
                    None => pending.push((kind, i)),
                }
            }
        }

        let mut out = self.clone();
        if pending.is_empty() {
            return out;
        }

        let mut next = 0i64;
        let mut assigned = Vec::with_capacity(pending.len());
        for slot in pending {
            while used.contains(&next) {
                next += 1;
            }
            used.insert(next);
            assigned.push((slot, next));
        }

        for ((kind, i), z) in assigned {
            if let Some(base) = out.elements.bases_mut(kind).into_iter().nth(i) {
                base.z_index = Some(z);
            }
        }
        out
    }

    /// Elements in paint order, bottom first.
    ///
    /// Sorted by z-index, then category order, then declaration order. Elements that still lack
    /// a z-index sort where [`SceneDocument::with_default_z_indices`] would put them.
    pub fn layers(&self) -> Vec<ElementRef<'_>> {
        let resolved = self.with_default_z_indices();
        let z_of: Vec<i64> = resolved
            .elements
            .iter()
            .map(|e| e.base().z_index.unwrap_or(0))
            .collect();

        let mut keyed: Vec<(i64, usize, usize, ElementRef<'_>)> = Vec::new();
        let mut per_kind = [0usize; 5];
        for (flat, el) in self.elements.iter().enumerate() {
            let rank = el.kind().rank();
            keyed.push((z_of[flat], rank, per_kind[rank], el));
            per_kind[rank] += 1;
        }
        keyed.sort_by_key(|(z, rank, decl, _)| (*z, *rank, *decl));
        keyed.into_iter().map(|(_, _, _, el)| el).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/order.rs"]
mod tests;
