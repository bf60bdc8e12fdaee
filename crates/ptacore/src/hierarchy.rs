//! Class hierarchy with incremental C3 linearization (spec §3.4, §4.6, L6).
//!
//! A class can carry *more than one* MRO at once: when a base expression is
//! ambiguous (`cls = random_choice([A, B]); class X(cls)`), `X` ends up with
//! one MRO per resolved choice of `cls` rather than a single merged answer.
//! `mros_of` therefore returns a set, not an optional single linearization.
//!
//! Grounded on the reference implementation's `class_hiearchy.py`
//! (`add_class`, `add_class_base`, `add_base_mro`) and the teacher's
//! `compute_c3_mro`; the cross-product-of-candidate-MROs shape of
//! `add_base_mro` below follows the reference implementation's algorithm
//! directly since it is the one place the source's exact enumeration order
//! matters for which MROs exist, not just which classes do.

use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};

use crate::object::ObjId;

#[derive(Debug, Default)]
pub struct ClassHierarchy {
    /// Per class, per base position, every class object discovered so far
    /// (`PT(bases[i])` restricted to class objects).
    bases: AHashMap<ObjId, Vec<AHashSet<ObjId>>>,
    /// Per class, the set of MROs derivable from its current bases. `self`
    /// is always the head of every member.
    mros: AHashMap<ObjId, AHashSet<Vec<ObjId>>>,
    /// `base -> {(class, position)}`, for propagating a changed MRO set to
    /// dependents (invariant CH-2).
    subclasses: AHashMap<ObjId, AHashSet<(ObjId, usize)>>,
}

impl ClassHierarchy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoked once per class when allocated. `initial_bases[i]` is whatever
    /// class objects `PT(bases[i])` already contains at that moment. Returns
    /// every `(class, mro)` pair newly added anywhere in the hierarchy as a
    /// consequence (including cascades into existing subclasses), so a
    /// caller can re-materialize already-resolved attributes onto them
    /// (spec §4.7 "NewClass incremental").
    #[must_use]
    pub fn add_class(&mut self, cls: ObjId, initial_bases: &[Vec<ObjId>]) -> Vec<(ObjId, Vec<ObjId>)> {
        let positions = self.bases.entry(cls).or_insert_with(|| vec![AHashSet::new(); initial_bases.len()]);
        if positions.len() < initial_bases.len() {
            positions.resize(initial_bases.len(), AHashSet::new());
        }
        for (i, candidates) in initial_bases.iter().enumerate() {
            for &b in candidates {
                if positions[i].insert(b) {
                    self.subclasses.entry(b).or_default().insert((cls, i));
                }
            }
        }
        let mut added = Vec::new();
        self.add_base_mro(cls, None, &AHashSet::new(), &mut added);
        added
    }

    /// Invoked when a new class object `base` flows into `cls`'s base
    /// position `index`. Returns every `(class, mro)` pair newly added as a
    /// consequence (spec OQ3: guards against re-adding an already-known
    /// base for speed, per P1 this is not required for correctness).
    #[must_use]
    pub fn add_class_base(&mut self, cls: ObjId, index: usize, base: ObjId) -> Vec<(ObjId, Vec<ObjId>)> {
        let positions = self.bases.entry(cls).or_default();
        if positions.len() <= index {
            positions.resize(index + 1, AHashSet::new());
        }
        if !positions[index].insert(base) {
            return Vec::new();
        }
        self.subclasses.entry(base).or_default().insert((cls, index));
        let base_mros = self.mros.get(&base).cloned().unwrap_or_else(|| AHashSet::from_iter([vec![base]]));
        let mut added = Vec::new();
        self.add_base_mro(cls, Some(index), &base_mros, &mut added);
        added
    }

    /// The set of MROs currently derivable for `cls`, empty until at least
    /// one consistent linearization has been found.
    #[must_use]
    pub fn mros_of(&self, cls: ObjId) -> impl Iterator<Item = &[ObjId]> {
        self.mros.get(&cls).into_iter().flatten().map(Vec::as_slice)
    }

    #[must_use]
    pub fn subclasses_of(&self, base: ObjId) -> impl Iterator<Item = (ObjId, usize)> + '_ {
        self.subclasses.get(&base).into_iter().flatten().copied()
    }

    /// Recomputes `cls`'s MRO set, optionally overriding position `index`
    /// with `new_mros` instead of reading `self.bases`/`self.mros` for it
    /// (spec §4.6: `addBaseMRO(C, index, newMros)`), and propagates any
    /// genuinely new MRO to `cls`'s own dependents. Every `(class, mro)`
    /// pair actually added anywhere in the cascade is appended to `added`.
    fn add_base_mro(&mut self, cls: ObjId, index: Option<usize>, new_mros: &AHashSet<Vec<ObjId>>, added: &mut Vec<(ObjId, Vec<ObjId>)>) {
        let num_positions = self.bases.get(&cls).map_or(0, Vec::len);
        if num_positions == 0 {
            self.add_mros(cls, AHashSet::from_iter([vec![cls]]), added);
            return;
        }

        let mut per_position_choices: Vec<Vec<Vec<ObjId>>> = Vec::with_capacity(num_positions);
        for j in 0..num_positions {
            if index == Some(j) {
                per_position_choices.push(new_mros.iter().cloned().collect());
            } else {
                let mut choices = Vec::new();
                let candidates = self.bases.get(&cls).map(|p| p[j].clone()).unwrap_or_default();
                for b in candidates {
                    match self.mros.get(&b) {
                        Some(mros_b) => choices.extend(mros_b.iter().cloned()),
                        None => choices.push(vec![b]),
                    }
                }
                per_position_choices.push(choices);
            }
        }
        if per_position_choices.iter().any(Vec::is_empty) {
            return;
        }

        let mut new_ones = AHashSet::new();
        for combo in cartesian_product(&per_position_choices) {
            let heads: Vec<ObjId> = combo.iter().map(|m| m[0]).collect();
            let mut seqs: Vec<VecDeque<ObjId>> = combo.into_iter().map(VecDeque::from).collect();
            seqs.push(VecDeque::from(heads));
            let Some(merged) = c3_merge(seqs) else { continue };
            if merged.contains(&cls) {
                continue; // would place `cls` in its own ancestor list: illegal
            }
            let mut full = Vec::with_capacity(merged.len() + 1);
            full.push(cls);
            full.extend(merged);
            if !self.mros.get(&cls).is_some_and(|s| s.contains(&full)) {
                new_ones.insert(full);
            }
        }
        if !new_ones.is_empty() {
            self.add_mros(cls, new_ones, added);
        }
    }

    fn add_mros(&mut self, cls: ObjId, candidates: AHashSet<Vec<ObjId>>, added: &mut Vec<(ObjId, Vec<ObjId>)>) {
        let entry = self.mros.entry(cls).or_default();
        let mut actually_new = AHashSet::new();
        for m in candidates {
            if entry.insert(m.clone()) {
                actually_new.insert(m);
            }
        }
        if actually_new.is_empty() {
            return;
        }
        for m in &actually_new {
            added.push((cls, m.clone()));
        }
        let deps: Vec<(ObjId, usize)> = self.subclasses.get(&cls).into_iter().flatten().copied().collect();
        for (sub, idx) in deps {
            self.add_base_mro(sub, Some(idx), &actually_new, added);
        }
    }
}

/// Standard C3 merge: picks the next head that does not appear in the tail
/// of any other sequence, repeating until all sequences are empty. Returns
/// `None` if no consistent order exists (spec §4.6.1, §4.6: "the caller
/// discards the attempt").
fn c3_merge(mut seqs: Vec<VecDeque<ObjId>>) -> Option<Vec<ObjId>> {
    let mut result = Vec::new();
    loop {
        seqs.retain(|s| !s.is_empty());
        if seqs.is_empty() {
            return Some(result);
        }
        let head = seqs.iter().find_map(|seq| {
            let candidate = *seq.front()?;
            let appears_in_tail = seqs.iter().any(|s| s.iter().skip(1).any(|&x| x == candidate));
            (!appears_in_tail).then_some(candidate)
        })?;
        result.push(head);
        for seq in &mut seqs {
            if seq.front() == Some(&head) {
                seq.pop_front();
            }
        }
    }
}

/// Cartesian product of per-position candidate lists: one combination per
/// choice of exactly one candidate MRO at each position, in `choices`'
/// iteration order (mirrors the reference implementation's nested-loop
/// enumeration so tie-breaking among ambiguous bases stays deterministic).
fn cartesian_product(choices: &[Vec<Vec<ObjId>>]) -> Vec<Vec<Vec<ObjId>>> {
    let mut result: Vec<Vec<Vec<ObjId>>> = vec![Vec::new()];
    for options in choices {
        let mut next = Vec::with_capacity(result.len() * options.len());
        for partial in &result {
            for opt in options {
                let mut p = partial.clone();
                p.push(opt.clone());
                next.push(p);
            }
        }
        result = next;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `ObjId` has no public constructor outside the arena, so tests mint
    /// handles through a shared pool keyed by distinct allocation sites.
    fn objs(pool: &mut crate::object::ObjectPool<()>, n: u32) -> ObjId {
        pool.create(crate::object::ObjectData::Builtin {
            site: crate::ir::StmtId(n),
            ctx: (),
            type_tag: crate::intern::NameId::default(),
            value: None,
        })
    }

    #[test]
    fn single_base_chain_linearizes_in_order() {
        let mut ch = ClassHierarchy::new();
        let mut pool: crate::object::ObjectPool<()> = crate::object::ObjectPool::new();
        let a = objs(&mut pool, 1);
        let b = objs(&mut pool, 2);
        ch.add_class(a, &[]);
        ch.add_class(b, &[vec![]]);
        ch.add_class_base(b, 0, a);
        assert_eq!(ch.mros_of(b).collect::<Vec<_>>(), vec![&[b, a][..]]);
    }

    #[test]
    fn diamond_inheritance_c3() {
        // A; B(A); C(A); D(B, C) -> D, B, C, A
        let mut ch = ClassHierarchy::new();
        let mut pool: crate::object::ObjectPool<()> = crate::object::ObjectPool::new();
        let a = objs(&mut pool, 1);
        let b = objs(&mut pool, 2);
        let c = objs(&mut pool, 3);
        let d = objs(&mut pool, 4);
        ch.add_class(a, &[]);
        ch.add_class(b, &[vec![]]);
        ch.add_class(c, &[vec![]]);
        ch.add_class(d, &[vec![], vec![]]);
        ch.add_class_base(b, 0, a);
        ch.add_class_base(c, 0, a);
        assert_eq!(ch.mros_of(d).count(), 0, "D is not linearizable until both bases are known");
        ch.add_class_base(d, 0, b);
        ch.add_class_base(d, 1, c);
        assert_eq!(ch.mros_of(d).collect::<Vec<_>>(), vec![&[d, b, c, a][..]]);
    }

    #[test]
    fn base_mro_change_propagates_to_dependents() {
        let mut ch = ClassHierarchy::new();
        let mut pool: crate::object::ObjectPool<()> = crate::object::ObjectPool::new();
        let a = objs(&mut pool, 1);
        let b = objs(&mut pool, 2);
        let c = objs(&mut pool, 3);
        ch.add_class(a, &[]);
        ch.add_class(b, &[vec![]]);
        ch.add_class(c, &[vec![]]);
        ch.add_class_base(c, 0, b);
        assert_eq!(ch.mros_of(c).collect::<Vec<_>>(), vec![&[c, b][..]]);
        ch.add_class_base(b, 0, a);
        assert_eq!(ch.mros_of(b).collect::<Vec<_>>(), vec![&[b, a][..]]);
        assert_eq!(ch.mros_of(c).collect::<Vec<_>>(), vec![&[c, b, a][..]]);
    }

    #[test]
    fn inconsistent_hierarchy_has_no_mro() {
        // classic C3 failure case: X(A, B); Y(B, A); Z(X, Y)
        let mut ch = ClassHierarchy::new();
        let mut pool: crate::object::ObjectPool<()> = crate::object::ObjectPool::new();
        let a = objs(&mut pool, 1);
        let b = objs(&mut pool, 2);
        let x = objs(&mut pool, 3);
        let y = objs(&mut pool, 4);
        let z = objs(&mut pool, 5);
        ch.add_class(a, &[]);
        ch.add_class(b, &[]);
        ch.add_class(x, &[vec![], vec![]]);
        ch.add_class(y, &[vec![], vec![]]);
        ch.add_class(z, &[vec![], vec![]]);
        ch.add_class_base(x, 0, a);
        ch.add_class_base(x, 1, b);
        ch.add_class_base(y, 0, b);
        ch.add_class_base(y, 1, a);
        ch.add_class_base(z, 0, x);
        ch.add_class_base(z, 1, y);
        assert_eq!(ch.mros_of(z).count(), 0);
    }

    #[test]
    fn ambiguous_base_yields_two_mros() {
        // cls = random_choice([A, B]); class X(cls) -- spec S5
        let mut ch = ClassHierarchy::new();
        let mut pool: crate::object::ObjectPool<()> = crate::object::ObjectPool::new();
        let a = objs(&mut pool, 1);
        let b = objs(&mut pool, 2);
        let x = objs(&mut pool, 3);
        ch.add_class(a, &[]);
        ch.add_class(b, &[]);
        ch.add_class(x, &[vec![]]);
        ch.add_class_base(x, 0, a);
        ch.add_class_base(x, 0, b);
        let mut mros: Vec<Vec<ObjId>> = ch.mros_of(x).map(<[ObjId]>::to_vec).collect();
        mros.sort();
        let mut expected = vec![vec![x, a], vec![x, b]];
        expected.sort();
        assert_eq!(mros, expected);
    }
}
