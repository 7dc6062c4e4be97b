//! Sorted postings list algebra.
//!
//! Every list handled here is sorted ascending and duplicate-free, and every
//! function returns a list with the same property. The slice-level merges are
//! pure; the [`Postings`]-level operations add negation dispatch on top.

use crate::error::{Error, Negation, Result};
use crate::index::DocId;

/// A postings list tagged with whether it is a match set or an exclusion set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Postings {
    Positive(Vec<DocId>),
    /// Documents that must not match. Only resolvable as the right side of AND-NOT.
    Negated(Vec<DocId>),
}

impl Postings {
    pub fn ids(&self) -> &[DocId] {
        match self {
            Postings::Positive(ids) | Postings::Negated(ids) => ids,
        }
    }

    pub fn is_negated(&self) -> bool {
        matches!(self, Postings::Negated(_))
    }

    pub fn into_ids(self) -> Vec<DocId> {
        match self {
            Postings::Positive(ids) | Postings::Negated(ids) => ids,
        }
    }
}

/// Ids present in both lists.
pub fn intersect_ids(p1: &[DocId], p2: &[DocId]) -> Vec<DocId> {
    let (mut x, mut y) = (0, 0);
    let mut out = Vec::with_capacity(p1.len().min(p2.len()));
    while x < p1.len() && y < p2.len() {
        if p1[x] < p2[y] {
            x += 1;
        } else if p1[x] > p2[y] {
            y += 1;
        } else {
            out.push(p1[x]);
            x += 1;
            y += 1;
        }
    }
    out
}

/// Ids present in either list.
pub fn union_ids(p1: &[DocId], p2: &[DocId]) -> Vec<DocId> {
    let (mut x, mut y) = (0, 0);
    let mut out = Vec::with_capacity(p1.len() + p2.len());
    while x < p1.len() && y < p2.len() {
        if p1[x] < p2[y] {
            out.push(p1[x]);
            x += 1;
        } else if p1[x] > p2[y] {
            out.push(p2[y]);
            y += 1;
        } else {
            out.push(p1[x]);
            x += 1;
            y += 1;
        }
    }
    out.extend_from_slice(&p1[x..]);
    out.extend_from_slice(&p2[y..]);
    out
}

/// Ids of `p1` that are absent from `p2`.
pub fn difference_ids(p1: &[DocId], p2: &[DocId]) -> Vec<DocId> {
    let (mut x, mut y) = (0, 0);
    let mut out = Vec::with_capacity(p1.len());
    while x < p1.len() {
        if y >= p2.len() {
            out.extend_from_slice(&p1[x..]);
            break;
        }
        if p1[x] < p2[y] {
            out.push(p1[x]);
            x += 1;
        } else if p1[x] == p2[y] {
            x += 1;
            y += 1;
        } else {
            y += 1;
        }
    }
    out
}

/// `p1 AND p2`. A negated operand turns the operation into AND-NOT against the other side.
pub fn intersect(p1: &Postings, p2: &Postings) -> Result<Postings> {
    match (p1, p2) {
        (Postings::Positive(a), Postings::Positive(b)) => {
            Ok(Postings::Positive(intersect_ids(a, b)))
        }
        (Postings::Positive(_), Postings::Negated(_)) => and_not(p1, p2),
        (Postings::Negated(_), _) => and_not(p2, p1),
    }
}

/// `p1 OR p2`. Fails if either side is negated.
pub fn union(p1: &Postings, p2: &Postings) -> Result<Postings> {
    match (p1, p2) {
        (Postings::Positive(a), Postings::Positive(b)) => {
            Ok(Postings::Positive(union_ids(a, b)))
        }
        _ => Err(Negation::NegatedUnionOperand {
            left: p1.is_negated(),
            right: p2.is_negated(),
        }
        .into()),
    }
}

/// `p1 AND NOT p2`: the ids of `p1` not listed in `p2`, whatever `p2`'s tag.
pub fn and_not(p1: &Postings, p2: &Postings) -> Result<Postings> {
    match p1 {
        Postings::Positive(a) => Ok(Postings::Positive(difference_ids(a, p2.ids()))),
        Postings::Negated(_) => Err(Negation::DoubleNegation.into()),
    }
}

/// Left fold of [`intersect`]. A single operand is returned unchanged.
pub fn intersect_multiple(args: &[Postings]) -> Result<Postings> {
    fold(args, "AND", intersect)
}

/// Left fold of [`union`]. A single operand is returned unchanged.
pub fn union_multiple(args: &[Postings]) -> Result<Postings> {
    fold(args, "OR", union)
}

fn fold(
    args: &[Postings],
    op: &'static str,
    f: fn(&Postings, &Postings) -> Result<Postings>,
) -> Result<Postings> {
    let (first, rest) = args.split_first().ok_or(Error::EmptyOperands(op))?;
    let mut result = first.clone();
    for element in rest {
        result = f(&result, element)?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pos(ids: &[DocId]) -> Postings { Postings::Positive(ids.to_vec()) }
    fn neg(ids: &[DocId]) -> Postings { Postings::Negated(ids.to_vec()) }

    #[test]
    fn intersect_stops_at_shorter_list() {
        assert_eq!(intersect_ids(&[1, 3, 5, 7, 9], &[3, 4, 5]), vec![3, 5]);
        assert_eq!(intersect_ids(&[2, 4], &[]), Vec::<DocId>::new());
    }

    #[test]
    fn union_appends_remainder() {
        assert_eq!(union_ids(&[1, 4], &[2, 3, 4, 8, 9]), vec![1, 2, 3, 4, 8, 9]);
        assert_eq!(union_ids(&[], &[5, 6]), vec![5, 6]);
    }

    #[test]
    fn difference_boundaries() {
        assert_eq!(difference_ids(&[1, 2, 3, 6], &[2, 4]), vec![1, 3, 6]);
        // p2 exhausted first: rest of p1 copied verbatim
        assert_eq!(difference_ids(&[5, 6, 7], &[1]), vec![5, 6, 7]);
        // p1 runs out while p2 still has ids: stop
        assert_eq!(difference_ids(&[1], &[2, 3, 4]), vec![1]);
        assert_eq!(difference_ids(&[2, 3], &[2, 3, 4, 5]), Vec::<DocId>::new());
        assert_eq!(difference_ids(&[], &[1, 2]), Vec::<DocId>::new());
    }

    #[test]
    fn intersect_dispatches_negation_on_either_side() {
        let brutus = pos(&[1, 2, 4]);
        let not_calpurnia = neg(&[2]);
        assert_eq!(intersect(&brutus, &not_calpurnia).unwrap(), pos(&[1, 4]));
        assert_eq!(intersect(&not_calpurnia, &brutus).unwrap(), pos(&[1, 4]));
    }

    #[test]
    fn negated_empty_list_removes_nothing() {
        assert_eq!(intersect(&pos(&[1, 2]), &neg(&[])).unwrap(), pos(&[1, 2]));
    }

    #[test]
    fn double_negation_fails() {
        let err = intersect(&neg(&[1]), &neg(&[2])).unwrap_err();
        assert!(matches!(err, Error::UnsupportedNegation(Negation::DoubleNegation)));
        let err = and_not(&neg(&[1]), &pos(&[2])).unwrap_err();
        assert!(matches!(err, Error::UnsupportedNegation(Negation::DoubleNegation)));
    }

    #[test]
    fn union_rejects_negated_operand() {
        let err = union(&pos(&[1]), &neg(&[2])).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedNegation(Negation::NegatedUnionOperand { left: false, right: true })
        ));
        let err = union(&neg(&[]), &neg(&[])).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedNegation(Negation::NegatedUnionOperand { left: true, right: true })
        ));
    }

    #[test]
    fn multiple_folds() {
        assert_eq!(intersect_multiple(&[pos(&[1, 2])]).unwrap(), pos(&[1, 2]));
        assert_eq!(intersect_multiple(&[neg(&[3])]).unwrap(), neg(&[3]));
        let lists = [pos(&[1, 2, 3, 4]), pos(&[2, 3, 4]), neg(&[3])];
        assert_eq!(intersect_multiple(&lists).unwrap(), pos(&[2, 4]));
        let lists = [pos(&[5]), pos(&[1]), pos(&[3, 5])];
        assert_eq!(union_multiple(&lists).unwrap(), pos(&[1, 3, 5]));
    }

    #[test]
    fn empty_operand_list_is_an_error() {
        assert!(matches!(intersect_multiple(&[]), Err(Error::EmptyOperands("AND"))));
        assert!(matches!(union_multiple(&[]), Err(Error::EmptyOperands("OR"))));
    }

    fn sorted_unique() -> impl Strategy<Value = Vec<DocId>> {
        proptest::collection::btree_set(1u32..200, 0..40).prop_map(|s| s.into_iter().collect())
    }

    fn is_sorted_unique(ids: &[DocId]) -> bool {
        ids.windows(2).all(|w| w[0] < w[1])
    }

    proptest! {
        #[test]
        fn intersect_is_commutative_and_contained(a in sorted_unique(), b in sorted_unique()) {
            let ab = intersect_ids(&a, &b);
            prop_assert_eq!(&ab, &intersect_ids(&b, &a));
            prop_assert!(is_sorted_unique(&ab));
            for id in &ab {
                prop_assert!(a.contains(id) && b.contains(id));
            }
        }

        #[test]
        fn union_is_set_union(a in sorted_unique(), b in sorted_unique()) {
            let u = union_ids(&a, &b);
            prop_assert!(is_sorted_unique(&u));
            let expected: std::collections::BTreeSet<DocId> = a.iter().chain(b.iter()).copied().collect();
            prop_assert_eq!(u.clone(), expected.into_iter().collect::<Vec<_>>());
            prop_assert_eq!(u.len() + intersect_ids(&a, &b).len(), a.len() + b.len());
        }

        #[test]
        fn and_not_partitions_left_operand(a in sorted_unique(), b in sorted_unique()) {
            let diff = and_not(&Postings::Positive(a.clone()), &Postings::Positive(b.clone())).unwrap().into_ids();
            let inter = intersect_ids(&a, &b);
            prop_assert!(is_sorted_unique(&diff));
            prop_assert!(intersect_ids(&diff, &inter).is_empty());
            prop_assert_eq!(union_ids(&diff, &inter), a);
        }

        #[test]
        fn idempotent_and_empty_identity(a in sorted_unique()) {
            prop_assert_eq!(&intersect_ids(&a, &a), &a);
            prop_assert_eq!(&union_ids(&a, &a), &a);
            prop_assert!(intersect_ids(&a, &[]).is_empty());
            prop_assert_eq!(&union_ids(&[], &a), &a);
        }
    }
}
