//! Ancestor derivation from dotted MeSH tree numbers
//!
//! `C04.588.443` sits three levels deep; its ancestors are `C04.588`
//! (distance 1) and `C04` (distance 2), and the tree number itself is
//! reported with distance 0.

use rustc_hash::FxHashSet;

use crate::record::AncestorTreeNumber;

/// Derive the deduplicated set of ancestor prefixes for `tree_numbers`.
///
/// Pairs with equal `(distance, tree)` collapse to one. The result is a
/// set; callers must not rely on its order (it happens to be first-seen,
/// root to leaf per input).
pub fn ancestor_tree_numbers<S: AsRef<str>>(tree_numbers: &[S]) -> Vec<AncestorTreeNumber> {
    let mut seen: FxHashSet<AncestorTreeNumber> = FxHashSet::default();
    let mut ancestors = Vec::new();

    for tree in tree_numbers {
        let tree = tree.as_ref();
        // Each prefix ends right before a dot, the last one at the end of the string
        let ends: Vec<usize> = tree
            .match_indices('.')
            .map(|(pos, _)| pos)
            .chain(std::iter::once(tree.len()))
            .collect();
        let depth = ends.len();

        for (i, end) in ends.into_iter().enumerate() {
            let ancestor = AncestorTreeNumber {
                distance: depth - (i + 1),
                tree: tree[..end].to_string(),
            };
            if !seen.contains(&ancestor) {
                seen.insert(ancestor.clone());
                ancestors.push(ancestor);
            }
        }
    }

    ancestors
}
