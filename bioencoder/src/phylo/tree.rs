//! Traversal utilities over a parsed tree: tip depths and common ancestors.

use std::collections::HashSet;

use crate::error::{BioEncoderError, BioEncoderResult};

use super::newick::NewickNode;

/// A leaf of the tree together with its position relative to the root.
#[derive(Debug, Clone)]
pub(super) struct Tip {
    pub label: String,
    /// Cumulative branch length from the root to this leaf.
    pub depth: f64,
    /// Root-to-leaf path as `(node id, cumulative depth)` entries, the root
    /// first. Node ids are preorder indices of the traversal that produced
    /// the tips, so equal ids across two paths mean the same node.
    pub path: Vec<(usize, f64)>,
}

/// The most recent common ancestor of two tips.
#[derive(Debug, Clone, Copy)]
pub(super) struct Mrca {
    /// Cumulative branch length from the root to the ancestor.
    pub depth: f64,
    /// Whether the ancestor is the tree's root itself.
    pub is_root: bool,
}

/// Collect every leaf of the tree with its depth and root-to-leaf path.
///
/// # Errors
///
/// Returns `Err(BioEncoderError::DuplicateTipLabel)` if two leaves share a
/// label, and `Err(BioEncoderError::TreeParse)` for unlabeled leaves.
pub(super) fn collect_tips(root: &NewickNode) -> BioEncoderResult<Vec<Tip>> {
    let mut tips = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = Vec::new();
    let mut next_id = 0;
    walk(root, 0.0, &mut next_id, &mut stack, &mut seen, &mut tips)?;
    Ok(tips)
}

fn walk(
    node: &NewickNode,
    parent_depth: f64,
    next_id: &mut usize,
    stack: &mut Vec<(usize, f64)>,
    seen: &mut HashSet<String>,
    tips: &mut Vec<Tip>,
) -> BioEncoderResult<()> {
    let depth = parent_depth + node.length;
    let id = *next_id;
    *next_id += 1;
    stack.push((id, depth));

    if node.is_leaf() {
        let label = node.label.clone().ok_or_else(|| BioEncoderError::TreeParse {
            reason: "tree contains an unlabeled leaf".to_string(),
        })?;
        if !seen.insert(label.clone()) {
            return Err(BioEncoderError::DuplicateTipLabel { label });
        }
        tips.push(Tip {
            label,
            depth,
            path: stack.clone(),
        });
    } else {
        for child in &node.children {
            walk(child, depth, next_id, stack, seen, tips)?;
        }
    }

    stack.pop();
    Ok(())
}

/// Find the most recent common ancestor of two tips by comparing their
/// root-to-leaf paths: the deepest shared node is the last entry of the
/// longest common prefix. Returns `None` if the paths share no node.
pub(super) fn mrca(first: &Tip, second: &Tip) -> Option<Mrca> {
    let mut common = None;
    let mut shared = 0;
    for (a, b) in first.path.iter().zip(second.path.iter()) {
        if a.0 != b.0 {
            break;
        }
        common = Some(a.1);
        shared += 1;
    }
    common.map(|depth| Mrca {
        depth,
        is_root: shared == 1,
    })
}

#[cfg(test)]
mod tests {
    use super::super::newick;
    use super::*;

    fn tips_of(text: &str) -> Vec<Tip> {
        collect_tips(&newick::parse(text).unwrap()).unwrap()
    }

    #[test]
    fn depths_accumulate_branch_lengths() {
        let tips = tips_of("((A:1,B:2.5):0.5,C:3);");
        let a = tips.iter().find(|t| t.label == "A").unwrap();
        let b = tips.iter().find(|t| t.label == "B").unwrap();
        let c = tips.iter().find(|t| t.label == "C").unwrap();
        assert_eq!(a.depth, 1.5);
        assert_eq!(b.depth, 3.0);
        assert_eq!(c.depth, 3.0);
    }

    #[test]
    fn mrca_of_siblings_is_their_parent() {
        let tips = tips_of("((A:1,B:1):0.5,C:3);");
        let a = tips.iter().find(|t| t.label == "A").unwrap();
        let b = tips.iter().find(|t| t.label == "B").unwrap();
        let anc = mrca(a, b).unwrap();
        assert!(!anc.is_root);
        assert_eq!(anc.depth, 0.5);
    }

    #[test]
    fn mrca_across_the_basal_split_is_the_root() {
        let tips = tips_of("((A:1,B:1):0.5,C:3);");
        let a = tips.iter().find(|t| t.label == "A").unwrap();
        let c = tips.iter().find(|t| t.label == "C").unwrap();
        let anc = mrca(a, c).unwrap();
        assert!(anc.is_root);
        assert_eq!(anc.depth, 0.0);
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let root = newick::parse("((A:1,A:1):0.5,C:3);").unwrap();
        assert!(matches!(
            collect_tips(&root),
            Err(BioEncoderError::DuplicateTipLabel { label }) if label == "A"
        ));
    }
}
