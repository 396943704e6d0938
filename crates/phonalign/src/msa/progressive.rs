//! Progressive alignment along a guide tree.

use crate::{
    profile::{Profile, ProfileAligner},
    scoring::ScoringModel,
    tree::GuideTree,
    AlignError, Result,
};

/// The state of one node of the guide tree during progressive alignment.
#[derive(Clone, Debug)]
enum Node {
    /// Both children have been aligned into this profile.
    Resolved(Profile),
    /// The profile was consumed by its parent's merge.
    Merged,
}

/// Resolve every node of the guide tree, bottom-up in merge order.
///
/// Leaves start resolved. Merge `k` consumes the profiles of its two
/// children and resolves node `n + k`. The root's profile is returned.
///
/// # Errors
///
/// * `InvalidGuideTree` if a merge names a node that is not resolved.
/// * Any error of [`ProfileAligner::align_profiles`]; merges are never
///   retried.
pub(crate) fn progressive<M>(aligner: &ProfileAligner<'_, M>, tree: &GuideTree) -> Result<Profile>
where
    M: ScoringModel + ?Sized,
{
    let n = tree.leaves();
    let mut nodes = (0..n).map(|i| Node::Resolved(aligner.leaf(i))).collect::<Vec<_>>();

    for (k, &[a, b]) in tree.merges().iter().enumerate() {
        let left = take(&mut nodes, a)?;
        let right = take(&mut nodes, b)?;
        ftlog::trace!(
            "Merge {k}: node {a} with {} rows and node {b} with {} rows into node {}",
            left.len(),
            right.len(),
            n + k
        );
        let (merged, score) = aligner.align_profiles(&left, &right)?;
        ftlog::trace!("Merge {k} has width {} and score {score:.6}", merged.width());
        nodes.push(Node::Resolved(merged));
    }

    nodes
        .pop()
        .and_then(|node| match node {
            Node::Resolved(profile) => Some(profile),
            Node::Merged => None,
        })
        .ok_or_else(|| AlignError::guide_tree("the root is not resolved"))
}

/// Take the profile of a resolved node, marking it merged.
fn take(nodes: &mut [Node], id: usize) -> Result<Profile> {
    match nodes.get_mut(id).map(|node| core::mem::replace(node, Node::Merged)) {
        Some(Node::Resolved(profile)) => Ok(profile),
        _ => Err(AlignError::guide_tree(format!("node {id} is not resolved"))),
    }
}
