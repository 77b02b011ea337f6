//! Certificate-policy tree processing (RFC 5280 Sections 6.1.3 and 6.1.4).
//!
//! Builds the valid_policy_tree across the chain from the root down to the
//! leaf while maintaining the explicit_policy counter. Policy qualifiers
//! are restricted to CPS pointers and the policy-mappings extension is not
//! processed: a mapped policy is treated as unmatched. This is a known
//! simplification of the standard algorithm.

use super::engine::CheckOutcome;
use crate::model::{Certificate, CertificatePolicy};
use crate::oid;

/// One node of the valid_policy_tree. Children are exclusively owned by
/// their parent; the root is a synthetic anyPolicy node at depth 0.
#[derive(Debug, Clone)]
struct PolicyTreeNode {
    valid_policy: String,
    #[allow(dead_code)] // carried for parity with the standard structure
    qualifier_set: Vec<String>,
    expected_policy_set: Vec<String>,
    children: Vec<PolicyTreeNode>,
}

impl PolicyTreeNode {
    fn any_policy_root() -> Self {
        Self {
            valid_policy: oid::ANY_POLICY.to_string(),
            qualifier_set: Vec::new(),
            expected_policy_set: vec![oid::ANY_POLICY.to_string()],
            children: Vec::new(),
        }
    }

    fn child_for(policy: &CertificatePolicy) -> Self {
        Self {
            valid_policy: policy.oid.clone(),
            qualifier_set: policy.cps_uri.iter().cloned().collect(),
            expected_policy_set: vec![policy.oid.clone()],
            children: Vec::new(),
        }
    }
}

/// Visit every node at `target` depth, parents first unchanged.
fn for_each_at_depth<F>(node: &mut PolicyTreeNode, node_depth: usize, target: usize, f: &mut F)
where
    F: FnMut(&mut PolicyTreeNode),
{
    if node_depth == target {
        f(node);
        return;
    }
    for child in &mut node.children {
        for_each_at_depth(child, node_depth + 1, target, f);
    }
}

/// Remove nodes above the current depth that gained no children
/// (RFC 5280 Section 6.1.3 (d)(3)).
fn prune(node: &mut PolicyTreeNode, node_depth: usize, current: usize) {
    if node_depth + 1 == current {
        // children are this level's fresh leaves
        return;
    }
    node.children.retain_mut(|child| {
        prune(child, node_depth + 1, current);
        !child.children.is_empty()
    });
}

/// Run the whole-chain policy-tree check. The chain is leaf-first;
/// processing walks it in reverse, root to leaf.
pub(crate) fn process(chain: &[Certificate]) -> CheckOutcome {
    let chain_length = chain.len();
    // n + 1 so that a chain without policy constraints never exhausts it
    let mut explicit_policy = chain_length + 1;
    let mut tree: Option<PolicyTreeNode> = Some(PolicyTreeNode::any_policy_root());

    for (level, certificate) in chain.iter().rev().enumerate() {
        let depth = level + 1;
        let is_final = level == chain_length - 1;

        let mut collapsed = false;
        if let Some(root) = tree.as_mut() {
            if certificate.certificate_policies.is_empty() {
                // 6.1.3 (e): no certificate-policies extension collapses the tree
                collapsed = true;
            } else {
                for policy in &certificate.certificate_policies {
                    if policy.oid != oid::ANY_POLICY {
                        attach_policy(root, policy, depth);
                    } else if certificate.self_signed && !is_final {
                        expand_any_policy(root, policy, depth);
                    }
                }
                prune(root, 0, depth);
                collapsed = root.children.is_empty();
            }
        }
        if collapsed {
            tree = None;
        }

        if !certificate.self_signed && explicit_policy > 0 {
            explicit_policy -= 1;
        }
        if let Some(required) = certificate.require_explicit_policy {
            let required = required as usize;
            if required < explicit_policy {
                explicit_policy = required;
            }
        }

        if explicit_policy == 0 && tree.is_none() {
            return CheckOutcome::fail_with(format!(
                "valid_policy_tree is empty and explicit_policy is exhausted at certificate '{}'",
                certificate.id
            ));
        }
    }

    CheckOutcome::pass()
}

/// 6.1.3 (d)(1): attach a declared policy to every current-level node
/// expecting it, or to an anyPolicy node when none expects it.
fn attach_policy(root: &mut PolicyTreeNode, policy: &CertificatePolicy, depth: usize) {
    let mut matched = false;
    for_each_at_depth(root, 0, depth - 1, &mut |node| {
        if node.expected_policy_set.contains(&policy.oid) {
            node.children.push(PolicyTreeNode::child_for(policy));
            matched = true;
        }
    });
    if !matched {
        for_each_at_depth(root, 0, depth - 1, &mut |node| {
            if !matched && node.valid_policy == oid::ANY_POLICY {
                node.children.push(PolicyTreeNode::child_for(policy));
                matched = true;
            }
        });
    }
}

/// 6.1.3 (d)(2): a self-issued certificate declaring anyPolicy extends
/// every expected policy of the current level.
fn expand_any_policy(root: &mut PolicyTreeNode, policy: &CertificatePolicy, depth: usize) {
    for_each_at_depth(root, 0, depth - 1, &mut |node| {
        for expected in node.expected_policy_set.clone() {
            let already_present = node.children.iter().any(|c| c.valid_policy == expected);
            if !already_present {
                node.children.push(PolicyTreeNode {
                    valid_policy: expected.clone(),
                    qualifier_set: policy.cps_uri.iter().cloned().collect(),
                    expected_policy_set: vec![expected],
                    children: Vec::new(),
                });
            }
        }
    });
}
