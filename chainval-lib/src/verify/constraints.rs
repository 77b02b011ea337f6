//! Name-constraints processing (RFC 5280 Section 4.2.1.10 and 6.1.4 (g)).
//!
//! Walks the chain from the root down, maintaining the permitted and
//! excluded subtree state, and checks the leaf certificate's subject name
//! and directoryName subject-alternative-names against it. Only
//! directoryName subtrees are interpreted; every other general-name type
//! is logged and ignored.

use super::engine::CheckOutcome;
use crate::model::{Certificate, DistinguishedName, GeneralName, GeneralNameKind};
use tracing::warn;

/// Parse the directoryName entries of a subtree list into DNs.
///
/// Non-directoryName entries and entries whose value does not parse into
/// at least one relative distinguished name are excluded from the match
/// set with a warning (parsing is fail-open; the constraint itself stays
/// fail-closed).
fn directory_subtrees(subtrees: &[GeneralName]) -> Vec<DistinguishedName> {
    let mut parsed = Vec::new();
    for subtree in subtrees {
        if subtree.kind != GeneralNameKind::DirectoryName {
            warn!(
                "name-constraint subtree of type {:?} is not supported, entry ignored",
                subtree.kind
            );
            continue;
        }
        let dn = DistinguishedName::parse(&subtree.value);
        if dn.is_empty() {
            warn!("unparsable directoryName subtree '{}', entry ignored", subtree.value);
            continue;
        }
        parsed.push(dn);
    }
    parsed
}

/// Intersect the running permitted set with a certificate's declared set.
///
/// Of an overlapping pair the more specific subtree survives; pairs with
/// no overlap contribute nothing, so disjoint sets intersect to an empty
/// set that permits no name at all.
fn intersect(
    previous: &[DistinguishedName],
    declared: &[DistinguishedName],
) -> Vec<DistinguishedName> {
    let mut result: Vec<DistinguishedName> = Vec::new();
    for declared_subtree in declared {
        for previous_subtree in previous {
            let survivor = if declared_subtree.is_within(previous_subtree) {
                Some(declared_subtree)
            } else if previous_subtree.is_within(declared_subtree) {
                Some(previous_subtree)
            } else {
                None
            };
            if let Some(survivor) = survivor {
                if !result.contains(survivor) {
                    result.push(survivor.clone());
                }
            }
        }
    }
    result
}

/// Union the running excluded set with a certificate's declared set.
///
/// Of an overlapping pair the broader subtree survives; both sides of a
/// non-overlapping pair are kept.
fn union(previous: &[DistinguishedName], declared: &[DistinguishedName]) -> Vec<DistinguishedName> {
    let mut result: Vec<DistinguishedName> = Vec::new();
    let keep = |subtree: &DistinguishedName, result: &mut Vec<DistinguishedName>| {
        if !result.contains(subtree) {
            result.push(subtree.clone());
        }
    };
    for declared_subtree in declared {
        for previous_subtree in previous {
            if declared_subtree.is_within(previous_subtree) {
                keep(previous_subtree, &mut result);
            } else if previous_subtree.is_within(declared_subtree) {
                keep(declared_subtree, &mut result);
            } else {
                keep(previous_subtree, &mut result);
                keep(declared_subtree, &mut result);
            }
        }
        if previous.is_empty() {
            keep(declared_subtree, &mut result);
        }
    }
    result
}

/// Whether a DN lies within at least one subtree of the set.
fn within_any(dn: &DistinguishedName, subtrees: &[DistinguishedName]) -> bool {
    subtrees.iter().any(|subtree| dn.is_within(subtree))
}

/// Directory names to check on the leaf: the subject DN plus every
/// directoryName subject-alternative-name.
fn leaf_names(certificate: &Certificate) -> Vec<DistinguishedName> {
    let mut names = vec![certificate.subject.clone()];
    for san in &certificate.subject_alternative_names {
        if san.kind == GeneralNameKind::DirectoryName {
            names.push(DistinguishedName::parse(&san.value));
        }
    }
    names
}

/// Run the whole-chain name-constraints check. The chain is leaf-first;
/// the state walk goes root to leaf and membership is verified at the
/// leaf only.
pub(crate) fn process(chain: &[Certificate]) -> CheckOutcome {
    let mut permitted: Option<Vec<DistinguishedName>> = None;
    let mut excluded: Option<Vec<DistinguishedName>> = None;

    for (index, certificate) in chain.iter().enumerate().rev() {
        if index == 0 {
            for name in leaf_names(certificate) {
                if let Some(permitted) = &permitted {
                    if !within_any(&name, permitted) {
                        return CheckOutcome::fail_with(format!(
                            "name '{}' is not within the permitted subtrees",
                            name
                        ));
                    }
                }
                if let Some(excluded) = &excluded {
                    if within_any(&name, excluded) {
                        return CheckOutcome::fail_with(format!(
                            "name '{}' is within an excluded subtree",
                            name
                        ));
                    }
                }
            }
        }

        // 6.1.4 (g): fold this certificate's declared subtrees into the state
        if !certificate.permitted_subtrees.is_empty() {
            let declared = directory_subtrees(&certificate.permitted_subtrees);
            if !declared.is_empty() {
                permitted = Some(match permitted.take() {
                    Some(previous) => intersect(&previous, &declared),
                    None => declared,
                });
            }
        }
        if !certificate.excluded_subtrees.is_empty() {
            let declared = directory_subtrees(&certificate.excluded_subtrees);
            if !declared.is_empty() {
                excluded = Some(match excluded.take() {
                    Some(previous) => union(&previous, &declared),
                    None => declared,
                });
            }
        }
    }

    CheckOutcome::pass()
}
