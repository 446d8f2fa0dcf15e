//! Deterministic native-clause selection.
//!
//! Selection is a partial preference order with a stable final
//! tie-break, not a total order: among matching clauses, prefer the
//! subset declaring the highest OS-version floor, then the subset
//! declaring a language, and finally fall back to declaration order.
//! The staging is preserved exactly as inherited; do not "simplify" it
//! into a comparator.

use crate::clause::{NativeClause, NativeHeader};
use crate::platform::{Platform, WINDOWS_ALIAS};
use lattice_core::{ManifestError, ManifestResult, VersionRange};
use lattice_filter::parse_filter;

/// Select at most one clause for the platform
///
/// # Errors
///
/// Returns [`ManifestError::UnresolvableNativeCode`] when nothing matches
/// and the header carried no optional sentinel, or propagates
/// [`ManifestError::InvalidFilter`] from a bad selection filter.
pub fn select_clause<'a>(
    header: &'a NativeHeader,
    platform: &Platform,
) -> ManifestResult<Option<&'a NativeClause>> {
    if header.clauses.is_empty() {
        return Ok(None);
    }

    let mut matching = Vec::new();
    for (idx, clause) in header.clauses.iter().enumerate() {
        if matches_platform(clause, platform)? {
            matching.push(idx);
        }
    }

    let selected = match matching.len() {
        0 => {
            if header.optional {
                tracing::debug!("no native clause matches; optional sentinel present");
                return Ok(None);
            }
            return Err(ManifestError::UnresolvableNativeCode {
                reason: format!(
                    "no native-code clause matches platform {}/{}",
                    platform.os_name, platform.processor
                ),
            });
        }
        1 => matching[0],
        _ => first_preferred(&header.clauses, &matching)?,
    };

    Ok(Some(&header.clauses[selected]))
}

/// Whether a clause admits the platform
fn matches_platform(clause: &NativeClause, platform: &Platform) -> ManifestResult<bool> {
    let os_ok = clause.os_names.iter().any(|name| {
        *name == platform.os_name || (name == WINDOWS_ALIAS && platform.is_windows())
    });
    if !os_ok {
        return Ok(false);
    }

    if !clause.processors.contains(&platform.processor) {
        return Ok(false);
    }

    if !clause.os_versions.is_empty() {
        let mut in_range = false;
        for range_str in &clause.os_versions {
            if VersionRange::parse(range_str)?.includes(&platform.os_version) {
                in_range = true;
                break;
            }
        }
        if !in_range {
            return Ok(false);
        }
    }

    if !clause.languages.is_empty() && !clause.languages.contains(&platform.language) {
        return Ok(false);
    }

    if let Some(expr) = &clause.selection_filter {
        let filter = parse_filter(expr)?;
        if !filter.matches(&platform.properties()) {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Staged tie-break over more than one matching clause
fn first_preferred(clauses: &[NativeClause], matching: &[usize]) -> ManifestResult<usize> {
    let mut index_list: Vec<usize> = matching.to_vec();
    let mut selection: Vec<usize> = Vec::new();

    // Stage 1: clauses declaring any OS-version range, and the max floor
    // across every declared range.
    let mut max_floor = lattice_core::Version::default();
    for &idx in &index_list {
        let os_versions = &clauses[idx].os_versions;
        if !os_versions.is_empty() {
            selection.push(idx);
        }
        for range_str in os_versions {
            let range = VersionRange::parse(range_str)?;
            if range.floor >= max_floor {
                max_floor = range.floor;
            }
        }
    }

    if selection.len() == 1 {
        return Ok(selection[0]);
    }
    if selection.len() > 1 {
        // Stage 2: keep only clauses declaring a range whose floor is the
        // max floor.
        index_list = std::mem::take(&mut selection);
        for &idx in &index_list {
            for range_str in &clauses[idx].os_versions {
                let range = VersionRange::parse(range_str)?;
                if range.floor >= max_floor {
                    selection.push(idx);
                    break;
                }
            }
        }
    }

    match selection.len() {
        0 => index_list = matching.to_vec(),
        1 => return Ok(selection[0]),
        _ => index_list = selection,
    }

    // Stage 3: prefer clauses declaring a language; otherwise the first
    // matching clause in declaration order.
    index_list
        .iter()
        .copied()
        .find(|&idx| !clauses[idx].languages.is_empty())
        .map_or_else(|| Ok(matching[0]), Ok)
}
