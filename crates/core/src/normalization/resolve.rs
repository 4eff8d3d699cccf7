//! Column name resolution.
//!
//! Each target column is matched against the source header by, in order:
//! case-insensitive exact name, the alias list, then (optionally) a fuzzy
//! token-set score. A source column is claimed by at most one target.

use std::collections::BTreeSet;

use tracing::debug;

use super::aliases::{AliasEntry, aliases_for};
use crate::io::Table;

/// Minimum fuzzy score (0..=100) for a match.
pub const FUZZY_THRESHOLD: usize = 90;

/// Renames columns of `table` to the names in `target`.
///
/// Unmatched source columns are left untouched. Returns the number of
/// columns whose name changed.
pub fn resolve_columns(
    table: &mut Table,
    target: &[&str],
    aliases: &[AliasEntry],
    fuzzy: bool,
) -> usize {
    let reserved: BTreeSet<String> = target.iter().map(|t| t.to_lowercase()).collect();
    let mut claimed = BTreeSet::new();
    let mut renamed = 0;

    for &want in target {
        let lowered: Vec<String> = table.columns().iter().map(|c| c.to_lowercase()).collect();
        let free = |idx: &usize| !claimed.contains(idx);
        let find = |name: &str| {
            let name = name.to_lowercase();
            (0..lowered.len()).filter(free).find(|&i| lowered[i] == name)
        };

        let mut found = find(want);
        if found.is_none() {
            found = aliases_for(aliases, want).iter().find_map(|&alt| find(alt));
        }
        if found.is_none() && fuzzy {
            let own = want.to_lowercase();
            found = (0..lowered.len())
                .filter(free)
                .filter(|&i| lowered[i] == own || !reserved.contains(&lowered[i]))
                .map(|i| (i, token_set_score(want, &table.columns()[i])))
                .filter(|(_, score)| *score >= FUZZY_THRESHOLD)
                .fold(None, |best: Option<(usize, usize)>, candidate| match best {
                    Some(b) if b.1 >= candidate.1 => Some(b),
                    _ => Some(candidate),
                })
                .map(|(i, _)| i);
        }

        if let Some(idx) = found {
            claimed.insert(idx);
            if table.columns()[idx] != want {
                debug!(from = %table.columns()[idx], to = %want, "Resolved column");
                table.rename_column(idx, want);
                renamed += 1;
            }
        }
    }

    renamed
}

fn tokens(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Edit similarity as an integer percentage.
fn ratio(a: &str, b: &str) -> usize {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0;
    }
    let distance = strsim::levenshtein(a, b).min(longest);
    (longest - distance) * 100 / longest
}

/// Token-set similarity between two header names (0..=100).
///
/// Word order and duplicate words are ignored; a name whose words are all
/// contained in the other scores 100.
#[must_use]
pub fn token_set_score(a: &str, b: &str) -> usize {
    let left = tokens(a);
    let right = tokens(b);
    if left.is_empty() || right.is_empty() {
        return 0;
    }

    let common: Vec<&str> = left.intersection(&right).map(String::as_str).collect();
    let only_left: Vec<&str> = left.difference(&right).map(String::as_str).collect();
    let only_right: Vec<&str> = right.difference(&left).map(String::as_str).collect();
    if !common.is_empty() && (only_left.is_empty() || only_right.is_empty()) {
        return 100;
    }

    let section = common.join(" ");
    let join = |rest: &[&str]| {
        let mut parts: Vec<&str> = Vec::with_capacity(rest.len() + 1);
        if !section.is_empty() {
            parts.push(&section);
        }
        parts.extend_from_slice(rest);
        parts.join(" ")
    };
    let combined_left = join(&only_left);
    let combined_right = join(&only_right);

    ratio(&section, &combined_left)
        .max(ratio(&section, &combined_right))
        .max(ratio(&combined_left, &combined_right))
}
