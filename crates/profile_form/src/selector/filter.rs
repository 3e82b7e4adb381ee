//! Case-insensitive substring filter.
//!
//! No fuzzy matching and no ranking: matches keep candidate order.

/// Indices of all candidates containing `query`, ignoring case.
/// An empty query matches everything.
pub fn filter_indices(candidates: &[String], query: &str) -> Vec<usize> {
    if query.is_empty() {
        return (0..candidates.len()).collect();
    }
    let needle = query.to_lowercase();
    candidates
        .iter()
        .enumerate()
        .filter(|(_, candidate)| candidate.to_lowercase().contains(&needle))
        .map(|(index, _)| index)
        .collect()
}

/// Whether a list this large still needs more query text before any rows
/// are produced.
pub fn requires_typing(
    candidate_count: usize,
    query: &str,
    large_list_threshold: usize,
    min_query_len: usize,
) -> bool {
    candidate_count > large_list_threshold && query.trim().chars().count() < min_query_len
}
