//! Mandatory exclusions and cascading categorical filters.
//!
//! Every level of a [`FilterSelection`] follows the same rule: an empty set
//! places no constraint on that level. Levels compose by conjunction.

use std::collections::BTreeSet;

use cchc_core::{Dataset, FilterSelection, MessageRow, EXCLUDED_TOPIC};

/// `true` for rows that may reach an aggregate: written by the public, with a
/// topic, and not in the catch-all topic. A null `sender` is not eligible.
#[must_use]
pub fn is_eligible(row: &MessageRow) -> bool {
    row.is_public() && row.topic().is_some_and(|topic| topic != EXCLUDED_TOPIC)
}

/// A null cell only passes a level with no constraint.
fn level_allows(selection: &BTreeSet<String>, value: Option<&str>) -> bool {
    selection.is_empty() || value.is_some_and(|v| selection.contains(v))
}

/// Drops sender rows, rows without a topic and rows in the excluded topic.
#[must_use]
pub fn filter_base(table: &Dataset) -> Dataset {
    table.iter().filter(|row| is_eligible(row)).cloned().collect()
}

/// [`filter_base`] followed by the region, comuna and topic levels of
/// `selection`.
///
/// Callers building the topic overview pass a selection without topics
/// (see [`FilterSelection::without_topics`]); sub-topic views pass the full
/// selection.
#[must_use]
pub fn apply_filters(table: &Dataset, selection: &FilterSelection) -> Dataset {
    table
        .iter()
        .filter(|row| is_eligible(row))
        .filter(|row| level_allows(&selection.regions, row.region()))
        .filter(|row| level_allows(&selection.comunas, row.comuna()))
        .filter(|row| level_allows(&selection.topics, row.topic()))
        .cloned()
        .collect()
}

/// Sorted distinct non-null regions of `table`.
#[must_use]
pub fn available_regions(table: &Dataset) -> Vec<String> {
    distinct(table.iter().filter_map(MessageRow::region))
}

/// Comuna options for the current region selection.
///
/// With no region selected every comuna is offered; otherwise only comunas
/// of rows in a selected region. Sorted ascending, case preserved.
#[must_use]
pub fn available_comunas(table: &Dataset, regions: &BTreeSet<String>) -> Vec<String> {
    distinct(
        table
            .iter()
            .filter(|row| level_allows(regions, row.region()))
            .filter_map(MessageRow::comuna),
    )
}

/// Topic options, built from the same exclusions the aggregates use.
#[must_use]
pub fn available_topics(table: &Dataset) -> Vec<String> {
    distinct(
        table
            .iter()
            .filter(|row| is_eligible(row))
            .filter_map(MessageRow::topic),
    )
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}
