//! Grouped distinct-message counts and renormalized relevance shares.
//!
//! Aggregates skip rows that fail [`is_eligible`], so the mandatory
//! exclusions hold even if a caller hands in an unfiltered table. Output is
//! ordered by grouping key; display order is the chart's concern.

use std::collections::{BTreeMap, HashSet};

use cchc_core::{Dataset, MessageRow};
use serde::Serialize;

use crate::error::{AggregateView, AnalyticsError};
use crate::filter::is_eligible;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtopicCount {
    pub topic: String,
    pub subtopic: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtopicShare {
    pub topic: String,
    pub subtopic: String,
    /// Fraction of the visible percentage mass, in `[0, 1]` for
    /// non-negative inputs.
    pub share: f64,
}

/// Distinct `msg_id` count per topic. Rows with a null id keep their topic
/// in the output but add nothing to its count.
///
/// # Errors
///
/// [`AnalyticsError::EmptyAggregate`] when no eligible row remains.
pub fn topic_counts(table: &Dataset) -> Result<Vec<TopicCount>, AnalyticsError> {
    let mut groups: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
    for row in table.iter().filter(|row| is_eligible(row)) {
        if let Some(topic) = row.topic() {
            let ids = groups.entry(topic).or_default();
            ids.extend(row.message_id());
        }
    }

    if groups.is_empty() {
        return Err(AnalyticsError::EmptyAggregate {
            view: AggregateView::TopicCounts,
        });
    }

    Ok(groups
        .into_iter()
        .map(|(topic, ids)| TopicCount {
            topic: topic.to_owned(),
            count: ids.len(),
        })
        .collect())
}

/// Eligible rows keyed by `(topic, subtopic)`; rows without a sub-topic are
/// left out of every sub-topic grouping.
fn subtopic_rows(table: &Dataset) -> impl Iterator<Item = ((&str, &str), &MessageRow)> + '_ {
    table
        .iter()
        .filter(|row| is_eligible(row))
        .filter_map(|row| Some(((row.topic()?, row.subtopic()?), row)))
}

/// Distinct `msg_id` count per `(topic, subtopic)` pair.
///
/// # Errors
///
/// [`AnalyticsError::EmptyAggregate`] when no eligible row carries a
/// sub-topic.
pub fn subtopic_counts(table: &Dataset) -> Result<Vec<SubtopicCount>, AnalyticsError> {
    let mut groups: BTreeMap<(&str, &str), HashSet<&str>> = BTreeMap::new();
    for (key, row) in subtopic_rows(table) {
        groups.entry(key).or_default().extend(row.message_id());
    }

    if groups.is_empty() {
        return Err(AnalyticsError::EmptyAggregate {
            view: AggregateView::SubtopicCounts,
        });
    }

    Ok(groups
        .into_iter()
        .map(|((topic, subtopic), ids)| SubtopicCount {
            topic: topic.to_owned(),
            subtopic: subtopic.to_owned(),
            count: ids.len(),
        })
        .collect())
}

/// Summed `percentage` per `(topic, subtopic)` divided by the grand total of
/// the table, so the shares of the visible sub-topics add up to one.
///
/// # Errors
///
/// [`AnalyticsError::EmptyAggregate`] when there are no groups or the grand
/// total is zero.
pub fn subtopic_relevance(table: &Dataset) -> Result<Vec<SubtopicShare>, AnalyticsError> {
    let mut sums: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    for (key, row) in subtopic_rows(table) {
        *sums.entry(key).or_insert(0.0) += row.percentage;
    }

    let total: f64 = sums.values().sum();
    if sums.is_empty() || total == 0.0 || !total.is_finite() {
        return Err(AnalyticsError::EmptyAggregate {
            view: AggregateView::SubtopicRelevance,
        });
    }

    Ok(sums
        .into_iter()
        .map(|((topic, subtopic), sum)| SubtopicShare {
            topic: topic.to_owned(),
            subtopic: subtopic.to_owned(),
            share: sum / total,
        })
        .collect())
}
