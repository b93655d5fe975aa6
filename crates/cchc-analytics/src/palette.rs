//! Stable topic ordering and the topic → color binding.
//!
//! The domain is taken from the full, unfiltered table so colors and order
//! do not shift while the analyst changes filters.

use std::collections::BTreeSet;

use cchc_core::{Dataset, MessageRow};
use serde::Serialize;

/// Brand palette, bound to the topic domain by position.
pub const CATEGORY_COLORS: [&str; 6] = [
    "#1a249e", "#4a8dff", "#e66c37", "#e044a6", "#e044a6", "#6b077a",
];

/// Sorted distinct non-null topics of `table`.
///
/// Pass the full loaded table, never a filtered one.
#[must_use]
pub fn topic_domain(table: &Dataset) -> Vec<String> {
    table
        .iter()
        .filter_map(MessageRow::topic)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicColor {
    pub topic: String,
    /// `None` when the domain is longer than the palette.
    pub color: Option<String>,
}

/// Positional mapping of a topic domain onto a palette.
///
/// Topics past the end of the palette are left without a color rather than
/// wrapped around; the presentation layer decides how to draw them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorScale {
    entries: Vec<TopicColor>,
}

impl ColorScale {
    #[must_use]
    pub fn new(domain: &[String], palette: &[&str]) -> Self {
        if domain.len() > palette.len() {
            tracing::warn!(
                topics = domain.len(),
                colors = palette.len(),
                "topic domain is larger than the palette; extra topics have no color"
            );
        }
        let entries = domain
            .iter()
            .enumerate()
            .map(|(idx, topic)| TopicColor {
                topic: topic.clone(),
                color: palette.get(idx).map(|c| (*c).to_owned()),
            })
            .collect();
        Self { entries }
    }

    /// Domain of `table` bound to [`CATEGORY_COLORS`].
    #[must_use]
    pub fn for_dataset(table: &Dataset) -> Self {
        Self::new(&topic_domain(table), &CATEGORY_COLORS)
    }

    #[must_use]
    pub fn entries(&self) -> &[TopicColor] {
        &self.entries
    }

    /// Topics in draw order.
    pub fn domain(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.topic.as_str())
    }

    #[must_use]
    pub fn color_for(&self, topic: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.topic == topic)
            .and_then(|e| e.color.as_deref())
    }

    /// Position of `topic` in the domain.
    #[must_use]
    pub fn position(&self, topic: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.topic == topic)
    }

    /// Topics that did not get a palette entry.
    pub fn unmapped(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.color.is_none())
            .map(|e| e.topic.as_str())
    }
}
