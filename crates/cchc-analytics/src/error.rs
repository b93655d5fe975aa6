use serde::Serialize;
use thiserror::Error;

/// Which aggregate came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateView {
    TopicCounts,
    SubtopicCounts,
    SubtopicRelevance,
}

impl std::fmt::Display for AggregateView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateView::TopicCounts => write!(f, "topic counts"),
            AggregateView::SubtopicCounts => write!(f, "sub-topic counts"),
            AggregateView::SubtopicRelevance => write!(f, "sub-topic relevance"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    /// No eligible rows, or a zero share total, under the current selection.
    #[error("no data for this selection ({view})")]
    EmptyAggregate { view: AggregateView },
}
