//! One recomputation pass of the dashboard for a filter selection.
//!
//! Empty aggregates degrade to [`Panel::Empty`] so the caller can render a
//! "no data" state while keeping the analyst's selection.

use std::sync::Arc;

use cchc_core::{Dataset, FilterSelection};
use serde::Serialize;

use crate::aggregate::{subtopic_counts, subtopic_relevance, topic_counts};
use crate::chart::{build_chart, BarChart, ValueFormat};
use crate::error::{AggregateView, AnalyticsError};
use crate::filter::{apply_filters, available_comunas, available_regions, available_topics};
use crate::palette::{ColorScale, TopicColor};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Panel<T> {
    Ready { data: T },
    Empty { view: AggregateView, message: String },
}

impl<T> Panel<T> {
    #[must_use]
    pub fn from_result(result: Result<T, AnalyticsError>) -> Self {
        match result {
            Ok(data) => Panel::Ready { data },
            Err(err) => {
                let AnalyticsError::EmptyAggregate { view } = err;
                tracing::info!(%view, "aggregate empty for selection");
                Panel::Empty {
                    view,
                    message: err.to_string(),
                }
            }
        }
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match self {
            Panel::Ready { data } => Some(data),
            Panel::Empty { .. } => None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Panel::Empty { .. })
    }
}

/// Choices offered to the analyst for the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub regions: Vec<String>,
    /// Constrained by the selected regions.
    pub comunas: Vec<String>,
    pub topics: Vec<String>,
}

impl FilterOptions {
    #[must_use]
    pub fn for_selection(table: &Dataset, selection: &FilterSelection) -> Self {
        Self {
            regions: available_regions(table),
            comunas: available_comunas(table, &selection.regions),
            topics: available_topics(table),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtopicDetail {
    pub relevance: Panel<BarChart>,
    pub counts: Panel<BarChart>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub selection: FilterSelection,
    pub options: FilterOptions,
    pub domain: Vec<TopicColor>,
    /// Distinct messages per topic for the selected location.
    pub topics: Panel<BarChart>,
    /// Present only once a region or comuna is selected.
    pub subtopics: Option<SubtopicDetail>,
}

/// Computes every panel for `selection` from the full `table`.
///
/// `scale` must come from the same full table (see
/// [`ColorScale::for_dataset`]). The topic panel ignores the topic level of
/// the selection; the sub-topic panels honor it.
#[must_use]
pub fn build_dashboard(table: &Dataset, scale: &ColorScale, selection: &FilterSelection) -> Dashboard {
    let located = apply_filters(table, &selection.without_topics());
    let topics = Panel::from_result(
        topic_counts(&located).map(|counts| build_chart(&counts, scale, ValueFormat::Count)),
    );

    let subtopics = selection.has_location().then(|| {
        let detailed = apply_filters(table, selection);
        SubtopicDetail {
            relevance: Panel::from_result(
                subtopic_relevance(&detailed)
                    .map(|shares| build_chart(&shares, scale, ValueFormat::Percent)),
            ),
            counts: Panel::from_result(
                subtopic_counts(&detailed)
                    .map(|counts| build_chart(&counts, scale, ValueFormat::Count)),
            ),
        }
    });

    Dashboard {
        selection: selection.clone(),
        options: FilterOptions::for_selection(table, selection),
        domain: scale.entries().to_vec(),
        topics,
        subtopics,
    }
}

/// A loaded dataset together with the color scale derived from it.
///
/// Built once per load; every selection change reuses the same scale.
#[derive(Debug, Clone)]
pub struct DashboardModel {
    dataset: Arc<Dataset>,
    scale: ColorScale,
}

impl DashboardModel {
    #[must_use]
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let scale = ColorScale::for_dataset(&dataset);
        Self { dataset, scale }
    }

    #[must_use]
    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    #[must_use]
    pub fn scale(&self) -> &ColorScale {
        &self.scale
    }

    #[must_use]
    pub fn options(&self, selection: &FilterSelection) -> FilterOptions {
        FilterOptions::for_selection(&self.dataset, selection)
    }

    #[must_use]
    pub fn dashboard(&self, selection: &FilterSelection) -> Dashboard {
        build_dashboard(&self.dataset, &self.scale, selection)
    }
}

#[cfg(test)]
mod tests {
    use cchc_core::{MessageId, MessageRow};

    use super::*;

    fn row(region: &str, comuna: &str, cat2: &str, cat3: &str, msg_id: &str, pct: f64) -> MessageRow {
        MessageRow {
            sender: Some(false),
            msg_id: Some(MessageId::from(msg_id)),
            region: Some(region.to_owned()),
            comuna: Some(comuna.to_owned()),
            cat2: Some(cat2.to_owned()),
            cat3: Some(cat3.to_owned()),
            percentage: pct,
        }
    }

    fn model() -> DashboardModel {
        DashboardModel::new(Arc::new(Dataset::new(vec![
            row("A", "X", "T1", "S1", "1", 0.3),
            row("A", "X", "T1", "S2", "2", 0.1),
            row("B", "Y", "T2", "S3", "3", 0.6),
            row("B", "Y", "Otros", "S4", "4", 0.9),
        ])))
    }

    #[test]
    fn no_location_shows_topic_overview_only() {
        let dashboard = model().dashboard(&FilterSelection::new());
        assert!(dashboard.subtopics.is_none());
        let chart = dashboard.topics.data().expect("topic panel ready");
        let labels: Vec<&str> = chart.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["T1", "T2"]);
    }

    #[test]
    fn region_selection_adds_subtopic_detail() {
        let dashboard = model().dashboard(&FilterSelection::new().with_regions(["A"]));
        let detail = dashboard.subtopics.expect("detail present");
        let relevance = detail.relevance.data().expect("relevance ready");
        assert_eq!(relevance.bars[0].label, "S1");
        assert!((relevance.bars[0].value - 0.75).abs() < 1e-9);
        assert_eq!(detail.counts.data().expect("counts ready").bars.len(), 2);
    }

    #[test]
    fn topic_level_only_narrows_subtopic_panels() {
        let selection = FilterSelection::new()
            .with_regions(["A", "B"])
            .with_topics(["T2"]);
        let dashboard = model().dashboard(&selection);
        assert_eq!(dashboard.topics.data().expect("topics").bars.len(), 2);
        let detail = dashboard.subtopics.expect("detail");
        let counts = detail.counts.data().expect("counts");
        assert_eq!(counts.bars.len(), 1);
        assert_eq!(counts.bars[0].topic, "T2");
    }

    #[test]
    fn unmatched_location_degrades_to_empty_panels() {
        let selection = FilterSelection::new().with_regions(["A"]).with_comunas(["Y"]);
        let dashboard = model().dashboard(&selection);
        assert!(dashboard.topics.is_empty());
        let detail = dashboard.subtopics.expect("detail");
        assert!(detail.relevance.is_empty());
        assert!(detail.counts.is_empty());
        assert_eq!(dashboard.selection, selection, "selection is kept");
    }

    #[test]
    fn domain_is_stable_across_selections() {
        let model = model();
        let everything = model.dashboard(&FilterSelection::new());
        let narrowed = model.dashboard(&FilterSelection::new().with_regions(["B"]));
        assert_eq!(everything.domain, narrowed.domain);
        assert_eq!(
            everything.domain.iter().map(|e| e.topic.as_str()).collect::<Vec<_>>(),
            vec!["Otros", "T1", "T2"]
        );
    }

    #[test]
    fn excluded_topic_is_neither_option_nor_bar() {
        let model = model();
        let selection = FilterSelection::new().with_regions(["B"]).with_topics(["Otros"]);
        let dashboard = model.dashboard(&selection);
        assert!(!dashboard.options.topics.iter().any(|t| t == "Otros"));
        let detail = dashboard.subtopics.expect("detail");
        assert!(detail.counts.is_empty());
        let topics = dashboard.topics.data().expect("topics");
        assert!(topics.bars.iter().all(|b| b.topic != "Otros"));
    }

    #[test]
    fn comuna_options_follow_region() {
        let options = model().options(&FilterSelection::new().with_regions(["B"]));
        assert_eq!(options.regions, vec!["A", "B"]);
        assert_eq!(options.comunas, vec!["Y"]);
    }

    #[test]
    fn empty_panel_serializes_with_status_tag() {
        let panel: Panel<BarChart> = Panel::from_result(Err(AnalyticsError::EmptyAggregate {
            view: AggregateView::SubtopicRelevance,
        }));
        let json = serde_json::to_value(&panel).expect("serialize");
        assert_eq!(json["status"], "empty");
        assert_eq!(json["view"], "subtopic_relevance");
    }
}
