//! Bar-chart series for the presentation layer.
//!
//! The color scale is passed in explicitly: a chart never looks up the topic
//! domain on its own.

use serde::Serialize;

use crate::aggregate::{SubtopicCount, SubtopicShare, TopicCount};
use crate::palette::ColorScale;

/// How bar values are labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    /// Whole numbers.
    Count,
    /// Percent with two decimals.
    Percent,
}

impl ValueFormat {
    /// d3-format pattern understood by the charting front end.
    #[must_use]
    pub fn pattern(self) -> &'static str {
        match self {
            ValueFormat::Count => ".0f",
            ValueFormat::Percent => ".2%",
        }
    }
}

/// One aggregate record as a chart sees it.
pub trait ChartRecord {
    /// Category axis label.
    fn label(&self) -> &str;
    /// Topic used for coloring.
    fn topic(&self) -> &str;
    fn value(&self) -> f64;
}

impl ChartRecord for TopicCount {
    fn label(&self) -> &str {
        &self.topic
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    #[allow(clippy::cast_precision_loss)]
    fn value(&self) -> f64 {
        self.count as f64
    }
}

impl ChartRecord for SubtopicCount {
    fn label(&self) -> &str {
        &self.subtopic
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    #[allow(clippy::cast_precision_loss)]
    fn value(&self) -> f64 {
        self.count as f64
    }
}

impl ChartRecord for SubtopicShare {
    fn label(&self) -> &str {
        &self.subtopic
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    fn value(&self) -> f64 {
        self.share
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub topic: String,
    pub value: f64,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub format: ValueFormat,
    pub pattern: &'static str,
    pub bars: Vec<Bar>,
}

/// Builds a chart with bars sorted by value descending, ties by label then
/// by the topic's position in the domain, each colored through `scale`.
#[must_use]
pub fn build_chart<R: ChartRecord>(records: &[R], scale: &ColorScale, format: ValueFormat) -> BarChart {
    let mut bars: Vec<Bar> = records
        .iter()
        .map(|record| Bar {
            label: record.label().to_owned(),
            topic: record.topic().to_owned(),
            value: record.value(),
            color: scale.color_for(record.topic()).map(str::to_owned),
        })
        .collect();

    bars.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then_with(|| a.label.cmp(&b.label))
            .then_with(|| scale.position(&a.topic).cmp(&scale.position(&b.topic)))
    });

    BarChart {
        format,
        pattern: format.pattern(),
        bars,
    }
}
