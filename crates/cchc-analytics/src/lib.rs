//! Filtering and aggregation for the CCHC topic dashboard.
//!
//! Applies the mandatory exclusions and the cascading region → comuna →
//! topic selections to a loaded [`cchc_core::Dataset`], computes distinct
//! message counts and renormalized relevance shares per topic and
//! sub-topic, and binds topics to the fixed palette for bar charts.

pub mod aggregate;
pub mod chart;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod palette;

pub use aggregate::{
    subtopic_counts, subtopic_relevance, topic_counts, SubtopicCount, SubtopicShare, TopicCount,
};
pub use chart::{build_chart, Bar, BarChart, ChartRecord, ValueFormat};
pub use dashboard::{build_dashboard, Dashboard, DashboardModel, FilterOptions, Panel, SubtopicDetail};
pub use error::{AggregateView, AnalyticsError};
pub use filter::{
    apply_filters, available_comunas, available_regions, available_topics, filter_base,
    is_eligible,
};
pub use palette::{topic_domain, ColorScale, TopicColor, CATEGORY_COLORS};
