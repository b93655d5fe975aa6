//! Renders one subcommand against a loaded dataset as pretty JSON.

use cchc_analytics::{
    apply_filters, build_chart, subtopic_counts, subtopic_relevance, topic_counts,
    AnalyticsError, BarChart, DashboardModel, ValueFormat,
};
use serde::Serialize;

use crate::Commands;

/// Returns the text to print for `command`.
///
/// An empty single aggregate renders as a one-line notice rather than an
/// error, so a narrow selection still exits cleanly.
///
/// # Errors
///
/// Returns an error if the output cannot be serialized.
pub(crate) fn render(model: &DashboardModel, command: &Commands) -> anyhow::Result<String> {
    match command {
        Commands::Options { selection } => to_json(&model.options(&selection.to_selection())),
        Commands::Topics { selection } => {
            let selection = selection.to_selection().without_topics();
            chart_or_notice(
                topic_counts(&apply_filters(model.dataset(), &selection))
                    .map(|counts| build_chart(&counts, model.scale(), ValueFormat::Count)),
            )
        }
        Commands::Subtopics { selection } => chart_or_notice(
            subtopic_counts(&apply_filters(model.dataset(), &selection.to_selection()))
                .map(|counts| build_chart(&counts, model.scale(), ValueFormat::Count)),
        ),
        Commands::Relevance { selection } => chart_or_notice(
            subtopic_relevance(&apply_filters(model.dataset(), &selection.to_selection()))
                .map(|shares| build_chart(&shares, model.scale(), ValueFormat::Percent)),
        ),
        Commands::Domain => to_json(&model.scale().entries()),
        Commands::Dashboard { selection } => to_json(&model.dashboard(&selection.to_selection())),
    }
}

fn chart_or_notice(result: Result<BarChart, AnalyticsError>) -> anyhow::Result<String> {
    match result {
        Ok(chart) => to_json(&chart),
        Err(e) => {
            tracing::info!(error = %e, "empty aggregate");
            Ok(e.to_string())
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
