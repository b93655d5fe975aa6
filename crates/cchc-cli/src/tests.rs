use std::sync::Arc;

use cchc_analytics::DashboardModel;
use cchc_core::{Dataset, MessageId, MessageRow};

use super::*;

fn row(region: &str, comuna: &str, cat2: &str, cat3: &str, msg_id: &str, pct: f64) -> MessageRow {
    MessageRow {
        sender: Some(false),
        msg_id: Some(MessageId::from(msg_id)),
        region: Some(region.to_string()),
        comuna: Some(comuna.to_string()),
        cat2: Some(cat2.to_string()),
        cat3: Some(cat3.to_string()),
        percentage: pct,
    }
}

fn model() -> DashboardModel {
    DashboardModel::new(Arc::new(Dataset::new(vec![
        row("A", "X", "T1", "S1", "1", 0.3),
        row("A", "X", "T1", "S2", "2", 0.1),
        row("B", "Y", "T2", "S3", "3", 0.6),
    ])))
}

fn render_json(command: &Commands) -> serde_json::Value {
    let text = report::render(&model(), command).expect("render");
    serde_json::from_str(&text).expect("json output")
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["cchc-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_domain_command() {
    let cli = Cli::try_parse_from(["cchc-cli", "domain"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Domain)));
}

#[test]
fn repeated_region_flags_collect() {
    let cli = Cli::try_parse_from([
        "cchc-cli", "relevance", "--region", "A", "--region", "B", "--topic", "T1",
    ])
    .expect("expected valid cli args");
    match cli.command {
        Some(Commands::Relevance { selection }) => {
            assert_eq!(selection.regions, vec!["A", "B"]);
            assert!(selection.comunas.is_empty());
            assert_eq!(selection.topics, vec!["T1"]);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn blank_flag_values_are_dropped() {
    let args = SelectionArgs {
        regions: vec![" ".to_string(), "A".to_string()],
        ..SelectionArgs::default()
    };
    let selection = args.to_selection();
    assert_eq!(selection.regions.len(), 1);
    assert!(selection.regions.contains("A"));
}

#[test]
fn topics_render_as_count_chart() {
    let json = render_json(&Commands::Topics {
        selection: SelectionArgs::default(),
    });
    assert_eq!(json["pattern"], ".0f");
    assert_eq!(json["bars"][0]["label"], "T1");
    assert_eq!(json["bars"][0]["value"], 2.0);
}

#[test]
fn relevance_renders_shares_for_region() {
    let json = render_json(&Commands::Relevance {
        selection: SelectionArgs {
            regions: vec!["A".to_string()],
            ..SelectionArgs::default()
        },
    });
    let share = json["bars"][0]["value"].as_f64().expect("share");
    assert!((share - 0.75).abs() < 1e-9);
}

#[test]
fn empty_aggregate_renders_notice() {
    let text = report::render(
        &model(),
        &Commands::Subtopics {
            selection: SelectionArgs {
                regions: vec!["Z".to_string()],
                ..SelectionArgs::default()
            },
        },
    )
    .expect("render");
    assert!(text.starts_with("no data for this selection"), "got {text}");
}

#[test]
fn dashboard_without_location_omits_detail() {
    let json = render_json(&Commands::Dashboard {
        selection: SelectionArgs::default(),
    });
    assert_eq!(json["topics"]["status"], "ready");
    assert!(json["subtopics"].is_null());
}
