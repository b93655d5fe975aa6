mod report;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cchc_core::FilterSelection;

#[derive(Debug, Parser)]
#[command(name = "cchc-cli")]
#[command(about = "CCHC topic dashboard command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Repeatable location and topic selections. Omitting a flag leaves that
/// level unconstrained.
#[derive(Debug, Default, Args)]
pub(crate) struct SelectionArgs {
    /// Region to include (repeatable)
    #[arg(long = "region", value_name = "REGION")]
    pub regions: Vec<String>,

    /// Comuna to include (repeatable)
    #[arg(long = "comuna", value_name = "COMUNA")]
    pub comunas: Vec<String>,

    /// Topic (cat2) to include (repeatable)
    #[arg(long = "topic", value_name = "TOPIC")]
    pub topics: Vec<String>,
}

impl SelectionArgs {
    pub(crate) fn to_selection(&self) -> FilterSelection {
        let keep = |values: &[String]| -> Vec<String> {
            values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
                .collect()
        };
        FilterSelection::new()
            .with_regions(keep(&self.regions))
            .with_comunas(keep(&self.comunas))
            .with_topics(keep(&self.topics))
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// List region, comuna and topic choices
    Options {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Distinct messages per topic
    Topics {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Distinct messages per sub-topic
    Subtopics {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Renormalized percentage share per sub-topic
    Relevance {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Topic color domain of the full dataset
    Domain,
    /// Every dashboard panel for a selection
    Dashboard {
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = cchc_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("cchc-cli: pass a subcommand, see --help");
        return Ok(());
    };

    let source = cchc_source::DataSource::from_config(&config)?;
    let dataset = source.load().await?;
    let model = cchc_analytics::DashboardModel::new(dataset);

    println!("{}", report::render(&model, &command)?);
    Ok(())
}

#[cfg(test)]
mod tests;
