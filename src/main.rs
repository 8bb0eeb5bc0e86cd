use anyhow::{Context, Result, ensure};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use epicmap::config::TrackerSettings;
use epicmap::diagram::{StoryGraph, build_story_graph, mermaid::mermaid_source};
use epicmap::studio::run_studio;
use epicmap::tracker::{Epic, TrackerClient};

#[derive(Debug, Parser)]
#[command(name = "epicmap", about = "Interactive diagram of a Pivotal Tracker epic")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the epic's diagram as mermaid source.
    Text {
        /// The epic label in Pivotal Tracker.
        #[arg(short, long)]
        epic: String,
    },
    /// Open the epic's diagram in the interactive studio.
    Studio {
        /// The epic label in Pivotal Tracker.
        #[arg(short, long)]
        epic: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let settings = TrackerSettings::from_env().context("failed to load configuration")?;
    let client = TrackerClient::new(settings);

    match cli.command {
        Commands::Text { epic } => {
            let (_, graph) = fetch_epic_graph(&client, &epic).await?;
            println!("{}", mermaid_source(&graph));
        }
        Commands::Studio { epic } => {
            let (epic_record, graph) = fetch_epic_graph(&client, &epic).await?;
            run_studio(&epic_record, graph)?;
        }
    }

    Ok(())
}

async fn fetch_epic_graph(client: &TrackerClient, label: &str) -> Result<(Epic, StoryGraph)> {
    info!(label, "fetching epic from tracker");
    let mut epics = client
        .epics_with_label(label)
        .await
        .context("failed to fetch epics")?;

    // This fetch mostly functions as a "does this epic exist" check.
    ensure!(!epics.is_empty(), "could not find epic matching label `{label}`");
    ensure!(
        epics.len() == 1,
        "found more than one epic matching label `{label}`"
    );
    let epic_record = epics.remove(0);

    info!(label, "fetching stories from tracker");
    let mut stories = client
        .stories_with_label(label)
        .await
        .context("failed to fetch stories")?;

    info!(count = stories.len(), "fetching blockers and labels for each story");
    for story in &mut stories {
        story.blockers = Some(
            client
                .blockers_for_story(story.id)
                .await
                .with_context(|| format!("failed to fetch blockers for story {}", story.id))?,
        );
        story.labels = Some(
            client
                .labels_for_story(story.id)
                .await
                .with_context(|| format!("failed to fetch labels for story {}", story.id))?,
        );
    }

    let graph = build_story_graph(&stories);
    Ok((epic_record, graph))
}

fn init_tracing() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,epicmap=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}
