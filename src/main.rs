//! Wanderer - Story-Driven Walking Tours
//!
//! Command line entry point: plan a walk, simulate walking it, or check
//! provider status.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wanderer::config::{self, AppConfig};
use wanderer::location::{self, ReplayPositionSource};
use wanderer::narration::LoggingNarrator;
use wanderer::services::ProviderStatus;
use wanderer::session::{SessionEvent, SessionUpdate, WalkPlan, WalkSession};
use wanderer::story::NarrationCue;
use wanderer::{Coordinate, Genre, Route, Services, Story};

#[derive(Debug, Parser)]
#[command(name = "wanderer", version)]
#[command(about = "Story-driven walking tours")]
struct Cli {
    /// Config file (defaults to the platform data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute the route and story for a walk
    Plan {
        #[command(flatten)]
        walk: WalkArgs,

        /// Print JSON instead of a readable overview
        #[arg(long)]
        json: bool,
    },
    /// Walk the planned route with a simulated position feed
    Simulate {
        #[command(flatten)]
        walk: WalkArgs,

        /// Meters between simulated positions
        #[arg(long, default_value_t = 10.0)]
        step: f64,

        /// Emit positions at the tracking interval instead of all at once
        #[arg(long)]
        paced: bool,

        /// Index of the choice taken at every branch
        #[arg(long, default_value_t = 0)]
        choice: usize,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which providers are enabled, have keys and are ready
    Status {
        /// Also test the story provider connection
        #[arg(long)]
        check: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write a configuration file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
struct WalkArgs {
    /// Starting position as "lat,lon"
    #[arg(long)]
    start: Coordinate,

    /// Checkpoint as "lat,lon"; repeat in walking order
    #[arg(long = "checkpoint", required = true)]
    checkpoints: Vec<Coordinate>,

    /// Story genre (adventure, mystery, fantasy, historical, comedy, romance, sci-fi, horror)
    #[arg(long)]
    genre: Option<String>,

    /// Return to the start after the last checkpoint
    #[arg(long = "loop")]
    is_loop: bool,
}

impl WalkArgs {
    fn plan(&self, config: &AppConfig) -> WalkPlan {
        let genre = self
            .genre
            .as_deref()
            .map(Genre::from_name)
            .unwrap_or(config.walking.default_genre);

        let mut plan = WalkPlan::new(genre)
            .looped(self.is_loop)
            .with_trigger_radius(config.walking.trigger_radius_m)
            .with_speech_rate(config.narration.rate);
        for coordinate in &self.checkpoints {
            plan.add_checkpoint(*coordinate);
        }
        plan
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    tracing::info!("Starting Wanderer v{}", env!("CARGO_PKG_VERSION"));

    if let Command::Init { force } = cli.command {
        return init(cli.config.as_deref(), force);
    }

    let config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
    .context("Failed to load configuration")?;
    let services = Services::from_config(&config);

    match cli.command {
        Command::Plan { walk, json } => plan(&services, &config, &walk, json).await,
        Command::Simulate {
            walk,
            step,
            paced,
            choice,
            json,
        } => simulate(&services, &config, &walk, step, paced, choice, json).await,
        Command::Status { check, json } => status(&services, check, json).await,
        Command::Init { .. } => Ok(()),
    }
}

fn init(path: Option<&Path>, force: bool) -> Result<()> {
    let target = path.map(Path::to_path_buf).unwrap_or_else(config::get_config_path);
    if target.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", target.display());
    }

    let defaults = AppConfig::default();
    match path {
        Some(path) => config::save_config_to(&defaults, path),
        None => config::save_config(&defaults),
    }
    .context("Failed to write configuration")?;

    println!("Wrote {}", target.display());
    Ok(())
}

#[derive(Serialize)]
struct StatusOutput {
    providers: Vec<ProviderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    story_connection: Option<String>,
}

async fn status(services: &Services, check: bool, json: bool) -> Result<()> {
    let providers = services.status().await;
    let story_connection = if check {
        Some(match services.check_story_connection().await {
            None => "disabled".to_string(),
            Some(Ok(())) => "ok".to_string(),
            Some(Err(e)) => e.to_string(),
        })
    } else {
        None
    };

    if json {
        let out = StatusOutput {
            providers,
            story_connection,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for p in &providers {
        println!(
            "{:<17} {:<8} keys {}/{} ({} remaining)",
            p.provider.display_name(),
            if p.ready {
                "ready"
            } else if p.enabled {
                "no keys"
            } else {
                "disabled"
            },
            p.stats.current,
            p.stats.total,
            p.stats.remaining
        );
    }
    if let Some(result) = story_connection {
        println!("Story connection: {}", result);
    }
    Ok(())
}

#[derive(Serialize)]
struct PlanOutput<'a> {
    plan: &'a WalkPlan,
    route: &'a Route,
    story: &'a Story,
}

async fn plan(services: &Services, config: &AppConfig, walk: &WalkArgs, json: bool) -> Result<()> {
    let plan = walk.plan(config);
    let route = services.plan_route(&plan, walk.start).await?;
    let story = services.generate_story(&plan, Some(&route)).await;

    if json {
        let out = PlanOutput {
            plan: &plan,
            route: &route,
            story: &story,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "Route ({:?}): {:.0} m, ~{} min, {} steps",
        route.source(),
        route.distance(),
        plan.estimated_minutes(Some(&route)),
        route.steps().len()
    );
    for step in route.steps() {
        println!("  - {} ({:.0} m)", step.instruction, step.distance);
    }
    println!("Story: {} [{}]", story.title, story.genre);
    for (i, segment) in story.segments.iter().enumerate() {
        let title = segment.title.as_deref().unwrap_or("");
        println!("  {}. {} ({} s, {} choice(s))", i + 1, title, segment.duration_s, segment.choices.len());
    }
    Ok(())
}

async fn simulate(
    services: &Services,
    config: &AppConfig,
    walk: &WalkArgs,
    step: f64,
    paced: bool,
    choice: usize,
    json: bool,
) -> Result<()> {
    let plan = walk.plan(config);
    let route = services.plan_route(&plan, walk.start).await?;

    let mut source = ReplayPositionSource::new(location::walk_along(&route, step));
    if paced {
        source = source.paced();
    }
    let narrator = Arc::new(LoggingNarrator::new());
    let speech = config.narration.clone().with_rate(plan.speech_rate);

    let mut session = WalkSession::start_with(
        &plan,
        route,
        Box::new(source),
        narrator.clone(),
        config.tracking_options(),
    )?
    .with_speech(speech);

    let story = services.generate_story(&plan, Some(session.route())).await;
    let (control, events) = crossbeam::channel::unbounded();
    control
        .send(SessionEvent::StoryReady(story))
        .context("Session control channel closed")?;

    // Narration is instantaneous here, and every branch takes the same choice index
    let summary = session.run(events, |update| match update {
        SessionUpdate::CheckpointReached(reached) => {
            println!("Reached {} ({:.0} m away)", reached.title, reached.distance);
        }
        SessionUpdate::Cue(NarrationCue::Speak { segment_index, .. }) => {
            println!("Narrating segment {}", segment_index + 1);
            let _ = control.send(SessionEvent::NarrationDone);
        }
        SessionUpdate::Cue(NarrationCue::PresentChoices { choices, .. }) => {
            if let Some(picked) = choices.get(choice.min(choices.len().saturating_sub(1))) {
                println!("Choosing: {}", picked.text);
                let _ = control.send(SessionEvent::ChoiceSelected(picked.id.clone()));
            }
        }
        SessionUpdate::Progress(progress) => {
            tracing::debug!("{:.1}% done, {:.0} m left", progress.percent, progress.remaining_distance);
        }
        SessionUpdate::Cue(_) | SessionUpdate::Completed(_) => {}
    });

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{}: {} in {}, {}/{} checkpoints, {} choice(s), {} segment(s) narrated",
            if summary.completed { "Completed" } else { "Stopped" },
            summary.formatted_distance(),
            summary.formatted_time(),
            summary.checkpoints_completed,
            summary.checkpoints_total,
            summary.story_choices_made.len(),
            narrator.transcript().len()
        );
    }
    Ok(())
}
