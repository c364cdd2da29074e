//! Octorank CLI - batch entry points for the aggregation pipeline.

mod config;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use octorank::gate::{ApiRateLimiter, LiveRateGate};
use octorank::github::GithubClient;
use octorank::notify::{Notifier, NullNotifier, WebhookNotifier};
use octorank::streak::NullStreak;
use octorank::sync::{self, UpdateContext, UpdateOptions};
use octorank::{connect_and_migrate, store};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "octorank")]
#[command(version)]
#[command(about = "GitHub user activity aggregator and ranking engine")]
#[command(
    long_about = "Octorank tracks GitHub users: it aggregates their profile, organization, \
repository and language data into a local store and derives a composite score, rank and \
percentile tier for each tracked user."
)]
#[command(after_long_help = r#"EXAMPLES
    Update a single user:
        $ octorank update octocat

    Refresh everyone not updated for a week:
        $ octorank refresh

    Drain the deferred-work queue after a rate-limit window resets:
        $ octorank drain-queue

    Rebuild leaderboards and ranks:
        $ octorank rebuild-ranks

ENVIRONMENT VARIABLES
    OCTORANK_DATABASE_URL        Database connection string
    OCTORANK_GITHUB_TOKEN        GitHub personal access token
    OCTORANK_NOTIFY_WEBHOOK_URL  Webhook for lifecycle notifications
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Fetch and reconcile one user, then recompute their score
    Update {
        /// GitHub username to update
        username: String,
    },
    /// Refresh all users whose last update is at least a week old
    Refresh,
    /// Drain the deferred-work queue
    DrainQueue,
    /// Rebuild leaderboard snapshots and every user's rank/tier
    RebuildRanks,
    /// Permanently block a username from being tracked
    Block {
        /// GitHub username to block
        username: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("octorank=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load();

    let database_url = config
        .database_url()
        .ok_or("could not determine a database location")?;
    let db = connect_and_migrate(&database_url).await?;

    if let Commands::Migrate = cli.command {
        // connect_and_migrate already brought the schema up to date.
        println!("migrations applied");
        return Ok(());
    }

    if let Commands::Block { username } = &cli.command {
        store::users::block(&db, username).await?;
        println!("{} is now blocked", username);
        return Ok(());
    }

    if let Commands::RebuildRanks = cli.command {
        let notifier = build_notifier(&config);
        let updated = sync::batch::rebuild_rankings(&db, notifier.as_ref()).await?;
        println!("ranks recomputed for {} users", updated);
        return Ok(());
    }

    // The remaining commands all need the upstream client.
    let token = config
        .github
        .token
        .clone()
        .ok_or("a GitHub token is required (OCTORANK_GITHUB_TOKEN)")?;
    let mut client = GithubClient::new(&token)?;
    if config.update.requests_per_second > 0 {
        client = client.with_pacer(ApiRateLimiter::new(config.update.requests_per_second));
    }
    let gate = LiveRateGate::new(client.clone());
    let notifier = build_notifier(&config);
    let streak = NullStreak;

    let ctx = UpdateContext::new(&db, &client, &gate)
        .with_streak(&streak)
        .with_notifier(notifier.as_ref())
        .with_options(UpdateOptions {
            concurrency: config.update.concurrency,
            defer_on_exhaustion: true,
        });

    match cli.command {
        Commands::Update { username } => {
            let user = sync::update_user(&ctx, &username).await?;
            println!(
                "{}: score {} rank {} tier {}",
                user.username,
                user.total_score,
                user.current_rank
                    .map_or_else(|| "-".to_string(), |r| r.to_string()),
                user.tier
            );
        }
        Commands::Refresh => {
            let outcome = sync::batch::refresh_stale(&ctx).await?;
            report_batch("refresh", &outcome);
        }
        Commands::DrainQueue => {
            let outcome = sync::batch::drain_deferred(&ctx).await?;
            report_batch("drain-queue", &outcome);
        }
        Commands::Migrate | Commands::Block { .. } | Commands::RebuildRanks => unreachable!(),
    }

    Ok(())
}

fn build_notifier(config: &Config) -> Box<dyn Notifier> {
    match config.notify.webhook_url.as_deref() {
        Some(url) => Box::new(WebhookNotifier::new(url)),
        None => Box::new(NullNotifier),
    }
}

fn report_batch(job: &str, outcome: &octorank::sync::batch::BatchOutcome) {
    if outcome.aborted {
        println!(
            "{}: aborted on rate exhaustion after {}/{} users",
            job, outcome.updated, outcome.processed
        );
    } else {
        println!("{}: updated {}/{} users", job, outcome.updated, outcome.processed);
    }
}
