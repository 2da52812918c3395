use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{Item, ItemCatalog, ItemId, UserId};
use pipeline::FeedKind;
use server::{RecommendationOrchestrator, RelatedItem};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// feed-rank - Feed ranking and short-video recommendations
#[derive(Parser)]
#[command(name = "feed-rank")]
#[command(about = "Rank posts/ads feeds and recommend short videos from JSON fixtures", long_about = None)]
struct Cli {
    /// Directory holding items.json, follows.json and optionally interactions.json
    #[arg(short, long, default_value = "data/demo")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the posts/ads feed for a viewer
    Feed {
        /// Viewer to rank the feed for
        #[arg(long)]
        user_id: UserId,

        /// Named feed (ads, shipments); sets the follow ratio
        #[arg(long, default_value = "ads")]
        kind: FeedKind,

        /// Explicit share of followed authors, in (0, 1); overrides --kind
        #[arg(long)]
        follow_ratio: Option<f64>,

        /// Number of items to print
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Recommend short videos for a viewer
    Shorts {
        /// Viewer to recommend shorts for
        #[arg(long)]
        user_id: UserId,
    },

    /// Show a viewer's preference profile and recent activity
    Profile {
        /// Viewer to display
        #[arg(long)]
        user_id: UserId,
    },

    /// Find items similar to an item
    Similar {
        /// Item to compare against
        #[arg(long)]
        item_id: ItemId,

        /// Number of related items to return
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading fixtures from {}...", cli.data_dir.display());
    let start = Instant::now();
    let catalog = Arc::new(
        ItemCatalog::load_from_dir(&cli.data_dir).context("Failed to load feed fixtures")?,
    );
    let (items, viewers, interactions) = catalog.counts();
    println!(
        "{} Loaded {} items, {} viewers with follows, {} interactions in {:?}",
        "✓".green(),
        items,
        viewers,
        interactions,
        start.elapsed()
    );

    let orchestrator = RecommendationOrchestrator::from_catalog(catalog);

    match cli.command {
        Commands::Feed {
            user_id,
            kind,
            follow_ratio,
            limit,
        } => handle_feed(&orchestrator, &user_id, kind, follow_ratio, limit).await?,
        Commands::Shorts { user_id } => handle_shorts(&orchestrator, &user_id).await?,
        Commands::Profile { user_id } => handle_profile(&orchestrator, &user_id).await?,
        Commands::Similar { item_id, limit } => handle_similar(&orchestrator, &item_id, limit).await?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(orchestrator, requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'feed' command
async fn handle_feed(
    orchestrator: &RecommendationOrchestrator,
    user_id: &str,
    kind: FeedKind,
    follow_ratio: Option<f64>,
    limit: usize,
) -> Result<()> {
    let ratio = follow_ratio.unwrap_or_else(|| kind.follow_ratio());
    let feed = orchestrator.ranked_feed_with_ratio(user_id, ratio).await?;

    let following = orchestrator.catalog().following(user_id);
    let header = format!("Feed for {} (follow ratio {:.2}, {} items):", user_id, ratio, feed.len());
    println!("{}", header.bold().blue());
    for (rank, item) in feed.iter().take(limit).enumerate() {
        let marker = if following.contains(&item.author_id) {
            "★ followed".yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "{}. {} by {} [{}] {}",
            (rank + 1).to_string().green(),
            item.id,
            item.author_id,
            format_stats(item),
            marker
        );
    }
    Ok(())
}

/// Handle the 'shorts' command
async fn handle_shorts(orchestrator: &RecommendationOrchestrator, user_id: &str) -> Result<()> {
    let shorts = orchestrator.recommended_shorts(user_id).await?;

    println!("{}", format!("Shorts for {}:", user_id).bold().blue());
    if shorts.is_empty() {
        println!("  (nothing left to recommend)");
    }
    for (rank, item) in shorts.iter().enumerate() {
        println!(
            "{}. {} by {} {}",
            (rank + 1).to_string().green(),
            item.id,
            item.author_id,
            format_labels(&item.hashtags).cyan()
        );
    }
    Ok(())
}

/// Handle the 'profile' command
async fn handle_profile(orchestrator: &RecommendationOrchestrator, user_id: &str) -> Result<()> {
    let context = orchestrator.viewer_context(user_id).await?;
    if context.following.is_empty() && context.history.is_empty() {
        bail!("Viewer {} has no follows and no interactions", user_id);
    }

    println!("{}", format!("Viewer: {}", user_id).bold().blue());
    let mut following: Vec<&UserId> = context.following.iter().collect();
    following.sort();
    println!(
        "{}Follows {} authors: {}",
        "• ".green(),
        following.len(),
        following.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
    );
    println!("{}Top interests: {}", "• ".green(), format_labels(&context.profile.interests));
    println!("{}Preferred moods: {}", "• ".green(), context.profile.preferred_moods.join(", "));
    println!("{}Interactions: {}", "• ".cyan(), context.history.len());

    let completed = context.history.iter().filter(|p| p.record.completed).count();
    let liked = context.history.iter().filter(|p| p.record.liked).count();
    println!("{}Completed: {}, liked: {}", "• ".cyan(), completed, liked);

    println!("Recent views:");
    for item_id in context.recent_views.iter().take(10) {
        println!("  - {}", item_id);
    }
    Ok(())
}

/// Handle the 'similar' command
async fn handle_similar(
    orchestrator: &RecommendationOrchestrator,
    item_id: &str,
    limit: usize,
) -> Result<()> {
    let related = orchestrator.related_items(item_id, limit).await?;

    println!("{}", format!("Items similar to {}:", item_id).bold().blue());
    print_related(&related);
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    orchestrator: RecommendationOrchestrator,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    let viewers = orchestrator.catalog().viewers();
    if viewers.is_empty() {
        return Err(anyhow!("No viewers in the fixtures to benchmark with"));
    }
    if requests == 0 {
        bail!("--requests must be at least 1");
    }

    let user_ids: Vec<UserId> = (0..requests)
        .map(|_| viewers[rand::random::<u32>() as usize % viewers.len()].clone())
        .collect();

    info!(
        "Benchmarking {} requests across {} viewers, {} at a time",
        requests,
        viewers.len(),
        concurrent
    );

    // even requests rank the ads feed, odd ones recommend shorts
    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();
    let mut handles = vec![];
    for (n, user) in user_ids.into_iter().enumerate() {
        let orchestrator = orchestrator.clone();
        let permits = permits.clone();
        let handle = tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let start = Instant::now();
            if n % 2 == 0 {
                orchestrator.ranked_feed(&user, FeedKind::Ads).await?;
            } else {
                orchestrator.recommended_shorts(&user).await?;
            }
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    let mut timings: Vec<Duration> = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let total_time = wall_clock.elapsed();

    let summed: Duration = timings.iter().sum();
    let avg_latency = summed / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

fn print_related(related: &[RelatedItem]) {
    for (rank, r) in related.iter().enumerate() {
        println!(
            "{}. {} by {} {} - Similarity: {:.1}",
            (rank + 1).to_string().green(),
            r.item.id,
            r.item.author_id,
            format_labels(&r.item.hashtags).cyan(),
            r.similarity
        );
    }
}

fn format_stats(item: &Item) -> String {
    format!(
        "{} reactions, {} comments, {} shares",
        item.reaction_count, item.comment_count, item.share_count
    )
}

fn format_labels(labels: &[String]) -> String {
    labels
        .iter()
        .map(|l| format!("#{}", l.trim_start_matches('#')))
        .collect::<Vec<_>>()
        .join(" ")
}
