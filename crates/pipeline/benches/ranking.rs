//! Benchmarks for feed ranking and short recommendations
//!
//! Run with: cargo bench --package pipeline
//!
//! Uses a synthetic catalog so the numbers don't depend on fixture files.

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{Item, UserId};
use pipeline::{FeatureEngineer, FeedKind, FeedRanker, ShortsRecommender};
use profile::ViewerContext;
use std::collections::HashSet;

fn synthetic_items(count: usize) -> Vec<Item> {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let mut item = Item::new(
                format!("item{i}"),
                format!("author{}", i % 50),
                now - Duration::hours((i % 400) as i64),
            );
            item.view_count = 1000 + (i as u64 * 37) % 5000;
            item.reaction_count = (i as u64 * 13) % 300;
            item.comment_count = (i as u64 * 7) % 40;
            item.share_count = (i as u64 * 3) % 25;
            item.hashtags = vec![format!("#tag{}", i % 20), format!("#tag{}", i % 7)];
            item.categories = vec![format!("cat{}", i % 6)];
            item.mood = Some(format!("mood{}", i % 4));
            item
        })
        .collect()
}

fn viewer_context(following: &HashSet<UserId>) -> ViewerContext {
    let mut context = ViewerContext::new("viewer");
    context.following = following.clone();
    context.profile.interests = vec!["tag1".into(), "tag3".into(), "tag5".into()];
    context.profile.preferred_moods = vec!["mood2".into()];
    context.recent_views = (0..50).map(|i| format!("item{}", i * 3)).collect();
    context
}

fn bench_rank_feed(c: &mut Criterion) {
    let items = synthetic_items(2_000);
    let following: HashSet<UserId> = (0..10).map(|i| format!("author{i}")).collect();
    let ranker = FeedRanker::new();

    c.bench_function("rank_ads_feed_2000", |b| {
        b.iter(|| {
            let feed = ranker.rank(
                black_box(&items),
                black_box(&following),
                "viewer",
                FeedKind::Ads.follow_ratio(),
            );
            black_box(feed)
        })
    });
}

fn bench_short_features(c: &mut Criterion) {
    let items = synthetic_items(2_000);
    let following: HashSet<UserId> = HashSet::new();
    let context = viewer_context(&following);
    let engineer = FeatureEngineer::new(Utc::now());

    c.bench_function("short_features_2000", |b| {
        b.iter(|| black_box(engineer.compute_features(black_box(&items), &context)))
    });
}

fn bench_recommend_shorts(c: &mut Criterion) {
    let items = synthetic_items(2_000);
    let following: HashSet<UserId> = (0..5).map(|i| format!("author{i}")).collect();
    let context = viewer_context(&following);
    let recommender = ShortsRecommender::new();

    c.bench_function("recommend_shorts_2000", |b| {
        b.iter(|| {
            let shorts = recommender.recommend(black_box(items.clone()), &context);
            black_box(shorts)
        })
    });
}

criterion_group!(
    benches,
    bench_rank_feed,
    bench_short_features,
    bench_recommend_shorts
);
criterion_main!(benches);
