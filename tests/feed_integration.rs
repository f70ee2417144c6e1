//! Token Feed Integration Tests
//!
//! End-to-end checks through the public API:
//! 1. Column lifecycle: loading -> live -> disposed
//! 2. Filter and sort over a live column
//! 3. Flash timing and drift invariants under the running feed
//! 4. Dashboard fault isolation with the terminal renderer
//!
//! All tests run on a paused tokio clock with seeded feeds.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use token_feed::adapters::cli::render_column;
use token_feed::adapters::simulated_feed::{FeedConfig, FeedEvent, FeedPhase};
use token_feed::application::{create_column, create_column_with_rng, Dashboard, Panel};
use token_feed::config::parse_config;
use token_feed::domain::{ColumnKind, SortField, SortOrder, UpdateDirection};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Feed with a long fixed tick so flash windows never overlap a new cycle
fn slow_tick_config() -> FeedConfig {
    FeedConfig {
        tick_min: Duration::from_secs(5),
        tick_max: Duration::from_secs(5),
        ..FeedConfig::default()
    }
}

// ============================================================================
// Column lifecycle
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_column_loads_fifteen_unique_tokens() {
    let column = create_column(ColumnKind::NewPairs, &FeedConfig::default());
    assert!(column.snapshot().await.loading);

    assert!(column.wait_until_loaded().await);
    let snapshot = column.snapshot().await;

    assert!(!snapshot.loading);
    assert_eq!(snapshot.tokens.len(), 15);
    let ids: HashSet<&str> = snapshot.tokens.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids.len(), 15);
    assert!(snapshot
        .tokens
        .iter()
        .all(|t| t.last_update_direction == UpdateDirection::None));
}

#[tokio::test(start_paused = true)]
async fn test_dispose_mid_cycle_freezes_column() {
    let mut column =
        create_column_with_rng(ColumnKind::Migrated, &FeedConfig::default(), StdRng::seed_from_u64(11));
    column.wait_until_loaded().await;
    tokio::time::sleep(Duration::from_millis(1_200)).await;

    column.dispose().await;
    let frozen = column.snapshot().await.tokens;

    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(column.phase().await, FeedPhase::Stopped);
    assert_eq!(column.snapshot().await.tokens, frozen);
}

// ============================================================================
// Filter and sort
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_filter_and_sort_toggle() {
    let mut column =
        create_column_with_rng(ColumnKind::NewPairs, &slow_tick_config(), StdRng::seed_from_u64(3));
    column.wait_until_loaded().await;

    column.set_filter_text("WIF");
    let view = column.view().await;

    // WIF sits at list positions 0 and 14
    assert_eq!(view.tokens.len(), 2);
    assert!(view.tokens.iter().all(|t| t.symbol == "WIF"));
    assert_eq!(view.sort.field, SortField::MarketCap);
    assert_eq!(view.sort.order, SortOrder::Desc);
    assert!(view.tokens[0].market_cap >= view.tokens[1].market_cap);

    column.set_sort_field(SortField::MarketCap);
    let view = column.view().await;
    assert_eq!(view.sort.order, SortOrder::Asc);
    assert!(view.tokens[0].market_cap <= view.tokens[1].market_cap);

    column.set_filter_text("");
    let view = column.view().await;
    assert_eq!(view.tokens.len(), 15);
    assert!(view
        .tokens
        .windows(2)
        .all(|w| w[0].market_cap <= w[1].market_cap));
}

// ============================================================================
// Feed behaviour
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_flash_clears_after_800ms() {
    let column =
        create_column_with_rng(ColumnKind::NewPairs, &slow_tick_config(), StdRng::seed_from_u64(5));
    let mut events = column.subscribe();

    let ids = loop {
        match events.recv().await {
            Ok(FeedEvent::Mutated { ids }) => break ids,
            Ok(_) => continue,
            Err(e) => panic!("feed closed: {}", e),
        }
    };

    let direction = |tokens: &[token_feed::domain::Token], id: &str| {
        tokens
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.last_update_direction)
    };

    let tokens = column.snapshot().await.tokens;
    assert!(direction(&tokens, &ids[0]).is_some_and(|d| d.is_flashing()));

    tokio::time::sleep(Duration::from_millis(799)).await;
    let tokens = column.snapshot().await.tokens;
    assert!(direction(&tokens, &ids[0]).is_some_and(|d| d.is_flashing()));

    tokio::time::sleep(Duration::from_millis(2)).await;
    let tokens = column.snapshot().await.tokens;
    assert_eq!(direction(&tokens, &ids[0]), Some(UpdateDirection::None));
}

#[tokio::test(start_paused = true)]
async fn test_final_stretch_progress_monotone_and_supply_constant() {
    let column = create_column_with_rng(
        ColumnKind::FinalStretch,
        &FeedConfig::default(),
        StdRng::seed_from_u64(8),
    );
    column.wait_until_loaded().await;

    let initial = column.snapshot().await.tokens;
    let supply: HashMap<String, f64> = initial.iter().map(|t| (t.id.clone(), t.supply())).collect();
    let mut last_progress: HashMap<String, f64> = initial
        .iter()
        .map(|t| (t.id.clone(), t.progress.unwrap_or(0.0)))
        .collect();

    for _ in 0..60 {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let tokens = column.snapshot().await.tokens;
        assert_eq!(tokens.len(), 15);

        for token in &tokens {
            let progress = token.progress.unwrap_or(0.0);
            assert!((0.0..=100.0).contains(&progress));
            assert!(progress >= last_progress[&token.id]);
            last_progress.insert(token.id.clone(), progress);

            assert_relative_eq!(token.supply(), supply[&token.id], max_relative = 1e-9);
        }
    }
}

// ============================================================================
// Dashboard
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_dashboard_isolates_faulty_column() {
    let config = parse_config("[feed]\nload_delay_min_ms = 400\nload_delay_max_ms = 400\n").unwrap();
    let mut dashboard = Dashboard::start_seeded(FeedConfig::from(&config), 21);
    dashboard.wait_until_loaded().await;

    let panels = dashboard
        .render(|view| {
            if view.kind == ColumnKind::FinalStretch {
                Err("corrupt row".to_string())
            } else {
                render_column(view, 15).map_err(|e| e.to_string())
            }
        })
        .await;

    assert!(matches!(&panels[0], Panel::Rendered { body, .. } if body.starts_with("NEW PAIRS")));
    assert!(panels[1].is_offline());
    assert!(matches!(&panels[2], Panel::Rendered { body, .. } if body.starts_with("MIGRATED")));

    dashboard.retry(ColumnKind::FinalStretch).await.unwrap();
    dashboard.wait_until_loaded().await;
    let panels = dashboard.render(|view| render_column(view, 15)).await;
    assert!(panels.iter().all(|p| !p.is_offline()));

    dashboard.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_seeded_dashboards_match() {
    let mut a = Dashboard::start_seeded(FeedConfig::default(), 99);
    let mut b = Dashboard::start_seeded(FeedConfig::default(), 99);
    a.wait_until_loaded().await;
    b.wait_until_loaded().await;

    for kind in ColumnKind::ALL {
        let left = a.column(kind).unwrap().snapshot().await.tokens;
        let right = b.column(kind).unwrap().snapshot().await.tokens;
        assert_eq!(left, right);
    }

    a.shutdown().await;
    b.shutdown().await;
}
