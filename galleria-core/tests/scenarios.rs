use std::collections::HashSet;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

use galleria_core::controller::{run_search, GalleryController, SearchEvent, FAILED_STATUS};
use galleria_core::error::{GalleryError, Result};
use galleria_core::models::{SearchResultRecord, SessionState, DISPLAY_SLOTS};
use galleria_core::query::SearchQuery;
use galleria_core::scheduler::{ReplacementScheduler, ReplacementTick};
use galleria_core::slots::DisplaySlots;
use galleria_core::sources::ArtworkSource;

enum Behaviour {
    Results(Vec<SearchResultRecord>),
    Unreachable,
}

struct StubSource {
    behaviour: Behaviour,
    searches: AtomicUsize,
}

impl StubSource {
    /// `total` records cycling through `distinct` artwork urls.
    fn cycling(distinct: usize, total: usize) -> Arc<Self> {
        let records = (0..total)
            .map(|i| SearchResultRecord::new(url(i % distinct)))
            .collect();
        Arc::new(Self {
            behaviour: Behaviour::Results(records),
            searches: AtomicUsize::new(0),
        })
    }

    fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            behaviour: Behaviour::Unreachable,
            searches: AtomicUsize::new(0),
        })
    }
}

fn url(i: usize) -> String {
    format!("https://is1.example/image/thumb/{i}/100x100bb.jpg")
}

#[async_trait]
impl ArtworkSource for StubSource {
    fn name(&self) -> &str {
        "Stub"
    }

    fn query_url(&self, query: &SearchQuery) -> String {
        query.url("https://stub.example/search")
    }

    async fn search(&self, _query: &SearchQuery) -> Result<Vec<SearchResultRecord>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            Behaviour::Results(records) => Ok(records.clone()),
            Behaviour::Unreachable => {
                // nothing listens on the discard port
                reqwest::Client::new()
                    .get("http://127.0.0.1:9/search")
                    .send()
                    .await?;
                Err(GalleryError::MalformedResponse("unexpected listener".into()))
            }
        }
    }

    async fn download(&self, url: &str) -> Result<bytes::Bytes> {
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([url.len() as u8, 0, 0]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png)?;
        Ok(bytes::Bytes::from(buf.into_inner()))
    }
}

async fn search(ctl: &mut GalleryController, source: Arc<StubSource>, term: &str) {
    let query = ctl.begin_search(term, "music").unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    run_search(source, query, tx).await;
    while let Some(ev) = rx.recv().await {
        ctl.handle_search_event(ev);
    }
}

fn assert_distinct(slots: &DisplaySlots) {
    let urls: HashSet<&str> = (0..DISPLAY_SLOTS).filter_map(|i| slots.shown_url(i)).collect();
    assert_eq!(urls.len(), DISPLAY_SLOTS, "duplicate url on screen");
}

/// Plan, resolve and commit one tick the way the GUI does.
async fn apply_tick(ctl: &mut GalleryController, tick: ReplacementTick, rng: &mut StdRng) -> bool {
    let Some(planned) = ctl.plan_replacement(tick, rng) else {
        return false;
    };
    let image = ctl.loader().unwrap().resolve(&planned.url).await.unwrap();
    ctl.commit_replacement(&planned, image)
}

#[tokio::test]
async fn scenario_a_insufficient_results_on_first_search() {
    let mut ctl = GalleryController::default();
    search(&mut ctl, StubSource::cycling(15, 25), "obscure").await;

    assert_eq!(ctl.state(), SessionState::Error);
    let diag = ctl.diagnostic().unwrap();
    assert_eq!(diag.found, Some(15));
    assert_eq!(diag.required, 21);
    assert_eq!(diag.category, "insufficient results");
    assert!(ctl.slots().is_placeholder());
    assert!(!ctl.can_play());
    assert!(ctl.can_search());
    assert_eq!(ctl.progress(), 1.0);
}

#[tokio::test]
async fn scenario_b_forty_distinct_out_of_two_hundred() {
    let mut ctl = GalleryController::default();
    search(&mut ctl, StubSource::cycling(40, 200), "beatles").await;

    assert_eq!(ctl.state(), SessionState::Displaying);
    for i in 0..DISPLAY_SLOTS {
        assert_eq!(ctl.slots().shown_url(i), Some(url(i).as_str()));
    }
    assert_eq!(ctl.pool().unwrap().len(), 40);
    assert!(ctl.can_play());
    assert_eq!(ctl.progress(), 1.0);
}

#[tokio::test(start_paused = true)]
async fn scenario_c_two_ticks_then_pause() {
    let mut ctl = GalleryController::new(ReplacementScheduler::new(Duration::from_secs(2)));
    search(&mut ctl, StubSource::cycling(40, 200), "beatles").await;
    let mut rng = StdRng::seed_from_u64(42);

    let mut ticks = ctl.toggle_play().unwrap();
    let started = tokio::time::Instant::now();
    let mut mutations = 0;
    while started.elapsed() < Duration::from_secs(4) {
        let Some(tick) = ticks.recv().await else {
            break;
        };
        if apply_tick(&mut ctl, tick, &mut rng).await {
            mutations += 1;
        }
        assert_distinct(ctl.slots());
    }
    assert!(mutations <= 2);
    assert!(mutations >= 1);

    // pause right after a tick: nothing may change afterwards
    ctl.toggle_play();
    assert_eq!(ctl.state(), SessionState::Displaying);
    let frozen = ctl.slots().clone();

    tokio::time::sleep(Duration::from_secs(10)).await;
    while let Some(tick) = ticks.recv().await {
        assert!(!apply_tick(&mut ctl, tick, &mut rng).await);
    }
    assert_eq!(ctl.slots(), &frozen);
}

#[tokio::test(start_paused = true)]
async fn scenario_c_pause_after_first_tick() {
    let mut ctl = GalleryController::default();
    search(&mut ctl, StubSource::cycling(40, 200), "beatles").await;
    let mut rng = StdRng::seed_from_u64(5);

    let mut ticks = ctl.toggle_play().unwrap();
    let first = ticks.recv().await.unwrap();
    assert!(apply_tick(&mut ctl, first, &mut rng).await);
    ctl.toggle_play();
    let after_first = ctl.slots().clone();

    tokio::time::sleep(Duration::from_secs(6)).await;
    // a tick from the cancelled session replayed late is still refused
    assert!(!apply_tick(&mut ctl, first, &mut rng).await);
    assert_eq!(ticks.recv().await, None);
    assert_eq!(ctl.slots(), &after_first);
}

#[tokio::test(start_paused = true)]
async fn scenario_d_new_search_stops_replacement_first() {
    let mut ctl = GalleryController::default();
    let first = StubSource::cycling(40, 200);
    search(&mut ctl, first, "beatles").await;
    let mut rng = StdRng::seed_from_u64(9);

    let mut ticks = ctl.toggle_play().unwrap();
    let queued = ticks.recv().await.unwrap();

    let second = StubSource::cycling(30, 60);
    let query = ctl.begin_search("stones", "music").unwrap();
    // play is already over before the request goes out
    assert_eq!(ctl.state(), SessionState::Searching);
    assert_eq!(second.searches.load(Ordering::SeqCst), 0);
    assert!(ctl.plan_replacement(queued, &mut rng).is_none());
    assert_eq!(ticks.recv().await, None);

    let (tx, mut rx) = mpsc::unbounded_channel();
    run_search(second.clone(), query, tx).await;
    while let Some(ev) = rx.recv().await {
        ctl.handle_search_event(ev);
    }
    assert_eq!(second.searches.load(Ordering::SeqCst), 1);
    assert_eq!(ctl.state(), SessionState::Displaying);
    assert!(!apply_tick(&mut ctl, queued, &mut rng).await);
    assert_eq!(ctl.pool().unwrap().len(), 30);
}

#[tokio::test]
async fn transport_failure_keeps_existing_slots() {
    let mut ctl = GalleryController::default();
    search(&mut ctl, StubSource::cycling(40, 200), "beatles").await;
    let before = ctl.slots().clone();

    search(&mut ctl, StubSource::unreachable(), "beatles").await;

    assert_eq!(ctl.state(), SessionState::Error);
    assert_eq!(ctl.diagnostic().unwrap().category, "transport failure");
    assert_eq!(ctl.status(), FAILED_STATUS);
    assert_eq!(ctl.slots(), &before);
    assert!(ctl.can_play());
}

#[tokio::test]
async fn progress_events_are_ordered() {
    let source = StubSource::cycling(25, 25);
    let query = SearchQuery::parse("x", "all").unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    run_search(source, query, tx).await;

    let mut progress = Vec::new();
    let mut finished = 0;
    while let Some(ev) = rx.recv().await {
        match ev {
            SearchEvent::Progress(p) => {
                assert_eq!(finished, 0, "progress after finish");
                progress.push(p);
            }
            SearchEvent::Finished(result) => {
                assert!(result.is_ok());
                finished += 1;
            }
        }
    }
    let expected: Vec<f32> = (1..=20).map(|i| i as f32 / 20.0).collect();
    assert_eq!(progress, expected);
    assert_eq!(finished, 1);
}
