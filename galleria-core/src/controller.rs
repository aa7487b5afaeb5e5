use std::sync::Arc;

use rand::Rng;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{GalleryError, Result};
use crate::loader::ImageLoader;
use crate::models::{LoadedImage, MediaType, SessionState, MIN_DISTINCT_RESULTS};
use crate::query::SearchQuery;
use crate::scheduler::{
    pick_replacement, PlannedReplacement, PlayHandle, ReplacementScheduler, ReplacementTick,
};
use crate::selector::DistinctImageSet;
use crate::slots::DisplaySlots;
use crate::sources::ArtworkSource;

pub const DIRECTIONS: &str = "Type in a term, select a media type, then click the button.";
pub const SEARCHING_STATUS: &str = "Getting images...";
pub const FAILED_STATUS: &str = "Last attempt to get images failed...";

/// User-facing description of a failed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The query URL, or the image URL for resolution failures.
    pub uri: String,
    pub category: String,
    pub message: String,
    pub found: Option<usize>,
    pub required: usize,
}

impl Diagnostic {
    pub fn new(query_url: &str, err: &GalleryError) -> Self {
        let uri = match err {
            GalleryError::ImageResolution { url, .. } if !url.is_empty() => url.clone(),
            _ => query_url.to_string(),
        };
        let found = match err {
            GalleryError::InsufficientResults { found, .. } => Some(*found),
            _ => None,
        };
        Self {
            uri,
            category: err.category().to_string(),
            message: err.to_string(),
            found,
            required: MIN_DISTINCT_RESULTS,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "URI: {}\n\nError ({}): {}", self.uri, self.category, self.message)
    }
}

/// Working set produced by a successful search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub query_url: String,
    pub pool: DistinctImageSet,
    pub loader: Arc<ImageLoader>,
    pub images: Vec<LoadedImage>,
}

#[derive(Debug, Clone)]
pub enum SearchEvent {
    Progress(f32),
    Finished(std::result::Result<SearchOutcome, Diagnostic>),
}

/// Background half of a search: query, dedupe, resolve the initial images.
/// Sends any number of `Progress` events followed by exactly one `Finished`.
pub async fn run_search(
    source: Arc<dyn ArtworkSource>,
    query: SearchQuery,
    events: mpsc::UnboundedSender<SearchEvent>,
) {
    let query_url = source.query_url(&query);
    let progress_tx = events.clone();
    let result = fetch_working_set(source, &query, &query_url, move |p| {
        let _ = progress_tx.send(SearchEvent::Progress(p));
    })
    .await
    .map_err(|e| {
        warn!(url = %query_url, "search failed: {e}");
        Diagnostic::new(&query_url, &e)
    });
    let _ = events.send(SearchEvent::Finished(result));
}

async fn fetch_working_set<F>(
    source: Arc<dyn ArtworkSource>,
    query: &SearchQuery,
    query_url: &str,
    on_progress: F,
) -> Result<SearchOutcome>
where
    F: FnMut(f32) + Send,
{
    info!(url = %query_url, "searching");
    let records = source.search(query).await?;
    let pool = DistinctImageSet::from_records(&records)?;
    info!(raw = records.len(), distinct = pool.len(), "search results accepted");

    let loader = ImageLoader::new(source);
    let images = loader.resolve_initial(pool.initial(), on_progress).await?;
    Ok(SearchOutcome {
        query_url: query_url.to_string(),
        pool,
        loader: Arc::new(loader),
        images,
    })
}

/// Owns the session state and the working set. Lives on the rendering
/// thread; every mutation of slots and state goes through it.
#[derive(Debug)]
pub struct GalleryController {
    state: SessionState,
    slots: DisplaySlots,
    pool: Option<DistinctImageSet>,
    loader: Option<Arc<ImageLoader>>,
    successful_searches: u32,
    progress: f32,
    status: String,
    diagnostic: Option<Diagnostic>,
    scheduler: ReplacementScheduler,
    play: Option<PlayHandle>,
}

impl GalleryController {
    pub fn new(scheduler: ReplacementScheduler) -> Self {
        Self {
            state: SessionState::Idle,
            slots: DisplaySlots::new(),
            pool: None,
            loader: None,
            successful_searches: 0,
            progress: 0.0,
            status: DIRECTIONS.to_string(),
            diagnostic: None,
            scheduler,
            play: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn slots(&self) -> &DisplaySlots {
        &self.slots
    }

    pub fn pool(&self) -> Option<&DistinctImageSet> {
        self.pool.as_ref()
    }

    pub fn loader(&self) -> Option<Arc<ImageLoader>> {
        self.loader.clone()
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.diagnostic.as_ref()
    }

    pub fn successful_searches(&self) -> u32 {
        self.successful_searches
    }

    pub fn can_search(&self) -> bool {
        self.state != SessionState::Searching
    }

    pub fn can_play(&self) -> bool {
        self.state != SessionState::Searching && self.successful_searches > 0
    }

    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Playing
    }

    pub fn play_label(&self) -> &'static str {
        if self.is_playing() {
            "Pause"
        } else {
            "Play"
        }
    }

    /// Start a search. Stops play before anything else so no replacement
    /// can race the upcoming fill. Returns the query to hand to
    /// [`run_search`].
    pub fn begin_search(&mut self, term: &str, media: &str) -> Result<SearchQuery> {
        if self.state == SessionState::Searching {
            return Err(GalleryError::SearchInProgress);
        }
        self.stop_play();
        self.progress = 0.0;
        self.diagnostic = None;

        match SearchQuery::parse(term, media) {
            Ok(query) => {
                self.state = SessionState::Searching;
                self.status = SEARCHING_STATUS.to_string();
                debug!(term, media, "search started");
                Ok(query)
            }
            Err(e) => {
                let diag = Diagnostic::new(&format!("term={term}&media={media}"), &e);
                self.fail(diag);
                Err(e)
            }
        }
    }

    /// Typed variant of [`begin_search`](Self::begin_search) for callers
    /// that already hold a `MediaType`.
    pub fn begin_search_with(&mut self, term: &str, media: MediaType) -> Result<SearchQuery> {
        self.begin_search(term, media.as_str())
    }

    /// Progress only moves forward and only while searching.
    pub fn record_progress(&mut self, progress: f32) {
        if self.state == SessionState::Searching && progress > self.progress {
            self.progress = progress.clamp(0.0, 1.0);
        }
    }

    pub fn handle_search_event(&mut self, event: SearchEvent) {
        match event {
            SearchEvent::Progress(p) => self.record_progress(p),
            SearchEvent::Finished(result) => self.finish_search(result),
        }
    }

    pub fn finish_search(&mut self, result: std::result::Result<SearchOutcome, Diagnostic>) {
        if self.state != SessionState::Searching {
            warn!(state = %self.state, "search result arrived outside a search; dropped");
            return;
        }
        match result {
            Ok(outcome) => {
                if let Err(e) = self.slots.fill_all(outcome.images) {
                    let diag = Diagnostic::new(&outcome.query_url, &e);
                    self.fail(diag);
                    return;
                }
                self.pool = Some(outcome.pool);
                self.loader = Some(outcome.loader);
                self.successful_searches += 1;
                self.progress = 1.0;
                self.status = outcome.query_url;
                self.state = SessionState::Displaying;
                info!(searches = self.successful_searches, "search complete");
            }
            Err(diag) => self.fail(diag),
        }
    }

    fn fail(&mut self, diag: Diagnostic) {
        warn!(category = %diag.category, uri = %diag.uri, "search attempt failed");
        self.state = SessionState::Error;
        self.progress = 1.0;
        self.status = FAILED_STATUS.to_string();
        self.diagnostic = Some(diag);
    }

    /// Close the diagnostic and fall back to whatever was shown before.
    pub fn dismiss_error(&mut self) {
        if self.state != SessionState::Error {
            return;
        }
        self.diagnostic = None;
        self.state = if self.successful_searches > 0 {
            SessionState::Displaying
        } else {
            SessionState::Idle
        };
    }

    /// Flip play mode. Returns the tick stream when play starts.
    pub fn toggle_play(&mut self) -> Option<mpsc::UnboundedReceiver<ReplacementTick>> {
        match self.state {
            SessionState::Playing => {
                self.stop_play();
                None
            }
            _ if self.can_play() => {
                self.dismiss_error();
                let (handle, ticks) = self.scheduler.start();
                self.play = Some(handle);
                self.state = SessionState::Playing;
                Some(ticks)
            }
            _ => None,
        }
    }

    /// Cancel the replacement timer if it runs. Safe to call at any time.
    pub fn stop_play(&mut self) {
        if let Some(mut handle) = self.play.take() {
            handle.cancel();
            info!(generation = handle.generation(), "play stopped");
        }
        if self.state == SessionState::Playing {
            self.state = SessionState::Displaying;
        }
    }

    fn accepts(&self, generation: u64) -> bool {
        self.state == SessionState::Playing
            && self.play.as_ref().map(PlayHandle::generation) == Some(generation)
    }

    /// Choose what a tick replaces. Stale ticks (from a cancelled play
    /// session or arriving outside play) yield `None`.
    pub fn plan_replacement<R: Rng>(
        &self,
        tick: ReplacementTick,
        rng: &mut R,
    ) -> Option<PlannedReplacement> {
        if !self.accepts(tick.generation) {
            debug!(generation = tick.generation, "stale tick ignored");
            return None;
        }
        let pool = self.pool.as_ref()?;
        let (slot, url) = pick_replacement(rng, &self.slots, pool)?;
        Some(PlannedReplacement {
            generation: tick.generation,
            slot,
            url,
        })
    }

    /// Commit a resolved replacement. Returns `true` if a slot changed.
    pub fn commit_replacement(&mut self, planned: &PlannedReplacement, image: LoadedImage) -> bool {
        if !self.accepts(planned.generation) || image.url != planned.url {
            return false;
        }
        match self.slots.replace(planned.slot, image) {
            Ok(()) => {
                debug!(slot = planned.slot, url = %planned.url, "slot replaced");
                true
            }
            Err(e) => {
                // another tick showed this url while it was loading
                debug!("replacement skipped: {e}");
                false
            }
        }
    }
}

impl Default for GalleryController {
    fn default() -> Self {
        Self::new(ReplacementScheduler::default())
    }
}
