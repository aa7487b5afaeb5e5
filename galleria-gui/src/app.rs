use std::collections::HashMap;
use std::sync::Arc;

use futures_lite::Stream;
use iced::widget::image::Handle as ImageHandle;
use iced::{Element, Task, Theme};
use tokio::sync::mpsc;

use galleria_core::config::{Config, GeneralConfig};
use galleria_core::controller::{run_search, GalleryController, SearchEvent};
use galleria_core::models::MediaType;
use galleria_core::paths::GalleryPaths;
use galleria_core::scheduler::ReplacementScheduler;
use galleria_core::sources::ArtworkSource;

use crate::message::Message;
use crate::views;

const INITIAL_TERM: &str = "Enter something here";

fn build_http(general: &GeneralConfig) -> anyhow::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(general.user_agent.clone());
    if let Some(timeout) = general.request_timeout() {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Drains an unbounded channel as a stream so `Task::run` can feed each item
/// back into `update`.
fn receiver_stream<T: Send + 'static>(
    rx: mpsc::UnboundedReceiver<T>,
) -> impl Stream<Item = T> + Send + 'static {
    futures_lite::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|item| (item, rx))
    })
}

pub struct App {
    controller: GalleryController,
    source: Arc<dyn ArtworkSource>,
    term: String,
    media: MediaType,
    handles: HashMap<String, ImageHandle>,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let config = match GalleryPaths::new() {
            Ok(paths) => Config::load_or_default(&paths),
            Err(e) => {
                tracing::warn!("using default config: {e}");
                Config::default()
            }
        };

        let http = build_http(&config.general).unwrap_or_else(|e| {
            tracing::warn!("http client setup failed, using defaults: {e}");
            reqwest::Client::new()
        });

        let itunes = galleria_source_itunes::create_source(&config.sources, http);
        let media = itunes.config().default_media;
        let source: Arc<dyn ArtworkSource> = Arc::new(itunes);
        tracing::info!(source = source.name(), "artwork source ready");

        let scheduler = ReplacementScheduler::new(config.playback.replacement_interval());

        let app = Self {
            controller: GalleryController::new(scheduler),
            source,
            term: INITIAL_TERM.to_string(),
            media,
            handles: HashMap::new(),
        };
        (app, Task::none())
    }

    pub fn theme(&self) -> Theme {
        Theme::GruvboxDark
    }

    /// Keeps one image handle per URL currently on the grid.
    fn sync_handles(&mut self) {
        let slots = self.controller.slots();
        self.handles.retain(|url, _| slots.is_shown(url));
        for image in slots.iter().flatten() {
            self.handles
                .entry(image.url.clone())
                .or_insert_with(|| ImageHandle::from_bytes(image.bytes.clone()));
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TermChanged(term) => {
                self.term = term;
                Task::none()
            }

            Message::MediaSelected(media) => {
                self.media = media;
                Task::none()
            }

            Message::GetImages => {
                let query = match self.controller.begin_search_with(&self.term, self.media) {
                    Ok(query) => query,
                    Err(e) => {
                        tracing::warn!("search not started: {e}");
                        return Task::none();
                    }
                };
                let (tx, rx) = mpsc::unbounded_channel();
                let search = Task::perform(run_search(Arc::clone(&self.source), query, tx), |()| {
                    Message::Noop
                });
                let events = Task::run(receiver_stream(rx), Message::Search);
                Task::batch([search, events])
            }

            Message::Search(event) => {
                let finished = matches!(event, SearchEvent::Finished(_));
                self.controller.handle_search_event(event);
                if finished {
                    self.sync_handles();
                }
                Task::none()
            }

            Message::TogglePlay => match self.controller.toggle_play() {
                Some(ticks) => Task::run(receiver_stream(ticks), Message::Tick),
                None => Task::none(),
            },

            Message::Tick(tick) => {
                let Some(planned) = self.controller.plan_replacement(tick, &mut rand::rng())
                else {
                    return Task::none();
                };
                let Some(loader) = self.controller.loader() else {
                    return Task::none();
                };
                Task::perform(
                    async move {
                        let result = loader.resolve(&planned.url).await.map_err(|e| e.to_string());
                        (planned, result)
                    },
                    |(planned, result)| Message::ReplacementLoaded(planned, result),
                )
            }

            Message::ReplacementLoaded(planned, Ok(image)) => {
                if self.controller.commit_replacement(&planned, image) {
                    self.sync_handles();
                }
                Task::none()
            }

            Message::ReplacementLoaded(planned, Err(e)) => {
                tracing::warn!(url = %planned.url, "replacement skipped: {e}");
                Task::none()
            }

            Message::DismissError => {
                self.controller.dismiss_error();
                Task::none()
            }

            Message::Noop => Task::none(),
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let content = views::gallery::view(&self.controller, &self.term, self.media, &self.handles);
        views::diagnostic_overlay::wrap_with_overlay(content, self.controller.diagnostic())
    }
}
