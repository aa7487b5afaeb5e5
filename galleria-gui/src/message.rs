use galleria_core::controller::SearchEvent;
use galleria_core::models::{LoadedImage, MediaType};
use galleria_core::scheduler::{PlannedReplacement, ReplacementTick};

#[derive(Debug, Clone)]
pub enum Message {
    // search form
    TermChanged(String),
    MediaSelected(MediaType),
    GetImages,

    // background search
    Search(SearchEvent),

    // play mode
    TogglePlay,
    Tick(ReplacementTick),
    ReplacementLoaded(PlannedReplacement, Result<LoadedImage, String>),

    // errors
    DismissError,
    Noop,
}
