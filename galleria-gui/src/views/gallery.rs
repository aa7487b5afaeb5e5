use std::collections::HashMap;

use iced::widget::image::Handle as ImageHandle;
use iced::widget::{
    button, column, container, pick_list, progress_bar, row, text, text_input, Image, Space,
};
use iced::{Alignment, ContentFit, Element, Length};

use galleria_core::controller::GalleryController;
use galleria_core::models::{MediaType, DISPLAY_SLOTS};

use crate::message::Message;

pub const GRID_COLUMNS: usize = 5;
pub const CELL_SIZE: f32 = 100.0;
const CREDIT: &str = "Images Provided by iTunes Search API.";

fn cell<'a>(handle: Option<&'a ImageHandle>) -> Element<'a, Message> {
    match handle {
        Some(handle) => Image::new(handle.clone())
            .width(CELL_SIZE)
            .height(CELL_SIZE)
            .content_fit(ContentFit::Cover)
            .into(),
        None => container(Space::new())
            .width(CELL_SIZE)
            .height(CELL_SIZE)
            .style(container::bordered_box)
            .into(),
    }
}

fn grid<'a>(
    controller: &'a GalleryController,
    handles: &'a HashMap<String, ImageHandle>,
) -> Element<'a, Message> {
    let slots = controller.slots();
    let mut rows = column![].spacing(2);
    for start in (0..DISPLAY_SLOTS).step_by(GRID_COLUMNS) {
        let mut line = row![].spacing(2);
        for index in start..(start + GRID_COLUMNS).min(DISPLAY_SLOTS) {
            let handle = slots.shown_url(index).and_then(|url| handles.get(url));
            line = line.push(cell(handle));
        }
        rows = rows.push(line);
    }
    rows.into()
}

pub fn view<'a>(
    controller: &'a GalleryController,
    term: &'a str,
    media: MediaType,
    handles: &'a HashMap<String, ImageHandle>,
) -> Element<'a, Message> {
    let can_search = controller.can_search();

    let mut input = text_input("Search term", term)
        .on_input(Message::TermChanged)
        .width(Length::Fill);
    if can_search {
        input = input.on_submit(Message::GetImages);
    }

    let controls = row![
        button(controller.play_label())
            .on_press_maybe(controller.can_play().then_some(Message::TogglePlay)),
        text("Search:"),
        input,
        pick_list(MediaType::ALL, Some(media), Message::MediaSelected).width(Length::Shrink),
        button("Get Images").on_press_maybe(can_search.then_some(Message::GetImages)),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let footer = row![
        container(progress_bar(0.0..=1.0, controller.progress())).width(200),
        text(CREDIT).size(12),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    column![
        controls,
        text(controller.status()).size(13),
        grid(controller, handles),
        footer,
    ]
    .spacing(8)
    .padding(8)
    .into()
}
