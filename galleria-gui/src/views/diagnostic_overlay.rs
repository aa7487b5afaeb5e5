use iced::widget::{button, column, container, mouse_area, scrollable, stack, text, Space};
use iced::{Background, Border, Color, Element, Length, Theme};

use galleria_core::controller::Diagnostic;

use crate::message::Message;

fn scrim_style(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.6))),
        ..Default::default()
    }
}

fn panel_style(theme: &Theme) -> container::Style {
    let palette = theme.extended_palette();
    container::Style {
        background: Some(Background::Color(palette.background.base.color)),
        border: Border {
            color: palette.danger.base.color,
            width: 1.0,
            radius: 8.0.into(),
        },
        ..Default::default()
    }
}

fn dialog<'a>(diagnostic: &'a Diagnostic) -> Element<'a, Message> {
    let body = column![
        text("Error").size(18),
        scrollable(text(diagnostic.to_string()).size(13)).height(Length::Fill),
    ]
    .spacing(12);

    body.push(
        container(button("Close").on_press(Message::DismissError)).align_right(Length::Fill),
    )
    .into()
}

/// Shows the diagnostic as a modal over `base`. Clicking the scrim or the
/// button dismisses it.
pub fn wrap_with_overlay<'a>(
    base: Element<'a, Message>,
    diagnostic: Option<&'a Diagnostic>,
) -> Element<'a, Message> {
    let Some(diagnostic) = diagnostic else {
        return base;
    };

    let scrim = mouse_area(
        container(Space::new())
            .width(Length::Fill)
            .height(Length::Fill)
            .style(scrim_style),
    )
    .on_press(Message::DismissError);

    let panel = container(
        container(dialog(diagnostic))
            .width(512)
            .height(323)
            .padding(16)
            .style(panel_style),
    )
    .center(Length::Fill)
    .width(Length::Fill)
    .height(Length::Fill);

    stack![base, scrim, panel].into()
}
