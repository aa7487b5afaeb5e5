mod app;
mod message;
mod views;

use iced::Size;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "galleria_gui=info,galleria_core=info".into()),
        )
        .init();

    iced::application(app::App::new, app::App::update, app::App::view)
        .title("GalleryApp!")
        .theme(app::App::theme)
        .window_size(Size::new(560.0, 600.0))
        .resizable(false)
        .run()
}
