use iced::widget::{column, container, progress_bar, text};
use iced::{Element, Length};

/// Progress bar (0-100) with the status line under it.
pub fn view<'a, Message: 'a>(progress: f32, status: &'a str) -> Element<'a, Message> {
    container(
        column![
            progress_bar(0.0..=100.0, progress).height(Length::Fixed(14.0)),
            text(status).size(14),
        ]
        .spacing(6),
    )
    .padding(10)
    .width(Length::Fill)
    .into()
}
