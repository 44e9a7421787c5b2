use iced::widget::{button, column, container, row, scrollable, text};
use iced::{Border, Color, Element, Length, Task, Theme};

#[derive(Debug, Clone)]
pub enum OutputMessage {
    Copy,
    Clear,
}

fn log_id() -> scrollable::Id {
    scrollable::Id::new("run-log")
}

/// Keep the newest log line in view.
pub fn follow<T>() -> Task<T> {
    scrollable::snap_to(log_id(), scrollable::RelativeOffset::END)
}

pub fn view<'a>(log: &'a str) -> Element<'a, OutputMessage> {
    let lines = log.lines().count();
    let has_log = lines > 0;

    let header = row![
        text(format!("Run log ({lines} lines)")).size(14).width(Length::Fill),
        button("Copy").on_press_maybe(has_log.then_some(OutputMessage::Copy)),
        button("Clear").on_press_maybe(has_log.then_some(OutputMessage::Clear)),
    ]
    .spacing(10)
    .align_y(iced::Alignment::Center);

    let body = if has_log {
        text(log).size(13).font(iced::Font::MONOSPACE)
    } else {
        text("Back up or restore to see progress here.")
            .size(13)
            .color(Color::from_rgb(0.55, 0.55, 0.6))
    };

    let log_view = container(scrollable(body).id(log_id()).width(Length::Fill).height(Length::Fill))
        .width(Length::Fill)
        .height(Length::Fill)
        .padding([8, 12])
        .style(|theme: &Theme| {
            let palette = theme.extended_palette();
            container::Style {
                background: Some(Color { a: 0.25, ..palette.background.weak.color }.into()),
                border: Border {
                    color: palette.background.strong.color,
                    width: 1.0,
                    radius: 6.0.into(),
                },
                ..Default::default()
            }
        });

    column![header, log_view]
        .spacing(6)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
