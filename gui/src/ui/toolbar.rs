use iced::widget::{button, row};
use iced::Element;

#[derive(Debug, Clone)]
pub enum ToolbarMessage {
    Backup,
    Restore,
}

pub fn view<'a>(is_running: bool) -> Element<'a, ToolbarMessage> {
    // Disable both actions while a run is active
    let backup_btn = if is_running {
        button("Back up Wi-Fi profiles")
    } else {
        button("Back up Wi-Fi profiles").on_press(ToolbarMessage::Backup)
    };
    let restore_btn = if is_running {
        button("Restore Wi-Fi profiles")
    } else {
        button("Restore Wi-Fi profiles").on_press(ToolbarMessage::Restore)
    };

    row![backup_btn.padding(8), restore_btn.padding(8)]
        .spacing(10)
        .padding(10)
        .into()
}
