pub mod output_panel;
pub mod status_bar;
pub mod toolbar;
