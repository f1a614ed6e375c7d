pub mod app;
pub mod chart;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod tables;
pub mod terminal;
pub mod utils;
pub mod view;

pub use app::RateApp;
pub use terminal::TerminalPresenter;
