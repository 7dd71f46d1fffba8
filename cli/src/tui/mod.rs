mod app;
pub mod events;
mod terminal;
pub mod ui;

pub use app::{TuiAction, TuiApp};
pub use terminal::{check_tui_support, restore_terminal, setup_terminal};
