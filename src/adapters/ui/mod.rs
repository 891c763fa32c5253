//! Terminal UI adapter: banner, spinners, table rendering, and the
//! interactive console implementing InputPort.

pub mod banner;
pub mod progress;
pub mod render;
pub mod tui;

pub use tui::ConsoleUi;

/// One-time startup output.
pub fn init_ui() {
    banner::print_welcome();
}
