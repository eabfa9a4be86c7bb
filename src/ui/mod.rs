//! Terminal UI: login, event browsing, experience selection and the camera screen.

pub mod app;
mod event_loop;
mod topbar;
mod tui;
pub mod views;

use std::io;
use std::sync::Arc;

use crate::api::BoothClient;
use crate::camera::SourceMode;
use crate::config::Config;
use crate::route::Route;

pub use app::{Action, App, SESSION_EXPIRED, View};
pub use event_loop::{TICK_INTERVAL, run};
pub use topbar::{APP_TITLE, render_hints, render_top_bar, welcome};
pub use tui::Tui;

/// Take over the terminal and run the booth until the user quits.
pub async fn run_booth(
    client: Arc<BoothClient>,
    config: Config,
    source_mode: SourceMode,
    initial_route: Option<Route>,
) -> io::Result<()> {
    let mut app = App::new(client, config, source_mode, initial_route);
    let mut tui = Tui::new()?;
    let result = run(&mut tui, &mut app).await;
    // Release the camera while the terminal is still ours.
    drop(app);
    tui.restore()?;
    result
}
