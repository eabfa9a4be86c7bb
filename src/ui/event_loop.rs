//! Async main loop: terminal input and the recording timer, multiplexed with
//! `tokio::select!`.

use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEventKind};
use futures_util::StreamExt;

use super::app::App;
use super::tui::Tui;

/// Redraw and timer period (~15 FPS for the ASCII preview).
pub const TICK_INTERVAL: Duration = Duration::from_millis(66);

/// Draw, wait for a key or a tick, repeat until the app asks to quit.
///
/// Each key press is handled to completion (including API calls) before
/// the next event is read. The screen is redrawn before an action runs so
/// loading states are visible.
pub async fn run(tui: &mut Tui, app: &mut App) -> io::Result<()> {
    let mut event_stream = EventStream::new();

    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    while !app.should_quit() {
        tui.terminal().draw(|frame| app.render(frame))?;

        tokio::select! {
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if let Some(action) = app.handle_key(key) {
                            tui.terminal().draw(|frame| app.render(frame))?;
                            app.perform(action).await;
                        }
                    }
                    // Resize and the rest only need a redraw.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e),
                    None => break,
                }
            }
            _ = ticker.tick() => app.tick(),
        }
    }

    Ok(())
}
