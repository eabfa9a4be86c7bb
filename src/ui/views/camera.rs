//! Live preview plus capture controls for one experience.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use crate::booth::{CaptureSession, Experience, Tone};
use crate::preview::{AsciiFrame, AsciiPreview};
use crate::route::Route;
use crate::ui::app::Action;

pub struct CameraView {
    pub session: CaptureSession,
    preview: Arc<AsciiPreview>,
}

impl CameraView {
    pub fn new(session: CaptureSession, preview: Arc<AsciiPreview>) -> Self {
        Self { session, preview }
    }

    pub fn route(&self) -> Route {
        Route::Camera {
            event_id: self.session.event_id(),
            mode: self.session.experience(),
        }
    }

    pub fn tick(&mut self) {
        self.session.tick();
    }

    /// Space: a photo in photo mode, otherwise start or stop recording.
    fn shutter(&mut self) {
        // Failures are reported through the session status line.
        let _ = if self.session.experience().records() {
            self.session.toggle_recording()
        } else {
            self.session.capture_photo().map(|_| ())
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.shutter();
                None
            }
            KeyCode::Char('u') if !self.session.is_recording() => Some(Action::Upload),
            KeyCode::Esc | KeyCode::Backspace => {
                self.session.release();
                Some(Action::Navigate(self.route().parent()))
            }
            _ => None,
        }
    }

    fn shutter_hint(&self) -> &'static str {
        match (self.session.experience(), self.session.is_recording()) {
            (Experience::Photo, _) => "Space: take photo",
            (_, true) => "Space: stop recording",
            (_, false) => "Space: start recording",
        }
    }

    fn preview_lines(frame: &AsciiFrame) -> Vec<Line<'static>> {
        if frame.width == 0 {
            return Vec::new();
        }
        frame
            .chars
            .chunks(frame.width as usize)
            .zip(frame.colors.chunks(frame.width as usize))
            .map(|(chars, colors)| {
                let spans: Vec<Span<'static>> = chars
                    .iter()
                    .zip(colors)
                    .map(|(c, color)| {
                        Span::styled(c.to_string(), Style::default().fg(Color::Rgb(color.r, color.g, color.b)))
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let [main_area, status_area] = Layout::vertical([Constraint::Min(5), Constraint::Length(1)]).areas(area);
        let [preview_area, side_area] =
            Layout::horizontal([Constraint::Min(20), Constraint::Length(32)]).areas(main_area);

        let recording = self.session.is_recording();
        let border = if recording { Color::Red } else { Color::DarkGray };
        let mut title = format!(" {} ", self.session.experience().title());
        if recording {
            title = format!(" {} ● REC {}s ", self.session.experience().title(), self.session.recording_seconds());
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title);
        let inner = block.inner(preview_area);
        frame.render_widget(block, preview_area);

        // The capture thread renders subsequent frames at this size.
        self.preview.set_size(inner.width, inner.height);
        match self.preview.latest() {
            Some(ascii) if self.session.is_camera_ready() => {
                frame.render_widget(Paragraph::new(Self::preview_lines(&ascii)), inner);
            }
            _ => {
                frame.render_widget(
                    Paragraph::new("Waiting for camera...")
                        .centered()
                        .style(Style::default().fg(Color::DarkGray)),
                    inner,
                );
            }
        }

        let items: Vec<ListItem> = self
            .session
            .captured()
            .iter()
            .rev()
            .map(|media| {
                let marker = if media.uploaded { "✓ " } else { "  " };
                ListItem::new(format!("{}{}", marker, media.file_name()))
            })
            .collect();
        let side = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Captured ({}) ", self.session.captured().len())),
        );
        frame.render_widget(side, side_area);

        let status = self.session.status();
        let color = match status.tone {
            Tone::Info => Color::Yellow,
            Tone::Success => Color::Green,
            Tone::Error => Color::Red,
        };
        let line = Line::from(vec![
            Span::styled(status.text.clone(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::raw("   "),
            Span::styled(self.shutter_hint(), Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(line), status_area);
    }
}
