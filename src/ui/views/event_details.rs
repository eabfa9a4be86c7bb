//! A single event, with an optional PIN gate before starting it.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::api::Event;
use crate::route::Route;
use crate::ui::app::Action;

pub const NO_DESCRIPTION: &str = "No description available";
pub const LOAD_ERROR: &str = "Unable to load event details";

#[derive(Debug, Clone)]
pub struct EventDetailsView {
    pub event_id: i64,
    pub event: Option<Event>,
    pub loading: bool,
    pub status: Option<String>,
    pub require_pin: bool,
    /// PIN typed so far; `Some` while the prompt is open.
    pub pin_entry: Option<String>,
}

impl EventDetailsView {
    pub fn new(event_id: i64, require_pin: bool) -> Self {
        Self {
            event_id,
            event: None,
            loading: true,
            status: None,
            require_pin,
            pin_entry: None,
        }
    }

    pub fn apply_event(&mut self, event: Event) {
        self.event = Some(event);
        self.loading = false;
        self.status = None;
    }

    pub fn apply_error(&mut self) {
        self.event = None;
        self.loading = false;
        self.status = Some(LOAD_ERROR.to_string());
    }

    /// Outcome of a PIN check.
    pub fn pin_rejected(&mut self) {
        self.pin_entry = Some(String::new());
        self.status = Some("Incorrect PIN".to_string());
    }

    /// `%B %d, %Y at %I:%M %p`, or the raw value when it doesn't parse.
    pub fn formatted_date(event: &Event) -> String {
        event
            .parsed_date()
            .map(|d| d.format("%B %d, %Y at %I:%M %p").to_string())
            .unwrap_or_else(|| event.date.clone())
    }

    fn handle_pin_key(&mut self, key: KeyEvent) -> Option<Action> {
        let pin = self.pin_entry.as_mut()?;
        match key.code {
            KeyCode::Esc => {
                self.pin_entry = None;
                self.status = None;
                None
            }
            KeyCode::Backspace => {
                pin.pop();
                None
            }
            KeyCode::Char(c) if !c.is_whitespace() => {
                pin.push(c);
                None
            }
            KeyCode::Enter if !pin.is_empty() => {
                let pin = pin.clone();
                self.status = Some("Checking PIN...".to_string());
                Some(Action::VerifyPin {
                    event_id: self.event_id,
                    pin,
                })
            }
            _ => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if self.pin_entry.is_some() {
            return self.handle_pin_key(key);
        }

        match key.code {
            KeyCode::Esc | KeyCode::Backspace => Some(Action::Navigate(Route::Events)),
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('r') => {
                self.loading = true;
                Some(Action::Navigate(Route::EventDetails(self.event_id)))
            }
            KeyCode::Enter if self.event.is_some() => {
                if self.require_pin {
                    self.pin_entry = Some(String::new());
                    self.status = None;
                    None
                } else {
                    Some(Action::Navigate(Route::Experience(self.event_id)))
                }
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let [body_area, pin_area] = Layout::vertical([Constraint::Min(5), Constraint::Length(3)]).areas(area);

        let block = Block::default().borders(Borders::ALL).title("Event");
        let Some(event) = &self.event else {
            let (text, color) = if self.loading {
                ("Loading event...", Color::DarkGray)
            } else {
                (self.status.as_deref().unwrap_or(LOAD_ERROR), Color::Red)
            };
            frame.render_widget(
                Paragraph::new(text).centered().style(Style::default().fg(color)).block(block),
                body_area,
            );
            return;
        };

        let label = Style::default().fg(Color::DarkGray);
        let description = event
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(NO_DESCRIPTION);
        let lines = vec![
            Line::from(Span::styled(
                event.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
            Line::from(vec![Span::styled("Date:     ", label), Span::raw(Self::formatted_date(event))]),
            Line::from(vec![Span::styled("Location: ", label), Span::raw(event.location.clone())]),
            Line::from(vec![Span::styled("Package:  ", label), Span::raw(event.package_name().to_string())]),
            Line::raw(""),
            Line::raw(description.to_string()),
        ];
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
            body_area,
        );

        let bottom = match (&self.pin_entry, &self.status) {
            (Some(pin), status) => {
                let mut spans = vec![Span::raw("PIN: "), Span::raw("*".repeat(pin.chars().count()))];
                if let Some(status) = status {
                    spans.push(Span::styled(format!("  {}", status), Style::default().fg(Color::Yellow)));
                }
                Line::from(spans)
            }
            (None, Some(status)) => Line::styled(status.clone(), Style::default().fg(Color::Red)),
            (None, None) => Line::styled("Press Enter to start", Style::default().fg(Color::Green)),
        };
        frame.render_widget(
            Paragraph::new(bottom).block(Block::default().borders(Borders::ALL)),
            pin_area,
        );
    }
}
