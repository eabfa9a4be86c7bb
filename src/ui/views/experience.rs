//! Picking a capture mode for an event.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::api::Template;
use crate::booth::Experience;
use crate::route::Route;
use crate::ui::app::Action;

#[derive(Debug, Clone)]
pub struct ExperienceView {
    pub event_id: i64,
    pub event_name: String,
    pub selected: Experience,
    pub templates: Vec<Template>,
    /// `None` means no template.
    pub template_index: Option<usize>,
}

impl ExperienceView {
    pub fn new(event_id: i64, event_name: impl Into<String>, templates: Vec<Template>) -> Self {
        Self {
            event_id,
            event_name: event_name.into(),
            selected: Experience::default(),
            template_index: if templates.is_empty() { None } else { Some(0) },
            templates,
        }
    }

    pub fn template(&self) -> Option<&Template> {
        self.template_index.and_then(|i| self.templates.get(i))
    }

    fn selected_index(&self) -> usize {
        Experience::ALL.iter().position(|e| *e == self.selected).unwrap_or(0)
    }

    /// Move within the 2x2 grid by `dx` columns and `dy` rows.
    fn move_selection(&mut self, dx: isize, dy: isize) {
        let index = self.selected_index() as isize;
        let (row, col) = (index / 2, index % 2);
        let row = (row + dy).clamp(0, 1);
        let col = (col + dx).clamp(0, 1);
        self.selected = Experience::ALL[(row * 2 + col) as usize];
    }

    /// None, then each template in turn.
    fn cycle_template(&mut self) {
        if self.templates.is_empty() {
            return;
        }
        self.template_index = match self.template_index {
            None => Some(0),
            Some(i) if i + 1 < self.templates.len() => Some(i + 1),
            Some(_) => None,
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => Some(Action::Navigate(Route::EventDetails(self.event_id))),
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Left | KeyCode::Char('h') => {
                self.move_selection(-1, 0);
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.move_selection(1, 0);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(0, -1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(0, 1);
                None
            }
            KeyCode::Char(c @ '1'..='4') => {
                self.selected = Experience::ALL[(c as u8 - b'1') as usize];
                None
            }
            KeyCode::Char('t') => {
                self.cycle_template();
                None
            }
            KeyCode::Enter => Some(Action::OpenCamera {
                event_id: self.event_id,
                mode: self.selected,
                template_id: self.template().map(|t| t.id),
            }),
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let [title_area, grid_area, template_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(format!("Choose an experience for {}", self.event_name))
                .style(Style::default().add_modifier(Modifier::BOLD)),
            title_area,
        );

        let rows = Layout::vertical([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)]).split(grid_area);
        for (row_index, row_area) in rows.iter().enumerate() {
            let cells = Layout::horizontal([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)]).split(*row_area);
            for (col_index, cell) in cells.iter().enumerate() {
                let experience = Experience::ALL[row_index * 2 + col_index];
                let highlighted = experience == self.selected;
                let border = if highlighted { Color::Cyan } else { Color::DarkGray };
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border))
                    .title(format!(" {} {} ", row_index * 2 + col_index + 1, experience.title()));
                let mut lines = vec![Line::raw(experience.description())];
                if let Some(limit) = experience.auto_stop() {
                    lines.push(Line::styled(
                        format!("Stops after {}s", limit.as_secs()),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                frame.render_widget(
                    Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
                    *cell,
                );
            }
        }

        let template = match (self.template(), self.templates.is_empty()) {
            (_, true) => "Template: none available".to_string(),
            (Some(t), false) => format!("Template: {} (t to change)", t.name),
            (None, false) => "Template: none (t to change)".to_string(),
        };
        frame.render_widget(
            Paragraph::new(template).style(Style::default().fg(Color::DarkGray)),
            template_area,
        );
    }
}
