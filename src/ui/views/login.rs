//! Email and password form.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::ui::app::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct LoginView {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
    pub busy: bool,
}

impl LoginView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Login form showing `error` (e.g. after a session expired).
    pub fn with_error(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    fn submit(&mut self) -> Option<Action> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            self.error = Some("Please enter both email and password".to_string());
            return None;
        }
        self.error = None;
        self.busy = true;
        Some(Action::Login {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.focus = match self.focus {
                    LoginField::Email => LoginField::Password,
                    LoginField::Password => LoginField::Email,
                };
                None
            }
            KeyCode::Enter => match self.focus {
                LoginField::Email if self.password.is_empty() => {
                    self.focus = LoginField::Password;
                    None
                }
                _ => self.submit(),
            },
            KeyCode::Backspace => {
                self.focused_mut().pop();
                None
            }
            KeyCode::Char(c) => {
                self.focused_mut().push(c);
                None
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let [form] = Layout::horizontal([Constraint::Length(50)])
            .flex(Flex::Center)
            .areas(area);
        let [title, email, password, message] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
        ])
        .flex(Flex::Center)
        .areas(form);

        frame.render_widget(
            Paragraph::new("Sign in to SelfieBooth")
                .centered()
                .style(Style::default().add_modifier(Modifier::BOLD)),
            title,
        );

        let field = |label: &'static str, focused: bool| {
            let color = if focused { Color::Cyan } else { Color::DarkGray };
            Block::default()
                .borders(Borders::ALL)
                .title(label)
                .border_style(Style::default().fg(color))
        };

        frame.render_widget(
            Paragraph::new(self.email.as_str()).block(field("Email", self.focus == LoginField::Email)),
            email,
        );
        let masked = "*".repeat(self.password.chars().count());
        frame.render_widget(
            Paragraph::new(masked).block(field("Password", self.focus == LoginField::Password)),
            password,
        );

        let (text, color) = match (&self.error, self.busy) {
            (Some(error), _) => (error.as_str(), Color::Red),
            (None, true) => ("Signing in...", Color::Yellow),
            (None, false) => ("Tab to switch fields, Enter to sign in", Color::DarkGray),
        };
        frame.render_widget(
            Paragraph::new(text).centered().style(Style::default().fg(color)),
            message,
        );
    }
}
