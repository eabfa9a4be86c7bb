//! Title bar and key hint line.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::api::User;

pub const APP_TITLE: &str = "SelfieBooth";

/// "Welcome, <name>" for a logged-in user.
pub fn welcome(user: &User) -> String {
    format!("Welcome, {}", user.display_name())
}

pub fn render_top_bar(frame: &mut Frame, user: Option<&User>, area: Rect) {
    let style = Style::default().fg(Color::Black).bg(Color::Cyan);
    let greeting = user.map(welcome).unwrap_or_default();
    let [left, right] =
        Layout::horizontal([Constraint::Length(APP_TITLE.len() as u16 + 2), Constraint::Min(0)]).areas(area);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {}", APP_TITLE),
            style.add_modifier(Modifier::BOLD),
        )))
        .style(style),
        left,
    );
    frame.render_widget(Paragraph::new(format!("{} ", greeting)).right_aligned().style(style), right);
}

/// Bottom line with the keys the current screen understands.
pub fn render_hints(frame: &mut Frame, hints: &str, area: Rect) {
    let hint_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };
    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::Black).bg(Color::White)),
        hint_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_uses_display_name() {
        let user = User {
            id: Some(1),
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
        };
        assert_eq!(welcome(&user), "Welcome, Ada");

        let anonymous = User {
            id: None,
            name: None,
            email: None,
        };
        assert_eq!(welcome(&anonymous), "Welcome, User");
    }
}
