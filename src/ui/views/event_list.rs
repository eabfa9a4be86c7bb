//! Paginated, tabbed, searchable event table.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs};

use crate::api::{Event, EventPage, EventTab};
use crate::route::Route;
use crate::ui::app::Action;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone)]
pub struct EventListView {
    pub tab: EventTab,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub search: String,
    pub searching: bool,
    pub events: Vec<Event>,
    pub selected: usize,
    pub loading: bool,
    pub status: Option<String>,
}

impl Default for EventListView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl EventListView {
    pub fn new(page_size: u32) -> Self {
        Self {
            tab: EventTab::Upcoming,
            page: 1,
            page_size: page_size.max(1),
            total_pages: 1,
            search: String::new(),
            searching: false,
            events: Vec::new(),
            selected: 0,
            loading: true,
            status: None,
        }
    }

    /// Search term to send, if any.
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }

    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }

    pub fn selected_event(&self) -> Option<&Event> {
        self.events.get(self.selected)
    }

    /// Show a fetched page.
    ///
    /// When the result has fewer pages than the one requested, the last page
    /// is fetched instead and `LoadEvents` is returned.
    pub fn apply_page(&mut self, page: EventPage) -> Option<Action> {
        self.total_pages = page.total_pages(self.page_size);
        let clamped = self.page.clamp(1, self.total_pages);
        if clamped != self.page {
            self.page = clamped;
            self.events.clear();
            self.selected = 0;
            self.loading = true;
            self.status = None;
            return Some(Action::LoadEvents);
        }
        self.events = page.data;
        self.selected = self.selected.min(self.events.len().saturating_sub(1));
        self.loading = false;
        self.status = self.events.is_empty().then(|| "No events found".to_string());
        None
    }

    pub fn apply_error(&mut self, message: impl Into<String>) {
        self.events.clear();
        self.selected = 0;
        self.loading = false;
        self.status = Some(message.into());
    }

    fn reload_first_page(&mut self) -> Option<Action> {
        self.page = 1;
        self.selected = 0;
        self.loading = true;
        Some(Action::LoadEvents)
    }

    fn switch_tab(&mut self, tab: EventTab) -> Option<Action> {
        if tab == self.tab {
            return None;
        }
        self.tab = tab;
        self.reload_first_page()
    }

    fn go_to_page(&mut self, page: u32) -> Option<Action> {
        let page = page.clamp(1, self.total_pages.max(1));
        if page == self.page {
            return None;
        }
        self.page = page;
        self.selected = 0;
        self.loading = true;
        Some(Action::LoadEvents)
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.searching = false;
                None
            }
            KeyCode::Backspace => {
                self.search.pop()?;
                self.reload_first_page()
            }
            KeyCode::Char(c) => {
                self.search.push(c);
                self.reload_first_page()
            }
            _ => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if self.searching {
            return self.handle_search_key(key);
        }

        match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('l') => Some(Action::Logout),
            KeyCode::Char('r') => {
                self.loading = true;
                Some(Action::LoadEvents)
            }
            KeyCode::Char('/') => {
                self.searching = true;
                None
            }
            KeyCode::Tab | KeyCode::Right => self.switch_tab(self.tab.next()),
            KeyCode::BackTab | KeyCode::Left => self.switch_tab(self.tab.prev()),
            KeyCode::PageDown => self.go_to_page(self.page + 1),
            KeyCode::PageUp => self.go_to_page(self.page.saturating_sub(1)),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.events.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Enter => self
                .selected_event()
                .map(|event| Action::Navigate(Route::EventDetails(event.id))),
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let [tabs_area, search_area, table_area, footer_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);

        let selected_tab = EventTab::ALL.iter().position(|t| *t == self.tab).unwrap_or(0);
        let tabs = Tabs::new(EventTab::ALL.iter().map(|t| t.label()))
            .select(selected_tab)
            .block(Block::default().borders(Borders::ALL).title("Events"))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, tabs_area);

        let search_style = if self.searching {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let search_text = if self.search.is_empty() && !self.searching {
            "Press / to search".to_string()
        } else {
            self.search.clone()
        };
        frame.render_widget(
            Paragraph::new(search_text).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Search")
                    .border_style(search_style),
            ),
            search_area,
        );

        let block = Block::default().borders(Borders::ALL);
        if self.loading || self.events.is_empty() {
            let message = if self.loading {
                "Loading events..."
            } else {
                self.status.as_deref().unwrap_or("No events found")
            };
            frame.render_widget(
                Paragraph::new(message)
                    .centered()
                    .style(Style::default().fg(Color::DarkGray))
                    .block(block),
                table_area,
            );
        } else {
            let header = Row::new(["Name", "Date", "Package", "Location"])
                .style(Style::default().add_modifier(Modifier::BOLD));
            let rows = self.events.iter().map(|event| {
                let date = event
                    .parsed_date()
                    .map(|d| d.format("%b %d, %Y").to_string())
                    .unwrap_or_else(|| event.date.clone());
                Row::new([
                    Cell::from(event.name.clone()),
                    Cell::from(date),
                    Cell::from(event.package_name().to_string()),
                    Cell::from(event.location.clone()),
                ])
            });
            let table = Table::new(
                rows,
                [
                    Constraint::Percentage(35),
                    Constraint::Percentage(20),
                    Constraint::Percentage(20),
                    Constraint::Percentage(25),
                ],
            )
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan));
            let mut state = TableState::default().with_selected(Some(self.selected));
            frame.render_stateful_widget(table, table_area, &mut state);
        }

        let footer = Line::from(vec![
            Span::styled(self.page_label(), Style::default().fg(Color::White)),
            Span::raw("  "),
            Span::styled(
                self.status.as_deref().filter(|_| !self.events.is_empty()).unwrap_or(""),
                Style::default().fg(Color::Red),
            ),
        ]);
        frame.render_widget(Paragraph::new(footer), footer_area);
    }
}
