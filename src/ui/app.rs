//! Application state: the current view, the logged-in client and navigation.
//!
//! Views turn key presses into [`Action`]s; [`App::perform`] carries them
//! out, which may involve API calls and replacing the current view.
//! Replacing the camera view drops its [`CaptureSession`], which releases
//! the camera.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use super::topbar::{render_hints, render_top_bar};
use super::views::{CameraView, EventDetailsView, EventListView, ExperienceView, LoginView};
use crate::api::{ApiError, BoothClient};
use crate::booth::{BoothError, CaptureSession, Experience};
use crate::camera::SourceMode;
use crate::config::Config;
use crate::media::MediaStore;
use crate::preview::AsciiPreview;
use crate::route::Route;

pub const SESSION_EXPIRED: &str = "Session expired, please log in again";

/// Something a view asks the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Login { email: String, password: String },
    Logout,
    /// Fetch the event page the event list currently points at.
    LoadEvents,
    Navigate(Route),
    VerifyPin { event_id: i64, pin: String },
    OpenCamera {
        event_id: i64,
        mode: Experience,
        template_id: Option<i64>,
    },
    /// Upload the newest capture of the camera view.
    Upload,
}

/// The screen currently shown.
pub enum View {
    Login(LoginView),
    Events(EventListView),
    EventDetails(EventDetailsView),
    Experience(ExperienceView),
    Camera(Box<CameraView>),
}

impl View {
    pub fn route(&self) -> Route {
        match self {
            View::Login(_) => Route::Login,
            View::Events(_) => Route::Events,
            View::EventDetails(v) => Route::EventDetails(v.event_id),
            View::Experience(v) => Route::Experience(v.event_id),
            View::Camera(v) => v.route(),
        }
    }

    fn hints(&self) -> &'static str {
        match self {
            View::Login(_) => " Tab: next field  Enter: sign in  Esc: quit",
            View::Events(_) => {
                " ←/→: tab  ↑/↓: select  Enter: open  /: search  PgUp/PgDn: page  r: refresh  l: logout  q: quit"
            }
            View::EventDetails(_) => " Enter: start  r: reload  Esc: back  q: quit",
            View::Experience(_) => " Arrows: choose  t: template  Enter: open camera  Esc: back",
            View::Camera(_) => " Space: capture  u: upload  Esc: back",
        }
    }
}

pub struct App {
    client: Arc<BoothClient>,
    config: Config,
    source_mode: SourceMode,
    view: View,
    /// Where to go once logged in.
    pending_route: Option<Route>,
    should_quit: bool,
}

impl App {
    /// Start at the login screen; `initial_route` is opened after login.
    pub fn new(client: Arc<BoothClient>, config: Config, source_mode: SourceMode, initial_route: Option<Route>) -> Self {
        Self {
            client,
            config,
            source_mode,
            view: View::Login(LoginView::new()),
            pending_route: initial_route.filter(|r| r.requires_login()),
            should_quit: false,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn route(&self) -> Route {
        self.view.route()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn pending_route(&self) -> Option<Route> {
        self.pending_route
    }

    /// Periodic work: recording timers and auto-stop.
    pub fn tick(&mut self) {
        if let View::Camera(camera) = &mut self.view {
            camera.tick();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }
        match &mut self.view {
            View::Login(v) => v.handle_key(key),
            View::Events(v) => v.handle_key(key),
            View::EventDetails(v) => v.handle_key(key),
            View::Experience(v) => v.handle_key(key),
            View::Camera(v) => v.handle_key(key),
        }
    }

    /// Carry out `action` and whatever it leads to.
    pub async fn perform(&mut self, action: Action) {
        let mut next = Some(action);
        while let Some(action) = next.take() {
            log::debug!("Action: {:?}", action);
            next = self.apply(action).await;
        }
    }

    async fn apply(&mut self, action: Action) -> Option<Action> {
        match action {
            Action::Quit => {
                self.set_view(View::Login(LoginView::new()));
                self.should_quit = true;
                None
            }
            Action::Login { email, password } => self.login(&email, &password).await,
            Action::Logout => {
                self.client.logout();
                self.pending_route = None;
                self.set_view(View::Login(LoginView::new()));
                None
            }
            Action::LoadEvents => self.load_events().await,
            Action::Navigate(route) => self.navigate(route).await,
            Action::VerifyPin { event_id, pin } => self.verify_pin(event_id, &pin).await,
            Action::OpenCamera {
                event_id,
                mode,
                template_id,
            } => self.open_camera(event_id, mode, template_id),
            Action::Upload => self.upload().await,
        }
    }

    fn release_camera(&mut self) {
        if let View::Camera(camera) = &mut self.view {
            camera.session.release();
        }
    }

    /// Replace the current view, releasing the camera of a camera view first.
    fn set_view(&mut self, view: View) {
        self.release_camera();
        self.view = view;
    }

    /// Drop the tokens and return to login; `route` is reopened after the next login.
    fn expire_session(&mut self, route: Route) -> Option<Action> {
        log::warn!("Session expired on {}", route);
        self.client.logout();
        self.pending_route = Some(route).filter(|r| r.requires_login());
        self.set_view(View::Login(LoginView::with_error(SESSION_EXPIRED)));
        None
    }

    async fn login(&mut self, email: &str, password: &str) -> Option<Action> {
        match self.client.login(email, password).await {
            Ok(user) => {
                log::info!("Logged in as {}", user.display_name());
                Some(Action::Navigate(self.pending_route.take().unwrap_or(Route::Events)))
            }
            Err(e) => {
                let message = match e {
                    ApiError::InvalidCredentials => e.to_string(),
                    other => format!("Login failed: {}", other),
                };
                log::warn!("{}", message);
                if let View::Login(view) = &mut self.view {
                    view.busy = false;
                    view.error = Some(message);
                }
                None
            }
        }
    }

    async fn navigate(&mut self, route: Route) -> Option<Action> {
        if route.requires_login() && !self.client.is_authenticated() {
            self.pending_route = Some(route);
            self.set_view(View::Login(LoginView::new()));
            return None;
        }
        log::info!("Navigating to {}", route);

        match route {
            Route::Login => {
                self.set_view(View::Login(LoginView::new()));
                None
            }
            Route::Events => {
                self.set_view(View::Events(EventListView::new(self.config.booth.page_size)));
                Some(Action::LoadEvents)
            }
            Route::EventDetails(event_id) => {
                self.release_camera();
                let mut view = EventDetailsView::new(event_id, self.config.booth.require_pin);
                match self.client.get_event(event_id).await {
                    Ok(event) => view.apply_event(event),
                    Err(e) if e.is_unauthorized() => return self.expire_session(route),
                    Err(e) => {
                        log::error!("Failed to load event {}: {}", event_id, e);
                        view.apply_error();
                    }
                }
                self.view = View::EventDetails(view);
                None
            }
            Route::Experience(event_id) => {
                self.release_camera();
                let name = match self.client.get_event(event_id).await {
                    Ok(event) => event.name,
                    Err(e) if e.is_unauthorized() => return self.expire_session(route),
                    Err(e) => {
                        log::warn!("Failed to load event {}: {}", event_id, e);
                        format!("event {}", event_id)
                    }
                };
                let templates = self.client.get_templates(Some(event_id)).await.unwrap_or_else(|e| {
                    log::warn!("Failed to load templates: {}", e);
                    Vec::new()
                });
                self.view = View::Experience(ExperienceView::new(event_id, name, templates));
                None
            }
            Route::Camera { event_id, mode } => self.open_camera(event_id, mode, None),
        }
    }

    async fn load_events(&mut self) -> Option<Action> {
        let View::Events(view) = &mut self.view else {
            return None;
        };
        view.loading = true;
        let (page, page_size, tab) = (view.page, view.page_size, view.tab);
        let search = view.search_term().map(str::to_string);

        let result = self
            .client
            .get_events_paginated(page, page_size, Some(tab), search.as_deref())
            .await;

        // The view may have been replaced while waiting.
        let View::Events(view) = &mut self.view else {
            return None;
        };
        match result {
            Ok(events) => {
                log::debug!("Loaded {} of {} events", events.data.len(), events.count);
                view.apply_page(events)
            }
            Err(e) if e.is_unauthorized() => self.expire_session(Route::Events),
            Err(e) => {
                log::error!("Failed to load events: {}", e);
                view.apply_error(format!("Failed to load events: {}", e));
                None
            }
        }
    }

    async fn verify_pin(&mut self, event_id: i64, pin: &str) -> Option<Action> {
        let result = self.client.verify_event_pin(event_id, pin).await;
        let View::EventDetails(view) = &mut self.view else {
            return None;
        };
        match result {
            Ok(true) => {
                view.pin_entry = None;
                Some(Action::Navigate(Route::Experience(event_id)))
            }
            Ok(false) => {
                view.pin_rejected();
                None
            }
            Err(e) if e.is_unauthorized() => self.expire_session(Route::EventDetails(event_id)),
            Err(e) => {
                log::error!("PIN check failed: {}", e);
                view.pin_entry = None;
                view.status = Some(format!("PIN check failed: {}", e));
                None
            }
        }
    }

    fn open_camera(&mut self, event_id: i64, mode: Experience, template_id: Option<i64>) -> Option<Action> {
        // Close any previous camera before opening a new one.
        self.release_camera();

        let store = match MediaStore::new(self.config.media_dir()) {
            Ok(store) => store,
            Err(e) => {
                log::error!("Media directory {} unusable: {}", self.config.media_dir().display(), e);
                return Some(Action::Navigate(Route::Experience(event_id)));
            }
        };

        let preview = Arc::new(AsciiPreview::new(self.config.charset(), self.config.preview.invert));
        let mut session = CaptureSession::new(event_id, mode, store).with_template(template_id);
        // A failed start is shown in the session status line.
        let _ = session.start_camera(self.config.camera_settings(), self.source_mode, preview.clone());
        self.view = View::Camera(Box::new(CameraView::new(session, preview)));
        None
    }

    async fn upload(&mut self) -> Option<Action> {
        let View::Camera(camera) = &mut self.view else {
            return None;
        };
        let route = camera.route();
        match camera.session.upload_latest(&self.client).await {
            Err(BoothError::Api(e)) if e.is_unauthorized() => self.expire_session(route),
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let [top, body, bottom] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let user = self.client.user();
        let greeting = user.as_ref().filter(|_| self.client.is_authenticated());
        render_top_bar(frame, greeting, top);

        match &self.view {
            View::Login(v) => v.render(frame, body),
            View::Events(v) => v.render(frame, body),
            View::EventDetails(v) => v.render(frame, body),
            View::Experience(v) => v.render(frame, body),
            View::Camera(v) => v.render(frame, body),
        }

        render_hints(frame, self.view.hints(), bottom);
    }
}
