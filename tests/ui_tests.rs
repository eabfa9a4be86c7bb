//! Booth UI flows against a mock backend, rendered with ratatui's TestBackend.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use selfie_booth::api::BoothClient;
use selfie_booth::booth::Experience;
use selfie_booth::camera::SourceMode;
use selfie_booth::config::Config;
use selfie_booth::route::Route;
use selfie_booth::ui::{Action, App, SESSION_EXPIRED, View};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn screen(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(120, 32)).unwrap();
    terminal.draw(|frame| app.render(frame)).unwrap();
    let buffer = terminal.backend().buffer().clone();
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Send keys, performing any action they produce.
async fn press(app: &mut App, keys: &[KeyCode]) {
    for code in keys {
        if let Some(action) = app.handle_key(key(*code)) {
            app.perform(action).await;
        }
    }
}

async fn type_text(app: &mut App, text: &str) {
    let keys: Vec<KeyCode> = text.chars().map(KeyCode::Char).collect();
    press(app, &keys).await;
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/create/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "a1", "refresh": "r1" })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Ada" })))
        .mount(server)
        .await;
}

async fn mount_event(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/events/5/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5,
            "name": "Summer Gala",
            "date": "2026-07-01T19:30:00",
            "location": "Rooftop"
        })))
        .mount(server)
        .await;
}

fn app(server: &MockServer, route: Option<Route>) -> (App, tempfile::TempDir) {
    let media = tempfile::TempDir::new().unwrap();
    let mut config = Config::default();
    config.media.dir = Some(media.path().to_path_buf());
    let client = Arc::new(BoothClient::new(&format!("{}/api", server.uri())).unwrap());
    (App::new(client, config, SourceMode::Simulated, route), media)
}

async fn log_in(app: &mut App) {
    type_text(app, "ada@example.com").await;
    press(app, &[KeyCode::Tab]).await;
    type_text(app, "pw").await;
    press(app, &[KeyCode::Enter]).await;
}

#[tokio::test]
async fn test_login_screen_renders() {
    let server = MockServer::start().await;
    let (app, _media) = app(&server, None);
    let text = screen(&app);
    assert!(text.contains("SelfieBooth"));
    assert!(text.contains("Sign in to SelfieBooth"));
    assert!(!text.contains("Welcome"));
    assert_eq!(app.route(), Route::Login);
}

#[tokio::test]
async fn test_rejected_login_shows_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/create/"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;
    let (mut app, _media) = app(&server, None);

    log_in(&mut app).await;

    assert_eq!(app.route(), Route::Login);
    assert!(screen(&app).contains("Invalid email or password"));
}

#[tokio::test]
async fn test_login_then_event_list() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .and(query_param("page", "1"))
        .and(query_param("date_filter", "gt"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 21,
            "data": [
                { "id": 5, "name": "Summer Gala", "date": "2026-07-01T19:30:00", "location": "Rooftop",
                  "package": { "name": "Premium" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let (mut app, _media) = app(&server, None);

    log_in(&mut app).await;

    assert_eq!(app.route(), Route::Events);
    let text = screen(&app);
    assert!(text.contains("Welcome, Ada"));
    assert!(text.contains("Summer Gala"));
    assert!(text.contains("Jul 01, 2026"));
    assert!(text.contains("Premium"));
    assert!(text.contains("Page 1 of 3"));
}

#[tokio::test]
async fn test_deep_link_opens_after_login() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_event(&server).await;
    let (mut app, _media) = app(&server, Some(Route::EventDetails(5)));
    assert_eq!(app.pending_route(), Some(Route::EventDetails(5)));

    log_in(&mut app).await;

    assert_eq!(app.route(), Route::EventDetails(5));
    assert!(app.pending_route().is_none());
    let text = screen(&app);
    assert!(text.contains("July 01, 2026 at 07:30 PM"));
    assert!(text.contains("No description available"));
}

#[tokio::test]
async fn test_unloadable_event_shows_error() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/events/8/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let (mut app, _media) = app(&server, Some(Route::EventDetails(8)));

    log_in(&mut app).await;

    assert!(screen(&app).contains("Unable to load event details"));
}

#[tokio::test]
async fn test_expired_session_returns_to_login() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/refresh/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let (mut app, _media) = app(&server, None);

    log_in(&mut app).await;

    assert_eq!(app.route(), Route::Login);
    assert_eq!(app.pending_route(), Some(Route::Events));
    assert!(screen(&app).contains(SESSION_EXPIRED));
}

#[tokio::test]
async fn test_experience_to_camera_and_back() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_event(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/events/5/templates/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 2, "name": "Confetti" }])))
        .mount(&server)
        .await;
    let (mut app, _media) = app(&server, Some(Route::Experience(5)));

    log_in(&mut app).await;
    assert_eq!(app.route(), Route::Experience(5));
    let text = screen(&app);
    assert!(text.contains("Summer Gala"));
    assert!(text.contains("Create a fun boomerang loop"));
    assert!(text.contains("Template: Confetti"));

    press(&mut app, &[KeyCode::Right, KeyCode::Enter]).await;
    assert_eq!(
        app.route(),
        Route::Camera {
            event_id: 5,
            mode: Experience::Gif
        }
    );
    match app.view() {
        View::Camera(camera) => {
            assert!(camera.session.is_camera_ready());
            assert_eq!(camera.session.template_id(), Some(2));
        }
        _ => panic!("expected camera view"),
    }
    assert!(screen(&app).contains("Space: start recording"));

    press(&mut app, &[KeyCode::Esc]).await;
    assert_eq!(app.route(), Route::Experience(5));
}

#[tokio::test]
async fn test_ctrl_c_quits_from_any_screen() {
    let server = MockServer::start().await;
    let (mut app, _media) = app(&server, None);
    let action = app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert_eq!(action, Some(Action::Quit));
    app.perform(Action::Quit).await;
    assert!(app.should_quit());
}

#[tokio::test]
async fn test_routes_need_login() {
    let server = MockServer::start().await;
    let (mut app, _media) = app(&server, None);
    app.perform(Action::Navigate(Route::Events)).await;
    assert_eq!(app.route(), Route::Login);
    assert_eq!(app.pending_route(), Some(Route::Events));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
