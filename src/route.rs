//! Screen routes, written as URL-like paths such as `/camera_test/12?mode=gif`.

use std::fmt;

use crate::booth::Experience;

/// A screen of the booth UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Events,
    EventDetails(i64),
    Experience(i64),
    Camera { event_id: i64, mode: Experience },
}

impl Route {
    /// Parse a route path. Unknown paths and malformed ids give `None`;
    /// an unknown or missing camera mode means photo.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.trim();
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] | ["login"] => Some(Route::Login),
            ["events"] => Some(Route::Events),
            ["event", id] => id.parse().ok().map(Route::EventDetails),
            ["experience", id] => id.parse().ok().map(Route::Experience),
            ["camera_test", id] => {
                let event_id = id.parse().ok()?;
                let mode = query
                    .and_then(|q| {
                        q.split('&')
                            .filter_map(|pair| pair.split_once('='))
                            .find(|(key, _)| *key == "mode")
                            .map(|(_, value)| value)
                    })
                    .and_then(Experience::parse)
                    .unwrap_or_default();
                Some(Route::Camera { event_id, mode })
            }
            _ => None,
        }
    }

    /// Where Esc leads from here.
    pub fn parent(self) -> Route {
        match self {
            Route::Login | Route::Events => Route::Login,
            Route::EventDetails(_) => Route::Events,
            Route::Experience(id) => Route::EventDetails(id),
            Route::Camera { event_id, .. } => Route::Experience(event_id),
        }
    }

    /// Whether the screen needs a logged-in user.
    pub fn requires_login(self) -> bool {
        self != Route::Login
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Login => write!(f, "/"),
            Route::Events => write!(f, "/events"),
            Route::EventDetails(id) => write!(f, "/event/{}", id),
            Route::Experience(id) => write!(f, "/experience/{}", id),
            Route::Camera { event_id, mode } => {
                write!(f, "/camera_test/{}?mode={}", event_id, mode.as_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_routes() {
        assert_eq!(Route::parse("/"), Some(Route::Login));
        assert_eq!(Route::parse(""), Some(Route::Login));
        assert_eq!(Route::parse("/events"), Some(Route::Events));
        assert_eq!(Route::parse("/event/42"), Some(Route::EventDetails(42)));
        assert_eq!(Route::parse("/experience/42/"), Some(Route::Experience(42)));
    }

    #[test]
    fn test_parse_camera_modes() {
        assert_eq!(
            Route::parse("/camera_test/12?mode=gif"),
            Some(Route::Camera {
                event_id: 12,
                mode: Experience::Gif
            })
        );
        assert_eq!(
            Route::parse("/camera_test/12?x=1&mode=boomerang"),
            Some(Route::Camera {
                event_id: 12,
                mode: Experience::Boomerang
            })
        );
        assert_eq!(
            Route::parse("/camera_test/12?mode=hologram"),
            Some(Route::Camera {
                event_id: 12,
                mode: Experience::Photo
            })
        );
        assert_eq!(
            Route::parse("/camera_test/12"),
            Some(Route::Camera {
                event_id: 12,
                mode: Experience::Photo
            })
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Route::parse("/event/abc"), None);
        assert_eq!(Route::parse("/settings"), None);
        assert_eq!(Route::parse("/camera_test/?mode=gif"), None);
    }

    #[test]
    fn test_display_round_trips() {
        let routes = [
            Route::Login,
            Route::Events,
            Route::EventDetails(5),
            Route::Experience(5),
            Route::Camera {
                event_id: 5,
                mode: Experience::Video,
            },
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.to_string()), Some(route));
        }
        assert_eq!(
            Route::Camera {
                event_id: 9,
                mode: Experience::Gif
            }
            .to_string(),
            "/camera_test/9?mode=gif"
        );
    }

    #[test]
    fn test_parent_chain() {
        let camera = Route::Camera {
            event_id: 3,
            mode: Experience::Photo,
        };
        assert_eq!(camera.parent(), Route::Experience(3));
        assert_eq!(Route::Experience(3).parent(), Route::EventDetails(3));
        assert_eq!(Route::EventDetails(3).parent(), Route::Events);
        assert!(!Route::Login.requires_login());
        assert!(Route::Events.requires_login());
    }
}
