//! One module per screen. Each view owns its state, turns keys into
//! [`Action`](super::app::Action)s and renders itself.

mod camera;
mod event_details;
mod event_list;
mod experience;
mod login;

pub use camera::CameraView;
pub use event_details::{EventDetailsView, LOAD_ERROR, NO_DESCRIPTION};
pub use event_list::{DEFAULT_PAGE_SIZE, EventListView};
pub use experience::ExperienceView;
pub use login::{LoginField, LoginView};
