//! Capabilities consumed by the API layer.
//!
//! The HTTP layer never sees how sessions, members, the desktop or the
//! capture pipeline are implemented. It only talks to these traits.

pub mod capture;
pub mod desktop;
pub mod member;
pub mod session;

pub use capture::{CaptureError, CaptureManager};
pub use desktop::{DesktopError, DesktopManager, ScreenSize};
pub use member::{Member, MemberError, MemberManager, MemberProfile};
pub use session::{RoomSettings, Session, SessionError, SessionHandle, SessionManager, SessionState};
