//! Session controller.
//!
//! The [`SessionController`] is the only writer of the session phase. It
//! runs the startup check against the token store and the backend, performs
//! login and logout, and hands views an authenticated request function that
//! ends the session when the backend rejects the token.

mod controller;
mod phase;

pub use controller::SessionController;
pub use phase::SessionPhase;
