//! Page objects for the SiriusXM site.
//!
//! Each page borrows the [`UiHandle`](crate::ui::UiHandle) it drives; flaky
//! steps are wrapped in [`Diagnostics::guard`](crate::diagnostics::Diagnostics::guard)
//! so a screenshot exists before the error reaches the scenario.

pub mod for_you;
pub mod home;
pub mod login;
pub mod player;

pub use for_you::{ChannelChoice, ForYouPage};
pub use home::HomePage;
pub use login::{LoginPage, UsernameOutcome};
pub use player::{PlaybackState, PlayerPage};
