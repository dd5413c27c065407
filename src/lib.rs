pub mod browser;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod pages;
pub mod routes;
pub mod scenarios;
pub mod selectors;
pub mod ui;
pub mod wait;

//  Re-export commonly used items
pub use browser::{ChromeDriver, ChromeElement, ChromePage, ConnectionMode};
pub use config::{Credentials, Settings};
pub use diagnostics::{Diagnostics, FailureRecord};
pub use error::{E2eError, Result};
pub use pages::{
    ChannelChoice, ForYouPage, HomePage, LoginPage, PlaybackState, PlayerPage, UsernameOutcome,
};
pub use routes::HrefMatcher;
pub use scenarios::{Scenario, ScenarioContext};
pub use ui::{UiElement, UiHandle};
pub use wait::{
    CarouselScanner, ElementState, ModalDismisser, ModalOutcome, PollResult, Poller, Probe,
    ScanCursor, ScanOutcome, ScanSummary,
};
