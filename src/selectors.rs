//! Selectors the page objects rely on.
//!
//! These mirror the player's current `data-qa` markup and break whenever the
//! site changes it.

// Marketing homepage
pub const GLOBAL_NAV: &str = "nav[data-componenttype='Global Nav']";
pub const LINK: &str = "a";
pub const START_LISTENING_TEXT: &str = "Start Listening";

// Login flow
pub const EMAIL_FIELD: &str = "input[data-qa='email-field']";
pub const SUBMIT_EMAIL: &str = "button[data-qa='submit-auth-email']";
pub const AUTH_METHOD_MODAL: &str = "div[data-qa='content-overlay-modal']";
pub const PASSWORD_AUTH_OPTION: &str = "div[data-qa='password-auth-option']";
pub const SUBMIT_AUTH_OPTION: &str = "button[data-qa='submit-auth-option']";
pub const PASSWORD_AUTH_FORM: &str = "form[data-qa='password-auth-form']";
pub const PASSWORD_FIELD: &str = "input[data-qa='password-field']";
pub const SIGN_IN: &str = "button[data-qa='sign-in']";
pub const COOKIE_ACCEPT: &str = "button#onetrust-accept-btn-handler";
pub const INVALID_USERNAME_TEXT: &str = "We can't find a match";

// Player navigation
pub const FOR_YOU_NAV: &str = "a[data-qa='content-nav-for-you']";
pub const MUSIC_NAV: &str = "a[data-qa='content-nav-music']";

// Carousels
pub const CAROUSEL: &str = "[data-qa='carousel']";
pub const CAROUSEL_ITEM: &str = "a[href]";
pub const CAROUSEL_NEXT: &str = "button[data-qa='carousel-next']";

// Transport controls, distinguished by their aria-label prefix
pub const TRANSPORT_BUTTON: &str = "button[aria-label^='Play'], button[aria-label^='Pause']";
pub const PLAY_LABEL_PREFIX: &str = "Play";
pub const PAUSE_LABEL_PREFIX: &str = "Pause";

// Overlay that can follow a playback-triggering action
pub const PLAYBACK_MODAL: &str = "[data-qa='content-overlay-modal']";
pub const PLAYBACK_MODAL_CLOSE: &str = "button[data-qa='close-modal']";

/// Rendered channel-linear links, used to tell when the For You carousels
/// have been populated.
pub const VISIBLE_CHANNEL_LINKS_SCRIPT: &str = r#"
    Array.from(document.querySelectorAll('a[href*="channel-linear"]'))
        .some(el => el.offsetParent !== null)
"#;
