pub mod carousel;
pub mod conditions;
pub mod modal;
pub mod poller;

pub use carousel::{CarouselScanner, ScanCursor, ScanOutcome, ScanSummary};
pub use conditions::{
    wait_for_attribute, wait_for_script, wait_for_selector, wait_for_url, wait_visible,
    ElementState,
};
pub use modal::{ModalDismisser, ModalOutcome};
pub use poller::{PollResult, Poller, Probe};
