// Warranty lifecycle derivation
pub mod classifier;
pub mod countdown;
pub mod progress;
pub mod ticker;

pub use classifier::{classify, EXPIRY_WARNING_WINDOW_DAYS};
pub use countdown::{countdown, COARSE_DISPLAY_MIN_DAYS};
pub use progress::progress;
pub use ticker::{CountdownSubscription, CountdownTicker, TICK_PERIOD};
