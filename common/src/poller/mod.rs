// Change detection over periodic listings

pub mod engine;
pub mod seen;

pub use engine::{ChangePoller, Notification};
pub use seen::SeenSet;
