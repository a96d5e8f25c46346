mod email;

pub use email::{EmailNotifier, SentConfirmation};
