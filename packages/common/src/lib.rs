pub mod mail;
pub mod media;
pub mod status;
pub mod turnstile;

pub use status::{CompetitorStatus, SubmissionStatus};
