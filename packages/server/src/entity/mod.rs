pub mod competitor;
pub mod submission;
pub mod vote;
pub mod vote_otp;
pub mod voting_settings;
