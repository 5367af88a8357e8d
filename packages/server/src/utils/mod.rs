pub mod competitor;
pub mod csv;
pub mod filename;
pub mod hashing;
pub mod settings;
pub mod voting_window;
