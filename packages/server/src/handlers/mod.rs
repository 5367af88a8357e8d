pub mod admin;
pub mod media;
pub mod next_up;
