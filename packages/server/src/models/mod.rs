pub mod admin;
pub mod next_up;
pub mod shared;
