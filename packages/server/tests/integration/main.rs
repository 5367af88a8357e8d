mod common;

mod leaderboard;
mod submission;
mod voting;
