pub mod admin;
pub mod auth;
pub mod forum;
pub mod moods;
pub mod resources;
