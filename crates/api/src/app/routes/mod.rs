pub mod admin;
pub mod predict;
pub mod system;
