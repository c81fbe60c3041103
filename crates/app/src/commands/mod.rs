pub mod admin;
pub mod seed;
pub mod show;
pub mod take;
