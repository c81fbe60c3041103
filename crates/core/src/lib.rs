#![forbid(unsafe_code)]

pub mod defaults;
pub mod model;
pub mod resolver;
pub mod scoring;
pub mod time;

pub use time::Clock;
