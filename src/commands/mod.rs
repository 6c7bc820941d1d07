pub mod accept;
pub mod config;
pub mod count;
pub mod expire;
pub mod plan;
