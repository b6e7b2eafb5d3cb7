pub mod action;
pub mod assertion;
pub mod backend;
pub mod cli;
pub mod config;
pub mod executor;
pub mod feature;
pub mod formatter;
pub mod page;
pub mod resolution;
pub mod steps;

pub use webship_common::error;
pub use webship_common::protocol;
