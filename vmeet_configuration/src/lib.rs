//! Configuration constants shared by the meeting crates
mod common;

pub use common::*;
