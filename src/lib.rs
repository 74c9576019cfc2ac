#![doc = include_str!("../README.md")]

pub mod cli;
pub mod each;
pub mod engine;
pub mod error;
pub mod log;
pub mod runtime;
pub mod shell;
pub mod types;

pub use each::*;
pub use error::*;
pub use types::*;
