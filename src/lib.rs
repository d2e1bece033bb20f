// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod captain;
pub mod config;
pub mod fpl;
pub mod llm;
pub mod recommend;
