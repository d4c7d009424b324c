//! CLI 명령어 구현

pub mod compile;
pub mod input;
pub mod run;
pub mod tables;
