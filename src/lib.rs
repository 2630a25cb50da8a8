#![allow(
    clippy::doc_markdown,
    reason = "These rules should not apply to the readme."
)]
#![doc = include_str!("../README.md")]

pub mod config;
pub mod curves;
pub mod error;
pub mod grid;
pub mod methods;
pub mod perlin;
pub mod prelude;
pub mod profile;
pub mod report;
pub mod rng;
pub mod runner;
pub mod verify;
