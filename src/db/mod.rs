// src/db/mod.rs

pub mod identifier;
pub mod provision;

pub use provision::provision;
