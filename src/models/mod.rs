// src/models/mod.rs

pub mod task;
