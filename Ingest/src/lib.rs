// src/lib.rs

//! Ingest: single-run data ingestion pipelines

pub mod error;
pub mod models;
pub mod parse;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
