//! Batch video transcoding on top of FFmpeg.
//!
//! Picks hardware encoders for the detected platform (NVENC or
//! VideoToolbox) and falls back to software and then a safe, maximally
//! compatible encode when an attempt fails.

pub mod cli;
pub mod config;
pub mod engine;
pub mod stats;
