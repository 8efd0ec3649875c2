// Core transcoding engine - independent of the CLI

pub mod batch;
pub mod core;
pub mod hardware;
pub mod worker;

pub use batch::{BatchError, BatchProcessor, FileFailure, PlannedFile};
pub use core::*;
pub use hardware::{GpuCheck, PlatformDetector, detect_platform, detect_platform_for};
