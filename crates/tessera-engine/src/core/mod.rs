//! Core engine-facing contracts.
//!
//! This module defines the interface between the host runtime (platform loop)
//! and the application, plus the per-tick acquire/render/present sequencing.

mod app;
mod tick;

pub use app::{App, FrameInfo, LaunchInfo};
pub use tick::{drive_tick, FramePresenter, TickOutcome};
