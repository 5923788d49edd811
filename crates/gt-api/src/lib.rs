//! # gt-api
//!
//! REST gateway for the goal tracker.
//!
//! [`GoalsApi`] is the seam between page logic and the network. The
//! production implementation, [`HttpGoalsApi`], speaks JSON over HTTP to the
//! goals service (`/api/goals`) and the step generator
//! (`/api/ai/generate-steps`). Tests substitute in-memory implementations.
//!
//! ## Key components
//!
//! - [`GoalsApi`]: async trait covering every endpoint the client uses
//! - [`HttpGoalsApi`]: reqwest-backed implementation
//! - [`StepPatch`], [`GenerateStepsRequest`]: request bodies
//! - [`ClientConfig`]: base URL and owner id, from `gt.toml` and the environment

pub mod client;
pub mod config;
pub mod error;
pub mod wire;

pub use client::{GoalsApi, HttpGoalsApi};
pub use config::ClientConfig;
pub use error::ApiError;
pub use wire::{GenerateStepsRequest, GenerateStepsResponse, StepPatch};
