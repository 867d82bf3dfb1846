//! Pure data structures shared across the Iron Gate workspace.
//!
//! This crate has no pipeline logic: no regex, no scoring arithmetic, no
//! HTTP, no storage. It exists so `irongate-core`, `irongate-postgres`,
//! and `irongate-server` all agree on the same wire shapes without
//! depending on each other.

pub mod chain;
pub mod config;
pub mod conversation;
pub mod entity;
pub mod event;
pub mod pseudonym;
pub mod score;
pub mod timestamp;

pub use chain::{ChainEntry, ChainVerification};
pub use config::{FirmConfig, RouteThresholds};
pub use conversation::{ConversationTurn, MAX_TURNS, SESSION_TTL_MINUTES};
pub use entity::{DetectedEntity, EntitySource, EntityType};
pub use event::{CaptureMethod, EventAction, EventRecord};
pub use pseudonym::{PseudonymEntry, PseudonymMap};
pub use score::{ScoreBreakdown, SensitivityLevel, SensitivityScore};
