//! Test helpers shared across MSME assistant crates.

pub mod engine;
pub mod server;
pub mod store;

pub use engine::{FailingChatEngine, FixedChatEngine, RecordingChatEngine};
pub use server::{TEST_ADMIN_PASSWORD, TEST_ADMIN_USER, memory_state, spawn_app, test_state};
pub use store::FailingStore;
