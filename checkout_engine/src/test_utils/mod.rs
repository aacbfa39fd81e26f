//! Test doubles for the collaborator traits, plus fixtures shared by unit, integration and cucumber tests.
mod fake_storefront;
mod manual_scheduler;
pub mod prepare_env;
mod recording_cart;

pub use fake_storefront::FakeStorefront;
pub use manual_scheduler::ManualScheduler;
pub use prepare_env::{prepare_test_env, sample_address, sample_cart};
pub use recording_cart::RecordingCartStore;
