//! Reference tool handlers grounding the end-to-end test scenarios.
//!
//! `add` is fully synchronous, `pii` and `welcome` are elicitation-gated,
//! and `count` is autonomous and multi-phase -- together they exercise
//! every path through the status state machine.

pub mod add;
pub mod count;
pub mod pii;
pub mod welcome;

pub use add::AddHandler;
pub use count::CountHandler;
pub use pii::PiiHandler;
pub use welcome::WelcomeHandler;
