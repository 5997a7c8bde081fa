//! Automatic Login
//!
//! Prompt recognition state machine and the queue of answers waiting to
//! be sent to the console.

mod queue;
mod recognizer;
mod state;

pub use queue::OutboundQueue;
pub use recognizer::{PromptRecognizer, PromptRule, Transition, PASSWORD_PROMPT};
pub use state::LoginState;
