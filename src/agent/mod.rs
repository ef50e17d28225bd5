//! Agents: bounded conversations, the tool dispatch loop and routing.

pub mod agent;
pub mod conversation;
pub mod coordinator;

pub use agent::{fallback_message, Agent};
pub use conversation::Conversation;
pub use coordinator::{Coordinator, CoordinatorOptions};
