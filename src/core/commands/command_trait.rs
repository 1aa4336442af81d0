// src/core/commands/command_trait.rs

//! Defines the core traits implemented by every command.

use crate::core::protocol::RespFrame;
use crate::core::state::ExecutionContext;
use crate::core::{CitrineError, RespValue};
use async_trait::async_trait;

/// A trait for the actual execution logic of a command.
/// Implemented by each command's struct (e.g., `Get`, `Set`).
#[async_trait]
pub trait ExecutableCommand {
    /// The core logic for the command's execution. Either produces a typed
    /// reply or an error; the connection handler encodes whichever it gets.
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<RespValue, CitrineError>;
}

/// A trait for parsing a command's arguments from a slice of `RespFrame`.
pub trait ParseCommand: Sized {
    /// Parses the arguments and returns an instance of the command struct.
    fn parse(args: &[RespFrame]) -> Result<Self, CitrineError>;
}
