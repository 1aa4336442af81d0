// src/core/commands/list/blpop.rs

//! Implements the `BLPOP` command.

use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::helpers::{extract_bytes, extract_string, validate_arg_count};
use crate::core::protocol::RespFrame;
use crate::core::state::ExecutionContext;
use crate::core::{CitrineError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Represents the `BLPOP` command with its parsed arguments. A timeout of
/// `None` waits forever (the wire form `0`).
#[derive(Debug, Clone, Default)]
pub struct BLPop {
    pub key: Bytes,
    pub timeout: Option<Duration>,
}

impl ParseCommand for BLPop {
    fn parse(args: &[RespFrame]) -> Result<Self, CitrineError> {
        validate_arg_count(args, 2, "BLPOP")?;
        let key = extract_bytes(&args[0])?;
        let timeout_secs: f64 = extract_string(&args[1])?.parse()?;
        let timeout = if timeout_secs == 0.0 {
            None
        } else if timeout_secs < 0.0 {
            return Err(CitrineError::NegativeTimeout);
        } else {
            Some(Duration::from_secs_f64(timeout_secs))
        };
        Ok(BLPop { key, timeout })
    }
}

#[async_trait]
impl ExecutableCommand for BLPop {
    /// Executes the `BLPOP` command. The blocking logic, including the
    /// check-then-register atomicity, lives in the central `BlockerManager`.
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<RespValue, CitrineError> {
        let state = ctx.state.clone();
        state
            .blocker_manager
            .orchestrate_blocking_pop(&state.keyspace, &self.key, self.timeout, ctx.session_id)
            .await
    }
}
