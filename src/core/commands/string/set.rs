// src/core/commands/string/set.rs

//! Implements the `SET` command: `SET key value [EX seconds | PX milliseconds]`.

use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::helpers::{extract_bytes, extract_string};
use crate::core::protocol::RespFrame;
use crate::core::state::ExecutionContext;
use crate::core::{CitrineError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// The optional time-to-live clause of `SET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TtlOption {
    #[default]
    None,
    Seconds(u64),
    Milliseconds(u64),
}

impl TtlOption {
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            TtlOption::None => None,
            TtlOption::Seconds(s) => Some(Duration::from_secs(*s)),
            TtlOption::Milliseconds(ms) => Some(Duration::from_millis(*ms)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Set {
    pub key: Bytes,
    pub value: Bytes,
    pub ttl: TtlOption,
}

impl ParseCommand for Set {
    fn parse(args: &[RespFrame]) -> Result<Self, CitrineError> {
        if args.len() != 2 && args.len() != 4 {
            return Err(CitrineError::WrongArgumentCount("SET".to_string()));
        }
        let key = extract_bytes(&args[0])?;
        let value = extract_bytes(&args[1])?;

        let ttl = if args.len() == 4 {
            let unit = extract_string(&args[2])?;
            let amount: u64 = extract_string(&args[3])?.parse()?;
            match unit.to_ascii_uppercase().as_str() {
                "EX" => TtlOption::Seconds(amount),
                "PX" => TtlOption::Milliseconds(amount),
                _ => return Err(CitrineError::SyntaxError),
            }
        } else {
            TtlOption::None
        };

        Ok(Set { key, value, ttl })
    }
}

#[async_trait]
impl ExecutableCommand for Set {
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<RespValue, CitrineError> {
        ctx.state
            .keyspace
            .set(self.key.clone(), self.value.clone(), self.ttl.as_duration());
        Ok(RespValue::SimpleString("OK".to_string()))
    }
}
