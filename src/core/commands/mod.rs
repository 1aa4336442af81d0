// src/core/commands/mod.rs

//! This module defines all supported commands, organizes them into categories,
//! and provides the central `Command` enum that encapsulates their parsed
//! state. Dispatch is a plain exhaustive match: the command table is small
//! enough that no macro is worth its indirection.

use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::helpers::extract_string;
use crate::core::protocol::RespFrame;
use crate::core::state::ExecutionContext;
use crate::core::{CitrineError, RespValue};
use tracing::warn;

pub mod command_trait;
pub mod generic;
pub mod helpers;
pub mod list;
pub mod streams;
pub mod string;

use generic::{Echo, Ping, TypeCmd};
use list::{BLPop, LLen, LPop, LPush, LRange, RPush};
use streams::{XAdd, XRange, XRead};
use string::{Get, Set};

/// All commands the server understands, in parsed form.
#[derive(Debug, Clone)]
pub enum Command {
    Ping(Ping),
    Echo(Echo),
    Set(Set),
    Get(Get),
    RPush(RPush),
    LPush(LPush),
    LRange(LRange),
    LLen(LLen),
    LPop(LPop),
    BLPop(BLPop),
    Type(TypeCmd),
    XAdd(XAdd),
    XRange(XRange),
    XRead(XRead),
}

impl TryFrom<RespFrame> for Command {
    type Error = CitrineError;

    /// Turns a decoded command frame into a parsed `Command`. Command names
    /// are ASCII and case-insensitive; an unrecognized name is a per-command
    /// error, not a connection-fatal one.
    fn try_from(frame: RespFrame) -> Result<Self, Self::Error> {
        let RespFrame::Array(parts) = frame else {
            return Err(CitrineError::Protocol(
                "command frame must be an array of bulk strings".to_string(),
            ));
        };
        let Some((name_frame, args)) = parts.split_first() else {
            return Err(CitrineError::Protocol(
                "empty command frame".to_string(),
            ));
        };
        let name = extract_string(name_frame)?.to_ascii_uppercase();

        match name.as_str() {
            "PING" => Ok(Command::Ping(Ping::parse(args)?)),
            "ECHO" => Ok(Command::Echo(Echo::parse(args)?)),
            "SET" => Ok(Command::Set(Set::parse(args)?)),
            "GET" => Ok(Command::Get(Get::parse(args)?)),
            "RPUSH" => Ok(Command::RPush(RPush::parse(args)?)),
            "LPUSH" => Ok(Command::LPush(LPush::parse(args)?)),
            "LRANGE" => Ok(Command::LRange(LRange::parse(args)?)),
            "LLEN" => Ok(Command::LLen(LLen::parse(args)?)),
            "LPOP" => Ok(Command::LPop(LPop::parse(args)?)),
            "BLPOP" => Ok(Command::BLPop(BLPop::parse(args)?)),
            "TYPE" => Ok(Command::Type(TypeCmd::parse(args)?)),
            "XADD" => Ok(Command::XAdd(XAdd::parse(args)?)),
            "XRANGE" => Ok(Command::XRange(XRange::parse(args)?)),
            "XREAD" => Ok(Command::XRead(XRead::parse(args)?)),
            _ => {
                warn!("unknown command: {name}");
                Err(CitrineError::UnknownCommand(name))
            }
        }
    }
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ping(_) => "ping",
            Command::Echo(_) => "echo",
            Command::Set(_) => "set",
            Command::Get(_) => "get",
            Command::RPush(_) => "rpush",
            Command::LPush(_) => "lpush",
            Command::LRange(_) => "lrange",
            Command::LLen(_) => "llen",
            Command::LPop(_) => "lpop",
            Command::BLPop(_) => "blpop",
            Command::Type(_) => "type",
            Command::XAdd(_) => "xadd",
            Command::XRange(_) => "xrange",
            Command::XRead(_) => "xread",
        }
    }

    /// Executes the command against the shared state.
    pub async fn execute(&self, ctx: &mut ExecutionContext) -> Result<RespValue, CitrineError> {
        match self {
            Command::Ping(cmd) => cmd.execute(ctx).await,
            Command::Echo(cmd) => cmd.execute(ctx).await,
            Command::Set(cmd) => cmd.execute(ctx).await,
            Command::Get(cmd) => cmd.execute(ctx).await,
            Command::RPush(cmd) => cmd.execute(ctx).await,
            Command::LPush(cmd) => cmd.execute(ctx).await,
            Command::LRange(cmd) => cmd.execute(ctx).await,
            Command::LLen(cmd) => cmd.execute(ctx).await,
            Command::LPop(cmd) => cmd.execute(ctx).await,
            Command::BLPop(cmd) => cmd.execute(ctx).await,
            Command::Type(cmd) => cmd.execute(ctx).await,
            Command::XAdd(cmd) => cmd.execute(ctx).await,
            Command::XRange(cmd) => cmd.execute(ctx).await,
            Command::XRead(cmd) => cmd.execute(ctx).await,
        }
    }
}
