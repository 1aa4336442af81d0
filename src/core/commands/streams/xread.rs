// src/core/commands/streams/xread.rs

//! Implements the `XREAD` command for reading entries from one or more
//! streams, optionally blocking until one of them receives an append.

use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::helpers::{extract_bytes, extract_string};
use crate::core::commands::streams::xrange::format_entry;
use crate::core::protocol::RespFrame;
use crate::core::state::ExecutionContext;
use crate::core::storage::keyspace::XReadStart;
use crate::core::storage::stream::StreamEntry;
use crate::core::{CitrineError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;
use futures::future::select_all;
use std::time::Duration;
use tracing::debug;

/// The parsed `XREAD` command. A `block_timeout` of `Some(ZERO)` waits
/// forever; `None` makes the command non-blocking.
#[derive(Debug, Clone, Default)]
pub struct XRead {
    pub streams: Vec<(Bytes, XReadStart)>,
    pub block_timeout: Option<Duration>,
}

impl ParseCommand for XRead {
    /// Parses `XREAD [BLOCK ms] STREAMS k... id... [BLOCK ms]`.
    ///
    /// `BLOCK` is accepted both before `STREAMS` (the conventional spot) and
    /// trailing after the id list. A trailing `BLOCK <ms>` pair is never a
    /// valid key/id tail — ids are `<ms>-<seq>` or `$` — so stripping it
    /// first is unambiguous.
    fn parse(args: &[RespFrame]) -> Result<Self, CitrineError> {
        let mut cmd = XRead::default();
        let mut i = 0;

        while i < args.len() {
            let keyword = extract_string(&args[i])?;
            match keyword.to_ascii_lowercase().as_str() {
                "block" => {
                    i += 1;
                    if i >= args.len() {
                        return Err(CitrineError::SyntaxError);
                    }
                    let ms: u64 = extract_string(&args[i])?.parse()?;
                    cmd.block_timeout = Some(Duration::from_millis(ms));
                    i += 1;
                }
                "streams" => {
                    i += 1;
                    let mut rest = &args[i..];
                    // Strip a trailing `BLOCK <ms>` before splitting the list.
                    if cmd.block_timeout.is_none()
                        && rest.len() >= 2
                        && let Ok(kw) = extract_string(&rest[rest.len() - 2])
                        && kw.eq_ignore_ascii_case("block")
                        && let Ok(tail) = extract_string(&rest[rest.len() - 1])
                        && let Ok(ms) = tail.parse::<u64>()
                    {
                        cmd.block_timeout = Some(Duration::from_millis(ms));
                        rest = &rest[..rest.len() - 2];
                    }

                    if rest.is_empty() || rest.len() % 2 != 0 {
                        return Err(CitrineError::WrongArgumentCount("XREAD".to_string()));
                    }
                    let num_streams = rest.len() / 2;
                    for (key_frame, id_frame) in
                        rest[..num_streams].iter().zip(&rest[num_streams..])
                    {
                        let key = extract_bytes(key_frame)?;
                        let id_str = extract_string(id_frame)?;
                        let start = if id_str == "$" {
                            XReadStart::Last
                        } else {
                            XReadStart::At(id_str.parse()?)
                        };
                        cmd.streams.push((key, start));
                    }
                    break;
                }
                _ => return Err(CitrineError::SyntaxError),
            }
        }

        if cmd.streams.is_empty() {
            return Err(CitrineError::WrongArgumentCount("XREAD".to_string()));
        }
        Ok(cmd)
    }
}

#[async_trait]
impl ExecutableCommand for XRead {
    /// Executes `XREAD`, handling both the synchronous and blocking cases.
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<RespValue, CitrineError> {
        let keyspace = &ctx.state.keyspace;

        // --- Phase 1: synchronous pass ---
        let pass = keyspace.xread_resolve(&self.streams)?;
        if !pass.results.is_empty() || self.block_timeout.is_none() {
            // Without BLOCK an all-empty read is an empty array, not null.
            return Ok(format_results(pass.results));
        }

        // --- Phase 2: arm the notification handles, then re-check ---
        // The handles are edge-triggered, so registration must precede the
        // re-read: an append landing in the gap is caught by the re-read,
        // and an append after it wakes the armed futures.
        let watches = pass.watches;
        let mut notified: Vec<_> = watches
            .iter()
            .map(|w| Box::pin(w.notify.notified()))
            .collect();
        for n in notified.iter_mut() {
            n.as_mut().enable();
        }
        let recheck = keyspace.xread_collect(&watches)?;
        if !recheck.is_empty() {
            return Ok(format_results(recheck));
        }

        // --- Phase 3: sleep until the first edge on any stream, or timeout ---
        let timeout = self.block_timeout.unwrap();
        debug!(
            "Session {}: XREAD blocking on {} stream(s), timeout {:?}",
            ctx.session_id,
            watches.len(),
            timeout
        );
        let wait_any = select_all(notified);
        let woken = if timeout.is_zero() {
            wait_any.await;
            true
        } else {
            tokio::time::timeout(timeout, wait_any).await.is_ok()
        };
        if !woken {
            return Ok(RespValue::NullArray);
        }

        // Woken by an append somewhere; re-read every watched stream against
        // its resolved start id and report the ones that produced data.
        let results = keyspace.xread_collect(&watches)?;
        Ok(format_results(results))
    }
}

/// Formats the reply: one `[stream-key, [entries...]]` element per stream
/// that produced data.
fn format_results(results: Vec<(Bytes, Vec<StreamEntry>)>) -> RespValue {
    RespValue::Array(
        results
            .into_iter()
            .map(|(key, entries)| {
                RespValue::Array(vec![
                    RespValue::BulkString(key),
                    RespValue::Array(entries.iter().map(format_entry).collect()),
                ])
            })
            .collect(),
    )
}
