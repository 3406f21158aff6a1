//! Line transport for the host bridge.
//!
//! Events are read in order. Install, activate and messages are handled
//! before the next line is read; each fetch is spawned onto the current
//! [`LocalSet`](tokio::task::LocalSet) so a slow navigation does not hold up
//! asset requests behind it. A single writer task owns the output and writes
//! one JSON line per reply.

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::bridge::{Bridge, Dispatch, HostReply};
use crate::host::Trigger;

/// Serve the bridge until `input` reaches end of file.
///
/// Must be polled inside a `LocalSet`. Returns once every in-flight fetch
/// has replied and the output has been flushed.
pub async fn serve<R, W>(
    mut bridge: Bridge, input: R, output: W, mut triggers: UnboundedReceiver<Trigger>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + 'static,
{
    let (replies, pending) = mpsc::unbounded_channel();
    let writer = tokio::task::spawn_local(write_replies(output, pending));

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match bridge.dispatch_line(&line).await {
            Dispatch::Reply(reply) => {
                while let Ok(trigger) = triggers.try_recv() {
                    send(&replies, HostReply::Control { trigger })?;
                }
                send(&replies, reply)?;
            }
            Dispatch::Fetch(task) => {
                let replies = replies.clone();
                tokio::task::spawn_local(async move {
                    let id = task.id();
                    if replies.send(task.run().await).is_err() {
                        tracing::warn!(id, "output closed before fetch reply was written");
                    }
                });
            }
        }
    }

    tracing::info!("input closed, waiting for in-flight fetches");
    drop(replies);

    writer.await?
}

fn send(replies: &UnboundedSender<HostReply>, reply: HostReply) -> Result<()> {
    replies.send(reply).map_err(|_| anyhow::anyhow!("reply writer stopped"))
}

async fn write_replies<W>(mut output: W, mut pending: UnboundedReceiver<HostReply>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(reply) = pending.recv().await {
        let mut line = serde_json::to_vec(&reply)?;
        line.push(b'\n');
        output.write_all(&line).await?;
        output.flush().await?;
    }
    Ok(())
}
