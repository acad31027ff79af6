//! A ratatui terminal whose output is written into an SSH channel.

use std::io;

use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use russh::server::Handle;
use russh::{ChannelId, CryptoVec};
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tracing::debug;

/// The terminal type driven for every SSH session channel.
pub type SshTerminal = Terminal<CrosstermBackend<ChannelWriter>>;

enum Outgoing {
    Data(Vec<u8>),
    Close,
}

/// Buffered writer that forwards each flush to an SSH channel.
///
/// Writes are queued to a background task, which preserves their order
/// relative to [`ChannelOutput::close`].
pub struct ChannelWriter {
    sender: UnboundedSender<Outgoing>,
    sink: Vec<u8>,
}

impl ChannelWriter {
    /// Spawns the forwarding task for `channel`.
    pub fn start(handle: Handle, channel: ChannelId) -> Self {
        let (sender, mut receiver) = unbounded_channel();

        tokio::spawn(async move {
            while let Some(message) = receiver.recv().await {
                match message {
                    Outgoing::Data(bytes) => {
                        if handle.data(channel, CryptoVec::from(bytes)).await.is_err() {
                            debug!(?channel, "Channel gone, dropping output");
                            break;
                        }
                    }
                    Outgoing::Close => {
                        let _ = handle.exit_status_request(channel, 0).await;
                        let _ = handle.eof(channel).await;
                        let _ = handle.close(channel).await;
                        debug!(?channel, "Channel closed");
                        break;
                    }
                }
            }
        });

        Self {
            sender,
            sink: Vec::new(),
        }
    }

    /// A handle onto the same output queue.
    pub fn output(&self) -> ChannelOutput {
        ChannelOutput {
            sender: self.sender.clone(),
        }
    }
}

impl io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.sink.is_empty() {
            return Ok(());
        }
        let bytes = std::mem::take(&mut self.sink);
        self.sender
            .send(Outgoing::Data(bytes))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "channel writer stopped"))
    }
}

/// The output queue of one SSH channel, shared by every writer onto it.
#[derive(Clone)]
pub struct ChannelOutput {
    sender: UnboundedSender<Outgoing>,
}

impl ChannelOutput {
    /// A fresh writer queueing onto this channel.
    pub fn writer(&self) -> ChannelWriter {
        ChannelWriter {
            sender: self.sender.clone(),
            sink: Vec::new(),
        }
    }

    /// Sends exit status 0, EOF and close, in that order.
    pub fn close(&self) {
        // The task is already gone if the client disconnected first.
        let _ = self.sender.send(Outgoing::Close);
    }
}
