//! Per-connection SSH handler.

use std::collections::HashMap;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crossterm::cursor::Hide;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::widgets::Paragraph;
use ratatui::{Terminal, TerminalOptions, Viewport};
use russh::keys::ssh_key::PublicKey;
use russh::server::{Auth, Handler, Msg, Server, Session};
use russh::{Channel, ChannelId, Pty};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use super::terminal::{ChannelOutput, ChannelWriter, SshTerminal};
use crate::input::decode_keys;
use crate::session::{Flow, SessionController};

/// Allocates a fresh [`ConnectionHandler`] for every inbound connection
/// and keeps count of the connections still open.
#[derive(Debug, Clone)]
pub struct GameServer {
    open: Arc<watch::Sender<usize>>,
}

impl GameServer {
    /// Creates the server handler factory.
    pub fn new() -> Self {
        Self {
            open: Arc::new(watch::channel(0).0),
        }
    }

    /// Number of connections whose handler is still alive.
    pub fn open_connections(&self) -> usize {
        *self.open.borrow()
    }

    /// Watches the open connection count.
    pub fn watch_open_connections(&self) -> watch::Receiver<usize> {
        self.open.subscribe()
    }
}

impl Default for GameServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Server for GameServer {
    type Handler = ConnectionHandler;

    fn new_client(&mut self, peer: Option<SocketAddr>) -> ConnectionHandler {
        ConnectionHandler::new(peer, Arc::clone(&self.open))
    }
}

fn fixed_viewport(area: Rect) -> TerminalOptions {
    TerminalOptions {
        viewport: Viewport::Fixed(area),
    }
}

/// One game per session channel, attached to a ratatui terminal writing
/// into that channel.
///
/// The viewport is always fixed to the client's PTY size. ratatui's
/// `clear` and `resize` query the local tty, which belongs to the server
/// process, so they are never called; clearing goes out as an escape
/// sequence and a resize rebuilds the terminal.
struct ChannelSession {
    terminal: SshTerminal,
    output: ChannelOutput,
    controller: SessionController,
    has_pty: bool,
}

impl ChannelSession {
    fn new(output: ChannelOutput) -> io::Result<Self> {
        let terminal = Terminal::with_options(
            CrosstermBackend::new(output.writer()),
            fixed_viewport(Rect::default()),
        )?;
        Ok(Self {
            terminal,
            output,
            controller: SessionController::new(),
            has_pty: false,
        })
    }

    fn resize(&mut self, col_width: u32, row_height: u32) -> io::Result<()> {
        let width = u16::try_from(col_width).unwrap_or(u16::MAX);
        let height = u16::try_from(row_height).unwrap_or(u16::MAX);
        let area = Rect::new(0, 0, width, height);
        self.terminal = Terminal::with_options(
            CrosstermBackend::new(self.output.writer()),
            fixed_viewport(area),
        )?;
        Ok(())
    }

    /// Wipes the client screen so the next draw repaints every cell.
    fn clear_screen(&mut self) -> io::Result<()> {
        execute!(self.terminal.backend_mut(), Clear(ClearType::All))
    }

    fn start(&mut self) -> io::Result<()> {
        execute!(self.terminal.backend_mut(), EnterAlternateScreen, Hide)?;
        self.clear_screen()?;
        self.redraw()
    }

    fn redraw(&mut self) -> io::Result<()> {
        let frame = self.controller.render();
        self.terminal
            .draw(|f| f.render_widget(Paragraph::new(frame.as_str()), f.area()))?;
        Ok(())
    }

    /// Feeds decoded keys to the controller, redrawing after each one.
    fn handle_input(&mut self, bytes: &[u8]) -> io::Result<Flow> {
        for key in decode_keys(bytes) {
            if self.controller.update(key) == Flow::Quit {
                self.finish()?;
                return Ok(Flow::Quit);
            }
            self.redraw()?;
        }
        Ok(Flow::Continue)
    }

    fn finish(&mut self) -> io::Result<()> {
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        self.output.close();
        Ok(())
    }

    fn reject_without_pty(&mut self) -> io::Result<()> {
        let backend = self.terminal.backend_mut();
        backend.write_all(b"Requires an active PTY\r\n")?;
        backend.flush()?;
        self.output.close();
        Ok(())
    }
}

/// State for a single SSH connection.
///
/// Nothing here is shared with other connections.
pub struct ConnectionHandler {
    peer: Option<SocketAddr>,
    connected_at: Instant,
    channels: HashMap<ChannelId, ChannelSession>,
    open: Arc<watch::Sender<usize>>,
}

impl ConnectionHandler {
    /// Creates the handler for a newly accepted connection.
    #[instrument(skip(open))]
    fn new(peer: Option<SocketAddr>, open: Arc<watch::Sender<usize>>) -> Self {
        info!("Client connected");
        open.send_modify(|count| *count += 1);
        Self {
            peer,
            connected_at: Instant::now(),
            channels: HashMap::new(),
            open,
        }
    }
}

impl Drop for ConnectionHandler {
    fn drop(&mut self) {
        self.open.send_modify(|count| *count = count.saturating_sub(1));
        info!(
            peer = ?self.peer,
            duration = ?self.connected_at.elapsed(),
            "Client disconnected"
        );
    }
}

impl Handler for ConnectionHandler {
    type Error = anyhow::Error;

    async fn auth_none(&mut self, user: &str) -> Result<Auth, Self::Error> {
        debug!(user, peer = ?self.peer, "Accepting auth none");
        Ok(Auth::Accept)
    }

    async fn auth_publickey(
        &mut self,
        user: &str,
        public_key: &PublicKey,
    ) -> Result<Auth, Self::Error> {
        debug!(
            user,
            peer = ?self.peer,
            algorithm = ?public_key.algorithm(),
            "Accepting public key"
        );
        Ok(Auth::Accept)
    }

    async fn channel_open_session(
        &mut self,
        channel: Channel<Msg>,
        session: &mut Session,
    ) -> Result<bool, Self::Error> {
        let id = channel.id();
        debug!(channel = ?id, peer = ?self.peer, "Session channel opened");
        let writer = ChannelWriter::start(session.handle(), id);
        self.channels.insert(id, ChannelSession::new(writer.output())?);
        Ok(true)
    }

    async fn pty_request(
        &mut self,
        channel: ChannelId,
        term: &str,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _modes: &[(Pty, u32)],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        debug!(?channel, term, col_width, row_height, "PTY requested");
        if let Some(game) = self.channels.get_mut(&channel) {
            game.resize(col_width, row_height)?;
            game.has_pty = true;
        }
        session.channel_success(channel)?;
        Ok(())
    }

    async fn shell_request(
        &mut self,
        channel: ChannelId,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        session.channel_success(channel)?;
        let Some(game) = self.channels.get_mut(&channel) else {
            return Ok(());
        };

        if game.has_pty {
            info!(?channel, peer = ?self.peer, "Starting game");
            game.start()?;
        } else {
            warn!(?channel, peer = ?self.peer, "Shell requested without a PTY");
            game.reject_without_pty()?;
            self.channels.remove(&channel);
        }
        Ok(())
    }

    async fn data(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        let Some(game) = self.channels.get_mut(&channel) else {
            return Ok(());
        };
        if !game.has_pty {
            return Ok(());
        }

        if game.handle_input(data)? == Flow::Quit {
            info!(?channel, peer = ?self.peer, "Game session ended");
            self.channels.remove(&channel);
        }
        Ok(())
    }

    async fn window_change_request(
        &mut self,
        channel: ChannelId,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        if let Some(game) = self.channels.get_mut(&channel) {
            debug!(?channel, col_width, row_height, "Window resized");
            game.resize(col_width, row_height)?;
            game.clear_screen()?;
            game.redraw()?;
        }
        Ok(())
    }

    async fn channel_close(
        &mut self,
        channel: ChannelId,
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        if self.channels.remove(&channel).is_some() {
            debug!(?channel, "Channel closed by client");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_connections_tracks_handler_lifetimes() {
        let mut server = GameServer::new();
        assert_eq!(server.open_connections(), 0);

        let first = server.new_client(None);
        let second = server.new_client(Some("127.0.0.1:4000".parse().unwrap()));
        assert_eq!(server.open_connections(), 2);

        drop(first);
        assert_eq!(server.open_connections(), 1);
        drop(second);
        assert_eq!(server.open_connections(), 0);
    }

    #[test]
    fn test_each_connection_starts_without_channels() {
        let mut server = GameServer::new();
        let handler = server.new_client(None);
        assert!(handler.channels.is_empty());
    }
}
