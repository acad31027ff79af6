//! End-to-end tests of the SSH host, driven with a russh client.

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

use russh::client::{self, Msg};
use russh::keys::ssh_key::PublicKey;
use russh::{Channel, ChannelMsg};
use tempfile::TempDir;
use tictactoe_server::{ServeConfig, run_server};
use tokio::time::timeout;

const ENTER_ALT_SCREEN: &str = "\x1b[?1049h";
const LEAVE_ALT_SCREEN: &str = "\x1b[?1049l";
const WAIT: Duration = Duration::from_secs(10);

struct Client;

impl client::Handler for Client {
    type Error = russh::Error;

    async fn check_server_key(&mut self, _key: &PublicKey) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

fn free_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("local addr")
}

/// Starts a server on a free port with a fresh host key.
fn spawn_server() -> (SocketAddr, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let addr = free_addr();
    let config = ServeConfig::new(addr, dir.path().join("host_key"));
    tokio::spawn(run_server(config));
    (addr, dir)
}

async fn connect(addr: SocketAddr) -> client::Handle<Client> {
    for _ in 0..100 {
        match client::connect(Arc::new(client::Config::default()), addr, Client).await {
            Ok(mut handle) => {
                let auth = handle.authenticate_none("player").await.expect("auth");
                assert!(auth.success());
                return handle;
            }
            Err(_) => tokio::time::sleep(Duration::from_millis(50)).await,
        }
    }
    panic!("server never accepted on {addr}");
}

async fn open_game(handle: &client::Handle<Client>) -> Channel<Msg> {
    let channel = handle.channel_open_session().await.expect("open session");
    channel
        .request_pty(true, "xterm", 80, 24, 0, 0, &[])
        .await
        .expect("pty");
    channel.request_shell(true).await.expect("shell");
    channel
}

/// Collects channel output until `needle` shows up or the channel ends.
///
/// Unchanged cells are skipped when drawing, so needles never span a
/// space.
async fn read_until(channel: &mut Channel<Msg>, needle: &str) -> String {
    let mut seen = String::new();
    let _ = timeout(WAIT, async {
        while let Some(msg) = channel.wait().await {
            if let ChannelMsg::Data { data } = msg {
                seen.push_str(&String::from_utf8_lossy(&data));
                if seen.contains(needle) {
                    return;
                }
            }
        }
    })
    .await;
    assert!(seen.contains(needle), "{needle:?} not in {seen:?}");
    seen
}

/// Everything the server sends until it closes the channel.
async fn read_to_close(channel: &mut Channel<Msg>) -> Vec<ChannelMsg> {
    let mut messages = Vec::new();
    timeout(WAIT, async {
        while let Some(msg) = channel.wait().await {
            let closed = matches!(msg, ChannelMsg::Close);
            messages.push(msg);
            if closed {
                break;
            }
        }
    })
    .await
    .expect("channel closes");
    messages
}

fn position(messages: &[ChannelMsg], wanted: impl Fn(&ChannelMsg) -> bool) -> usize {
    messages
        .iter()
        .position(wanted)
        .unwrap_or_else(|| panic!("missing message in {messages:?}"))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_session_draws_plays_and_quits() {
    let (addr, _dir) = spawn_server();
    let handle = connect(addr).await;
    let mut channel = open_game(&handle).await;

    let opening = read_until(&mut channel, "Player:").await;
    assert!(opening.contains(ENTER_ALT_SCREEN));
    assert!(opening.contains("Tic"));
    assert!(opening.contains("Current"));

    // O takes the top-left square and the turn passes to X.
    channel.data(&b" "[..]).await.expect("send select");
    read_until(&mut channel, "X").await;

    channel.data(&b"q"[..]).await.expect("send quit");
    let messages = read_to_close(&mut channel).await;

    let output: String = messages
        .iter()
        .filter_map(|msg| match msg {
            ChannelMsg::Data { data } => Some(String::from_utf8_lossy(data).into_owned()),
            _ => None,
        })
        .collect();
    assert!(output.contains(LEAVE_ALT_SCREEN), "{output:?}");

    let exit = position(&messages, |msg| {
        matches!(msg, ChannelMsg::ExitStatus { exit_status: 0 })
    });
    let eof = position(&messages, |msg| matches!(msg, ChannelMsg::Eof));
    assert!(exit < eof);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shell_without_pty_is_turned_away() {
    let (addr, _dir) = spawn_server();
    let handle = connect(addr).await;

    let mut channel = handle.channel_open_session().await.expect("open session");
    channel.request_shell(true).await.expect("shell");

    read_until(&mut channel, "Requires an active PTY").await;
    let rest = read_to_close(&mut channel).await;
    assert!(rest.iter().any(|msg| matches!(msg, ChannelMsg::Close)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_channels_on_one_connection_play_separate_games() {
    let (addr, _dir) = spawn_server();
    let handle = connect(addr).await;

    let mut first = open_game(&handle).await;
    let mut second = open_game(&handle).await;
    read_until(&mut first, "Player:").await;
    read_until(&mut second, "Player:").await;

    // A move in the first game leaves the second at O to move.
    first.data(&b" "[..]).await.expect("send select");
    read_until(&mut first, "X").await;

    second.data(&b"l "[..]).await.expect("send select");
    read_until(&mut second, "X").await;

    first.data(&b"q"[..]).await.expect("send quit");
    read_to_close(&mut first).await;

    // The second game is still running after the first one ends.
    second.data(&b"j "[..]).await.expect("send select");
    read_until(&mut second, "O").await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_window_change_redraws_frame() {
    let (addr, _dir) = spawn_server();
    let handle = connect(addr).await;
    let mut channel = open_game(&handle).await;
    read_until(&mut channel, "Player:").await;

    channel.window_change(100, 30, 0, 0).await.expect("resize");
    let redrawn = read_until(&mut channel, "Player:").await;
    assert!(redrawn.contains("Tic"));
}
