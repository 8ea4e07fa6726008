//! Test chat client.
//!
//! Speaks the line protocol with `Command` / `Reply` values and asserts on
//! what the server sends back.

use chatrelay_proto::{Command, ErrorCode, Reply};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A test chat client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

#[allow(dead_code)]
impl TestClient {
    /// Connect to a test server and consume the greeting.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;

        // Split stream for reading and writing
        let (read_half, write_half) = stream.into_split();
        let mut client = Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        };

        let greeting = client.recv().await?;
        anyhow::ensure!(
            greeting == Reply::Welcome,
            "expected greeting, got {greeting}"
        );
        Ok(client)
    }

    /// Connect and log in as `name`.
    pub async fn login_as(address: &str, name: &str) -> anyhow::Result<Self> {
        let mut client = Self::connect(address).await?;
        client.login(name).await?;
        Ok(client)
    }

    /// Send a raw line. A terminator is appended unless present.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with('\n') {
            self.writer.write_all(b"\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Send bytes exactly as given.
    pub async fn send_bytes(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Send a command.
    pub async fn send(&mut self, cmd: Command) -> anyhow::Result<()> {
        self.send_raw(&cmd.to_string()).await
    }

    /// Receive a single reply from the server.
    pub async fn recv(&mut self) -> anyhow::Result<Reply> {
        self.recv_timeout(RECV_TIMEOUT).await
    }

    /// Receive a reply with a timeout.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Reply> {
        let mut line = String::new();
        let read = timeout(dur, self.reader.read_line(&mut line)).await??;
        anyhow::ensure!(read > 0, "connection closed by server");

        line.trim_end_matches(['\r', '\n'])
            .parse::<Reply>()
            .map_err(|e| anyhow::anyhow!("Parse error: {e}"))
    }

    /// Receive `n` replies.
    pub async fn recv_n(&mut self, n: usize) -> anyhow::Result<Vec<Reply>> {
        let mut replies = Vec::with_capacity(n);
        for _ in 0..n {
            replies.push(self.recv().await?);
        }
        Ok(replies)
    }

    /// Expect an `ERR <code>` reply.
    pub async fn expect_err(&mut self, code: ErrorCode) -> anyhow::Result<()> {
        let reply = self.recv().await?;
        anyhow::ensure!(reply == Reply::Err(code), "expected ERR {code}, got {reply}");
        Ok(())
    }

    /// Assert nothing arrives within `dur`.
    pub async fn expect_silence(&mut self, dur: Duration) -> anyhow::Result<()> {
        let mut line = String::new();
        match timeout(dur, self.reader.read_line(&mut line)).await {
            Err(_) => Ok(()),
            Ok(Ok(0)) => anyhow::bail!("connection closed while expecting silence"),
            Ok(Ok(_)) => anyhow::bail!("unexpected line: {}", line.trim_end()),
            Ok(Err(e)) => Err(e.into()),
        }
    }

    /// Assert the server closes the connection, skipping at most `max_lines`
    /// lines before the close.
    pub async fn expect_closed(&mut self, max_lines: usize) -> anyhow::Result<Vec<String>> {
        let mut seen = Vec::new();
        loop {
            let mut line = String::new();
            match timeout(RECV_TIMEOUT, self.reader.read_line(&mut line)).await? {
                Ok(0) => return Ok(seen),
                Ok(_) => {
                    seen.push(line.trim_end().to_string());
                    anyhow::ensure!(
                        seen.len() <= max_lines,
                        "connection still open after {seen:?}"
                    );
                }
                // A reset counts as closed.
                Err(_) => return Ok(seen),
            }
        }
    }

    /// Log in and expect `OK`.
    pub async fn login(&mut self, name: &str) -> anyhow::Result<()> {
        self.send(Command::Login {
            name: name.to_string(),
        })
        .await?;
        let reply = self.recv().await?;
        anyhow::ensure!(reply == Reply::Ok, "login as {name} failed: {reply}");
        Ok(())
    }

    /// Broadcast a message.
    pub async fn msg(&mut self, text: &str) -> anyhow::Result<()> {
        self.send(Command::Msg {
            text: text.to_string(),
        })
        .await
    }

    /// Send a direct message.
    pub async fn dm(&mut self, target: &str, text: &str) -> anyhow::Result<()> {
        self.send(Command::Dm {
            target: target.to_string(),
            text: text.to_string(),
        })
        .await
    }

    /// Round-trip a PING. Everything the server queued before the PONG is
    /// returned, so this doubles as a barrier.
    pub async fn sync(&mut self) -> anyhow::Result<Vec<Reply>> {
        self.send(Command::Ping).await?;
        let mut before = Vec::new();
        loop {
            match self.recv().await? {
                Reply::Pong => return Ok(before),
                other => before.push(other),
            }
        }
    }

    /// Ask WHO and collect the user names, using a PING barrier to find the
    /// end of the unterminated listing.
    pub async fn who(&mut self) -> anyhow::Result<Vec<String>> {
        self.send(Command::Who).await?;
        let mut names = Vec::new();
        for reply in self.sync().await? {
            match reply {
                Reply::User(name) => names.push(name),
                other => anyhow::bail!("unexpected reply during WHO: {other}"),
            }
        }
        names.sort();
        Ok(names)
    }

    /// Close the write half, as a client hanging up would.
    pub async fn quit(mut self) -> anyhow::Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}
