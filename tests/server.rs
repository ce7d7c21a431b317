//! End-to-end tests over real TCP connections.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use linekv::{Config, Server};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
    time::timeout,
};

const READ_TIMEOUT: Duration = Duration::from_secs(3);

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr).await.context("connect")?;
        let (read, writer) = stream.into_split();
        Ok(Self {
            lines: BufReader::new(read).lines(),
            writer,
        })
    }

    /// Sends one request line and returns the response line.
    async fn request(&mut self, line: &str) -> Result<String> {
        self.writer.write_all(format!("{line}\n").as_bytes()).await?;
        timeout(READ_TIMEOUT, self.lines.next_line())
            .await
            .with_context(|| format!("timed out waiting for reply to {line:?}"))??
            .with_context(|| format!("connection closed before reply to {line:?}"))
    }
}

async fn start_server() -> Result<SocketAddr> {
    let config = Config {
        port: 0,
        ..Config::default()
    };
    let server = Server::bind(&config).await?;
    let addr = server.local_addr()?;
    tokio::spawn(server.run(std::future::pending()));
    Ok(addr)
}

#[tokio::test]
async fn set_then_get_round_trips() -> Result<()> {
    let addr = start_server().await?;
    let mut client = Client::connect(addr).await?;

    assert_eq!(client.request("SET greeting hello there world").await?, "OK");
    assert_eq!(
        client.request("GET greeting").await?,
        "VALUE: hello there world"
    );
    Ok(())
}

#[tokio::test]
async fn absent_keys_are_not_found() -> Result<()> {
    let addr = start_server().await?;
    let mut client = Client::connect(addr).await?;

    assert_eq!(client.request("GET never-set").await?, "NOT_FOUND");
    assert_eq!(client.request("DEL never-set").await?, "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn last_write_wins() -> Result<()> {
    let addr = start_server().await?;
    let mut client = Client::connect(addr).await?;

    assert_eq!(client.request("SET k v1").await?, "OK");
    assert_eq!(client.request("SET k v2").await?, "OK");
    assert_eq!(client.request("GET k").await?, "VALUE: v2");
    Ok(())
}

#[tokio::test]
async fn delete_removes_and_is_idempotent() -> Result<()> {
    let addr = start_server().await?;
    let mut client = Client::connect(addr).await?;

    assert_eq!(client.request("SET k v").await?, "OK");
    assert_eq!(client.request("DEL k").await?, "DELETED");
    assert_eq!(client.request("GET k").await?, "NOT_FOUND");
    assert_eq!(client.request("DEL k").await?, "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn malformed_input_keeps_connection_usable() -> Result<()> {
    let addr = start_server().await?;
    let mut client = Client::connect(addr).await?;

    for bad in ["FOO BAR", "", "GET", "GET a b", "SET lonely", "get lower"] {
        let reply = client.request(bad).await?;
        assert!(reply.starts_with("ERROR: "), "{bad:?} -> {reply:?}");
    }

    assert_eq!(client.request("SET still alive").await?, "OK");
    assert_eq!(client.request("GET still").await?, "VALUE: alive");
    Ok(())
}

#[tokio::test]
async fn two_clients_share_one_table() -> Result<()> {
    let addr = start_server().await?;
    let mut first = Client::connect(addr).await?;
    let mut second = Client::connect(addr).await?;

    assert_eq!(first.request("SET name alice").await?, "OK");
    assert_eq!(second.request("GET name").await?, "VALUE: alice");
    assert_eq!(first.request("DEL name").await?, "DELETED");
    assert_eq!(second.request("GET name").await?, "NOT_FOUND");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_clients_on_disjoint_keys_lose_no_updates() -> Result<()> {
    let addr = start_server().await?;
    let clients = 32;
    let keys_per_client = 25;

    let mut tasks = Vec::new();
    for c in 0..clients {
        tasks.push(tokio::spawn(async move {
            let mut client = Client::connect(addr).await?;
            for k in 0..keys_per_client {
                let reply = client.request(&format!("SET key:{c}:{k} value:{c}:{k}")).await?;
                anyhow::ensure!(reply == "OK", "unexpected reply {reply:?}");
            }
            Ok::<_, anyhow::Error>(())
        }));
    }
    for task in tasks {
        task.await??;
    }

    let mut checker = Client::connect(addr).await?;
    for c in 0..clients {
        for k in 0..keys_per_client {
            assert_eq!(
                checker.request(&format!("GET key:{c}:{k}")).await?,
                format!("VALUE: value:{c}:{k}")
            );
        }
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_writers_leave_one_whole_value() -> Result<()> {
    let addr = start_server().await?;
    let a = "A".repeat(2048);
    let b = "B".repeat(2048);

    let mut tasks = Vec::new();
    for value in [a.clone(), b.clone()] {
        tasks.push(tokio::spawn(async move {
            let mut client = Client::connect(addr).await?;
            for _ in 0..50 {
                client.request(&format!("SET contended {value}")).await?;
            }
            Ok::<_, anyhow::Error>(())
        }));
    }
    for task in tasks {
        task.await??;
    }

    let mut reader = Client::connect(addr).await?;
    let reply = reader.request("GET contended").await?;
    assert!(
        reply == format!("VALUE: {a}") || reply == format!("VALUE: {b}"),
        "torn value observed: {} bytes",
        reply.len()
    );
    Ok(())
}

#[tokio::test]
async fn shutdown_keeps_applied_writes_and_closes_listener() -> Result<()> {
    let config = Config {
        port: 0,
        grace_period_secs: 2,
        ..Config::default()
    };
    let server = Server::bind(&config).await?;
    let addr = server.local_addr()?;
    let table = server.table();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let running = tokio::spawn(server.run(async move {
        let _ = stop_rx.await;
    }));

    let mut client = Client::connect(addr).await?;
    assert_eq!(client.request("SET before shutdown").await?, "OK");

    stop_tx.send(()).ok();
    timeout(Duration::from_secs(5), running).await??;

    assert_eq!(
        table.get(b"before"),
        Some(bytes::Bytes::from("shutdown"))
    );
    assert!(TcpStream::connect(addr).await.is_err());
    Ok(())
}
