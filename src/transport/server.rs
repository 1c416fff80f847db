//! TCP server for the message transport
//!
//! One task per connection; within a connection every frame is dispatched on
//! its own task so a slow lookup does not hold up the rest. Responses share
//! the write half behind a mutex and are correlated by id, not by order.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::dispatcher::{DispatchError, MessageDispatcher};
use super::message::MessageResponse;

/// Largest accepted request frame in bytes, line terminator excluded.
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

pub struct MessageServer {
    listener: TcpListener,
    dispatcher: MessageDispatcher,
}

impl MessageServer {
    pub async fn bind(addr: impl ToSocketAddrs, dispatcher: MessageDispatcher) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            dispatcher,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown` resolves, then drops every open
    /// connection along with its in-flight requests.
    pub async fn serve(self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, addr)) => {
                            info!("New message connection from {}", addr);
                            let dispatcher = self.dispatcher.clone();
                            connections.spawn(handle_connection(stream, addr, dispatcher));
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                        }
                    }
                }

                Some(_) = connections.join_next(), if !connections.is_empty() => {}

                _ = &mut shutdown => {
                    info!("Message server shutting down");
                    break;
                }
            }
        }

        connections.shutdown().await;
    }
}

async fn handle_connection(stream: TcpStream, addr: SocketAddr, dispatcher: MessageDispatcher) {
    let (reader, writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let writer = Arc::new(Mutex::new(writer));
    let mut in_flight = JoinSet::new();

    loop {
        let mut frame = Vec::new();
        match read_frame(&mut reader, &mut frame, MAX_FRAME_BYTES).await {
            Ok(Frame::Eof) => {
                debug!("Connection {} closed by client", addr);
                break;
            }
            Ok(Frame::TooLarge) => {
                warn!("Dropped oversized frame from {}", addr);
                let response = DispatchError::Malformed(format!(
                    "frame exceeds {} bytes",
                    MAX_FRAME_BYTES
                ))
                .into_response("");
                if let Err(e) = write_response(&writer, &response).await {
                    warn!("Failed to write response to {}: {}", addr, e);
                    break;
                }
            }
            Ok(Frame::Complete) => {
                if frame.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                let dispatcher = dispatcher.clone();
                let writer = writer.clone();
                in_flight.spawn(async move {
                    let response = dispatcher.dispatch_frame(&frame).await;
                    if let Err(e) = write_response(&writer, &response).await {
                        warn!("Failed to write response {}: {}", response.id, e);
                    }
                });
            }
            Err(e) => {
                error!("Error reading from connection {}: {}", addr, e);
                in_flight.shutdown().await;
                return;
            }
        }

        // Reap finished requests so the set does not grow unbounded
        while in_flight.try_join_next().is_some() {}
    }

    // Client half-closed; let pending requests answer before closing
    while in_flight.join_next().await.is_some() {}
}

#[derive(Debug, PartialEq)]
enum Frame {
    /// `buf` holds one frame with its line terminator stripped
    Complete,
    /// The frame was longer than the limit and has been discarded
    TooLarge,
    Eof,
}

/// Reads one newline-terminated frame into `buf`, buffering at most
/// `max_len + 1` bytes. An oversized frame is skipped through its newline so
/// the next frame can still be read.
async fn read_frame<R>(reader: &mut R, buf: &mut Vec<u8>, max_len: usize) -> io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    let limit = max_len as u64 + 1;
    if (&mut *reader).take(limit).read_until(b'\n', buf).await? == 0 {
        return Ok(Frame::Eof);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        return Ok(Frame::Complete);
    }
    if buf.len() <= max_len {
        // Final frame without a terminator
        return Ok(Frame::Complete);
    }

    loop {
        buf.clear();
        let read = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
        if read == 0 || buf.last() == Some(&b'\n') {
            break;
        }
    }
    buf.clear();
    Ok(Frame::TooLarge)
}

async fn write_response(
    writer: &Mutex<OwnedWriteHalf>,
    response: &MessageResponse,
) -> io::Result<()> {
    let mut frame = serde_json::to_vec(response)?;
    frame.push(b'\n');

    let mut writer = writer.lock().await;
    writer.write_all(&frame).await?;
    writer.flush().await
}
