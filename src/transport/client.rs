//! Client for the message transport
//!
//! Requests on one client are sent one at a time; responses with other ids
//! are skipped.

use std::io;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use super::dispatcher::{GET_PRODUCT, GET_PRODUCTS};
use super::message::{MessageRequest, MessageResponse};
use crate::models::Product;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Connection closed before a response arrived")]
    Closed,

    /// The remote side answered with an error payload
    #[error("{status}: {message}")]
    Remote { status: String, message: String },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Remote { status, .. } if status == "not_found")
    }
}

pub struct MessageClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    next_id: u64,
}

impl MessageClient {
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
            next_id: 0,
        })
    }

    /// Sends `cmd` with `data` and waits for the matching response.
    pub async fn send(&mut self, cmd: &str, data: Value) -> Result<Value, ClientError> {
        self.next_id += 1;
        let request = MessageRequest::new(self.next_id.to_string(), cmd, data);

        let mut frame =
            serde_json::to_vec(&request).map_err(|e| ClientError::Protocol(e.to_string()))?;
        frame.push(b'\n');
        self.writer.write_all(&frame).await?;
        self.writer.flush().await?;

        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line).await? == 0 {
                return Err(ClientError::Closed);
            }

            let response: MessageResponse = serde_json::from_str(line.trim())
                .map_err(|e| ClientError::Protocol(e.to_string()))?;
            if response.id != request.id {
                continue;
            }

            return match response.err {
                Some(err) => Err(ClientError::Remote {
                    status: err.status,
                    message: err.message,
                }),
                None => Ok(response.response.unwrap_or(Value::Null)),
            };
        }
    }

    pub async fn get_products(&mut self) -> Result<Vec<Product>, ClientError> {
        let value = self.send(GET_PRODUCTS, Value::Null).await?;
        decode(value)
    }

    pub async fn get_product(&mut self, id: &str) -> Result<Product, ClientError> {
        let value = self.send(GET_PRODUCT, Value::String(id.to_string())).await?;
        decode(value)
    }

    pub async fn close(mut self) -> Result<(), ClientError> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| ClientError::Protocol(e.to_string()))
}
