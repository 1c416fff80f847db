//! Transport Module
//!
//! Message-dispatch surface for inter-process callers. Frames are single
//! lines of JSON over TCP. Each request names a command in its `pattern` and
//! is answered by a response carrying the same `id`.
//!
//! # Commands
//! - `get_products` - List products
//! - `get_product` - Fetch one product; `data` is the id as a JSON string
//!
//! Both commands go through the same [`ProductCatalog`](crate::catalog::ProductCatalog)
//! as the HTTP API, so they share its cache.

mod client;
mod dispatcher;
mod message;
mod server;

pub use client::{ClientError, MessageClient};
pub use dispatcher::{
    DispatchError, MessageDispatcher, GET_PRODUCTS, GET_PRODUCT, NO_HANDLER_MESSAGE,
};
pub use message::{MessageError, MessagePattern, MessageRequest, MessageResponse};
pub use server::{MessageServer, MAX_FRAME_BYTES};
