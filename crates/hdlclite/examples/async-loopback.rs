//! Stream frames through `HdlcCodec` over an in-memory duplex pipe.
//!
//! Run with:
//!   cargo run --example async-loopback --features async

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use hdlclite::frame::{DataFrame, HdlcCodec};
use tokio_util::codec::Framed;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (client, server) = tokio::io::duplex(256);
    let mut client = Framed::new(client, HdlcCodec::new());
    let mut server = Framed::new(server, HdlcCodec::new());

    client.send(DataFrame::new(0x10, 0x00, "ping")).await?;
    client.send(Bytes::from_static(b"raw payload")).await?;
    drop(client);

    while let Some(item) = server.next().await {
        match item? {
            Ok(body) => eprintln!("frame: {:02x?}", body.as_ref()),
            Err(e) => eprintln!("dropped frame: {e}"),
        }
    }
    Ok(())
}
