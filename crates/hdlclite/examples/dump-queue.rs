//! Print the entries of an entry queue dump.
//!
//! Run with:
//!   cargo run --example dump-queue -- path/to/queue.bin
//!
//! Without a path a small wrapped queue is built in memory.

use hdlclite::queue::{leb128, EntryQueue, QueueHeader, HEADER_SIZE};

fn sample_dump() -> Vec<u8> {
    // Two entries written across the end of a 24-byte ring.
    let mut ring = vec![0u8; 24];
    let mut active = Vec::new();
    for entry in [&b"temperature=21"[..], b"ok"] {
        leb128::encode_u32(entry.len() as u32, &mut active);
        active.extend_from_slice(entry);
    }
    let size = ring.len();
    let head = 16usize;
    for (i, byte) in active.iter().enumerate() {
        ring[(head + i) % size] = *byte;
    }
    let header = QueueHeader {
        data_size_bytes: size as u32,
        head: head as u32,
        tail: ((head + active.len()) % size) as u32,
    };

    let mut dump = Vec::with_capacity(HEADER_SIZE + ring.len());
    dump.extend_from_slice(&header.to_bytes());
    dump.extend_from_slice(&ring);
    dump
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dump = match std::env::args().nth(1) {
        Some(path) => std::fs::read(path)?,
        None => sample_dump(),
    };

    let queue = EntryQueue::parse(&dump)?;
    let header = queue.header();
    eprintln!(
        "size={} head={} tail={} wrapped={}",
        header.data_size_bytes,
        header.head,
        header.tail,
        header.is_wrapped()
    );

    for (index, entry) in queue.entries().enumerate() {
        let entry = entry?;
        println!("{index}: {}", String::from_utf8_lossy(&entry));
    }
    Ok(())
}
