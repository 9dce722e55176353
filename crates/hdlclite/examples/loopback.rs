//! Frame a few payloads over a socket pair and read them back.
//!
//! Run with:
//!   cargo run --example loopback
//!
//! One payload is corrupted on the wire to show the decoder dropping it
//! and resynchronizing on the next flag.

#[cfg(unix)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::io::Write;
    use std::os::unix::net::UnixStream;
    use std::thread;

    use hdlclite::frame::{Checksum, FrameConfig, FrameError, FrameReader, FrameWriter};

    let config = FrameConfig::with_checksum(Checksum::Crc32);
    let (tx, rx) = UnixStream::pair()?;

    let sender = thread::spawn(move || -> Result<(), FrameError> {
        let mut writer = FrameWriter::with_config(tx, config);
        writer.write_frame(0x01, 0x00, b"hello")?;
        // Flag bytes in the payload are escaped on the wire.
        writer.write_frame(0x01, 0x01, &[0x7E, 0x7D, 0x00])?;
        writer.get_mut().write_all(b"\x7Enot a frame\x7E")?;
        writer.write_frame(0x02, 0x00, b"goodbye")?;
        writer.flush()
    });

    let mut reader = FrameReader::with_config(rx, config);
    loop {
        match reader.read_data_frame() {
            Ok(frame) => eprintln!(
                "address={:#04x} control={:#04x} payload={:02x?}",
                frame.address,
                frame.control,
                frame.payload.as_ref()
            ),
            Err(FrameError::ConnectionClosed) => break,
            Err(e) if e.is_frame_local() => eprintln!("dropped frame: {e}"),
            Err(e) => return Err(e.into()),
        }
    }

    sender.join().map_err(|_| "sender thread panicked")??;
    Ok(())
}

#[cfg(not(unix))]
fn main() {
    eprintln!("loopback example requires a unix socket pair");
}
