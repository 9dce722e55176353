use bytes::Bytes;
use hdlclite_queue::EntryQueue;

use crate::cmd::QueueArgs;
use crate::exit::{io_error, queue_error, CliResult, SUCCESS};
use crate::output::{print_entry, OutputFormat};

pub fn run(args: QueueArgs, format: OutputFormat) -> CliResult<i32> {
    let dump = std::fs::read(&args.path)
        .map_err(|err| io_error(&format!("failed reading {}", args.path.display()), err))?;

    let count = print_entries(Bytes::from(dump), |index, entry| {
        print_entry(index, entry, format)
    })?;
    tracing::info!(entries = count, "queue dump finished");
    Ok(SUCCESS)
}

fn print_entries(dump: Bytes, mut emit: impl FnMut(usize, &[u8])) -> CliResult<usize> {
    let queue = EntryQueue::from_bytes(dump).map_err(|err| queue_error("invalid queue", err))?;
    let header = queue.header();
    tracing::info!(
        size = header.data_size_bytes,
        head = header.head,
        tail = header.tail,
        wrapped = header.is_wrapped(),
        "queue header"
    );

    let mut count = 0;
    for entry in queue.entries() {
        // Entries already printed stay on stdout; the error still fails the run.
        let entry = entry.map_err(|err| queue_error("corrupt queue entry", err))?;
        emit(count, &entry);
        count += 1;
    }
    Ok(count)
}
