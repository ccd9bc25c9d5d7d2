//! Line splitting for process output.
//!
//! ffmpeg rewrites its stats line in place with `\r`, so a reader that only
//! splits on `\n` would see no progress until the process exits. Both
//! delimiters end a line here; empty lines are dropped.

use std::io::{self, BufRead, BufReader, Read};

/// Calls `on_line` for every non-empty line read from `reader` until EOF.
pub(crate) fn for_each_line<R, F>(reader: R, mut on_line: F) -> io::Result<()>
where
    R: Read,
    F: FnMut(&str),
{
    let mut reader = BufReader::new(reader);
    let mut pending: Vec<u8> = Vec::new();

    loop {
        let consumed = {
            let buf = match reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if buf.is_empty() {
                break;
            }
            for &byte in buf {
                if byte == b'\n' || byte == b'\r' {
                    flush_line(&mut pending, &mut on_line);
                } else {
                    pending.push(byte);
                }
            }
            buf.len()
        };
        reader.consume(consumed);
    }

    flush_line(&mut pending, &mut on_line);
    Ok(())
}

fn flush_line<F: FnMut(&str)>(pending: &mut Vec<u8>, on_line: &mut F) {
    if pending.is_empty() {
        return;
    }
    let line = String::from_utf8_lossy(pending);
    let line = line.trim_end();
    if !line.is_empty() {
        on_line(line);
    }
    pending.clear();
}
