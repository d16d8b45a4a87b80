use std::io::{self, Read};

use crate::error::Result;

/// Reads the next block of complete lines from `r` into `dst`.
///
/// `tail` carries the trailing partial line between calls: it is copied to
/// the front of `dst` before reading and refilled with whatever follows the
/// last `\n` afterwards. The final newline of the block is not included.
///
/// Returns `Ok(false)` once the stream is exhausted. A final line without a
/// trailing newline is returned as a block of its own.
pub fn read_lines_block<R: Read + ?Sized>(
    r: &mut R,
    dst: &mut Vec<u8>,
    tail: &mut Vec<u8>,
    block_size: usize,
    max_line_len: usize,
) -> Result<bool> {
    let chunk = block_size.max(1);
    dst.clear();
    if dst.capacity() < chunk {
        dst.reserve_exact(chunk);
    }
    dst.extend_from_slice(tail);
    tail.clear();

    // dst[..filled] holds read bytes; dst[filled..] is zeroed space for the
    // next read. Space is zeroed at most one chunk ahead of the data.
    let mut filled = dst.len();
    loop {
        if filled == dst.len() {
            if dst.len() == dst.capacity() {
                dst.reserve(dst.len().max(chunk));
            }
            let end = dst.capacity().min(filled + chunk);
            dst.resize(end, 0);
        }

        let start = filled;
        let n = match fill(r, &mut dst[start..]) {
            Ok(n) => n,
            Err(err) => {
                dst.truncate(start);
                return Err(err);
            }
        };
        filled += n;
        if n == 0 {
            // A missing newline at the end of the stream is fine; the next
            // call starts with an empty tail and reports the end.
            dst.truncate(filled);
            return Ok(filled > 0);
        }

        match dst[start..filled].iter().rposition(|b| *b == b'\n') {
            Some(nn) => {
                let nn = start + nn;
                tail.extend_from_slice(&dst[nn + 1..filled]);
                dst.truncate(nn);
                return Ok(true);
            }
            None if filled > max_line_len => {
                dst.truncate(filled);
                return Err(format!("too long line: more than {} bytes", max_line_len).into());
            }
            None => (),
        }
    }
}

// End of stream, including a truncated one, reads as zero bytes.
fn fill<R: Read + ?Sized>(r: &mut R, buf: &mut [u8]) -> Result<usize> {
    loop {
        match r.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(0),
            Err(e) => return Err(("cannot read a block of data", e).into()),
        }
    }
}
