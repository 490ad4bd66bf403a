use std::cmp::min;
use std::io::{Read, Write};

/// A fixed-capacity ring buffer staging stream bytes ahead of the frame decoder.
///
/// The channel fills it from the underlying stream and the decoder consumes it
/// in place, so a partial frame survives between reads without any copying.
///
/// # Example
///
/// ```rust
/// # use std::io::Write;
/// # use nanolink::base::RingByteBuffer;
/// let mut buffer = RingByteBuffer::with_capacity(64);
/// buffer.write(&[0, 1, 2, 3]).unwrap();
/// assert_eq!(buffer.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RingByteBuffer {
    buf: Vec<u8>,
    head: usize,
    size: usize,
}

impl RingByteBuffer {
    /// Creates a buffer able to hold `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> RingByteBuffer {
        RingByteBuffer {
            buf: vec![0; capacity],
            head: 0,
            size: 0,
        }
    }

    /// Returns the number of bytes currently buffered.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if no bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the total capacity of the buffer in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Returns the amount of free space left in the buffer in bytes.
    pub fn free_space(&self) -> usize {
        self.buf.len() - self.size
    }

    fn tail(&self) -> usize {
        (self.head + self.size) % self.buf.len()
    }

    /// Returns the oldest contiguous run of buffered bytes.
    ///
    /// When the data wraps around the end of the internal storage this returns
    /// only the first run; consume it with [`RingByteBuffer::skip_bytes`] and
    /// call again for the remainder.
    pub fn current_read_slice(&self) -> &[u8] {
        let end = min(self.head + self.size, self.buf.len());
        &self.buf[self.head..end]
    }

    /// Drops up to `bytes` bytes from the front of the buffer.
    ///
    /// Returns the number of bytes actually dropped, which may be less than
    /// `bytes` if the buffer holds fewer.
    pub fn skip_bytes(&mut self, bytes: usize) -> usize {
        let skipped = min(self.size, bytes);
        self.head = (self.head + skipped) % self.buf.len();
        self.size -= skipped;
        skipped
    }

    fn writable_slice(&mut self) -> &mut [u8] {
        let tail = self.tail();
        let end = min(self.buf.len(), tail + self.free_space());
        &mut self.buf[tail..end]
    }

    fn commit_written(&mut self, bytes: usize) {
        self.size += min(self.free_space(), bytes);
    }

    fn fill_once(&mut self, upstream: &mut impl Read) -> std::io::Result<usize> {
        if self.writable_slice().is_empty() {
            return Ok(0);
        }

        match upstream.read(self.writable_slice()) {
            Ok(read) => {
                self.commit_written(read);
                Ok(read)
            }
            // A stream read timeout just means no data was ready.
            Err(err) if err.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(err) => Err(err),
        }
    }

    /// Fills the buffer from an upstream `Read` source.
    ///
    /// Reads at most twice so that both halves of a wrapped write region get a
    /// chance to fill. Returns the total number of bytes read from `upstream`.
    pub fn read_from(&mut self, upstream: &mut impl Read) -> std::io::Result<usize> {
        let first = self.fill_once(upstream)?;
        let second = self.fill_once(upstream)?;
        Ok(first + second)
    }
}

impl Write for RingByteBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            let slice = self.writable_slice();
            if slice.is_empty() {
                break;
            }
            let take = min(slice.len(), buf.len() - total);
            slice[..take].copy_from_slice(&buf[total..total + take]);
            self.commit_written(take);
            total += take;
        }
        Ok(total)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::RingByteBuffer;
    use std::io::Write;

    #[test]
    fn write_and_drain() {
        let mut buffer = RingByteBuffer::with_capacity(8);
        assert_eq!(buffer.write(&[1, 2, 3, 4, 5, 6]).unwrap(), 6);
        assert_eq!(buffer.len(), 6);
        assert_eq!(buffer.current_read_slice(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(buffer.skip_bytes(4), 4);
        assert_eq!(buffer.current_read_slice(), &[5, 6]);
    }

    #[test]
    fn wraps_around_storage_end() {
        let mut buffer = RingByteBuffer::with_capacity(8);
        buffer.write(&[0; 6]).unwrap();
        buffer.skip_bytes(6);

        // Head is now at index 6; a 5-byte write must wrap.
        assert_eq!(buffer.write(&[10, 11, 12, 13, 14]).unwrap(), 5);
        assert_eq!(buffer.current_read_slice(), &[10, 11]);
        buffer.skip_bytes(2);
        assert_eq!(buffer.current_read_slice(), &[12, 13, 14]);
    }

    #[test]
    fn write_stops_at_capacity() {
        let mut buffer = RingByteBuffer::with_capacity(4);
        assert_eq!(buffer.write(&[1, 2, 3, 4, 5, 6]).unwrap(), 4);
        assert_eq!(buffer.free_space(), 0);
        assert_eq!(buffer.write(&[7]).unwrap(), 0);
    }
}
