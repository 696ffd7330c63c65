/// Longest line kept from a client or a controller. rotctl requests and
/// feedback lines are a few dozen bytes.
pub const MAX_LINE_LEN: usize = 256;

/// Accumulates one `\n`-terminated line out of a buffered reader.
///
/// Bytes past `limit` are consumed but not stored, and the line is reported
/// as overflowed once its newline arrives. Survives across partial reads.
#[derive(Debug)]
pub struct LineBuffer {
    bytes: Vec<u8>,
    overflowed: bool,
    limit: usize,
}

impl LineBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(limit),
            overflowed: false,
            limit,
        }
    }

    /// Takes bytes from `available` up to and including the first newline.
    ///
    /// Returns how many bytes were used and whether the line is complete.
    pub fn push(&mut self, available: &[u8]) -> (usize, bool) {
        let (chunk, complete) = match available.iter().position(|b| *b == b'\n') {
            Some(end) => (&available[..=end], true),
            None => (available, false),
        };

        let room = self.limit.saturating_sub(self.bytes.len());

        if chunk.len() > room {
            self.overflowed = true;
        }

        self.bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);

        (chunk.len(), complete)
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty() && !self.overflowed
    }

    /// The finished line, decoded lossily, or `None` if it was too long.
    /// Leaves the buffer empty.
    pub fn take(&mut self) -> Option<String> {
        let line = (!self.overflowed).then(|| String::from_utf8_lossy(&self.bytes).into_owned());

        self.bytes.clear();
        self.overflowed = false;

        line
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(MAX_LINE_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_across_pushes() {
        let mut line = LineBuffer::new(16);

        assert_eq!(line.push(b"P 10 "), (5, false));
        assert_eq!(line.push(b"20\np\n"), (3, true));
        assert_eq!(line.take().as_deref(), Some("P 10 20\n"));
        assert!(line.is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let mut line = LineBuffer::new(16);

        line.push(b"P \xff\xfe 10\n");

        assert_eq!(line.take().as_deref(), Some("P \u{fffd}\u{fffd} 10\n"));
    }

    #[test]
    fn test_long_line_is_dropped_whole() {
        let mut line = LineBuffer::new(4);

        assert_eq!(line.push(b"abcdef"), (6, false));
        assert!(!line.is_empty());
        assert_eq!(line.push(b"gh\np\n"), (3, true));
        assert_eq!(line.take(), None);

        // The following line is unaffected.
        assert_eq!(line.push(b"p\n"), (2, true));
        assert_eq!(line.take().as_deref(), Some("p\n"));
    }

    #[test]
    fn test_line_of_exactly_the_limit_fits() {
        let mut line = LineBuffer::new(4);

        line.push(b"abc\n");

        assert_eq!(line.take().as_deref(), Some("abc\n"));
    }
}
