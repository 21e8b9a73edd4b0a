//! Accumulates client bytes until a complete program has arrived.

/// Matched as raw bytes, so `as` inside a leading word such as `has` also anchors.
const PROGRAM_START: &[u8] = b"as";
const PROGRAM_END: &[u8] = b"***";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// More input is needed.
    Pending,
    /// Text from the first `as` through the terminator.
    Ready(String),
    /// The program exceeds the configured size.
    Overflow,
}

#[derive(Debug)]
pub struct ProgramBuffer {
    data: Vec<u8>,
    anchored: bool,
    max_bytes: usize,
}

impl ProgramBuffer {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            data: Vec::new(),
            anchored: false,
            max_bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn push(&mut self, bytes: &[u8]) -> Feed {
        self.data.extend_from_slice(bytes);

        if !self.anchored {
            match find(&self.data, PROGRAM_START) {
                Some(start) => {
                    self.data.drain(..start);
                    self.anchored = true;
                }
                None => {
                    // Keep a trailing 'a' in case the next chunk starts with 's'.
                    let keep = usize::from(self.data.last() == Some(&PROGRAM_START[0]));
                    let cut = self.data.len() - keep;
                    self.data.drain(..cut);
                    return Feed::Pending;
                }
            }
        }

        match find(&self.data, PROGRAM_END) {
            Some(end) => {
                let program_len = end + PROGRAM_END.len();
                if program_len > self.max_bytes {
                    return Feed::Overflow;
                }
                Feed::Ready(String::from_utf8_lossy(&self.data[..program_len]).into_owned())
            }
            // Without a terminator the data can only grow past the limit.
            None if self.data.len() >= self.max_bytes + PROGRAM_END.len() => Feed::Overflow,
            None => Feed::Pending,
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discards_leading_garbage() {
        let mut buffer = ProgramBuffer::new(1_000);
        assert_eq!(buffer.push(b"noise\n"), Feed::Pending);
        assert!(buffer.is_empty());
        assert_eq!(
            buffer.push(b"as principal admin password \"admin\" do\nexit\n***\nafter"),
            Feed::Ready("as principal admin password \"admin\" do\nexit\n***".into())
        );
    }

    #[test]
    fn joins_split_markers() {
        let mut buffer = ProgramBuffer::new(1_000);
        assert_eq!(buffer.push(b"xxa"), Feed::Pending);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.push(b"s principal p password \"x\" do\n*"), Feed::Pending);
        assert_eq!(
            buffer.push(b"**"),
            Feed::Ready("as principal p password \"x\" do\n***".into())
        );
    }

    #[test]
    fn anchors_on_first_as_even_inside_a_word() {
        let mut buffer = ProgramBuffer::new(1_000);
        assert_eq!(
            buffer.push(b"it has\n***"),
            Feed::Ready("as\n***".into())
        );
    }

    #[test]
    fn oversize_program_overflows() {
        let mut buffer = ProgramBuffer::new(10);
        assert_eq!(buffer.push(b"as 123456789\n***"), Feed::Overflow);
    }

    #[test]
    fn unterminated_growth_overflows() {
        let mut buffer = ProgramBuffer::new(10);
        assert_eq!(buffer.push(b"as 1234"), Feed::Pending);
        assert_eq!(buffer.push(b"56789012"), Feed::Overflow);
    }
}
