//! Source preprocessing and the command cursor shared by both parsers.

/// Truncates a trailing `//` comment.
pub fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(index) => &line[..index],
        None => line,
    }
}

/// Iterates over the lines that carry a command, paired with their 1-based line numbers.
///
/// Comments are removed and the remainder is trimmed. Lines that end up empty are skipped.
pub fn significant_lines(source: &str) -> impl Iterator<Item = (usize, &str)> {
    source
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, strip_comment(line).trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// A rewindable cursor over an already classified command sequence.
///
/// The cursor starts *before* the first command: [Cursor::advance] has to be called once
/// before [Cursor::current] returns anything.
#[derive(Debug, Clone)]
pub struct Cursor<T> {
    buffer: Vec<T>,
    position: usize,
}

impl<T> Cursor<T> {
    pub fn new(buffer: Vec<T>) -> Cursor<T> {
        Cursor {
            buffer,
            position: 0,
        }
    }

    pub fn has_more(&self) -> bool {
        self.position < self.buffer.len()
    }

    /// Moves to the next item and returns it, or `None` when the input is exhausted.
    pub fn advance(&mut self) -> Option<&T> {
        let item = self.buffer.get(self.position)?;
        self.position += 1;
        Some(item)
    }

    pub fn current(&self) -> Option<&T> {
        match self.position {
            0 => None,
            position => self.buffer.get(position - 1),
        }
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    pub fn offset(&self) -> usize {
        self.position
    }

    /// All items regardless of the cursor position.
    pub fn items(&self) -> &[T] {
        &self.buffer[..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significant_lines() {
        let source = "// header\n\n  @2 // two\nD=A\n   \n// trailer";
        let lines = significant_lines(source).collect::<Vec<_>>();

        assert_eq!(lines, vec![(3, "@2"), (4, "D=A")]);
    }

    #[test]
    fn test_cursor_reset() {
        let mut cursor = Cursor::new(vec![1, 2]);

        assert_eq!(cursor.current(), None);
        assert_eq!(cursor.advance(), Some(&1));
        assert_eq!(cursor.advance(), Some(&2));
        assert!(!cursor.has_more());
        assert_eq!(cursor.advance(), None);
        assert_eq!(cursor.current(), Some(&2));

        cursor.reset();
        assert!(cursor.has_more());
        assert_eq!(cursor.advance(), Some(&1));
    }
}
