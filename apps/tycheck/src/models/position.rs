//! Offset <-> line/character conversion over a source text.
//!
//! Offsets and characters count UTF-16 code units, the unit compiler
//! columns are reported in. `\n`, `\r\n` and a lone `\r` each end a line.

#[derive(Debug, Clone)]
pub struct LineMap {
    starts: Vec<usize>,
    len: usize,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        let mut chars = text.chars().peekable();
        let mut len = 0;
        while let Some(c) = chars.next() {
            len += c.len_utf16();
            match c {
                '\r' => {
                    if let Some('\n') = chars.peek() {
                        chars.next();
                        len += 1;
                    }
                    starts.push(len);
                }
                '\n' => starts.push(len),
                _ => {}
            }
        }
        Self { starts, len }
    }

    /// 0-based line and character of `offset`. Offsets past the end clamp to
    /// the end of the text.
    pub fn line_and_character(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let line = match self.starts.binary_search(&offset) {
            Ok(l) => l,
            Err(l) => l - 1,
        };
        (line, offset - self.starts[line])
    }

    /// Offset of a 0-based line/character pair.
    pub fn offset(&self, line: usize, character: usize) -> Option<usize> {
        let start = *self.starts.get(line)?;
        Some((start + character).min(self.len))
    }
}
