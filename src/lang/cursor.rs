/// Mutable character cursor over one command line.
///
/// The dispatcher, the expression evaluator, and the flow-control verbs all
/// advance a shared cursor. Commands are 8-bit text; the cursor works on
/// bytes and reports a zero byte at end of line so callers can test for a
/// terminator without an option dance.
#[derive(Debug, Clone)]
pub struct Cursor {
    buf: Vec<u8>,
    pos: usize,
}

impl Cursor {
    pub fn new(text: &str) -> Cursor {
        Cursor {
            buf: text.as_bytes().to_vec(),
            pos: 0,
        }
    }

    /// Current byte, or 0 past the end of the line.
    pub fn ch(&self) -> u8 {
        *self.buf.get(self.pos).unwrap_or(&0)
    }

    pub fn bump(&mut self) {
        if self.pos < self.buf.len() {
            self.pos += 1;
        }
    }

    /// Step back one byte. Used when `!` turns out to start a comment
    /// rather than a `!=` operator.
    pub fn back(&mut self) {
        if self.pos > 0 {
            self.pos -= 1;
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.buf.len());
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// At end of line or at the `;` command separator.
    pub fn at_break(&self) -> bool {
        self.at_end() || self.ch() == b';'
    }

    pub fn skip_spaces(&mut self) {
        while self.ch() == b' ' {
            self.bump();
        }
    }

    /// Next space-delimited word: leading spaces skipped, then a run of
    /// alphanumerics, `?`, or `.`. May be empty when the cursor rests on
    /// punctuation.
    pub fn take_word(&mut self) -> String {
        self.skip_spaces();
        let mut w = String::new();
        loop {
            let c = self.ch();
            if c.is_ascii_alphanumeric() || c == b'?' || c == b'.' {
                w.push(c as char);
                self.bump();
            } else {
                break;
            }
        }
        w
    }

    /// Advance to the `;` separator or end of line without consuming it.
    pub fn skip_to_break(&mut self) {
        while !self.at_break() {
            self.bump();
        }
    }

    /// Advance past the rest of the current command, consuming a trailing
    /// `;` if present.
    pub fn skip_command(&mut self) {
        self.skip_to_break();
        if self.ch() == b';' {
            self.bump();
        }
    }

    /// Remaining text of the current command, cursor left at the break.
    pub fn take_to_break(&mut self) -> String {
        let mut s = String::new();
        while !self.at_break() {
            s.push(self.ch() as char);
            self.bump();
        }
        s
    }

    pub fn to_line_end(&mut self) {
        self.pos = self.buf.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_and_break() {
        let mut c = Cursor::new("  read 0x10; next");
        assert_eq!(c.take_word(), "read");
        assert_eq!(c.ch(), b' ');
        assert_eq!(c.take_word(), "0x10");
        assert!(c.at_break());
        c.skip_command();
        assert_eq!(c.take_word(), "next");
        assert!(c.at_end());
        assert_eq!(c.ch(), 0);
    }

    #[test]
    fn test_word_stops_at_punctuation() {
        let mut c = Cursor::new("label(a b): text");
        assert_eq!(c.take_word(), "label");
        assert_eq!(c.ch(), b'(');
        c.bump();
        assert_eq!(c.take_word(), "a");
        assert_eq!(c.take_word(), "b");
        assert_eq!(c.ch(), b')');
    }

    #[test]
    fn test_take_to_break() {
        let mut c = Cursor::new("hello there; rest");
        assert_eq!(c.take_to_break(), "hello there");
        assert_eq!(c.ch(), b';');
    }

    #[test]
    fn test_filenames_are_words() {
        let mut c = Cursor::new("discdiag.ini");
        assert_eq!(c.take_word(), "discdiag.ini");
    }
}
