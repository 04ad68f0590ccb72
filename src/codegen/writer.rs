/// Line-oriented source buffer with brace-driven indentation.
#[derive(Debug, Default)]
pub struct SourceWriter {
    buf: String,
    depth: usize,
}

const INDENT: &str = "    ";

impl SourceWriter {
    pub fn new() -> Self { Self::default() }

    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.buf.push('\n');
            return;
        }
        for _ in 0..self.depth {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Write `text` (normally ending in `{`) and indent what follows.
    pub fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.depth += 1;
    }

    /// Dedent, then write `text` (normally a closing brace).
    pub fn close(&mut self, text: impl AsRef<str>) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }

    /// `///` doc comment, one line per line of `text`. Nothing for empty text.
    pub fn doc(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        for l in text.lines() {
            let l = l.trim_end();
            if l.is_empty() {
                self.line("///");
            } else {
                self.line(format!("/// {l}"));
            }
        }
    }

    pub fn into_string(self) -> String { self.buf }
}
