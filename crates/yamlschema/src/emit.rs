use core::fmt;

/// Indentation-aware text sink for generated code.
///
/// Text is split on newlines internally. At the start of a line the buffer
/// writes two spaces per indent level before any content; an empty line
/// never receives indentation. A write without a trailing newline leaves the
/// cursor mid-line, so the next write continues it.
#[derive(Debug)]
pub struct EmitBuffer {
    out: String,
    indent: usize,
    sol: bool,
}

impl EmitBuffer {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
            sol: true,
        }
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn exdent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn write(&mut self, args: fmt::Arguments<'_>) {
        match args.as_str() {
            Some(text) => self.write_str(text),
            None => self.write_str(&args.to_string()),
        }
    }

    fn write_str(&mut self, mut text: &str) {
        while !text.is_empty() {
            match text.find('\n') {
                Some(idx) => {
                    let line = &text[..idx];
                    if !line.is_empty() {
                        self.pad();
                        self.out.push_str(line);
                    }
                    self.out.push('\n');
                    self.sol = true;
                    text = &text[idx + 1..];
                }
                None => {
                    self.pad();
                    self.out.push_str(text);
                    break;
                }
            }
        }
    }

    fn pad(&mut self) {
        if self.sol {
            for _ in 0..self.indent {
                self.out.push_str("  ");
            }
            self.sol = false;
        }
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

impl Default for EmitBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(buf: &mut EmitBuffer, text: &str) {
        buf.write(format_args!("{text}"));
    }

    #[test]
    fn lines_are_indented_at_start_only() {
        let mut buf = EmitBuffer::new();
        write(&mut buf, "if (x) {\n");
        buf.indent();
        write(&mut buf, "body();\n");
        buf.exdent();
        write(&mut buf, "}\n");
        assert_eq!(buf.as_str(), "if (x) {\n  body();\n}\n");
    }

    #[test]
    fn fragments_continue_the_current_line() {
        let mut buf = EmitBuffer::new();
        buf.indent();
        write(&mut buf, "a(");
        write(&mut buf, "b");
        write(&mut buf, ");\n");
        assert_eq!(buf.as_str(), "  a(b);\n");
    }

    #[test]
    fn empty_lines_carry_no_indentation() {
        let mut buf = EmitBuffer::new();
        buf.indent();
        buf.indent();
        write(&mut buf, "one\n\ntwo\n");
        assert_eq!(buf.as_str(), "    one\n\n    two\n");
    }

    #[test]
    fn multi_line_writes_indent_every_line() {
        let mut buf = EmitBuffer::new();
        buf.indent();
        write(&mut buf, "a;\nb;\n");
        assert_eq!(buf.as_str(), "  a;\n  b;\n");
    }

    #[test]
    fn exdent_never_underflows() {
        let mut buf = EmitBuffer::new();
        buf.exdent();
        write(&mut buf, "x\n");
        assert_eq!(buf.as_str(), "x\n");
    }
}
