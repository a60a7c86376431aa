//! Line buffer shared by the formatters

/// Accumulates indented output lines
///
/// Lines holding only indentation are dropped when the next line starts,
/// so callers can request a new line freely.
pub(crate) struct Printer {
    unit: String,
    lines: Vec<String>,
    current: String,
    glued: bool,
}

impl Printer {
    pub(crate) fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            lines: Vec::new(),
            current: String::new(),
            glued: false,
        }
    }

    /// Indentation made of `width` spaces
    pub(crate) fn spaces(width: usize) -> Self {
        Self::new(" ".repeat(width))
    }

    fn flush(&mut self) {
        if self.has_content() {
            self.lines.push(self.current.trim_end().to_string());
        }
        self.current.clear();
        self.glued = false;
    }

    /// Start a new line at the given indentation level
    pub(crate) fn newline(&mut self, level: usize) {
        self.flush();
        self.current = self.unit.repeat(level);
    }

    /// End the current line and leave one empty line after it
    pub(crate) fn blank_line(&mut self) {
        self.flush();
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(String::new());
        }
    }

    /// Append text, separated by a space when `space` is set and the line
    /// already has content
    pub(crate) fn write(&mut self, text: &str, space: bool) {
        if space && !self.glued && self.has_content() {
            self.current.push(' ');
        }
        self.current.push_str(text);
        self.glued = false;
    }

    /// Append text and suppress the space before whatever follows
    pub(crate) fn write_open(&mut self, text: &str, space: bool) {
        self.write(text, space);
        self.glued = true;
    }

    /// Continue the previous line when nothing was written on the current one
    pub(crate) fn rejoin(&mut self) {
        if self.has_content() || self.lines.last().map_or(true, |l| l.is_empty()) {
            return;
        }
        if let Some(line) = self.lines.pop() {
            self.current = line;
            self.glued = false;
        }
    }

    pub(crate) fn has_content(&self) -> bool {
        !self.current.trim().is_empty()
    }

    /// Width of the current line in characters
    pub(crate) fn width(&self) -> usize {
        self.current.chars().count()
    }

    pub(crate) fn finish(mut self) -> String {
        self.flush();
        while self.lines.last().is_some_and(|l| l.is_empty()) {
            self.lines.pop();
        }
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_only_lines_are_dropped() {
        let mut printer = Printer::spaces(2);
        printer.write("a", true);
        printer.newline(1);
        printer.newline(1);
        printer.write("b", true);
        printer.write("c", true);
        printer.blank_line();
        printer.blank_line();
        printer.newline(0);
        printer.write_open("d ", false);
        printer.write("e", true);
        assert_eq!(printer.finish(), "a\n  b c\n\nd e");
    }

    #[test]
    fn test_rejoin_continues_previous_line() {
        let mut printer = Printer::spaces(2);
        printer.write("{", false);
        printer.newline(1);
        printer.rejoin();
        printer.write("}", false);
        assert_eq!(printer.finish(), "{}");
    }
}
