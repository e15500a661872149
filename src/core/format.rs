//! Purpose: Centralize dialect read/write options.
//! Exports: `ReadOptions`, `WriteOptions`, `LineEnding`.
//! Role: Shared configuration for the builder, writer and CLI flags.
//! Invariants: Readers always accept both LF and CRLF; the line ending only affects writes.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn native() -> Self {
        if cfg!(windows) {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            LineEnding::Lf => b"\n",
            LineEnding::CrLf => b"\r\n",
        }
    }
}

impl Default for LineEnding {
    fn default() -> Self {
        Self::native()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReadOptions {
    pub has_header: bool,
}

impl ReadOptions {
    pub fn new(has_header: bool) -> Self {
        Self { has_header }
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self { has_header: true }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WriteOptions {
    pub header: bool,
    pub line_ending: LineEnding,
}

impl WriteOptions {
    pub fn new(header: bool) -> Self {
        Self {
            header,
            line_ending: LineEnding::native(),
        }
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::{LineEnding, WriteOptions};

    #[test]
    fn line_endings_encode_expected_bytes() {
        assert_eq!(LineEnding::Lf.as_bytes(), b"\n");
        assert_eq!(LineEnding::CrLf.as_bytes(), b"\r\n");
    }

    #[test]
    fn write_options_default_to_header_and_native_eol() {
        let options = WriteOptions::default();
        assert!(options.header);
        assert_eq!(options.line_ending, LineEnding::native());
        let lf = WriteOptions::new(false).with_line_ending(LineEnding::Lf);
        assert_eq!(lf.line_ending, LineEnding::Lf);
        assert!(!lf.header);
    }
}
