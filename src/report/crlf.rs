// src/report/crlf.rs

use std::io::{self, Write};

/// Writer adapter that turns bare `\n` into `\r\n`.
///
/// While the keypress monitor holds the terminal in raw mode the tty no
/// longer returns the carriage on newline, so every byte that reaches the
/// terminal (reports, forwarded command output, logs) goes through this.
/// Existing `\r\n` pairs are left alone.
#[derive(Debug)]
pub struct CrlfWriter<W: Write> {
    inner: W,
    last_was_cr: bool,
}

impl<W: Write> CrlfWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            last_was_cr: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CrlfWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut start = 0;
        for (i, &byte) in buf.iter().enumerate() {
            if byte != b'\n' {
                continue;
            }
            let preceded_by_cr = if i > 0 {
                buf[i - 1] == b'\r'
            } else {
                self.last_was_cr
            };
            self.inner.write_all(&buf[start..i])?;
            if !preceded_by_cr {
                self.inner.write_all(b"\r")?;
            }
            self.inner.write_all(b"\n")?;
            start = i + 1;
        }
        self.inner.write_all(&buf[start..])?;
        if let Some(&last) = buf.last() {
            self.last_was_cr = last == b'\r';
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
