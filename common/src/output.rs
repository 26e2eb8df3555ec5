// Line-oriented output for the consumers

use std::io::{self, Write};

/// Destination for rendered notification lines
pub trait LineSink {
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// Writes each line to stdout and flushes immediately
#[derive(Debug, Default)]
pub struct StdoutSink;

impl LineSink for StdoutSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", line)?;
        out.flush()
    }
}

/// Collects lines in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl LineSink for MemorySink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

/// Render at most `limit` payload bytes as a byte-string literal.
///
/// The literal is single-quoted unless the shown bytes contain `'` and no
/// `"`, in which case double quotes are used. Printable ASCII is kept, the
/// active quote and backslashes are escaped and every other byte becomes
/// `\n`, `\t`, `\r` or `\xNN`.
pub fn preview(payload: &[u8], limit: usize) -> String {
    let shown = &payload[..payload.len().min(limit)];
    let quote = if shown.contains(&b'\'') && !shown.contains(&b'"') {
        b'"'
    } else {
        b'\''
    };

    let mut rendered = String::with_capacity(shown.len() + 3);
    rendered.push('b');
    rendered.push(quote as char);
    for &byte in shown {
        match byte {
            b'\\' => rendered.push_str("\\\\"),
            b'\n' => rendered.push_str("\\n"),
            b'\t' => rendered.push_str("\\t"),
            b'\r' => rendered.push_str("\\r"),
            _ if byte == quote => {
                rendered.push('\\');
                rendered.push(byte as char);
            }
            0x20..=0x7e => rendered.push(byte as char),
            _ => rendered.push_str(&format!("\\x{:02x}", byte)),
        }
    }
    rendered.push(quote as char);
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_keeps_printable_ascii() {
        assert_eq!(preview(b"{\"id\":1}", 100), "b'{\"id\":1}'");
    }

    #[test]
    fn test_preview_truncates_to_limit() {
        let payload = vec![b'a'; 250];
        let rendered = preview(&payload, 100);
        assert_eq!(rendered, format!("b'{}'", "a".repeat(100)));
    }

    #[test]
    fn test_preview_escapes_control_and_non_ascii_bytes() {
        assert_eq!(preview(b"a\nb\t\x00\xff", 100), "b'a\\nb\\t\\x00\\xff'");
    }

    #[test]
    fn test_preview_switches_to_double_quotes_for_apostrophes() {
        assert_eq!(preview(b"it's", 100), "b\"it's\"");
        assert_eq!(preview(b"it's \\", 100), "b\"it's \\\\\"");
    }

    #[test]
    fn test_preview_escapes_single_quote_when_both_quotes_present() {
        assert_eq!(preview(b"it's \"x\"", 100), "b'it\\'s \"x\"'");
    }

    #[test]
    fn test_preview_of_empty_payload() {
        assert_eq!(preview(b"", 100), "b''");
    }

    #[test]
    fn test_memory_sink_collects_lines_in_order() {
        let mut sink = MemorySink::new();
        sink.write_line("first").unwrap();
        sink.write_line("second").unwrap();
        assert_eq!(sink.lines(), ["first".to_string(), "second".to_string()]);
    }
}
