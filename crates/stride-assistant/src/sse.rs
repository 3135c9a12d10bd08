//! Incremental decoder for `text/event-stream` chat completion frames.

use crate::types::StreamChunk;

const DATA_PREFIX: &str = "data: ";
const DONE_MARKER: &str = "[DONE]";

// ─── SseDecoder ───────────────────────────────────────────────────────────

/// Turns arbitrarily split transport chunks into text fragments.
///
/// Lines are split at `\n` with a trailing `\r` removed. Comment lines
/// (`:`), blank lines and lines without a `data: ` prefix are skipped. A
/// `data:` line whose JSON does not parse is kept in the buffer and retried
/// when more bytes arrive. `data: [DONE]` ends the stream.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    done: bool,
}

enum Line {
    Skip,
    Done,
    Text(String),
    Incomplete,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one transport chunk and return the fragments it completed.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut out = Vec::new();
        if self.done {
            return out;
        }
        self.buf.extend_from_slice(bytes);

        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw[..raw.len() - 1]).into_owned();
            match classify(&line) {
                Line::Skip => {}
                Line::Done => {
                    self.done = true;
                    self.buf.clear();
                    break;
                }
                Line::Text(text) => out.push(text),
                Line::Incomplete => {
                    // Put it back and wait for more data.
                    let mut rest = std::mem::take(&mut self.buf);
                    self.buf = raw;
                    self.buf.append(&mut rest);
                    break;
                }
            }
        }
        out
    }

    /// Flush whatever is left once the transport has ended. Lines that still
    /// fail to decode are dropped.
    pub fn finish(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        if self.done {
            return out;
        }
        let rest = std::mem::take(&mut self.buf);
        for line in String::from_utf8_lossy(&rest).split('\n') {
            match classify(line) {
                Line::Done => break,
                Line::Text(text) => out.push(text),
                Line::Skip => {}
                Line::Incomplete => {
                    tracing::debug!(line, "dropping undecodable trailing frame");
                }
            }
        }
        self.done = true;
        out
    }
}

fn classify(line: &str) -> Line {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.starts_with(':') || line.trim().is_empty() {
        return Line::Skip;
    }
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Line::Skip;
    };
    let payload = payload.trim();
    if payload == DONE_MARKER {
        return Line::Done;
    }
    match serde_json::from_str::<StreamChunk>(payload) {
        Ok(chunk) => match chunk.text() {
            Some(text) => Line::Text(text.to_string()),
            None => Line::Skip,
        },
        Err(_) => Line::Incomplete,
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(text: &str) -> String {
        format!("data: {{\"choices\":[{{\"delta\":{{\"content\":\"{text}\"}}}}]}}\n\n")
    }

    #[test]
    fn whole_frames_decode_in_order() {
        let mut d = SseDecoder::new();
        let input = format!("{}{}data: [DONE]\n\n", frame("Hel"), frame("lo"));
        let out = d.push(input.as_bytes());
        assert_eq!(out.concat(), "Hello");
        assert!(d.is_done());
    }

    #[test]
    fn frames_split_across_chunks() {
        let mut d = SseDecoder::new();
        let input = format!("{}{}", frame("Hel"), frame("lo"));
        let bytes = input.as_bytes();
        let mut out = Vec::new();
        for piece in bytes.chunks(7) {
            out.extend(d.push(piece));
        }
        assert_eq!(out, vec!["Hel".to_string(), "lo".to_string()]);
        assert!(!d.is_done());
    }

    #[test]
    fn line_without_newline_waits_for_more() {
        let mut d = SseDecoder::new();
        assert!(d.push(b"data: {\"choices\":[{\"delta\":").is_empty());
        let out = d.push(b"{\"content\":\"hi\"}}]}\n");
        assert_eq!(out, vec!["hi".to_string()]);
    }

    #[test]
    fn comments_blank_and_other_fields_are_ignored() {
        let mut d = SseDecoder::new();
        let input = format!(": keep-alive\r\n\r\nevent: message\n{}", frame("x"));
        assert_eq!(d.push(input.as_bytes()), vec!["x".to_string()]);
    }

    #[test]
    fn crlf_line_endings() {
        let mut d = SseDecoder::new();
        let out = d.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\r\n");
        assert_eq!(out, vec!["a".to_string()]);
    }

    #[test]
    fn bad_json_is_rebuffered_and_blocks_later_lines() {
        let mut d = SseDecoder::new();
        let input = format!("data: {{oops\n{}", frame("later"));
        assert!(d.push(input.as_bytes()).is_empty());
        // The broken line stays at the front until the transport ends.
        assert!(d.push(b"").is_empty());
        assert_eq!(d.finish(), vec!["later".to_string()]);
    }

    #[test]
    fn nothing_after_done() {
        let mut d = SseDecoder::new();
        let input = format!("data: [DONE]\n{}", frame("late"));
        assert!(d.push(input.as_bytes()).is_empty());
        assert!(d.push(frame("later").as_bytes()).is_empty());
        assert!(d.finish().is_empty());
    }

    #[test]
    fn finish_flushes_unterminated_last_line() {
        let mut d = SseDecoder::new();
        d.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}");
        assert_eq!(d.finish(), vec!["tail".to_string()]);
    }

    #[test]
    fn role_only_delta_yields_nothing() {
        let mut d = SseDecoder::new();
        assert!(d
            .push(b"data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n")
            .is_empty());
    }
}
