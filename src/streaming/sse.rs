//! Incremental server-sent events decoder.
//!
//! Network chunks rarely line up with event boundaries, so bytes are
//! buffered until a full line is available and `data:` fields are collected
//! until the blank line that ends the event.

/// Payload that marks the end of a completion stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// One complete event-stream frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// A data payload (multiple `data:` lines joined with `\n`)
    Data(String),
    /// The `[DONE]` sentinel
    Done,
}

/// Line-buffering decoder for `text/event-stream` bodies.
#[derive(Debug, Default)]
pub struct SseDecoder {
    partial_line: Vec<u8>,
    /// Bytes of `partial_line` already known to contain no newline.
    scanned: usize,
    data_lines: Vec<String>,
}

impl SseDecoder {
    /// Creates an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk of bytes and returns every frame it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.partial_line.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(offset) = self.partial_line[self.scanned..]
            .iter()
            .position(|&b| b == b'\n')
        {
            let newline = self.scanned + offset;
            self.scanned = 0;
            let mut line: Vec<u8> = self.partial_line.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            if let Some(frame) = self.process_line(&String::from_utf8_lossy(&line)) {
                frames.push(frame);
            }
        }
        self.scanned = self.partial_line.len();
        frames
    }

    /// Flushes a trailing event that was not followed by a blank line.
    pub fn finish(&mut self) -> Option<SseFrame> {
        if !self.partial_line.is_empty() {
            self.scanned = 0;
            let line = std::mem::take(&mut self.partial_line);
            let line = String::from_utf8_lossy(&line);
            if let Some(frame) = self.process_line(line.trim_end_matches('\r')) {
                return Some(frame);
            }
        }
        self.dispatch()
    }

    /// Returns true if no partial line or pending data is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partial_line.is_empty() && self.data_lines.is_empty()
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }

        // Comment line
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        if field == "data" {
            self.data_lines.push(value.to_string());
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        if self.data_lines.is_empty() {
            return None;
        }

        let data = std::mem::take(&mut self.data_lines).join("\n");
        if data.trim() == DONE_SENTINEL {
            Some(SseFrame::Done)
        } else {
            Some(SseFrame::Data(data))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_single_event() {
        let mut decoder = SseDecoder::new();

        let frames = decoder.push(b"data: {\"id\":\"1\"}\n\n");

        assert_eq!(frames, vec![SseFrame::Data("{\"id\":\"1\"}".to_string())]);
        assert!(decoder.is_empty());
    }

    #[test]
    fn decodes_done_sentinel() {
        let mut decoder = SseDecoder::new();

        let frames = decoder.push(b"data: [DONE]\n\n");

        assert_eq!(frames, vec![SseFrame::Done]);
    }

    #[test]
    fn reassembles_frames_split_across_chunks() {
        let mut decoder = SseDecoder::new();

        assert!(decoder.push(b"data: {\"id\"").is_empty());
        assert!(decoder.push(b":\"abc\"}").is_empty());
        assert!(decoder.push(b"\n").is_empty());
        let frames = decoder.push(b"\ndata: [DO");

        assert_eq!(frames, vec![SseFrame::Data("{\"id\":\"abc\"}".to_string())]);
        assert_eq!(decoder.push(b"NE]\n\n"), vec![SseFrame::Done]);
    }

    #[test]
    fn long_frame_fed_byte_by_byte_resumes_scan() {
        let mut decoder = SseDecoder::new();
        let payload = "x".repeat(4_096);
        let event = format!("data: {payload}\n\n");

        let mut frames = Vec::new();
        for byte in event.as_bytes() {
            frames.extend(decoder.push(std::slice::from_ref(byte)));
            assert_eq!(decoder.scanned, decoder.partial_line.len());
        }

        assert_eq!(frames, vec![SseFrame::Data(payload)]);
        assert!(decoder.is_empty());
    }

    #[test]
    fn handles_multibyte_characters_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let event = "data: héllo\n\n".as_bytes();
        let split = event.iter().position(|&b| b == 0xC3).unwrap() + 1;

        assert!(decoder.push(&event[..split]).is_empty());
        let frames = decoder.push(&event[split..]);

        assert_eq!(frames, vec![SseFrame::Data("héllo".to_string())]);
    }

    #[test]
    fn accepts_crlf_line_endings() {
        let mut decoder = SseDecoder::new();

        let frames = decoder.push(b"data: one\r\n\r\ndata: [DONE]\r\n\r\n");

        assert_eq!(
            frames,
            vec![SseFrame::Data("one".to_string()), SseFrame::Done]
        );
    }

    #[test]
    fn ignores_comments_and_other_fields() {
        let mut decoder = SseDecoder::new();

        let frames = decoder.push(b": keep-alive\n\nevent: message\nid: 7\nretry: 100\ndata: payload\n\n");

        assert_eq!(frames, vec![SseFrame::Data("payload".to_string())]);
    }

    #[test]
    fn joins_multiline_data() {
        let mut decoder = SseDecoder::new();

        let frames = decoder.push(b"data: first\ndata: second\n\n");

        assert_eq!(frames, vec![SseFrame::Data("first\nsecond".to_string())]);
    }

    #[test]
    fn data_without_space_after_colon() {
        let mut decoder = SseDecoder::new();

        let frames = decoder.push(b"data:{}\n\n");

        assert_eq!(frames, vec![SseFrame::Data("{}".to_string())]);
    }

    #[test]
    fn multiple_events_in_one_chunk() {
        let mut decoder = SseDecoder::new();

        let frames = decoder.push(b"data: a\n\ndata: b\n\ndata: [DONE]\n\n");

        assert_eq!(
            frames,
            vec![
                SseFrame::Data("a".to_string()),
                SseFrame::Data("b".to_string()),
                SseFrame::Done
            ]
        );
    }

    #[test]
    fn finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::new();

        assert!(decoder.push(b"data: [DONE]").is_empty());

        assert_eq!(decoder.finish(), Some(SseFrame::Done));
        assert!(decoder.is_empty());
    }

    #[test]
    fn finish_on_empty_decoder_yields_nothing() {
        let mut decoder = SseDecoder::new();
        assert_eq!(decoder.finish(), None);
    }
}
