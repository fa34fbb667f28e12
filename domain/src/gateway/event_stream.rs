//! Decoding of `text/event-stream` response bodies into their `data:` payloads.

use async_stream::stream;
use futures::{Stream, StreamExt};
use meeting_ai::Error;

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

/// Streams the `data:` payloads of a server-sent-events response body.
///
/// Comment, `event:` and `id:` lines are ignored. The stream ends at the
/// OpenAI-style `[DONE]` sentinel or when the body ends, whichever comes first.
pub(crate) fn data_payloads(
    response: reqwest::Response,
) -> impl Stream<Item = Result<String, Error>> + Send + 'static {
    stream! {
        let mut body = response.bytes_stream();
        let mut decoder = LineDecoder::default();

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(Error::Network(format!("event stream interrupted: {e}")));
                    return;
                }
            };
            for line in decoder.push(&chunk) {
                match classify(&line) {
                    Line::Data(payload) => yield Ok(payload),
                    Line::Done => return,
                    Line::Ignored => {}
                }
            }
        }

        if let Some(Line::Data(payload)) = decoder.finish().map(|line| classify(&line)) {
            yield Ok(payload);
        }
    }
}

#[derive(Debug, PartialEq)]
enum Line {
    Data(String),
    Done,
    Ignored,
}

fn classify(line: &str) -> Line {
    match line.strip_prefix(DATA_PREFIX) {
        Some(payload) => {
            let payload = payload.trim();
            if payload == DONE_SENTINEL {
                Line::Done
            } else if payload.is_empty() {
                Line::Ignored
            } else {
                Line::Data(payload.to_string())
            }
        }
        None => Line::Ignored,
    }
}

/// Splits a byte stream into lines without breaking multi-byte characters
/// that straddle chunk boundaries.
#[derive(Debug, Default)]
struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            lines.push(Self::decode(&raw));
        }
        lines
    }

    fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let raw = std::mem::take(&mut self.buffer);
        Some(Self::decode(&raw))
    }

    fn decode(raw: &[u8]) -> String {
        String::from_utf8_lossy(raw)
            .trim_end_matches(['\r', '\n'])
            .to_string()
    }
}
