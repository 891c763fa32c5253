//! Server-sent-event reader for the summary channel.
//!
//! Wire format: `data: {json}\n\n` per event, payload one of
//! `{text}` | `{done}` | `{error}`. A reader task pumps decoded events
//! into a bounded channel; the returned `SummaryStream` carries the task's
//! abort handle so the caller can cancel before the server finishes.

use super::client::ApiClient;
use crate::domain::SummaryEvent;
use crate::ports::SummaryStream;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const SUMMARY_STREAM_PATH: &str = "/chat/summary/stream";

/// Events buffered between the reader task and the consumer.
const EVENT_BUFFER: usize = 32;

pub(super) async fn open_summary_stream(
    client: &ApiClient,
) -> Result<SummaryStream, crate::domain::DomainError> {
    let response = client.get_stream(SUMMARY_STREAM_PATH).await?;
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let task = tokio::spawn(pump(response, tx));
    Ok(SummaryStream::new(rx, Some(task.abort_handle())))
}

/// Read the byte stream, reassemble lines across chunk boundaries, and
/// forward decoded events until a terminal event, a transport fault, or
/// the consumer hanging up.
async fn pump(response: reqwest::Response, tx: mpsc::Sender<SummaryEvent>) {
    let mut bytes = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = bytes.next().await {
        match chunk {
            Ok(data) => {
                buffer.extend_from_slice(&data);
                for event in drain_events(&mut buffer) {
                    let terminal =
                        matches!(event, SummaryEvent::Done | SummaryEvent::Error(_));
                    if tx.send(event).await.is_err() {
                        debug!("summary consumer closed; stopping reader");
                        return;
                    }
                    if terminal {
                        return;
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "summary stream transport fault");
                let _ = tx.send(SummaryEvent::Error(format!("connection lost: {e}"))).await;
                return;
            }
        }
    }

    // Server hung up without a done event.
    let _ = tx
        .send(SummaryEvent::Error("connection closed before completion".to_string()))
        .await;
}

/// Decode every complete line in `buffer`, leaving trailing bytes (a
/// partial line, possibly ending mid-codepoint) for the next chunk. The
/// buffer stays raw bytes: a chunk boundary can split a multi-byte UTF-8
/// character, so decoding happens per complete line only.
fn drain_events(buffer: &mut Vec<u8>) -> Vec<SummaryEvent> {
    let mut events = Vec::new();
    while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=newline).collect();
        let line = String::from_utf8_lossy(&line);
        if let Some(event) = parse_line(line.trim_end()) {
            events.push(event);
        }
    }
    events
}

/// One SSE line. Blank keep-alives and non-`data:` fields are skipped.
fn parse_line(line: &str) -> Option<SummaryEvent> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() {
        return None;
    }
    SummaryEvent::decode(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line_decodes_data_payloads() {
        assert_eq!(
            parse_line(r#"data: {"text":"hello"}"#),
            Some(SummaryEvent::Text("hello".to_string()))
        );
        assert_eq!(parse_line(r#"data: {"done":true}"#), Some(SummaryEvent::Done));
        assert_eq!(
            parse_line(r#"data: {"error":"model overloaded"}"#),
            Some(SummaryEvent::Error("model overloaded".to_string()))
        );
    }

    #[test]
    fn parse_line_skips_non_data_fields() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line(": keep-alive"), None);
        assert_eq!(parse_line("event: message"), None);
        assert_eq!(parse_line("data:"), None);
    }

    #[test]
    fn drain_events_handles_multiple_events_per_chunk() {
        let mut buffer =
            b"data: {\"text\":\"a\"}\n\ndata: {\"text\":\"b\"}\n\ndata: {\"done\":true}\n\n".to_vec();
        let events = drain_events(&mut buffer);
        assert_eq!(
            events,
            vec![
                SummaryEvent::Text("a".to_string()),
                SummaryEvent::Text("b".to_string()),
                SummaryEvent::Done,
            ]
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn drain_events_keeps_partial_line_for_next_chunk() {
        let mut buffer = b"data: {\"text\":\"a\"}\ndata: {\"te".to_vec();
        let events = drain_events(&mut buffer);
        assert_eq!(events, vec![SummaryEvent::Text("a".to_string())]);
        assert_eq!(buffer, b"data: {\"te");

        // The rest of the event arrives in the next chunk.
        buffer.extend_from_slice(b"xt\":\"b\"}\n");
        let events = drain_events(&mut buffer);
        assert_eq!(events, vec![SummaryEvent::Text("b".to_string())]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn drain_events_reassembles_codepoint_split_across_chunks() {
        let full = "data: {\"text\":\"r\u{e9}sum\u{e9}\"}\n".as_bytes();
        // Cut between the two bytes of the first "é".
        let split = full.iter().position(|&b| b == 0xC3).expect("lead byte") + 1;

        let mut buffer = full[..split].to_vec();
        assert!(drain_events(&mut buffer).is_empty());

        buffer.extend_from_slice(&full[split..]);
        let events = drain_events(&mut buffer);
        assert_eq!(
            events,
            vec![SummaryEvent::Text("r\u{e9}sum\u{e9}".to_string())]
        );
        assert!(buffer.is_empty());
    }
}
