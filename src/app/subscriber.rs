// LogPulse - app/subscriber.rs
//
// Live event subscriber: keeps a server-sent event stream open and forwards
// `newLog` / `statsUpdate` events to the UI thread.
//
// Architecture:
//   - `StreamManager` lives on the UI thread; `run_subscriber` runs on a
//     background thread holding the HTTP connection.
//   - An `Arc<AtomicBool>` cancel flag allows the UI to stop the stream.
//     Dropping the manager stops it too, so the connection is released on
//     every exit path of the owning view.
//   - Events are sent as `StreamProgress` messages over an mpsc channel and
//     drained by the UI each frame.
//
// Resilience:
//   - Connect failures, non-2xx answers, read errors and clean server
//     closes all lead to a reconnect with capped exponential backoff
//     (RECONNECT_INITIAL_DELAY_MS doubling up to RECONNECT_MAX_DELAY_MS).
//     The attempt counter resets once a connection has been established.
//   - Malformed payloads are reported as `Malformed` and otherwise dropped.
//   - Lines are read with a hard cap (MAX_EVENT_LINE_BYTES); an overlong
//     line is skipped up to its newline and its frame discarded.
//   - Every body read is bounded by the idle timeout, so a silent or
//     half-open connection ends in a reconnect instead of a hung thread.
//   - Reconnect sleeps are sliced so cancel is noticed within
//     STREAM_CANCEL_CHECK_INTERVAL_MS. While connected, cancel is noticed at
//     the next line, or at the latest when the idle timeout fires.

use crate::core::model::StreamProgress;
use crate::core::wire::{self, SseDecoder, SseEvent};
use crate::util::constants::{
    DEFAULT_STREAM_IDLE_TIMEOUT_SECS, EVENT_NEW_LOG, EVENT_STATS_UPDATE, MAX_EVENT_LINE_BYTES,
    RECONNECT_INITIAL_DELAY_MS, RECONNECT_MAX_DELAY_MS, STREAM_CANCEL_CHECK_INTERVAL_MS,
    STREAM_CONNECT_TIMEOUT_SECS,
};
use crate::util::error::StreamError;
use std::io::{self, BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

// =============================================================================
// StreamManager
// =============================================================================

/// Owns the background subscriber thread for the lifetime of the view.
pub struct StreamManager {
    /// Channel receiver for the UI to poll stream messages.
    progress_rx: Option<mpsc::Receiver<StreamProgress>>,
    /// Cancel flag shared with the background thread.
    cancel_flag: Option<Arc<AtomicBool>>,
    /// Longest silence tolerated on an open connection.
    idle_timeout: Duration,
}

impl StreamManager {
    pub fn new() -> Self {
        Self {
            progress_rx: None,
            cancel_flag: None,
            idle_timeout: Duration::from_secs(DEFAULT_STREAM_IDLE_TIMEOUT_SECS),
        }
    }

    /// Set the idle timeout used by streams started after this call.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Open the event stream at `url`. If one is already open it is stopped
    /// first.
    pub fn start(&mut self, url: String) {
        self.stop();

        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));

        self.progress_rx = Some(rx);
        self.cancel_flag = Some(Arc::clone(&cancel));

        let idle_timeout = self.idle_timeout;
        tracing::info!(
            url = %url,
            idle_timeout_secs = idle_timeout.as_secs_f32(),
            "Event stream subscriber starting"
        );
        std::thread::spawn(move || {
            run_subscriber(url, idle_timeout, tx, cancel);
        });
    }

    /// Ask the background thread to stop and release the channel.
    pub fn stop(&mut self) {
        if let Some(flag) = self.cancel_flag.take() {
            flag.store(true, Ordering::SeqCst);
            tracing::info!("Event stream subscriber stopping");
        }
        self.progress_rx = None;
    }

    /// Returns `true` while a subscriber thread is attached.
    pub fn is_active(&self) -> bool {
        self.cancel_flag.is_some()
    }

    /// Drain up to `max` pending messages without blocking.
    pub fn poll_progress(&self, max: usize) -> Vec<StreamProgress> {
        let mut messages = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while messages.len() < max {
                match rx.try_recv() {
                    Ok(msg) => messages.push(msg),
                    Err(_) => break,
                }
            }
        }
        messages
    }
}

impl Default for StreamManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for StreamManager {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// Event translation
// =============================================================================

/// Translate a decoded frame into a progress message.
///
/// Returns `None` for event names the dashboard does not use.
pub fn translate_event(frame: &SseEvent) -> Option<StreamProgress> {
    match frame.event.as_str() {
        EVENT_NEW_LOG => Some(match wire::decode_record_str(&frame.data) {
            Ok(record) => StreamProgress::NewLog { record },
            Err(e) => malformed(frame, e.to_string()),
        }),
        EVENT_STATS_UPDATE => Some(match wire::decode_stats_str(&frame.data) {
            Ok(stats) => StreamProgress::StatsUpdate { stats },
            Err(e) => malformed(frame, e.to_string()),
        }),
        other => {
            tracing::debug!(event = other, "Ignoring unrecognised stream event");
            None
        }
    }
}

fn malformed(frame: &SseEvent, reason: String) -> StreamProgress {
    tracing::warn!(
        event = %frame.event,
        reason = %reason,
        payload = crate::util::logging::preview(&frame.data),
        "Dropping malformed stream event"
    );
    StreamProgress::Malformed {
        event: frame.event.clone(),
        reason,
    }
}

/// Delay before reconnect attempt `attempt` (1-based).
pub fn backoff_delay_ms(attempt: u32) -> u64 {
    let exponent = attempt.saturating_sub(1).min(16);
    RECONNECT_INITIAL_DELAY_MS
        .saturating_mul(1u64 << exponent)
        .min(RECONNECT_MAX_DELAY_MS)
}

// =============================================================================
// Background subscriber
// =============================================================================

/// How a single connection ended without an error worth retrying.
enum StreamEnd {
    Cancelled,
    ReceiverGone,
}

/// Connection loop. Runs until cancelled or until the UI drops the receiver.
fn run_subscriber(
    url: String,
    idle_timeout: Duration,
    tx: mpsc::Sender<StreamProgress>,
    cancel: Arc<AtomicBool>,
) {
    // The blocking client applies `timeout` to each body read, which makes
    // it an idle timeout for the long-lived stream.
    let client = match reqwest::blocking::Client::builder()
        .connect_timeout(Duration::from_secs(STREAM_CONNECT_TIMEOUT_SECS))
        .timeout(idle_timeout)
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            let err = StreamError::Client { source: e };
            tracing::error!(error = %err, "Event stream disabled");
            let _ = tx.send(StreamProgress::Stopped);
            return;
        }
    };

    let mut attempt: u32 = 0;
    loop {
        if cancel.load(Ordering::SeqCst) {
            let _ = tx.send(StreamProgress::Stopped);
            return;
        }

        let mut connected = false;
        let error = match stream_once(&client, &url, &tx, &cancel, &mut connected) {
            Ok(StreamEnd::Cancelled) => {
                let _ = tx.send(StreamProgress::Stopped);
                tracing::info!("Event stream subscriber stopped");
                return;
            }
            Ok(StreamEnd::ReceiverGone) => return,
            Err(_) if cancel.load(Ordering::SeqCst) => {
                // Stopped while blocked in a read; nothing to retry.
                let _ = tx.send(StreamProgress::Stopped);
                tracing::info!("Event stream subscriber stopped");
                return;
            }
            Err(e) => e,
        };

        attempt = if connected { 1 } else { attempt.saturating_add(1) };
        let delay_ms = backoff_delay_ms(attempt);
        tracing::warn!(
            error = %error,
            attempt,
            delay_ms,
            "Event stream disconnected; reconnecting"
        );
        if tx
            .send(StreamProgress::Disconnected {
                error: error.to_string(),
                attempt,
                delay_ms,
            })
            .is_err()
        {
            return;
        }

        // Interruptible sleep: check cancel flag between slices.
        let slices = (delay_ms / STREAM_CANCEL_CHECK_INTERVAL_MS).max(1);
        for _ in 0..slices {
            std::thread::sleep(Duration::from_millis(STREAM_CANCEL_CHECK_INTERVAL_MS));
            if cancel.load(Ordering::SeqCst) {
                let _ = tx.send(StreamProgress::Stopped);
                return;
            }
        }
    }
}

/// Hold one connection open, forwarding events until it ends.
fn stream_once(
    client: &reqwest::blocking::Client,
    url: &str,
    tx: &mpsc::Sender<StreamProgress>,
    cancel: &AtomicBool,
    connected: &mut bool,
) -> Result<StreamEnd, StreamError> {
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .send()
        .map_err(|e| StreamError::Connect {
            url: url.to_string(),
            source: e,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(StreamError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    *connected = true;
    tracing::info!(url, "Event stream connected");
    if tx.send(StreamProgress::Connected).is_err() {
        return Ok(StreamEnd::ReceiverGone);
    }

    let mut reader = BufReader::new(response);
    let mut decoder = SseDecoder::new();
    let mut buf = Vec::new();

    loop {
        if cancel.load(Ordering::SeqCst) {
            return Ok(StreamEnd::Cancelled);
        }

        let read = read_line_capped(&mut reader, &mut buf, MAX_EVENT_LINE_BYTES).map_err(
            |e| StreamError::Read {
                url: url.to_string(),
                source: e,
            },
        )?;
        match read {
            LineRead::Eof => {
                return Err(StreamError::Closed {
                    url: url.to_string(),
                });
            }
            LineRead::Oversized => {
                tracing::debug!(max_bytes = MAX_EVENT_LINE_BYTES, "Skipped overlong stream line");
                decoder.discard_current();
                continue;
            }
            LineRead::Line => {}
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.strip_suffix('\n').unwrap_or(&line);
        let Some(frame) = decoder.push_line(line) else {
            continue;
        };
        let Some(msg) = translate_event(&frame) else {
            continue;
        };
        if tx.send(msg).is_err() {
            return Ok(StreamEnd::ReceiverGone);
        }
    }
}

/// Outcome of one capped line read.
#[derive(Debug, PartialEq, Eq)]
enum LineRead {
    /// `buf` holds one line (with its `\n`, unless the body ended first).
    Line,
    /// The line exceeded the cap; its bytes were consumed and dropped.
    Oversized,
    /// The body ended before any byte was read.
    Eof,
}

/// Read one `\n`-terminated line into `buf`, holding at most `max` bytes.
///
/// Past the cap the rest of the line is consumed without being stored, so a
/// server that never sends a newline cannot grow memory.
fn read_line_capped<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max: usize,
) -> io::Result<LineRead> {
    buf.clear();
    let mut overflowed = false;
    let mut read_any = false;

    loop {
        let available = match reader.fill_buf() {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            return Ok(match (read_any, overflowed) {
                (false, _) => LineRead::Eof,
                (true, true) => LineRead::Oversized,
                (true, false) => LineRead::Line,
            });
        }
        read_any = true;

        let (used, complete) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (i + 1, true),
            None => (available.len(), false),
        };
        if !overflowed {
            if buf.len() + used > max {
                overflowed = true;
                buf.clear();
                buf.shrink_to_fit();
            } else {
                buf.extend_from_slice(&available[..used]);
            }
        }
        reader.consume(used);

        if complete {
            return Ok(if overflowed {
                LineRead::Oversized
            } else {
                LineRead::Line
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Level;

    fn frame(event: &str, data: &str) -> SseEvent {
        SseEvent {
            event: event.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        assert_eq!(backoff_delay_ms(1), RECONNECT_INITIAL_DELAY_MS);
        assert_eq!(backoff_delay_ms(2), RECONNECT_INITIAL_DELAY_MS * 2);
        assert_eq!(backoff_delay_ms(3), RECONNECT_INITIAL_DELAY_MS * 4);
        assert_eq!(backoff_delay_ms(50), RECONNECT_MAX_DELAY_MS);
        assert_eq!(backoff_delay_ms(u32::MAX), RECONNECT_MAX_DELAY_MS);
        // Attempt 0 is treated like the first attempt.
        assert_eq!(backoff_delay_ms(0), RECONNECT_INITIAL_DELAY_MS);
    }

    #[test]
    fn test_translate_new_log() {
        let msg = translate_event(&frame(
            "newLog",
            r#"{"_id":"x1","timestamp":"2024-03-13T10:00:00Z","level":"WARN","service":"api","message":"slow"}"#,
        ));
        match msg {
            Some(StreamProgress::NewLog { record }) => {
                assert_eq!(record.id, "x1");
                assert_eq!(record.level, Level::Warn);
            }
            other => panic!("expected NewLog, got {other:?}"),
        }
    }

    #[test]
    fn test_translate_stats_update() {
        let msg = translate_event(&frame(
            "statsUpdate",
            r#"{"total":4,"counts":{"INFO":2,"WARN":1,"ERROR":1},"errorRate":25}"#,
        ));
        match msg {
            Some(StreamProgress::StatsUpdate { stats }) => {
                assert_eq!(stats.total, 4);
                assert_eq!(stats.error_rate, Some(25.0));
            }
            other => panic!("expected StatsUpdate, got {other:?}"),
        }
    }

    #[test]
    fn test_translate_malformed_and_unknown() {
        let msg = translate_event(&frame("newLog", r#"{"_id":"x1"}"#));
        assert!(matches!(msg, Some(StreamProgress::Malformed { .. })));
        assert!(translate_event(&frame("heartbeat", "{}")).is_none());
    }

    #[test]
    fn test_read_line_capped_splits_lines() {
        let mut reader = BufReader::with_capacity(4, io::Cursor::new("data: a\n\nrest"));
        let mut buf = Vec::new();
        assert_eq!(read_line_capped(&mut reader, &mut buf, 64).unwrap(), LineRead::Line);
        assert_eq!(buf, b"data: a\n");
        assert_eq!(read_line_capped(&mut reader, &mut buf, 64).unwrap(), LineRead::Line);
        assert_eq!(buf, b"\n");
        // Unterminated tail still comes back as a line, then EOF.
        assert_eq!(read_line_capped(&mut reader, &mut buf, 64).unwrap(), LineRead::Line);
        assert_eq!(buf, b"rest");
        assert_eq!(read_line_capped(&mut reader, &mut buf, 64).unwrap(), LineRead::Eof);
    }

    #[test]
    fn test_read_line_capped_skips_overlong_line() {
        let body = format!("data: {}\nevent: newLog\n", "x".repeat(100));
        let mut reader = BufReader::with_capacity(8, io::Cursor::new(body));
        let mut buf = Vec::new();
        assert_eq!(
            read_line_capped(&mut reader, &mut buf, 32).unwrap(),
            LineRead::Oversized
        );
        assert!(buf.len() <= 32);
        // Reading resumes at the next line.
        assert_eq!(read_line_capped(&mut reader, &mut buf, 32).unwrap(), LineRead::Line);
        assert_eq!(buf, b"event: newLog\n");
    }

    #[test]
    fn test_read_line_capped_overlong_unterminated_tail() {
        let mut reader = io::Cursor::new(vec![b'y'; 100]);
        let mut buf = Vec::new();
        assert_eq!(
            read_line_capped(&mut reader, &mut buf, 10).unwrap(),
            LineRead::Oversized
        );
        assert_eq!(read_line_capped(&mut reader, &mut buf, 10).unwrap(), LineRead::Eof);
    }

    #[test]
    fn test_manager_stop_is_idempotent() {
        let mut manager = StreamManager::new();
        assert!(!manager.is_active());
        manager.stop();
        assert!(manager.poll_progress(10).is_empty());
    }
}
