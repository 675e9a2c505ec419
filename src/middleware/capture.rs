//! In-memory capture of HTTP bodies.
//!
//! A body is drained frame by frame into a [`CaptureBuffer`] so it can be read
//! for logging, then replayed to its real consumer through
//! [`CapturedBody::into_body`] with the same bytes, trailers and terminal error.

use std::io::{self, Cursor, Read, Seek};
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::HeaderMap;
use bytes::Bytes;
use futures::stream;
use http_body::{Body as _, Frame, SizeHint};
use http_body_util::{BodyExt, StreamBody};

/// Seekable byte buffer standing in for a body while it is inspected.
///
/// Every read rewinds to the start first and rewinds again when done, so the
/// buffer is always positioned at byte 0 between operations.
#[derive(Debug, Default)]
pub struct CaptureBuffer {
    cursor: Cursor<Vec<u8>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cursor: Cursor::new(Vec::with_capacity(capacity)),
        }
    }

    /// Appends without moving the read position.
    pub fn write_chunk(&mut self, chunk: &[u8]) {
        self.cursor.get_mut().extend_from_slice(chunk);
    }

    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Reads at most `limit` bytes from the start of the buffer.
    pub fn read_prefix(&mut self, limit: usize) -> io::Result<Vec<u8>> {
        self.cursor.rewind()?;

        let mut raw = Vec::with_capacity(limit.min(self.len()));
        (&mut self.cursor).take(limit as u64).read_to_end(&mut raw)?;

        self.cursor.rewind()?;
        Ok(raw)
    }

    /// Decodes the whole buffer as UTF-8, replacing invalid sequences.
    pub fn read_text(&mut self) -> io::Result<String> {
        self.read_prefix(usize::MAX).map(|raw| decode_text(&raw))
    }

    /// Hands over every byte written, independent of the cursor position.
    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.cursor.into_inner())
    }
}

pub fn decode_text(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// A body drained into memory, plus everything needed to replay it.
#[derive(Debug)]
pub struct CapturedBody {
    buffer: CaptureBuffer,
    trailers: Option<HeaderMap>,
    error: Option<axum::Error>,
    remainder: Option<Body>,
}

impl CapturedBody {
    /// Drains `body` until it ends, fails, or at least `limit` bytes are buffered.
    pub async fn read(mut body: Body, limit: usize) -> Self {
        let hint = usize::try_from(body.size_hint().lower()).unwrap_or(0);
        let mut buffer = CaptureBuffer::with_capacity(hint.min(limit));
        let mut trailers: Option<HeaderMap> = None;

        while buffer.len() < limit {
            match body.frame().await {
                None => {
                    return Self {
                        buffer,
                        trailers,
                        error: None,
                        remainder: None,
                    }
                }
                Some(Ok(frame)) => match frame.into_data() {
                    Ok(data) => buffer.write_chunk(&data),
                    Err(frame) => {
                        if let Ok(map) = frame.into_trailers() {
                            trailers.get_or_insert_with(HeaderMap::new).extend(map);
                        }
                    }
                },
                Some(Err(err)) => {
                    return Self {
                        buffer,
                        trailers,
                        error: Some(err),
                        remainder: None,
                    }
                }
            }
        }

        let remainder = (!body.is_end_stream()).then_some(body);

        Self {
            buffer,
            trailers,
            error: None,
            remainder,
        }
    }

    pub fn buffer(&self) -> &CaptureBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut CaptureBuffer {
        &mut self.buffer
    }

    pub fn error(&self) -> Option<&axum::Error> {
        self.error.as_ref()
    }

    /// True when the capture limit stopped the read before the body ended.
    pub fn is_partial(&self) -> bool {
        self.remainder.is_some()
    }

    /// Rebuilds a body yielding the captured frames followed by any unread
    /// remainder. The size hint of the drained body is preserved.
    pub fn into_body(self) -> Body {
        let Self {
            buffer,
            trailers,
            error,
            remainder,
        } = self;
        let data = buffer.into_bytes();

        // A remainder only exists when the read stopped at the limit, before
        // any trailers or error could be seen.
        if let Some(rest) = remainder {
            return Body::new(ReplayBody {
                buffered: Some(data),
                rest,
            });
        }

        if trailers.is_none() && error.is_none() {
            return Body::from(data);
        }

        let mut frames: Vec<Result<Frame<Bytes>, axum::Error>> = Vec::with_capacity(3);
        if !data.is_empty() {
            frames.push(Ok(Frame::data(data)));
        }
        if let Some(trailers) = trailers {
            frames.push(Ok(Frame::trailers(trailers)));
        }
        if let Some(err) = error {
            frames.push(Err(err));
        }

        Body::new(StreamBody::new(stream::iter(frames)))
    }
}

/// Buffered prefix followed by the still unread part of the original body.
struct ReplayBody {
    buffered: Option<Bytes>,
    rest: Body,
}

impl http_body::Body for ReplayBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, axum::Error>>> {
        let this = self.get_mut();

        if let Some(data) = this.buffered.take().filter(|data| !data.is_empty()) {
            return Poll::Ready(Some(Ok(Frame::data(data))));
        }

        Pin::new(&mut this.rest).poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.buffered.as_ref().map_or(true, Bytes::is_empty) && self.rest.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        let buffered = self.buffered.as_ref().map_or(0, |data| data.len() as u64);
        let rest = self.rest.size_hint();

        let mut hint = SizeHint::new();
        hint.set_lower(rest.lower() + buffered);
        if let Some(upper) = rest.upper() {
            hint.set_upper(upper + buffered);
        }
        hint
    }
}
