//! Line-oriented event-stream decoding, blocking and cooperative.
//!
//! Both execution models share [`decode_line`]: blank lines are skipped, a
//! `data: ` prefix is stripped, the literal `[DONE]` line terminates the
//! sequence cleanly, invalid JSON kills the sequence with a decode error,
//! and payloads that parse to an empty/falsy value are dropped silently.

use bytes::{Bytes, BytesMut};
use futures::stream::{BoxStream, Stream};
use futures::StreamExt;
use serde_json::Value;
use std::io::{BufRead, BufReader};
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::response::FoundationModelObject;
use crate::{Error, Result};

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

pub(crate) enum DecodedLine {
    /// Nothing to emit for this line.
    Skip,
    /// Clean end of stream.
    Done,
    /// One chunk payload.
    Payload(Value),
}

pub(crate) fn decode_line(line: &str) -> std::result::Result<DecodedLine, serde_json::Error> {
    let line = line.trim_end_matches('\r');
    if line.is_empty() {
        return Ok(DecodedLine::Skip);
    }
    let line = line.strip_prefix(DATA_PREFIX).unwrap_or(line);
    if line == DONE_SENTINEL {
        return Ok(DecodedLine::Done);
    }
    let value: Value = serde_json::from_str(line)?;
    if is_falsy(&value) {
        Ok(DecodedLine::Skip)
    } else {
        Ok(DecodedLine::Payload(value))
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn decode_error(url: &str, err: &serde_json::Error) -> Error {
    Error::Decode {
        url: Some(url.to_string()),
        message: format!("JSONDecodeError: {err}"),
    }
}

fn utf8_error(url: &str, err: &std::str::Utf8Error) -> Error {
    Error::Decode {
        url: Some(url.to_string()),
        message: format!("invalid UTF-8 in event stream: {err}"),
    }
}

/// Blocking stream of chunk objects.
///
/// Single-pass and single-consumer; iteration after a decode error, the
/// `[DONE]` sentinel, or exhaustion yields nothing further.
pub struct ResponseStream<O> {
    url: String,
    lines: Option<std::io::Lines<BufReader<reqwest::blocking::Response>>>,
    _marker: PhantomData<fn() -> O>,
}

impl<O> std::fmt::Debug for ResponseStream<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseStream")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl<O> ResponseStream<O> {
    pub(crate) fn new(url: String, response: reqwest::blocking::Response) -> Self {
        Self {
            url,
            lines: Some(BufReader::new(response).lines()),
            _marker: PhantomData,
        }
    }
}

impl<O: FoundationModelObject> Iterator for ResponseStream<O> {
    type Item = Result<O>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next_line = match self.lines.as_mut() {
                Some(lines) => lines.next(),
                None => return None,
            };
            match next_line {
                None => {
                    self.lines = None;
                    return None;
                }
                Some(Err(e)) => {
                    self.lines = None;
                    return Some(Err(Error::Connection(e.to_string())));
                }
                Some(Ok(line)) => match decode_line(&line) {
                    Ok(DecodedLine::Skip) => continue,
                    Ok(DecodedLine::Done) => {
                        self.lines = None;
                        return None;
                    }
                    Ok(DecodedLine::Payload(value)) => return Some(Ok(O::from_json(value))),
                    Err(e) => {
                        self.lines = None;
                        return Some(Err(decode_error(&self.url, &e)));
                    }
                },
            }
        }
    }
}

struct AsyncInner {
    bytes: BoxStream<'static, reqwest::Result<Bytes>>,
    // Raw bytes, split on b'\n' only. A multi-byte character may arrive
    // split across transport chunks, so UTF-8 conversion happens per
    // complete line, never per chunk.
    buffer: BytesMut,
    eof: bool,
}

/// Cooperative stream of chunk objects.
///
/// The underlying transport resource is released exactly once: on the
/// `[DONE]` sentinel, on a decode error, on exhaustion, via [`close`], or
/// when the stream is dropped — whichever comes first.
///
/// [`close`]: AsyncResponseStream::close
pub struct AsyncResponseStream<O> {
    url: String,
    inner: Option<AsyncInner>,
    _marker: PhantomData<fn() -> O>,
}

impl<O> std::fmt::Debug for AsyncResponseStream<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncResponseStream")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl<O> AsyncResponseStream<O> {
    pub(crate) fn new(url: String, response: reqwest::Response) -> Self {
        Self::from_parts(url, response.bytes_stream().boxed())
    }

    fn from_parts(url: String, bytes: BoxStream<'static, reqwest::Result<Bytes>>) -> Self {
        Self {
            url,
            inner: Some(AsyncInner {
                bytes,
                buffer: BytesMut::new(),
                eof: false,
            }),
            _marker: PhantomData,
        }
    }

    /// Release the transport resource. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.inner = None;
    }
}

impl<O: FoundationModelObject> Stream for AsyncResponseStream<O> {
    type Item = Result<O>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            let inner = match this.inner.as_mut() {
                Some(inner) => inner,
                None => return Poll::Ready(None),
            };

            if let Some(idx) = inner.buffer.iter().position(|b| *b == b'\n') {
                let raw = inner.buffer.split_to(idx + 1);
                let line = match std::str::from_utf8(&raw[..idx]) {
                    Ok(line) => line,
                    Err(e) => {
                        let err = utf8_error(&this.url, &e);
                        this.inner = None;
                        return Poll::Ready(Some(Err(err)));
                    }
                };
                match decode_line(line) {
                    Ok(DecodedLine::Skip) => continue,
                    Ok(DecodedLine::Done) => {
                        this.inner = None;
                        return Poll::Ready(None);
                    }
                    Ok(DecodedLine::Payload(value)) => {
                        return Poll::Ready(Some(Ok(O::from_json(value))))
                    }
                    Err(e) => {
                        let err = decode_error(&this.url, &e);
                        this.inner = None;
                        return Poll::Ready(Some(Err(err)));
                    }
                }
            }

            if inner.eof {
                // Flush whatever remains after the last newline.
                let raw = std::mem::take(&mut inner.buffer);
                this.inner = None;
                let line = match std::str::from_utf8(&raw) {
                    Ok(line) => line,
                    Err(e) => return Poll::Ready(Some(Err(utf8_error(&this.url, &e)))),
                };
                match decode_line(line) {
                    Ok(DecodedLine::Payload(value)) => {
                        return Poll::Ready(Some(Ok(O::from_json(value))))
                    }
                    Ok(_) => return Poll::Ready(None),
                    Err(e) => return Poll::Ready(Some(Err(decode_error(&this.url, &e)))),
                }
            }

            match inner.bytes.poll_next_unpin(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(None) => {
                    inner.eof = true;
                }
                Poll::Ready(Some(Ok(bytes))) => {
                    inner.buffer.extend_from_slice(&bytes);
                }
                Poll::Ready(Some(Err(e))) => {
                    this.inner = None;
                    return Poll::Ready(Some(Err(Error::Connection(e.to_string()))));
                }
            }
        }
    }
}
