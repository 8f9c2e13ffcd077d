use std::io;

use bytes::{Bytes, BytesMut};
use http::header::{HeaderMap, HeaderValue, IntoHeaderName};
use http::{Response, StatusCode};

/// Captures what a handler writes: status, headers and a buffered body.
///
/// The status is fixed by the first of [`set_status`](Self::set_status) or a
/// body write, mirroring how a real connection commits the status line before
/// the body. Unset, it reads as `200 OK`.
#[derive(Debug, Default)]
pub struct ResponseRecorder {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Replace every value stored under `name`.
    pub fn set_header<K: IntoHeaderName>(&mut self, name: K, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Add a value under `name`, keeping the existing ones.
    pub fn append_header<K: IntoHeaderName>(&mut self, name: K, value: HeaderValue) {
        self.headers.append(name, value);
    }

    pub fn write_body(&mut self, data: impl AsRef<[u8]>) {
        self.set_status(StatusCode::OK);
        self.body.extend_from_slice(data.as_ref());
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Freeze the recording into an immutable response value.
    pub fn into_response(self) -> Response<Bytes> {
        let status = self.status();
        let mut response = Response::new(self.body.freeze());
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl io::Write for ResponseRecorder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_body(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
