use std::collections::BTreeMap;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use super::ResponseAsserter;
use crate::fail::Fail;
use crate::transport::{
    self, FORM_CONTENT_TYPE, Handler, HttpMethod, ResponseRecorder, TransportError,
};

/// Accumulates a request for one execution against the case's handler.
pub struct RequestBuilder<'h> {
    method: HttpMethod,
    path: String,
    headers: HeaderMap,
    body: Option<Bytes>,
    handler: &'h dyn Handler,
    fail: Fail,
}

impl<'h> RequestBuilder<'h> {
    pub(super) fn new(handler: &'h dyn Handler, fail: Fail, method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: HeaderMap::new(),
            body: None,
            handler,
            fail,
        }
    }

    /// Set `key` to `value`, replacing an earlier value for the same key.
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        let name = self.or_fatal(HeaderName::from_bytes(key.as_bytes()).map_err(|source| {
            TransportError::InvalidHeaderName {
                name: key.to_string(),
                source,
            }
        }));
        let value = self.or_fatal(HeaderValue::from_str(value).map_err(|source| {
            TransportError::InvalidHeaderValue {
                name: key.to_string(),
                source,
            }
        }));
        self.headers.insert(name, value);
        self
    }

    /// Set headers from alternating key/value arguments.
    pub fn with_headers(mut self, pairs: &[&str]) -> Self {
        self.require_pairs("with_headers", pairs);
        for pair in pairs.chunks_exact(2) {
            self = self.with_header(pair[0], pair[1]);
        }
        self
    }

    /// Use the alternating key/value arguments as a url-encoded form body.
    /// A repeated key keeps its last value. Content-Type is set to
    /// `application/x-www-form-urlencoded`.
    pub fn with_form_data(mut self, pairs: &[&str]) -> Self {
        self.require_pairs("with_form_data", pairs);

        let values: BTreeMap<&str, &str> = pairs
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect();
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(values)
            .finish();

        self.body = Some(Bytes::from(encoded));
        self.with_header(CONTENT_TYPE.as_str(), FORM_CONTENT_TYPE)
    }

    /// Send `body` as is. Replaces any earlier body, including form data.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Run the request against the handler and return assertions over the
    /// captured response.
    pub fn expect(mut self) -> ResponseAsserter {
        let body = self.body.take().unwrap_or_default();
        let mut req = self.or_fatal(transport::new_request(self.method, &self.path, body));
        for (name, value) in &self.headers {
            req.headers_mut().insert(name.clone(), value.clone());
        }

        let mut rec = ResponseRecorder::new();
        self.handler.serve(&req, &mut rec);
        let resp = rec.into_response();
        debug!(
            method = %self.method,
            target = %self.path,
            status = resp.status().as_u16(),
            body_bytes = resp.body().len(),
            "executed request against handler"
        );

        ResponseAsserter::new(req, resp, self.fail)
    }

    fn require_pairs(&self, operation: &str, pairs: &[&str]) {
        if pairs.len() % 2 != 0 {
            self.fail.fatal(format_args!(
                "{operation}: expected key/value pairs, got {} arguments",
                pairs.len()
            ));
        }
    }

    fn or_fatal<T>(&self, result: Result<T, TransportError>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => self.fail.fatal(err),
        }
    }
}
