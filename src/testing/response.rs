use std::cell::OnceCell;
use std::rc::Rc;

use bytes::Bytes;
use http::{Request, Response};
use serde::de::DeserializeOwned;

use super::HtmlAsserter;
use crate::document::{Document, Selection};
use crate::fail::Fail;

/// Custom response logic for anything the built-in assertions do not cover.
/// Implementations call [`Fail::fatal`] themselves.
pub trait ResponseChecker {
    fn check_response(&self, fail: &Fail, response: &Response<Bytes>);
}

impl<F> ResponseChecker for F
where
    F: Fn(&Fail, &Response<Bytes>),
{
    fn check_response(&self, fail: &Fail, response: &Response<Bytes>) {
        self(fail, response)
    }
}

/// Assertions over one executed request and its captured response.
pub struct ResponseAsserter {
    request: Rc<Request<Bytes>>,
    response: Rc<Response<Bytes>>,
    fail: Fail,
    document: OnceCell<Rc<Document>>,
}

impl ResponseAsserter {
    pub(super) fn new(req: Request<Bytes>, resp: Response<Bytes>, fail: Fail) -> Self {
        let request = Rc::new(req);
        let response = Rc::new(resp);
        let fail = fail
            .with_request(Rc::clone(&request))
            .with_response(Rc::clone(&response));
        Self {
            request,
            response,
            fail,
            document: OnceCell::new(),
        }
    }

    /// The request exactly as the handler received it.
    pub fn request(&self) -> &Request<Bytes> {
        &self.request
    }

    pub fn response(&self) -> &Response<Bytes> {
        &self.response
    }

    pub fn fail(&self) -> &Fail {
        &self.fail
    }

    pub fn status(&self, expected: u16) -> &Self {
        let actual = self.response.status().as_u16();
        if actual != expected {
            self.fail
                .fatal(format_args!("status code: got: '{actual}' exp: '{expected}'"));
        }
        self
    }

    /// Compare the first value stored under `key`; the lookup ignores case
    /// and a missing header reads as an empty string.
    pub fn header(&self, key: &str, expected: &str) -> &Self {
        let actual = self
            .response
            .headers()
            .get(key)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .unwrap_or_default();
        if actual != expected {
            self.fail
                .fatal(format_args!("header '{key}': got: '{actual}' exp: '{expected}'"));
        }
        self
    }

    pub fn body_size(&self, expected: usize) -> &Self {
        let actual = self.response.body().len();
        if actual != expected {
            self.fail
                .fatal(format_args!("body size: got: '{actual}', exp: '{expected}'"));
        }
        self
    }

    pub fn body_contains(&self, needle: &str) -> &Self {
        let body = String::from_utf8_lossy(self.response.body());
        if !body.contains(needle) {
            self.fail
                .fatal(format_args!("body: exp to contain '{needle}'"));
        }
        self
    }

    /// Deserialize the body as JSON, failing the test when it does not fit `T`.
    pub fn json<T: DeserializeOwned>(&self) -> T {
        match serde_json::from_slice(self.response.body()) {
            Ok(value) => value,
            Err(err) => self
                .fail
                .fatal(format_args!("failed to parse response body as JSON: {err}")),
        }
    }

    pub fn check(&self, checker: impl ResponseChecker) -> &Self {
        checker.check_response(&self.fail, &self.response);
        self
    }

    /// Assertions over the body parsed as HTML, scoped to the whole document.
    /// The body is parsed on the first call only.
    pub fn html(&self) -> HtmlAsserter {
        let doc = self.document.get_or_init(|| match Document::parse(self.response.body()) {
            Ok(doc) => Rc::new(doc),
            Err(err) => self
                .fail
                .fatal(format_args!("failed to parse response body as HTML: {err}")),
        });

        let root = Selection::root(Rc::clone(doc));
        HtmlAsserter::new(root, &self.fail)
    }
}
