//! # Testing & Assertions
//!
//! Fluent assertions against a [`Handler`]. A [`Case`] builds requests, each
//! request runs the handler exactly once, and the captured response can then
//! be checked directly or parsed as HTML and narrowed with selectors.
//!
//! ```
//! use bytes::Bytes;
//! use htest::{Case, Request, ResponseRecorder};
//!
//! let handler = |_: &Request<Bytes>, rec: &mut ResponseRecorder| {
//!     rec.write_body(r#"<p class="bar">foo</p>"#);
//! };
//!
//! Case::new(&handler)
//!     .get("/")
//!     .expect()
//!     .status(200)
//!     .html()
//!     .assert_all("p")
//!     .count(1)
//!     .text("foo")
//!     .attr("class", "bar");
//! ```

mod html;
mod request;
mod response;

use crate::fail::Fail;
use crate::transport::{Handler, HttpMethod};

pub use html::{HtmlAsserter, HtmlChecker};
pub use request::RequestBuilder;
pub use response::{ResponseAsserter, ResponseChecker};

/// A handler under test together with the fail used to report problems.
#[derive(Clone)]
pub struct Case<'h> {
    fail: Fail,
    handler: &'h dyn Handler,
}

impl<'h> Case<'h> {
    /// Case that fails the surrounding `#[test]` by panicking.
    pub fn new(handler: &'h dyn Handler) -> Self {
        Self::with_fail(Fail::std(), handler)
    }

    pub fn with_fail(fail: Fail, handler: &'h dyn Handler) -> Self {
        Self { fail, handler }
    }

    pub fn request(&self, method: HttpMethod, path: &str) -> RequestBuilder<'h> {
        RequestBuilder::new(self.handler, self.fail.clone(), method, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder<'h> {
        self.request(HttpMethod::Get, path)
    }

    pub fn post(&self, path: &str) -> RequestBuilder<'h> {
        self.request(HttpMethod::Post, path)
    }

    pub fn put(&self, path: &str) -> RequestBuilder<'h> {
        self.request(HttpMethod::Put, path)
    }

    pub fn patch(&self, path: &str) -> RequestBuilder<'h> {
        self.request(HttpMethod::Patch, path)
    }

    pub fn delete(&self, path: &str) -> RequestBuilder<'h> {
        self.request(HttpMethod::Delete, path)
    }

    pub fn head(&self, path: &str) -> RequestBuilder<'h> {
        self.request(HttpMethod::Head, path)
    }

    pub fn options(&self, path: &str) -> RequestBuilder<'h> {
        self.request(HttpMethod::Options, path)
    }
}
