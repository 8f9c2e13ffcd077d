//! Fluent assertions for HTTP handlers and the HTML they render.
//!
//! A [`Case`] wraps the handler under test. Each request built from it runs
//! the handler once against an in-memory [`ResponseRecorder`]; assertions on
//! the result report through a [`Fail`] that carries the request, response
//! and current HTML selection, so a failing test prints everything needed to
//! understand it.

pub mod config;
pub mod document;
pub mod fail;
pub mod testing;
pub mod transport;

pub use document::{Document, DocumentError, Selection};
pub use fail::{BufferReporter, Fail, FailBuffer, Failure, PanicReporter, Reporter, capture};
pub use testing::{
    Case, HtmlAsserter, HtmlChecker, RequestBuilder, ResponseAsserter, ResponseChecker,
};
pub use transport::{Handler, HttpMethod, ResponseRecorder, TransportError};

pub use http::{Request, Response, StatusCode};
