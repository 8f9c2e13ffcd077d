//! # Failure Reporting
//!
//! [`Fail`] is the only way an assertion signals a problem. It carries the
//! request, response and HTML selection the assertion was looking at, so the
//! final message explains itself without a debugger.
//!
//! Context values are immutable snapshots behind `Rc`. Cloning a `Fail` and
//! attaching new context to the clone never changes the original, which is
//! what lets assertion branches narrow their scope independently.

mod render;

use std::cell::RefCell;
use std::fmt::{self, Write as _};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use bytes::Bytes;
use http::{Request, Response};
use tracing::debug;

use crate::document::Selection;

pub use render::truncate;

/// Receives the fully composed failure message and ends the current test.
pub trait Reporter {
    fn report(&self, message: &str);
}

impl<F> Reporter for F
where
    F: Fn(&str),
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Fails the running test by panicking, which is how the Rust test harness
/// marks a test as failed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicReporter;

impl Reporter for PanicReporter {
    fn report(&self, message: &str) {
        panic!("{message}")
    }
}

/// Shared buffer a [`BufferReporter`] writes into.
#[derive(Debug, Clone, Default)]
pub struct FailBuffer(Rc<RefCell<String>>);

impl FailBuffer {
    pub fn contents(&self) -> String {
        self.0.borrow().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.0.borrow().contains(needle)
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

// Unwind payload that marks a buffered abort.
struct Aborted;

/// Records the message and unwinds with a private marker instead of a
/// regular panic, so no panic hook output is produced. Pair it with
/// [`capture`] or `catch_unwind`.
#[derive(Debug, Clone, Default)]
pub struct BufferReporter {
    buffer: FailBuffer,
}

impl BufferReporter {
    pub fn new(buffer: FailBuffer) -> Self {
        Self { buffer }
    }
}

impl Reporter for BufferReporter {
    fn report(&self, message: &str) {
        self.buffer.0.borrow_mut().push_str(message);
        panic::resume_unwind(Box::new(Aborted));
    }
}

/// A failure collected by [`capture`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Failure {
    pub message: String,
}

/// Run `body` with a buffering [`Fail`] and turn a fatal report into an
/// `Err`. Panics that did not come from the `Fail` keep unwinding.
pub fn capture<F>(body: F) -> Result<(), Failure>
where
    F: FnOnce(Fail),
{
    let (fail, buffer) = Fail::buffered();
    match panic::catch_unwind(AssertUnwindSafe(|| body(fail))) {
        Ok(()) => Ok(()),
        Err(payload) if payload.is::<Aborted>() => Err(Failure {
            message: buffer.contents(),
        }),
        Err(payload) => panic::resume_unwind(payload),
    }
}

/// Failure reporter plus whatever context has been attached so far.
#[derive(Clone)]
pub struct Fail {
    reporter: Rc<dyn Reporter>,
    request: Option<Rc<Request<Bytes>>>,
    response: Option<Rc<Response<Bytes>>>,
    selection: Option<Selection>,
}

impl Fail {
    pub fn new(reporter: impl Reporter + 'static) -> Self {
        Self {
            reporter: Rc::new(reporter),
            request: None,
            response: None,
            selection: None,
        }
    }

    /// Panics on failure; the binding for ordinary `#[test]` functions.
    pub fn std() -> Self {
        Self::new(PanicReporter)
    }

    /// A fail that writes into the returned buffer and unwinds.
    pub fn buffered() -> (Self, FailBuffer) {
        let buffer = FailBuffer::default();
        (Self::new(BufferReporter::new(buffer.clone())), buffer)
    }

    pub fn with_request(mut self, req: impl Into<Rc<Request<Bytes>>>) -> Self {
        self.request = Some(req.into());
        self
    }

    pub fn with_response(mut self, resp: impl Into<Rc<Response<Bytes>>>) -> Self {
        self.response = Some(resp.into());
        self
    }

    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = Some(sel);
        self
    }

    pub fn request(&self) -> Option<&Request<Bytes>> {
        self.request.as_deref()
    }

    pub fn response(&self) -> Option<&Response<Bytes>> {
        self.response.as_deref()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Message followed by the attached request, response and selection.
    pub fn compose(&self, message: impl fmt::Display) -> String {
        let mut out = message.to_string();
        if let Some(req) = &self.request {
            let _ = write!(out, "\n ---> REQUEST: {}", render::request(req));
        }
        if let Some(resp) = &self.response {
            let _ = write!(out, "\n <--- RESPONSE: {}", render::response(resp));
        }
        if let Some(sel) = &self.selection {
            let _ = write!(out, "\n ==== HTML SELECTION: {}", render::selection(sel));
        }
        out
    }

    /// Report the failure and end the test. Never returns, even when the
    /// reporter does.
    pub fn fatal(&self, message: impl fmt::Display) -> ! {
        let composed = self.compose(message);
        debug!(
            request = self.request.is_some(),
            response = self.response.is_some(),
            selection = self.selection.is_some(),
            "reporting assertion failure"
        );
        self.reporter.report(&composed);
        panic!("{composed}")
    }
}

impl Default for Fail {
    fn default() -> Self {
        Self::std()
    }
}

impl fmt::Debug for Fail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fail")
            .field("request", &self.request.as_ref().map(|req| req.uri().to_string()))
            .field("response", &self.response.as_ref().map(|resp| resp.status()))
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}
