//! # Synthetic Transport
//!
//! In-memory stand-ins for the network: a request value built from a method,
//! target and body, and a recorder the handler under test writes its response
//! into. No sockets are opened.

pub mod method;
mod recorder;
mod request;

use bytes::Bytes;
use http::Request;

pub use method::HttpMethod;
pub use recorder::ResponseRecorder;
pub use request::{
    DEFAULT_HOST, FORM_CONTENT_TYPE, dump_request, dump_response, form_value, new_request,
    parse_form,
};

/// The component being exercised: it reads a request and fills a recorder.
pub trait Handler {
    fn serve(&self, req: &Request<Bytes>, rec: &mut ResponseRecorder);
}

impl<F> Handler for F
where
    F: Fn(&Request<Bytes>, &mut ResponseRecorder),
{
    fn serve(&self, req: &Request<Bytes>, rec: &mut ResponseRecorder) {
        self(req, rec)
    }
}

/// Reasons a synthetic request could not be assembled.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid request target `{target}`: {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: http::uri::InvalidUri,
    },

    #[error("invalid header name `{name}`: {source}")]
    InvalidHeaderName {
        name: String,
        #[source]
        source: http::header::InvalidHeaderName,
    },

    #[error("invalid value for header `{name}`: {source}")]
    InvalidHeaderValue {
        name: String,
        #[source]
        source: http::header::InvalidHeaderValue,
    },

    #[error("failed to build request: {0}")]
    Build(#[from] http::Error),
}
