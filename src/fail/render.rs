use bytes::Bytes;
use http::{Request, Response};

use crate::config;
use crate::document::Selection;
use crate::transport;

const ELLIPSIS: &str = "...";

pub(super) fn request(req: &Request<Bytes>) -> String {
    truncate(&transport::dump_request(req), config::truncate_length())
}

pub(super) fn response(resp: &Response<Bytes>) -> String {
    truncate(&transport::dump_response(resp), config::truncate_length())
}

pub(super) fn selection(sel: &Selection) -> String {
    sel.pretty()
}

/// Cut `s` to at most `limit` characters, marking the cut with `...`.
pub fn truncate(s: &str, limit: usize) -> String {
    match s.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &s[..cut]),
        None => s.to_string(),
    }
}
