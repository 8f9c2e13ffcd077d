use std::fmt::Write as _;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HOST, HeaderMap};
use http::{Request, Response, Uri};

use super::TransportError;

/// Host assigned to origin-form targets such as `/login`.
pub const DEFAULT_HOST: &str = "example.com";

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Build the request value a handler will see. `target` is either a path
/// (`/users?id=1`) or an absolute URI; the host header follows from it.
pub fn new_request(
    method: impl Into<http::Method>,
    target: &str,
    body: Bytes,
) -> Result<Request<Bytes>, TransportError> {
    let uri: Uri = target.parse().map_err(|source| TransportError::InvalidTarget {
        target: target.to_string(),
        source,
    })?;

    let host = uri
        .authority()
        .map(|authority| authority.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());

    let request = Request::builder()
        .method(method.into())
        .uri(uri)
        .header(HOST, host)
        .body(body)?;
    Ok(request)
}

/// Decode the query string and, for form-encoded requests, the body into
/// key/value pairs. Body pairs come first.
pub fn parse_form(req: &Request<Bytes>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    let is_form = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(';').next().unwrap_or("").trim())
        .is_some_and(|media| media.eq_ignore_ascii_case(FORM_CONTENT_TYPE));
    if is_form {
        pairs.extend(url::form_urlencoded::parse(req.body()).into_owned());
    }

    if let Some(query) = req.uri().query() {
        pairs.extend(url::form_urlencoded::parse(query.as_bytes()).into_owned());
    }

    pairs
}

/// First form or query value stored under `key`.
pub fn form_value(req: &Request<Bytes>, key: &str) -> Option<String> {
    parse_form(req)
        .into_iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value)
}

/// Render a request the way it would travel over an HTTP/1.1 connection.
pub fn dump_request(req: &Request<Bytes>) -> String {
    let target = req
        .uri()
        .path_and_query()
        .map(|path| path.as_str())
        .unwrap_or("/");

    let mut out = format!("{} {target} HTTP/1.1\r\n", req.method());
    write_headers(&mut out, req.headers());
    out.push_str("\r\n");
    out.push_str(&String::from_utf8_lossy(req.body()));
    out
}

/// Render a captured response the way it would travel over an HTTP/1.1
/// connection.
pub fn dump_response(resp: &Response<Bytes>) -> String {
    let status = resp.status();
    let mut out = format!(
        "HTTP/1.1 {} {}\r\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
    write_headers(&mut out, resp.headers());
    out.push_str("\r\n");
    out.push_str(&String::from_utf8_lossy(resp.body()));
    out
}

fn write_headers(out: &mut String, headers: &HeaderMap) {
    for (name, value) in headers {
        let value = value.to_str().unwrap_or("<binary>");
        let _ = write!(out, "{}: {value}\r\n", canonical_name(name.as_str()));
    }
}

// `content-type` -> `Content-Type`
fn canonical_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use http::header::HeaderValue;
    use http::{Method, StatusCode};

    use super::*;

    #[test]
    fn origin_form_target_gets_default_host() {
        let req = new_request(Method::GET, "/foo?x=1", Bytes::new()).unwrap();
        assert_eq!(req.uri().path(), "/foo");
        assert_eq!(req.headers()[HOST], DEFAULT_HOST);
    }

    #[test]
    fn absolute_target_keeps_its_host() {
        let req = new_request(Method::GET, "http://docs.local:8080/a", Bytes::new()).unwrap();
        assert_eq!(req.headers()[HOST], "docs.local:8080");
    }

    #[test]
    fn malformed_target_is_rejected() {
        let err = new_request(Method::GET, "/bad path", Bytes::new()).unwrap_err();
        assert!(matches!(err, TransportError::InvalidTarget { .. }));
        assert!(err.to_string().contains("/bad path"));
    }

    #[test]
    fn form_body_and_query_are_decoded() {
        let mut req = new_request(Method::POST, "/?page=2", Bytes::from("Rab=Dar&q=a+b")).unwrap();
        req.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));

        assert_eq!(
            parse_form(&req),
            vec![
                ("Rab".to_string(), "Dar".to_string()),
                ("q".to_string(), "a b".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
        assert_eq!(form_value(&req, "Rab").as_deref(), Some("Dar"));
        assert_eq!(form_value(&req, "missing"), None);
    }

    #[test]
    fn body_is_ignored_without_form_content_type() {
        let req = new_request(Method::POST, "/", Bytes::from("Rab=Dar")).unwrap();
        assert!(parse_form(&req).is_empty());
    }

    #[test]
    fn request_dump_has_wire_shape() {
        let mut req = new_request(Method::POST, "/foo", Bytes::from("body")).unwrap();
        req.headers_mut()
            .insert("x-trace-id", HeaderValue::from_static("abc"));

        let dump = dump_request(&req);
        assert!(dump.starts_with("POST /foo HTTP/1.1\r\n"), "{dump}");
        assert!(dump.contains("Host: example.com\r\n"), "{dump}");
        assert!(dump.contains("X-Trace-Id: abc\r\n"), "{dump}");
        assert!(dump.ends_with("\r\n\r\nbody"), "{dump}");
    }

    #[test]
    fn response_dump_has_status_line() {
        let mut resp = Response::new(Bytes::from("some body"));
        *resp.status_mut() = StatusCode::SEE_OTHER;

        let dump = dump_response(&resp);
        assert!(dump.starts_with("HTTP/1.1 303 See Other\r\n"), "{dump}");
        assert!(dump.ends_with("some body"), "{dump}");
    }
}
