// Driftchat Gateway — HTTP Wire Types
//
// Just enough HTTP for a chat gateway: parse a request accumulated from the
// socket (request line, headers, Content-Length body) and format a response
// with the CORS header set attached to every reply. The widget embeds
// cross-origin, so the headers ride on success, failure, and pre-flight
// alike.

use crate::atoms::constants::{
    CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS, CORS_ALLOW_ORIGIN, MAX_REQUEST_BYTES,
};

// ── Request parsing ────────────────────────────────────────────────────

#[derive(Debug)]
pub(crate) struct HttpRequest {
    pub method: String,
    /// Path with any query string stripped.
    pub path: String,
    headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Result of attempting to parse the bytes read so far.
#[derive(Debug)]
pub(crate) enum ParseOutcome {
    /// A full request (head + declared body) is available.
    Complete(HttpRequest),
    /// Valid so far, but more bytes are needed.
    Partial,
    /// Not an HTTP request we serve; the connection should be dropped.
    Invalid(&'static str),
}

/// Try to parse one request from the accumulated buffer. The caller keeps
/// reading while this returns `Partial`; anything beyond the declared body
/// is ignored because every response closes the connection.
pub(crate) fn parse_request(buf: &[u8]) -> ParseOutcome {
    let Some(head_end) = find_header_end(buf) else {
        // A request head alone should never approach the cap.
        if buf.len() > MAX_REQUEST_BYTES {
            return ParseOutcome::Invalid("header section exceeds request cap");
        }
        return ParseOutcome::Partial;
    };

    let head = String::from_utf8_lossy(&buf[..head_end]);
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or("");
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return ParseOutcome::Invalid("malformed request line");
    };
    if !method.chars().all(|c| c.is_ascii_uppercase()) {
        return ParseOutcome::Invalid("malformed method");
    }

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| {
            line.split_once(':')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        })
        .collect();

    let content_length = match headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
    {
        Some((_, v)) => match v.parse::<usize>() {
            Ok(n) => n,
            Err(_) => return ParseOutcome::Invalid("bad content-length"),
        },
        None => 0,
    };
    if content_length > MAX_REQUEST_BYTES {
        return ParseOutcome::Invalid("declared body exceeds request cap");
    }

    let body_start = head_end + 4;
    if buf.len() < body_start + content_length {
        return ParseOutcome::Partial;
    }

    let path = target.split('?').next().unwrap_or(target).to_string();
    ParseOutcome::Complete(HttpRequest {
        method: method.to_string(),
        path,
        headers,
        body: buf[body_start..body_start + content_length].to_vec(),
    })
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

// ── Response formatting ────────────────────────────────────────────────

#[derive(Debug)]
pub(crate) struct HttpResponse {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

impl HttpResponse {
    /// The uniform `{reply}` JSON shape used by every chat-path outcome.
    pub fn reply(status: u16, text: &str) -> Self {
        let body = serde_json::json!({ "reply": text }).to_string().into_bytes();
        HttpResponse { status, content_type: "application/json", body }
    }

    pub fn json(status: u16, value: serde_json::Value) -> Self {
        HttpResponse {
            status,
            content_type: "application/json",
            body: value.to_string().into_bytes(),
        }
    }

    /// Empty 200, used by the CORS pre-flight.
    pub fn empty_ok() -> Self {
        HttpResponse { status: 200, content_type: "text/plain", body: Vec::new() }
    }

    pub fn html(body: String) -> Self {
        HttpResponse {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.into_bytes(),
        }
    }

    pub fn javascript(body: String) -> Self {
        HttpResponse {
            status: 200,
            content_type: "text/javascript; charset=utf-8",
            body: body.into_bytes(),
        }
    }

    pub fn binary(content_type: &'static str, body: Vec<u8>) -> Self {
        HttpResponse { status: 200, content_type, body }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Serialize: status line, CORS set, content headers, close, body.
    pub fn into_bytes(self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {} {}\r\nAccess-Control-Allow-Origin: {}\r\nAccess-Control-Allow-Methods: {}\r\nAccess-Control-Allow-Headers: {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            status_text(self.status),
            CORS_ALLOW_ORIGIN,
            CORS_ALLOW_METHODS,
            CORS_ALLOW_HEADERS,
            self.content_type,
            self.body.len(),
        );
        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "Error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(raw: &[u8]) -> HttpRequest {
        match parse_request(raw) {
            ParseOutcome::Complete(req) => req,
            other => panic!("expected complete request, got {:?}", other),
        }
    }

    #[test]
    fn parses_bodyless_get() {
        let req = complete(b"GET /api/status HTTP/1.1\r\nHost: x\r\n\r\n");
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/api/status");
        assert!(req.body.is_empty());
    }

    #[test]
    fn parses_post_with_content_length_body() {
        let req = complete(
            b"POST /api/chat HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 17\r\n\r\n{\"message\":\"hi\"}!",
        );
        assert_eq!(req.method, "POST");
        assert_eq!(req.body, b"{\"message\":\"hi\"}!");
    }

    #[test]
    fn split_body_reads_as_partial_until_complete() {
        let full = b"POST /api/chat HTTP/1.1\r\nContent-Length: 16\r\n\r\n{\"message\":\"hi\"}";
        assert!(matches!(parse_request(&full[..20]), ParseOutcome::Partial));
        assert!(matches!(parse_request(&full[..full.len() - 4]), ParseOutcome::Partial));
        assert!(matches!(parse_request(full), ParseOutcome::Complete(_)));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = complete(b"GET / HTTP/1.1\r\ncontent-TYPE: text/plain\r\n\r\n");
        assert_eq!(req.header("Content-Type"), Some("text/plain"));
        assert_eq!(req.header("missing"), None);
    }

    #[test]
    fn query_string_is_stripped_from_path() {
        let req = complete(b"GET /embed.js?v=3 HTTP/1.1\r\n\r\n");
        assert_eq!(req.path, "/embed.js");
    }

    #[test]
    fn garbage_request_line_is_invalid() {
        assert!(matches!(
            parse_request(b"nonsense\r\n\r\n"),
            ParseOutcome::Invalid(_)
        ));
        assert!(matches!(
            parse_request(b"\x16\x03\x01\x02\x00\r\n\r\n"),
            ParseOutcome::Invalid(_)
        ));
    }

    #[test]
    fn oversized_declared_body_is_invalid() {
        let raw = format!(
            "POST /api/chat HTTP/1.1\r\nContent-Length: {}\r\n\r\n",
            MAX_REQUEST_BYTES + 1
        );
        assert!(matches!(parse_request(raw.as_bytes()), ParseOutcome::Invalid(_)));
    }

    #[test]
    fn response_bytes_carry_cors_on_every_status() {
        for (resp, status) in [
            (HttpResponse::reply(200, "ok"), "HTTP/1.1 200 OK"),
            (HttpResponse::reply(500, "no"), "HTTP/1.1 500 Internal Server Error"),
            (HttpResponse::empty_ok(), "HTTP/1.1 200 OK"),
        ] {
            let text = String::from_utf8(resp.into_bytes()).unwrap();
            assert!(text.starts_with(status), "bad status line in {text}");
            assert!(text.contains("Access-Control-Allow-Origin: *"));
            assert!(text.contains("Access-Control-Allow-Methods: POST, OPTIONS"));
            assert!(text.contains("Access-Control-Allow-Headers: Content-Type"));
            assert!(text.contains("Connection: close"));
        }
    }

    #[test]
    fn reply_body_is_the_uniform_shape() {
        let bytes = HttpResponse::reply(500, "Sorry.").into_bytes();
        let text = String::from_utf8(bytes).unwrap();
        let body = text.split("\r\n\r\n").nth(1).unwrap();
        assert_eq!(body, r#"{"reply":"Sorry."}"#);
    }

    #[test]
    fn preflight_response_has_no_body() {
        let bytes = HttpResponse::empty_ok().into_bytes();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("Content-Length: 0"));
        assert!(text.ends_with("\r\n\r\n"));
    }
}
