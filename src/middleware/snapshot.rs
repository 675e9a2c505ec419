use std::fmt;

use axum::http::{header, request::Parts};

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Text copy of an inbound request, kept only long enough to be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSnapshot {
    pub scheme: String,
    pub host: String,
    pub path: String,
    pub query: String,
    pub body: String,
}

impl RequestSnapshot {
    pub fn from_parts(parts: &Parts, default_scheme: &str, body: String) -> Self {
        let scheme = parts
            .uri
            .scheme_str()
            .or_else(|| {
                parts
                    .headers
                    .get(FORWARDED_PROTO)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.split(',').next())
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
            })
            .unwrap_or(default_scheme)
            .to_string();

        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| parts.uri.authority().map(|a| a.to_string()))
            .unwrap_or_default();

        let query = parts
            .uri
            .query()
            .filter(|q| !q.is_empty())
            .map(|q| format!("?{q}"))
            .unwrap_or_default();

        Self {
            scheme,
            host,
            path: parts.uri.path().to_string(),
            query,
            body,
        }
    }
}

/// `{scheme} {host}{path} {query} {body}`
impl fmt::Display for RequestSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}{} {} {}",
            self.scheme, self.host, self.path, self.query, self.body
        )
    }
}

/// Text copy of an outbound response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSnapshot {
    pub body: String,
}

impl fmt::Display for ResponseSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(request: Request<()>) -> Parts {
        request.into_parts().0
    }

    #[test]
    fn absolute_uri_supplies_scheme_and_host() {
        let parts = parts(
            Request::get("https://example.com/items?id=5")
                .body(())
                .unwrap(),
        );
        let snapshot = RequestSnapshot::from_parts(&parts, "http", String::new());

        assert_eq!(snapshot.to_string(), "https example.com/items ?id=5 ");
    }

    #[test]
    fn host_header_and_forwarded_proto_win_for_origin_form() {
        let parts = parts(
            Request::post("/api/v1/echo")
                .header("host", "gateway.local:3000")
                .header("x-forwarded-proto", "https, http")
                .body(())
                .unwrap(),
        );
        let snapshot = RequestSnapshot::from_parts(&parts, "http", "hello".to_string());

        assert_eq!(snapshot.scheme, "https");
        assert_eq!(snapshot.host, "gateway.local:3000");
        assert_eq!(snapshot.query, "");
        assert_eq!(snapshot.to_string(), "https gateway.local:3000/api/v1/echo  hello");
    }

    #[test]
    fn default_scheme_and_empty_query() {
        let parts = parts(Request::get("/health?").body(()).unwrap());
        let snapshot = RequestSnapshot::from_parts(&parts, "http", String::new());

        assert_eq!(snapshot.to_string(), "http /health  ");
    }
}
