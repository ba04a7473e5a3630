//! Recording fake transport
//!
//! [`FakeHttpClient`] stands in for a real [`HttpClient`]: every call returns
//! the outcome it was built with, whatever the request. The request is only
//! logged to the test context and recorded for later inspection.

use ciforge_lib::networking::{HttpClient, HttpRequest, HttpResponse, TransportError};
use reqwest::{Method, Url};
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::trace;

use crate::context::TestContext;

/// A request as seen by the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: Url,
    /// Drained body; empty when the body could not be read
    pub payload: Vec<u8>,
}

impl RecordedRequest {
    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// [`HttpClient`] that always returns the same outcome
pub struct FakeHttpClient {
    ctx: TestContext,
    outcome: Result<HttpResponse, TransportError>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeHttpClient {
    pub fn new(ctx: TestContext, outcome: Result<HttpResponse, TransportError>) -> Self {
        Self {
            ctx,
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fake answering every request with `response`
    pub fn responding(ctx: TestContext, response: HttpResponse) -> Self {
        Self::new(ctx, Ok(response))
    }

    /// Fake failing every request with `error`
    pub fn failing(ctx: TestContext, error: TransportError) -> Self {
        Self::new(ctx, Err(error))
    }

    pub fn outcome(&self) -> &Result<HttpResponse, TransportError> {
        &self.outcome
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock_requests().clone()
    }

    fn lock_requests(&self) -> MutexGuard<'_, Vec<RecordedRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HttpClient for FakeHttpClient {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            mut body,
            ..
        } = request;

        let payload = body.drain().unwrap_or_else(ignore_read_error);
        // Released on every path, not only after a successful read
        drop(body);

        self.ctx.log(format!(
            "FakeHttpClient> execute> {} {}: Payload {}",
            method,
            url,
            String::from_utf8_lossy(&payload)
        ));

        self.lock_requests().push(RecordedRequest {
            method,
            url,
            payload,
        });

        self.outcome.clone()
    }
}

fn ignore_read_error(err: io::Error) -> Vec<u8> {
    trace!(error = %err, "Ignoring unreadable request body");
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciforge_lib::networking::RequestBody;
    use reqwest::StatusCode;
    use std::io::Read;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Reader that fails and notes when it is dropped
    struct BrokenBody {
        dropped: Arc<AtomicBool>,
    }

    impl Read for BrokenBody {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"))
        }
    }

    impl Drop for BrokenBody {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    fn accepted() -> HttpResponse {
        HttpResponse::new(StatusCode::ACCEPTED).with_body(r#"{"status":"queued"}"#)
    }

    #[test]
    fn test_returns_fixed_response_for_any_request() {
        let ctx = TestContext::new("fixed_response");
        let fake = FakeHttpClient::responding(ctx, accepted());

        let requests = [
            HttpRequest::get("https://api.example.com/projects").unwrap(),
            HttpRequest::post("http://10.0.0.1:8081/queue", "job=42").unwrap(),
            HttpRequest::parse(Method::DELETE, "https://vcs.example.com/repo/hooks/7").unwrap(),
        ];

        for request in requests {
            assert_eq!(fake.execute(request), Ok(accepted()));
        }
        assert_eq!(fake.requests().len(), 3);
    }

    #[test]
    fn test_returns_fixed_error_for_any_request() {
        let error = TransportError::Timeout {
            url: "https://api.example.com".to_string(),
        };
        let fake = FakeHttpClient::failing(TestContext::new("fixed_error"), error.clone());

        let first = fake.execute(HttpRequest::get("https://a.example.com/").unwrap());
        let second = fake.execute(HttpRequest::post("https://b.example.com/x", "body").unwrap());

        assert_eq!(first, Err(error.clone()));
        assert_eq!(second, Err(error));
    }

    #[test]
    fn test_logs_method_url_and_payload() {
        let ctx = TestContext::new("logging");
        let fake = FakeHttpClient::responding(ctx.clone(), accepted());

        let request = HttpRequest::post("https://api.example.com/hooks?branch=main", "hello").unwrap();
        fake.execute(request).unwrap();

        assert_eq!(
            ctx.logs(),
            vec!["FakeHttpClient> execute> POST https://api.example.com/hooks?branch=main: Payload hello"]
        );
        assert!(ctx.logs_contain("hello"));
    }

    #[test]
    fn test_records_requests() {
        let fake = FakeHttpClient::responding(TestContext::new("recording"), accepted());

        fake.execute(HttpRequest::post("https://api.example.com/a", "first").unwrap())
            .unwrap();
        fake.execute(HttpRequest::get("https://api.example.com/b").unwrap())
            .unwrap();

        let recorded = fake.requests();
        assert_eq!(recorded[0].method, Method::POST);
        assert_eq!(recorded[0].payload_text(), "first");
        assert_eq!(recorded[1].url.path(), "/b");
        assert!(recorded[1].payload.is_empty());
    }

    #[test]
    fn test_unreadable_body_is_ignored_and_released() {
        let ctx = TestContext::new("broken_body");
        let fake = FakeHttpClient::responding(ctx.clone(), accepted());
        let dropped = Arc::new(AtomicBool::new(false));

        let request = HttpRequest::parse(Method::PUT, "https://api.example.com/artifact")
            .unwrap()
            .with_body(RequestBody::from_reader(BrokenBody {
                dropped: dropped.clone(),
            }));

        assert_eq!(fake.execute(request), Ok(accepted()));
        assert!(dropped.load(Ordering::SeqCst));
        assert_eq!(
            ctx.logs(),
            vec!["FakeHttpClient> execute> PUT https://api.example.com/artifact: Payload "]
        );
    }

    #[test]
    fn test_usable_as_trait_object() {
        let fake: Arc<dyn HttpClient> = Arc::new(FakeHttpClient::responding(
            TestContext::new("trait_object"),
            accepted(),
        ));

        let response = fake
            .execute(HttpRequest::get("https://api.example.com/").unwrap())
            .unwrap();
        assert_eq!(response.status, StatusCode::ACCEPTED);
    }
}
