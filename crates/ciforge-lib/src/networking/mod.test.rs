use super::*;
use mockito::Server;
use reqwest::header::CONTENT_TYPE;

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream closed"))
    }
}

/// Something that only knows about the capability, not the implementation
fn fetch_status(client: &dyn HttpClient, url: &str) -> Result<StatusCode, TransportError> {
    let response = client.execute(HttpRequest::get(url)?)?;
    Ok(response.status)
}

#[test]
fn test_request_body_drain_reads_everything() {
    let mut body = RequestBody::from("hello");
    assert_eq!(body.len_hint(), Some(5));
    assert_eq!(body.drain().unwrap(), b"hello");
    // Stream is consumed
    assert!(body.drain().unwrap().is_empty());
}

#[test]
fn test_request_body_from_reader_has_no_length() {
    let mut body = RequestBody::from_reader(io::Cursor::new(b"abc".to_vec()));
    assert_eq!(body.len_hint(), None);
    assert_eq!(body.drain().unwrap(), b"abc");
}

#[test]
fn test_request_body_read_error_surfaces_from_drain() {
    let mut body = RequestBody::from_reader(FailingReader);
    let err = body.drain().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
}

#[test]
fn test_request_parse_rejects_invalid_url() {
    let err = HttpRequest::get("not a url").unwrap_err();
    assert!(matches!(err, TransportError::InvalidRequest { .. }));
    assert!(err.to_string().contains("not a url"));
}

#[test]
fn test_request_builders() {
    let request = HttpRequest::post("https://ci.example.com/hooks", "payload")
        .unwrap()
        .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

    assert_eq!(request.method, Method::POST);
    assert_eq!(request.url.as_str(), "https://ci.example.com/hooks");
    assert_eq!(request.headers[CONTENT_TYPE], "text/plain");
    assert_eq!(request.body.len_hint(), Some(7));
}

#[test]
fn test_response_helpers() {
    let response = HttpResponse::new(StatusCode::OK)
        .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .with_body(r#"{"name":"build"}"#);

    assert!(response.is_success());
    assert_eq!(response.text(), r#"{"name":"build"}"#);

    let value: serde_json::Value = response.json().unwrap();
    assert_eq!(value["name"], "build");

    let broken = HttpResponse::new(StatusCode::BAD_GATEWAY).with_body("<html>");
    assert!(!broken.is_success());
    assert!(matches!(
        broken.json::<serde_json::Value>(),
        Err(TransportError::Body { .. })
    ));
}

#[test]
fn test_networking_config_defaults() {
    let config = NetworkingConfig::default();
    assert_eq!(config.timeout_seconds, 30);
    assert!(!config.trace_requests);
}

#[test]
fn test_live_client_sends_method_body_and_headers() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/hooks/build")
        .match_header("content-type", "text/plain")
        .match_body("hello")
        .with_status(201)
        .with_header("x-request-id", "42")
        .with_body("created")
        .create();

    let client = LiveHttpClient::new(NetworkingConfig {
        trace_requests: true,
        ..Default::default()
    })
    .unwrap();

    let request = HttpRequest::post(&format!("{}/hooks/build", server.url()), "hello")
        .unwrap()
        .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

    let response = client.execute(request).unwrap();

    mock.assert();
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.headers["x-request-id"], "42");
    assert_eq!(response.text(), "created");
}

#[test]
fn test_live_client_streams_reader_body() {
    let mut server = Server::new();
    let mock = server
        .mock("PUT", "/artifacts/log.txt")
        .match_body("streamed content")
        .with_status(204)
        .create();

    let client = LiveHttpClient::new(NetworkingConfig::default()).unwrap();
    let request = HttpRequest::parse(
        Method::PUT,
        &format!("{}/artifacts/log.txt", server.url()),
    )
    .unwrap()
    .with_body(RequestBody::from_reader(io::Cursor::new(
        b"streamed content".to_vec(),
    )));

    let response = client.execute(request).unwrap();

    mock.assert();
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(response.body.is_empty());
}

#[test]
fn test_live_client_returns_error_statuses_as_responses() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .with_body("not found")
        .create();

    let client = LiveHttpClient::new(NetworkingConfig::default()).unwrap();
    let status = fetch_status(&client, &format!("{}/missing", server.url())).unwrap();

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test]
fn test_live_client_usable_through_shared_handle() {
    let mut server = Server::new();
    let mock = server.mock("GET", "/ping").with_status(200).expect(2).create();

    let client: Arc<dyn HttpClient> =
        Arc::new(LiveHttpClient::new(NetworkingConfig::default()).unwrap());
    let url = format!("{}/ping", server.url());

    assert_eq!(fetch_status(&client, &url).unwrap(), StatusCode::OK);
    assert_eq!(fetch_status(&*client, &url).unwrap(), StatusCode::OK);
    mock.assert();
}
