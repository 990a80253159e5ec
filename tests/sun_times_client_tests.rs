//! Exercises the HTTP client against a throwaway local server.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use sunalert::{Coordinate, SunTimesClient, SunTimesError, SunTimesSource};

const OK_BODY: &str = r#"{"status":"OK","results":{"sunrise":"2024-06-01T10:00:00+00:00","sunset":"2024-06-02T00:30:00+00:00"},"tzid":"UTC"}"#;

/// Serve one connection with a canned response; returns the endpoint URL and
/// a handle yielding the raw request text.
async fn serve_once(
    status_line: &'static str,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let n = socket.read(&mut buf).await.unwrap();
        let request = String::from_utf8_lossy(&buf[..n]).to_string();

        let response = format!(
            "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (format!("http://{}/json", addr), handle)
}

/// Client that talks to the local server directly, ignoring proxy settings.
fn local_client(endpoint: String, timeout: Duration) -> SunTimesClient {
    let http = reqwest::Client::builder()
        .no_proxy()
        .timeout(timeout)
        .build()
        .unwrap();
    SunTimesClient::from_client(http, endpoint, timeout)
}

fn nyc() -> Coordinate {
    Coordinate::new(40.7128, -74.0060)
}

#[tokio::test]
async fn test_fetch_success_sends_expected_query() {
    let (endpoint, server) = serve_once("HTTP/1.1 200 OK", OK_BODY).await;
    let client = local_client(endpoint, Duration::from_secs(10));

    let times = client.fetch(nyc()).await.unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("GET /json?lat=40.7128&lng=-74.006&formatted=0 HTTP/1.1"));
    assert_eq!(times.sunrise.to_rfc3339(), "2024-06-01T10:00:00+00:00");
    assert_eq!(times.sunset.to_rfc3339(), "2024-06-02T00:30:00+00:00");
}

#[tokio::test]
async fn test_fetch_api_error_status() {
    let (endpoint, _server) =
        serve_once("HTTP/1.1 200 OK", r#"{"results":"","status":"INVALID_TZID"}"#).await;
    let client = local_client(endpoint, Duration::from_secs(10));

    assert_eq!(
        client.fetch(nyc()).await,
        Err(SunTimesError::Api {
            status: "INVALID_TZID".to_string()
        })
    );
}

#[tokio::test]
async fn test_fetch_non_json_body() {
    let (endpoint, _server) = serve_once("HTTP/1.1 200 OK", "<html>maintenance</html>").await;
    let client = local_client(endpoint, Duration::from_secs(10));

    assert!(matches!(
        client.fetch(nyc()).await,
        Err(SunTimesError::Parse(_))
    ));
}

#[tokio::test]
async fn test_fetch_http_error_is_network_error() {
    let (endpoint, _server) = serve_once(
        "HTTP/1.1 500 Internal Server Error",
        r#"{"status":"UNKNOWN_ERROR"}"#,
    )
    .await;
    let client = local_client(endpoint, Duration::from_secs(10));

    let result = client.fetch(nyc()).await;
    assert!(
        matches!(&result, Err(SunTimesError::Network(cause)) if cause.contains("500")),
        "unexpected result: {:?}",
        result
    );
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = local_client(format!("http://127.0.0.1:{}/json", port), Duration::from_secs(5));

    assert!(matches!(
        client.fetch(nyc()).await,
        Err(SunTimesError::Network(_))
    ));
}

#[tokio::test]
async fn test_fetch_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // Accept and hold the connection without ever answering.
    let _server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(socket);
    });

    let client = local_client(format!("http://{}/json", addr), Duration::from_secs(1));

    assert_eq!(
        client.fetch(nyc()).await,
        Err(SunTimesError::Network(
            "request timed out after 1s".to_string()
        ))
    );
}
