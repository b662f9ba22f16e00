use super::HttpError;
use bytes::Bytes;
use http::{header, Method, Request};
use http_body_util::{BodyExt, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::debug;

/// Longest response body excerpt kept in status errors
const ERROR_BODY_LIMIT: usize = 512;

/// Pooled HTTP/1 client for JSON APIs, plain or TLS.
///
/// Every call is bounded by the timeout the caller passes in, covering
/// connect, request and reading the full body.
#[derive(Clone)]
pub struct JsonHttpClient {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl JsonHttpClient {
    pub fn new() -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();

        Self {
            client: Client::builder(TokioExecutor::new()).build(connector),
        }
    }

    /// GET `url` and decode the JSON response
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<T, HttpError> {
        let request = build_request(Method::GET, url, headers, Bytes::new())?;
        let body = self.execute(request, timeout).await?;
        serde_json::from_slice(&body).map_err(HttpError::Decode)
    }

    /// Send `body` as JSON and return the raw response body
    pub async fn send_json<B: Serialize>(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, &str)],
        body: &B,
        timeout: Duration,
    ) -> Result<Bytes, HttpError> {
        let payload = serde_json::to_vec(body).map_err(HttpError::Encode)?;
        let request = build_request(method, url, headers, Bytes::from(payload))?;
        self.execute(request, timeout).await
    }

    async fn execute(
        &self,
        request: Request<Full<Bytes>>,
        timeout: Duration,
    ) -> Result<Bytes, HttpError> {
        let uri = request.uri().to_string();
        let method = request.method().clone();

        let exchange = async {
            let response = self.client.request(request).await?;
            let status = response.status();
            let body = response.into_body().collect().await?.to_bytes();
            Ok::<_, HttpError>((status, body))
        };

        let (status, body) = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| HttpError::Timeout {
                uri: uri.clone(),
                timeout,
            })??;

        debug!(%method, %uri, status = status.as_u16(), "http exchange finished");

        if !status.is_success() {
            let excerpt = String::from_utf8_lossy(&body[..body.len().min(ERROR_BODY_LIMIT)]);
            return Err(HttpError::Status {
                status,
                body: excerpt.into_owned(),
            });
        }

        Ok(body)
    }
}

impl Default for JsonHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn build_request(
    method: Method,
    url: &str,
    headers: &[(&str, &str)],
    body: Bytes,
) -> Result<Request<Full<Bytes>>, HttpError> {
    let mut builder = Request::builder()
        .method(method)
        .uri(url)
        .header(header::ACCEPT, "application/json");

    if !body.is_empty() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    Ok(builder.body(Full::new(body))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP/1.1 response on a local port
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await.unwrap();
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_build_request_sets_headers() {
        let request = build_request(
            Method::PUT,
            "http://localhost/assets",
            &[("x-api-key", "secret")],
            Bytes::from_static(b"{}"),
        )
        .unwrap();

        assert_eq!(request.method(), Method::PUT);
        assert_eq!(request.headers()["x-api-key"], "secret");
        assert_eq!(request.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_build_request_rejects_invalid_uri() {
        let result = build_request(Method::GET, "not a uri", &[], Bytes::new());
        assert!(matches!(result, Err(HttpError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_get_json_decodes_body() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 13\r\nconnection: close\r\n\r\n{\"data\":[42]}",
        )
        .await;

        let value: serde_json::Value = JsonHttpClient::new()
            .get_json(&format!("{}/specifications", base), &[], Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(value["data"][0], 42);
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let base = serve_once(
            "HTTP/1.1 401 Unauthorized\r\ncontent-length: 6\r\nconnection: close\r\n\r\ndenied",
        )
        .await;

        let result: Result<serde_json::Value, _> = JsonHttpClient::new()
            .get_json(&base, &[], Duration::from_secs(5))
            .await;

        match result {
            Err(HttpError::Status { status, body }) => {
                assert_eq!(status, http::StatusCode::UNAUTHORIZED);
                assert_eq!(body, "denied");
            }
            other => panic!("expected status error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let result: Result<serde_json::Value, _> = JsonHttpClient::new()
            .get_json(&format!("http://{}", addr), &[], Duration::from_millis(100))
            .await;

        assert!(matches!(result, Err(HttpError::Timeout { .. })));
    }
}
