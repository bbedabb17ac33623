//! Shared HTTP client construction and response helpers.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use url::Url;

use crate::error::{DeployError, DeployResult};

/// Header carrying the per-invocation request identifier.
pub const HEADER_REQUEST_ID: &str = "Request-Id";
/// User agent sent with every request; GitHub rejects requests without one.
pub const USER_AGENT: &str = concat!("dpod/", env!("CARGO_PKG_VERSION"));

const MAX_ERROR_BODY: usize = 512;

/// Build the HTTP client shared by every stage.
///
/// `timeout` bounds connection setup and each read, not the whole exchange,
/// so a large archive that keeps streaming is not cut off.
///
/// # Errors
///
/// Returns [`DeployError::ClientBuild`] if the client cannot be constructed.
pub fn build_client(timeout: Duration, request_id: &str) -> DeployResult<Client> {
    let mut default_headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(request_id) {
        default_headers.insert(HEADER_REQUEST_ID, value);
    }

    Client::builder()
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .user_agent(USER_AGENT)
        .default_headers(default_headers)
        .build()
        .map_err(|source| DeployError::ClientBuild { source })
}

/// Append path segments to an API base URL.
///
/// # Errors
///
/// Returns [`DeployError::InvalidEndpoint`] when `base` cannot carry a path.
pub fn endpoint<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> DeployResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| DeployError::InvalidEndpoint {
            base: base.to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Pass successful responses through; turn anything else into [`DeployError::Status`].
///
/// # Errors
///
/// Returns [`DeployError::Status`] for non-2xx responses.
pub async fn ensure_success(response: Response, endpoint: &'static str) -> DeployResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let bytes = response.bytes().await.unwrap_or_default();
    let mut body = String::from_utf8_lossy(&bytes).trim().to_string();
    if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|idx| body.is_char_boundary(*idx))
            .unwrap_or(0);
        body.truncate(cut);
        body.push_str("...");
    }
    if body.is_empty() {
        body = "<empty body>".to_string();
    }

    Err(DeployError::Status {
        endpoint,
        status,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::time::sleep;

    #[test]
    fn endpoint_appends_segments_to_root() {
        let base: Url = "https://api.github.com".parse().expect("url");
        let url = endpoint(&base, ["repos", "alice", "myapp"]).expect("endpoint");
        assert_eq!(url.as_str(), "https://api.github.com/repos/alice/myapp");
    }

    #[test]
    fn endpoint_preserves_base_path() {
        let base: Url = "https://ghe.example.com/api/v3/".parse().expect("url");
        let url = endpoint(&base, ["repos", "acme", "site"]).expect("endpoint");
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/repos/acme/site");
    }

    #[test]
    fn endpoint_rejects_opaque_base() {
        let base: Url = "mailto:ops@example.com".parse().expect("url");
        assert!(matches!(
            endpoint(&base, ["x"]),
            Err(DeployError::InvalidEndpoint { .. })
        ));
    }

    #[tokio::test]
    async fn client_sends_request_id_and_user_agent() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/ping")
                .header(HEADER_REQUEST_ID, "trace-1")
                .header("user-agent", USER_AGENT);
            then.status(204);
        });

        let client = build_client(Duration::from_secs(5), "trace-1")?;
        client.get(server.url("/ping")).send().await?;

        mock.assert();
        Ok(())
    }

    /// Serves one response whose body arrives in chunks `gap` apart.
    async fn trickle_server(
        chunks: &'static [&'static str],
        gap: Duration,
    ) -> anyhow::Result<String> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut request = [0_u8; 1024];
            let _ = socket.read(&mut request).await;
            let length: usize = chunks.iter().map(|chunk| chunk.len()).sum();
            let head = format!("HTTP/1.1 200 OK\r\ncontent-length: {length}\r\n\r\n");
            if socket.write_all(head.as_bytes()).await.is_err() {
                return;
            }
            for chunk in chunks {
                sleep(gap).await;
                if socket.write_all(chunk.as_bytes()).await.is_err() {
                    return;
                }
            }
        });
        Ok(format!("http://{addr}/archive"))
    }

    #[tokio::test]
    async fn slow_body_outlasting_timeout_still_completes() -> anyhow::Result<()> {
        let url = trickle_server(&["tar", "ball", "-bytes"], Duration::from_millis(400)).await?;
        let client = build_client(Duration::from_secs(1), "trace-1")?;

        let body = client.get(url).send().await?.bytes().await?;

        assert_eq!(body.as_ref(), b"tarball-bytes");
        Ok(())
    }

    #[tokio::test]
    async fn stalled_body_times_out() -> anyhow::Result<()> {
        let url = trickle_server(&["tar", "ball"], Duration::from_millis(800)).await?;
        let client = build_client(Duration::from_millis(200), "trace-1")?;

        let response = client.get(url).send().await?;
        let result = response.bytes().await;

        assert!(result.is_err_and(|err| err.is_timeout()));
        Ok(())
    }

    #[tokio::test]
    async fn ensure_success_reports_status_and_body() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("{\"message\":\"Not Found\"}");
        });

        let response = Client::new().get(server.url("/missing")).send().await?;
        let err = ensure_success(response, "archive")
            .await
            .expect_err("404 should fail");
        match err {
            DeployError::Status {
                endpoint,
                status,
                body,
            } => {
                assert_eq!(endpoint, "archive");
                assert_eq!(status.as_u16(), 404);
                assert!(body.contains("Not Found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }
}
