//! Local redirect listener for the authorization callback
//!
//! After the operator approves access in the browser, the photo service
//! redirects to `http://127.0.0.1:<port>/callback?code=...`. The listener
//! accepts exactly one connection, answers with a plain success page, and
//! hands the authorization code back to the flow. A callback without a
//! `code` parameter is fatal to the request; the operator restarts the
//! flow from the authorization URL.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};

use crate::error::{PhotoEmbedError, Result};

// ---------------------------------------------------------------------------
// CallbackListener
// ---------------------------------------------------------------------------

/// One-shot TCP listener for the OAuth redirect callback.
///
/// # Examples
///
/// ```no_run
/// use photoembed::auth::CallbackListener;
///
/// # async fn example() -> photoembed::error::Result<()> {
/// let listener = CallbackListener::bind(0).await?;
/// let redirect_uri = listener.redirect_uri()?;
/// println!("register {redirect_uri} with the photo service");
/// let code = listener.accept_code().await?;
/// println!("authorization code: {code}");
/// # Ok(())
/// # }
/// ```
pub struct CallbackListener {
    listener: tokio::net::TcpListener,
}

impl CallbackListener {
    /// Binds the callback listener on the loopback interface.
    ///
    /// Use port `0` to let the OS assign a free port; the actual redirect
    /// URI is reported by [`redirect_uri`](Self::redirect_uri).
    pub async fn bind(port: u16) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{port}"))
            .await
            .map_err(|e| {
                PhotoEmbedError::AuthorizationFailed(format!(
                    "failed to bind redirect listener: {e}"
                ))
            })?;
        Ok(Self { listener })
    }

    /// Returns the redirect URI served by this listener.
    pub fn redirect_uri(&self) -> Result<String> {
        let local_addr = self.listener.local_addr().map_err(|e| {
            PhotoEmbedError::AuthorizationFailed(format!("failed to get local address: {e}"))
        })?;
        Ok(format!("http://127.0.0.1:{}/callback", local_addr.port()))
    }

    /// Accepts a single connection and extracts the authorization code.
    ///
    /// Parses the HTTP request line of the redirect, responds with a plain
    /// 200 page so the browser does not spin, and returns the `code` query
    /// parameter.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoEmbedError::AuthorizationFailed`] when the
    /// connection cannot be read or the callback carries no `code`
    /// parameter (the operator denied access, or the service reported an
    /// error). The listener is consumed either way; restart the flow to
    /// try again.
    pub async fn accept_code(self) -> Result<String> {
        let (stream, _peer) = self.listener.accept().await.map_err(|e| {
            PhotoEmbedError::AuthorizationFailed(format!(
                "failed to accept authorization callback connection: {e}"
            ))
        })?;

        // Move to a blocking task so we can use std I/O for simple HTTP
        // request parsing without pulling in a full HTTP server.
        let code = tokio::task::spawn_blocking(move || -> Result<String> {
            let std_stream = stream.into_std().map_err(|e| {
                PhotoEmbedError::AuthorizationFailed(format!("stream conversion failed: {e}"))
            })?;

            let mut write_stream = std_stream.try_clone().map_err(|e| {
                PhotoEmbedError::AuthorizationFailed(format!("stream clone failed: {e}"))
            })?;

            let reader = BufReader::new(std_stream);
            let mut request_line = String::new();

            for line in reader.lines() {
                let line = line.map_err(|e| {
                    PhotoEmbedError::AuthorizationFailed(format!(
                        "failed to read callback request: {e}"
                    ))
                })?;
                // HTTP headers end at the first empty line.
                if line.is_empty() {
                    break;
                }
                if request_line.is_empty() {
                    request_line = line;
                }
            }

            // Send HTTP 200 response immediately so the browser does not
            // spin indefinitely.
            let response = "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\nAuthorization received. You may close this tab.";
            let _ = write_stream.write_all(response.as_bytes());

            // Parse request line: "GET /callback?code=... HTTP/1.1"
            let path = request_line.split_whitespace().nth(1).unwrap_or("/");
            let query_string = path.split_once('?').map(|x| x.1).unwrap_or("");
            let params = parse_query_string(query_string);

            params.get("code").cloned().filter(|c| !c.is_empty()).ok_or_else(|| {
                PhotoEmbedError::AuthorizationFailed(
                    "authorization code missing from callback".to_string(),
                )
                .into()
            })
        })
        .await
        .map_err(|e| {
            PhotoEmbedError::AuthorizationFailed(format!("callback task panicked: {e}"))
        })??;

        Ok(code)
    }
}

/// Attempts to open the authorization URL in the operator's default
/// browser.
///
/// Errors are intentionally ignored; if the browser does not open the
/// operator can copy the URL from stderr.
pub(crate) fn try_open_browser(url: &str) {
    #[cfg(target_os = "macos")]
    {
        let _ = std::process::Command::new("open").arg(url).spawn();
    }
    #[cfg(target_os = "linux")]
    {
        let _ = std::process::Command::new("xdg-open").arg(url).spawn();
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        // On other platforms (e.g. Windows) we do not attempt to open the
        // browser; the operator must copy the URL manually.
        let _ = url;
    }
}

// ---------------------------------------------------------------------------
// Utility functions
// ---------------------------------------------------------------------------

/// Parses a URL query string into a key-value map.
///
/// Values are percent-decoded. Duplicate keys are overwritten by the last
/// occurrence.
fn parse_query_string(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // parse_query_string
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_query_string_with_code() {
        let map = parse_query_string("code=abc123&scope=readonly");
        assert_eq!(map.get("code"), Some(&"abc123".to_string()));
        assert_eq!(map.get("scope"), Some(&"readonly".to_string()));
    }

    #[test]
    fn test_parse_query_string_empty_returns_empty_map() {
        let map = parse_query_string("");
        assert!(map.is_empty());
    }

    #[test]
    fn test_parse_query_string_decodes_percent_sequences() {
        let map = parse_query_string("code=4%2FabcDEF&greeting=hello+world");
        assert_eq!(map.get("code"), Some(&"4/abcDEF".to_string()));
        assert_eq!(map.get("greeting"), Some(&"hello world".to_string()));
    }

    // -----------------------------------------------------------------------
    // accept_code
    // -----------------------------------------------------------------------

    async fn drive_callback(request: &'static str) -> Result<String> {
        let listener = CallbackListener::bind(0).await?;
        let redirect_uri = listener.redirect_uri()?;
        let port: u16 = redirect_uri
            .rsplit(':')
            .next()
            .and_then(|rest| rest.split('/').next())
            .and_then(|p| p.parse().ok())
            .expect("redirect URI must carry a port");

        let client = tokio::spawn(async move {
            use tokio::io::{AsyncReadExt, AsyncWriteExt};
            let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", port))
                .await
                .expect("connect to callback listener");
            stream
                .write_all(request.as_bytes())
                .await
                .expect("send callback request");
            let mut response = Vec::new();
            let _ = stream.read_to_end(&mut response).await;
            response
        });

        let code = listener.accept_code().await;
        let response = client.await.expect("client task");
        assert!(
            response.starts_with(b"HTTP/1.1 200 OK"),
            "listener must answer 200 to the browser"
        );
        code
    }

    #[tokio::test]
    async fn test_accept_code_extracts_code_parameter() {
        let code = drive_callback("GET /callback?code=auth_code_42 HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .expect("callback with code must succeed");
        assert_eq!(code, "auth_code_42");
    }

    #[tokio::test]
    async fn test_accept_code_fails_without_code_parameter() {
        let result = drive_callback("GET /callback?error=access_denied HTTP/1.1\r\nHost: x\r\n\r\n")
            .await;
        let err = result.expect_err("callback without code must fail");
        assert!(matches!(
            err.downcast_ref::<PhotoEmbedError>(),
            Some(PhotoEmbedError::AuthorizationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_redirect_uri_reports_bound_port() {
        let listener = CallbackListener::bind(0).await.unwrap();
        let uri = listener.redirect_uri().unwrap();
        assert!(uri.starts_with("http://127.0.0.1:"));
        assert!(uri.ends_with("/callback"));
    }
}
