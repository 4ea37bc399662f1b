//! Installed-app consent flow with a loopback redirect.
//!
//! Binds an ephemeral port on 127.0.0.1, prints the consent URL, waits for
//! the browser to come back with `?code=...`, then exchanges the code.

use super::{ClientSecrets, StoredToken, YOUTUBE_SCOPE, request_token};
use crate::config::secrets::ExposeSecret;
use crate::error::{Error, Result};
use reqwest::Url;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::debug;

const REPLY_OK: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nConnection: close\r\n\r\nAuthorization received. You can close this window.\n";
const REPLY_ERR: &str = "HTTP/1.1 400 Bad Request\r\nContent-Type: text/plain; charset=utf-8\r\nConnection: close\r\n\r\nAuthorization failed. Check the terminal for details.\n";

/// Run the interactive consent flow and return a fresh token.
pub async fn run_loopback_flow(
    http: &reqwest::Client,
    secrets: &ClientSecrets,
) -> Result<StoredToken> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let redirect_uri = format!("http://127.0.0.1:{}", listener.local_addr()?.port());

    let consent_url = consent_url(secrets, &redirect_uri)?;
    println!("Open the following URL in your browser to authorize access:\n\n  {consent_url}\n");

    let (stream, peer) = listener.accept().await?;
    debug!(%peer, "received oauth redirect");

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    let code = parse_redirect(&request_line, &redirect_uri);
    let reply = if code.is_ok() { REPLY_OK } else { REPLY_ERR };
    let mut stream = reader.into_inner();
    stream.write_all(reply.as_bytes()).await?;
    stream.shutdown().await.ok();
    let code = code?;

    let params = [
        ("code", code.as_str()),
        ("client_id", secrets.client_id.as_str()),
        ("client_secret", secrets.client_secret.expose_secret()),
        ("redirect_uri", redirect_uri.as_str()),
        ("grant_type", "authorization_code"),
    ];
    let response = request_token(http, &secrets.token_uri, &params).await?;
    Ok(response.into_stored(None))
}

/// Build the consent page URL.
pub fn consent_url(secrets: &ClientSecrets, redirect_uri: &str) -> Result<Url> {
    Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", YOUTUBE_SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .map_err(|e| Error::Auth(format!("bad auth_uri {}: {e}", secrets.auth_uri)))
}

/// Extract the authorization code from an HTTP request line such as
/// `GET /?code=abc&scope=... HTTP/1.1`.
fn parse_redirect(request_line: &str, redirect_uri: &str) -> Result<String> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| Error::Auth(format!("malformed redirect request: {request_line:?}")))?;
    let url = Url::parse(redirect_uri)
        .and_then(|base| base.join(target))
        .map_err(|e| Error::Auth(format!("malformed redirect target {target}: {e}")))?;

    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => return Ok(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }
    Err(Error::Auth(match error {
        Some(reason) => format!("consent denied: {reason}"),
        None => "redirect carried no authorization code".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REDIRECT: &str = "http://127.0.0.1:8765";

    #[test]
    fn parses_code_from_request_line() {
        let code = parse_redirect(
            "GET /?code=4%2F0Abc&scope=https://www.googleapis.com/auth/youtube HTTP/1.1\r\n",
            REDIRECT,
        )
        .unwrap();
        assert_eq!(code, "4/0Abc");
    }

    #[test]
    fn reports_denied_consent() {
        let err = parse_redirect("GET /?error=access_denied HTTP/1.1", REDIRECT).unwrap_err();
        assert!(err.to_string().contains("access_denied"));
    }

    #[test]
    fn rejects_empty_request() {
        assert!(parse_redirect("", REDIRECT).is_err());
    }

    #[test]
    fn consent_url_requests_offline_youtube_scope() {
        let secrets = ClientSecrets::from_json(
            r#"{"installed":{"client_id":"cid","client_secret":"shh"}}"#,
        )
        .unwrap();
        let url = consent_url(&secrets, REDIRECT).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("scope".to_string(), YOUTUBE_SCOPE.to_string())));
        assert!(pairs.contains(&("access_type".to_string(), "offline".to_string())));
        assert!(pairs.contains(&("redirect_uri".to_string(), REDIRECT.to_string())));
    }
}
