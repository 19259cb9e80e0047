//! Defines the [`Publisher`] trait and its implementations: [`TwitterClient`],
//! which posts through the social API's v2 endpoint, and [`DryRun`], which
//! only logs.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::oauth::{self, Credentials, InvalidLength, Nonce};

/// The public API host. Tests point the client elsewhere with
/// [`TwitterClient::with_api_base`].
pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";

const CREATE_POST_PATH: &str = "2/tweets";
const USER_AGENT: &str = concat!("blogcast/", env!("CARGO_PKG_VERSION"));
const TIMEOUT_SECS: u64 = 30;

/// The identifier the platform assigns to a published post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostId(String);

impl PostId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Something that can publish a finished announcement.
pub trait Publisher {
    fn publish(&self, text: &str) -> Result<PostId>;
}

/// Publishes through `POST /2/tweets` with OAuth 1.0a user credentials.
pub struct TwitterClient {
    client: Client,
    endpoint: Url,
    credentials: Credentials,
}

#[derive(Serialize)]
struct CreatePostRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct CreatePostResponse {
    data: CreatedPost,
}

#[derive(Deserialize)]
struct CreatedPost {
    id: String,
}

impl TwitterClient {
    pub fn new(credentials: Credentials) -> Result<TwitterClient> {
        TwitterClient::with_api_base(credentials, DEFAULT_API_BASE)
    }

    /// `api_base` is the scheme and host (and optionally a path ending in
    /// `/`) that `2/tweets` is joined onto.
    pub fn with_api_base(credentials: Credentials, api_base: &str) -> Result<TwitterClient> {
        let endpoint = Url::parse(api_base)?.join(CREATE_POST_PATH)?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;
        Ok(TwitterClient {
            client,
            endpoint,
            credentials,
        })
    }
}

impl Publisher for TwitterClient {
    fn publish(&self, text: &str) -> Result<PostId> {
        let authorization = oauth::authorization_header(
            &self.credentials,
            "POST",
            self.endpoint.as_str(),
            &[],
            &Nonce::generate(),
        )?;
        debug!(endpoint = %self.endpoint, "submitting post");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, authorization)
            .json(&CreatePostRequest { text })
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(if status == StatusCode::UNAUTHORIZED {
                Error::Authentication { status, body }
            } else {
                Error::Rejected { status, body }
            });
        }

        let created: CreatePostResponse = response.json()?;
        Ok(PostId(created.data.id))
    }
}

/// Logs the text instead of publishing it.
pub struct DryRun;

impl Publisher for DryRun {
    fn publish(&self, text: &str) -> Result<PostId> {
        info!("dry run; not publishing:\n{}", text);
        Ok(PostId(String::from("dry-run")))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for publishing.
#[derive(Debug)]
pub enum Error {
    /// Returned when the platform rejects the credentials (HTTP 401).
    Authentication { status: StatusCode, body: String },

    /// Returned for any other non-success response, e.g. rate limits or
    /// duplicate content.
    Rejected { status: StatusCode, body: String },

    /// Returned for transport failures and unreadable responses.
    Http(reqwest::Error),

    /// Returned when the configured API base isn't a valid URL.
    InvalidEndpoint(url::ParseError),

    /// Returned when the signing key can't be used.
    Signing(InvalidLength),
}

impl Error {
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Authentication { status, body } => {
                write!(f, "authentication failed ({}): {}", status, body)
            }
            Error::Rejected { status, body } => {
                write!(f, "publish failed ({}): {}", status, body)
            }
            Error::Http(err) => write!(f, "publish failed: {}", err),
            Error::InvalidEndpoint(err) => write!(f, "invalid API endpoint: {}", err),
            Error::Signing(err) => write!(f, "signing request: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Authentication { .. } => None,
            Error::Rejected { .. } => None,
            Error::Http(err) => Some(err),
            Error::InvalidEndpoint(err) => Some(err),
            Error::Signing(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Error {
        Error::Http(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::InvalidEndpoint(err)
    }
}

impl From<InvalidLength> for Error {
    fn from(err: InvalidLength) -> Error {
        Error::Signing(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use mockito::Matcher;

    fn credentials() -> Credentials {
        Credentials {
            consumer_key: "consumer".to_owned(),
            consumer_secret: "consumer-secret".to_owned(),
            access_token: "token".to_owned(),
            access_token_secret: "token-secret".to_owned(),
        }
    }

    #[test]
    fn test_publish_returns_post_id() -> Result<()> {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/2/tweets")
            .match_header(
                "authorization",
                Matcher::Regex(r#"^OAuth oauth_consumer_key="consumer", oauth_nonce="[A-Za-z0-9]{32}", oauth_signature=""#.to_owned()),
            )
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({ "text": "ブログを更新しました！" })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{"id":"1445880548472328192","text":"ブログを更新しました！"}}"#)
            .create();

        let client = TwitterClient::with_api_base(credentials(), &server.url())?;
        let id = client.publish("ブログを更新しました！")?;
        assert_eq!("1445880548472328192", id.as_str());
        mock.assert();
        Ok(())
    }

    #[test]
    fn test_unauthorized_is_authentication_error() -> Result<()> {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/2/tweets")
            .with_status(401)
            .with_body(r#"{"title":"Unauthorized","status":401}"#)
            .create();

        let client = TwitterClient::with_api_base(credentials(), &server.url())?;
        let err = client.publish("hello").unwrap_err();
        assert!(err.is_authentication());
        assert!(format!("{}", err).contains("Unauthorized"));
        mock.assert();
        Ok(())
    }

    #[test]
    fn test_rate_limit_is_publish_error() -> Result<()> {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/2/tweets")
            .with_status(429)
            .with_body("Too Many Requests")
            .create();

        let client = TwitterClient::with_api_base(credentials(), &server.url())?;
        let err = client.publish("hello").unwrap_err();
        assert!(!err.is_authentication());
        assert!(matches!(err, Error::Rejected { status, .. } if status == StatusCode::TOO_MANY_REQUESTS));
        mock.assert();
        Ok(())
    }

    #[test]
    fn test_unexpected_response_body_is_publish_error() -> Result<()> {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/2/tweets")
            .with_status(200)
            .with_body("not json")
            .create();

        let client = TwitterClient::with_api_base(credentials(), &server.url())?;
        assert!(matches!(client.publish("hello"), Err(Error::Http(_))));
        Ok(())
    }

    #[test]
    fn test_invalid_api_base() {
        assert!(matches!(
            TwitterClient::with_api_base(credentials(), "not a url"),
            Err(Error::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_dry_run() -> Result<()> {
        assert_eq!("dry-run", DryRun.publish("anything")?.as_str());
        Ok(())
    }
}
