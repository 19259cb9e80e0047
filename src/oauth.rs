//! OAuth 1.0a request signing (HMAC-SHA1) for the social API. Only the
//! user-context flow is supported: the consumer key pair and the access
//! token pair are both supplied up front.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;

pub use hmac::digest::InvalidLength;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const VERSION: &str = "1.0";
const NONCE_LEN: usize = 32;

/// The four secrets needed to act on behalf of an account.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl fmt::Debug for Credentials {
    /// Only the public halves are shown.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

/// The per-request values that make a signature unique.
#[derive(Debug, Clone)]
pub struct Nonce {
    pub nonce: String,
    pub timestamp: i64,
}

impl Nonce {
    /// A random alphanumeric nonce stamped with the current time.
    pub fn generate() -> Nonce {
        Nonce {
            nonce: rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(NONCE_LEN)
                .map(char::from)
                .collect(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Builds the `Authorization` header value for a request. `params` are the
/// query and form parameters that take part in the signature; a JSON body
/// does not.
pub fn authorization_header(
    credentials: &Credentials,
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    nonce: &Nonce,
) -> Result<String, InvalidLength> {
    let timestamp = nonce.timestamp.to_string();
    let mut oauth_params = vec![
        ("oauth_consumer_key", credentials.consumer_key.as_str()),
        ("oauth_nonce", nonce.nonce.as_str()),
        ("oauth_signature_method", SIGNATURE_METHOD),
        ("oauth_timestamp", timestamp.as_str()),
        ("oauth_token", credentials.access_token.as_str()),
        ("oauth_version", VERSION),
    ];

    let mut all_params = oauth_params.clone();
    all_params.extend_from_slice(params);
    let signature = sign(credentials, &base_string(method, url, &all_params))?;

    oauth_params.push(("oauth_signature", signature.as_str()));
    oauth_params.sort();
    Ok(format!(
        "OAuth {}",
        oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<String>>()
            .join(", ")
    ))
}

/// `METHOD&enc(url)&enc(k1=v1&k2=v2...)` with pairs sorted after encoding.
pub fn base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();
    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<String>>()
        .join("&");
    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&param_string)
    )
}

/// Base64 HMAC-SHA1 of `base_string` keyed by both secrets.
pub fn sign(credentials: &Credentials, base_string: &str) -> Result<String, InvalidLength> {
    let key = format!(
        "{}&{}",
        encode(&credentials.consumer_secret),
        encode(&credentials.access_token_secret)
    );
    let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())?;
    mac.update(base_string.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// RFC 3986 percent-encoding: everything but `A-Z a-z 0-9 - . _ ~`.
fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

#[cfg(test)]
mod test {
    use super::*;

    // The worked example from the platform's "Creating a signature" guide.
    fn example_credentials() -> Credentials {
        Credentials {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".to_owned(),
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".to_owned(),
            access_token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".to_owned(),
            access_token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".to_owned(),
        }
    }

    fn example_nonce() -> Nonce {
        Nonce {
            nonce: "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg".to_owned(),
            timestamp: 1318622958,
        }
    }

    const EXAMPLE_URL: &str = "https://api.twitter.com/1.1/statuses/update.json";
    const EXAMPLE_PARAMS: &[(&str, &str)] = &[
        ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
        ("include_entities", "true"),
    ];

    #[test]
    fn test_base_string() {
        let params = [
            ("include_entities", "true"),
            ("status", "a b+c"),
            ("oauth_version", "1.0"),
        ];
        assert_eq!(
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&include_entities%3Dtrue%26oauth_version%3D1.0%26status%3Da%2520b%252Bc",
            base_string("post", EXAMPLE_URL, &params),
        );
    }

    #[test]
    fn test_authorization_header_matches_worked_example() -> Result<(), InvalidLength> {
        let header = authorization_header(
            &example_credentials(),
            "POST",
            EXAMPLE_URL,
            EXAMPLE_PARAMS,
            &example_nonce(),
        )?;
        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\", "));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
        assert!(header.contains("oauth_timestamp=\"1318622958\""));
        assert!(header.ends_with("oauth_version=\"1.0\""));
        assert!(!header.contains("status"));
        Ok(())
    }

    #[test]
    fn test_generated_nonces_differ() {
        let a = Nonce::generate();
        let b = Nonce::generate();
        assert_eq!(NONCE_LEN, a.nonce.len());
        assert!(a.nonce.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a.nonce, b.nonce);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let shown = format!("{:?}", example_credentials());
        assert!(shown.contains("xvz1evFS4wEEPTGEFPHBog"));
        assert!(!shown.contains("kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw"));
        assert!(!shown.contains("LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE"));
    }
}
