//! Single sign-on URL builders.
//!
//! Both flows are pure functions of caller input and session credentials:
//! remote authentication signs `name + email + token + timestamp` with MD5,
//! the JWT flow signs `{iat, jti, name, email}` with HMAC-SHA256.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::ApiError;

const REMOTE_PATH: &str = "/access/remote";
const JWT_PATH: &str = "/access/jwt";

/// Input of a remote-authentication login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteLogin<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub token: &'a str,
    pub timestamp: i64,
}

impl RemoteLogin<'_> {
    /// Lowercase hex MD5 of the concatenated fields.
    pub fn hash(&self) -> String {
        use md5::{Digest, Md5};

        let input = format!("{}{}{}{}", self.name, self.email, self.token, self.timestamp);
        Md5::digest(input.as_bytes())
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }
}

/// `<base>/access/remote?name=..&email=..&timestamp=..&hash=..[&return_to=..]`
pub fn remote_login_url(base_url: &str, login: &RemoteLogin<'_>, return_to: Option<&str>) -> Result<String, ApiError> {
    let timestamp = login.timestamp.to_string();
    let hash = login.hash();
    build_url(
        base_url,
        REMOTE_PATH,
        &[
            ("name", login.name),
            ("email", login.email),
            ("timestamp", &timestamp),
            ("hash", &hash),
        ],
        return_to,
    )
}

/// Payload of a JWT sign-on token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Unique per token: `<iat>/<nonce>`.
    pub jti: String,
    pub name: String,
    pub email: String,
}

impl Claims {
    pub fn issue(name: &str, email: &str, issued_at: i64) -> Self {
        Self {
            iat: issued_at,
            jti: format!("{issued_at}/{}", Uuid::new_v4()),
            name: name.to_string(),
            email: email.to_string(),
        }
    }
}

#[derive(Serialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

/// Compact HS256 JWT.
pub fn encode_jwt(claims: &Claims, secret: &str) -> Result<String, ApiError> {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let header = serde_json::to_vec(&Header { alg: "HS256", typ: "JWT" })
        .map_err(|e| ApiError::SerializationError(e.to_string()))?;
    let payload = serde_json::to_vec(claims).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    let signing_input = format!("{}.{}", URL_SAFE_NO_PAD.encode(header), URL_SAFE_NO_PAD.encode(payload));

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| ApiError::SerializationError(e.to_string()))?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{signature}"))
}

/// `<base>/access/jwt?jwt=..[&return_to=..]`
pub fn jwt_login_url(
    base_url: &str,
    claims: &Claims,
    secret: &str,
    return_to: Option<&str>,
) -> Result<String, ApiError> {
    let token = encode_jwt(claims, secret)?;
    build_url(base_url, JWT_PATH, &[("jwt", &token)], return_to)
}

fn build_url(base_url: &str, path: &str, pairs: &[(&str, &str)], return_to: Option<&str>) -> Result<String, ApiError> {
    let mut url = Url::parse(base_url)?;
    url.set_path(path);
    url.set_query(None);
    {
        let mut query = url.query_pairs_mut();
        query.extend_pairs(pairs);
        if let Some(return_to) = return_to.filter(|value| !value.trim().is_empty()) {
            query.append_pair("return_to", return_to);
        }
    }
    Ok(url.to_string())
}
