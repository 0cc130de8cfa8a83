//! AWS Signature Version 4 request signing.
//!
//! Only what the JSON protocol needs: a single canonical path, an already
//! canonical query string, and a fully buffered body.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const SCOPE_TERMINATOR: &str = "aws4_request";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningError {
    #[error("aws credentials are incomplete: `{0}` is empty")]
    MissingCredential(&'static str),
    #[error("hmac key was rejected")]
    InvalidKey,
}

pub struct SigningParams<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub session_token: Option<&'a str>,
    pub region: &'a str,
    pub service: &'a str,
    pub time: DateTime<Utc>,
}

pub struct SignableRequest<'a> {
    pub method: &'a str,
    pub host: &'a str,
    pub path: &'a str,
    pub query: &'a str,
    pub headers: &'a [(&'a str, &'a str)],
    pub body: &'a [u8],
}

/// Headers the caller must attach for the signature to verify.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedHeaders {
    pub authorization: String,
    pub amz_date: String,
    pub security_token: Option<String>,
}

pub fn sign(
    request: &SignableRequest<'_>,
    params: &SigningParams<'_>,
) -> Result<SignedHeaders, SigningError> {
    if params.access_key_id.is_empty() {
        return Err(SigningError::MissingCredential("access_key_id"));
    }
    if params.secret_access_key.is_empty() {
        return Err(SigningError::MissingCredential("secret_access_key"));
    }

    let amz_date = params.time.format(AMZ_DATE_FORMAT).to_string();
    let date = params.time.format("%Y%m%d").to_string();

    let mut headers = BTreeMap::new();
    headers.insert("host".to_owned(), request.host.trim().to_owned());
    headers.insert("x-amz-date".to_owned(), amz_date.clone());
    if let Some(token) = params.session_token {
        headers.insert("x-amz-security-token".to_owned(), token.trim().to_owned());
    }
    for (name, value) in request.headers {
        headers.insert(name.to_ascii_lowercase(), value.trim().to_owned());
    }

    let canonical_headers: String =
        headers.iter().map(|(name, value)| format!("{name}:{value}\n")).collect();
    let signed_headers = headers.keys().map(String::as_str).collect::<Vec<_>>().join(";");
    let path = if request.path.is_empty() { "/" } else { request.path };

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        request.method,
        path,
        request.query,
        canonical_headers,
        signed_headers,
        sha256_hex(request.body)
    );

    let scope = format!("{date}/{}/{}/{SCOPE_TERMINATOR}", params.region, params.service);
    let string_to_sign =
        format!("{ALGORITHM}\n{amz_date}\n{scope}\n{}", sha256_hex(canonical_request.as_bytes()));

    let signing_key =
        derive_signing_key(params.secret_access_key, &date, params.region, params.service)?;
    let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

    Ok(SignedHeaders {
        authorization: format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            params.access_key_id
        ),
        amz_date,
        security_token: params.session_token.map(str::to_owned),
    })
}

pub fn derive_signing_key(
    secret_access_key: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, SigningError> {
    let date_key = hmac_sha256(format!("AWS4{secret_access_key}").as_bytes(), date.as_bytes())?;
    let region_key = hmac_sha256(&date_key, region.as_bytes())?;
    let service_key = hmac_sha256(&region_key, service.as_bytes())?;
    hmac_sha256(&service_key, SCOPE_TERMINATOR.as_bytes())
}

fn hmac_sha256(key: &[u8], payload: &[u8]) -> Result<Vec<u8>, SigningError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SigningError::InvalidKey)?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sha256_hex(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{derive_signing_key, sign, SignableRequest, SigningError, SigningParams};

    const EXAMPLE_SECRET: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

    fn params(session_token: Option<&'static str>) -> SigningParams<'static> {
        SigningParams {
            access_key_id: "AKIDEXAMPLE",
            secret_access_key: EXAMPLE_SECRET,
            session_token,
            region: "us-east-1",
            service: "service",
            time: Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).single().expect("valid time"),
        }
    }

    fn vanilla_get() -> SignableRequest<'static> {
        SignableRequest {
            method: "GET",
            host: "example.amazonaws.com",
            path: "/",
            query: "",
            headers: &[],
            body: b"",
        }
    }

    #[test]
    fn signing_key_matches_published_derivation() {
        let key = derive_signing_key(EXAMPLE_SECRET, "20120215", "us-east-1", "iam")
            .expect("key derives");
        assert_eq!(
            hex::encode(key),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }

    #[test]
    fn vanilla_get_matches_known_answer() {
        let signed = sign(&vanilla_get(), &params(None)).expect("request signs");

        assert_eq!(signed.amz_date, "20150830T123600Z");
        assert_eq!(
            signed.authorization,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
             SignedHeaders=host;x-amz-date, \
             Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        );
        assert_eq!(signed.security_token, None);
    }

    #[test]
    fn session_token_and_extra_headers_are_signed_in_sorted_order() {
        let request = SignableRequest {
            method: "POST",
            host: "translate.us-west-2.amazonaws.com",
            path: "/",
            query: "",
            headers: &[
                ("X-Amz-Target", "AWSShineFrontendService_20170701.TranslateText"),
                ("Content-Type", " application/x-amz-json-1.1 "),
            ],
            body: br#"{"Text":"Hello"}"#,
        };

        let signed = sign(&request, &params(Some("session"))).expect("request signs");

        assert!(signed.authorization.contains(
            "SignedHeaders=content-type;host;x-amz-date;x-amz-security-token;x-amz-target,"
        ));
        assert_eq!(signed.security_token.as_deref(), Some("session"));

        let unsigned_body = SignableRequest { body: br#"{"Text":"Bye"}"#, ..request };
        let other = sign(&unsigned_body, &params(Some("session"))).expect("request signs");
        assert_ne!(signed.authorization, other.authorization);
    }

    #[test]
    fn empty_credentials_are_refused() {
        let mut missing = params(None);
        missing.secret_access_key = "";
        assert_eq!(
            sign(&vanilla_get(), &missing),
            Err(SigningError::MissingCredential("secret_access_key"))
        );
    }
}
