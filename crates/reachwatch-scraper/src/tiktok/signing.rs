//! Request signing for the TokCount API.
//!
//! Each request carries the current millisecond timestamp plus two digests
//! derived from it. Signatures are only valid for a short window, so headers
//! must be rebuilt for every request.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha384};

pub(crate) const ORIGIN: &str = "https://tokcount.com";
pub(crate) const REFERER: &str = "https://tokcount.com/";
const SERVICE_NAME: &str = "TokCount";
const ANTIABUSE_IP: &str = "1.1.1.1";
const MIDAS_SUFFIX: &str = "64";

/// `sha384(sha256(timestamp + "64"))` over the raw first-stage bytes,
/// hex-encoded.
#[must_use]
pub fn midas_signature(timestamp: &str) -> String {
    let first = Sha256::digest(format!("{timestamp}{MIDAS_SUFFIX}").as_bytes());
    format!("{:x}", Sha384::digest(first))
}

/// `ripemd160(timestamp)`, hex-encoded.
#[must_use]
pub fn ajay_signature(timestamp: &str) -> String {
    format!("{:x}", Ripemd160::digest(timestamp.as_bytes()))
}

/// Builds the full header set for one TokCount request.
///
/// `include_identity` adds the service identity headers the user lookup and
/// stats endpoints require.
#[must_use]
pub fn signed_headers(
    timestamp_ms: i64,
    user_agent: &str,
    include_identity: bool,
) -> Vec<(&'static str, String)> {
    let timestamp = timestamp_ms.to_string();
    let mut headers = vec![
        ("Origin", ORIGIN.to_owned()),
        ("Referer", REFERER.to_owned()),
        ("User-Agent", user_agent.to_owned()),
        ("x-midas", midas_signature(&timestamp)),
        ("x-ajay", ajay_signature(&timestamp)),
        ("x-catto", timestamp),
    ];
    if include_identity {
        headers.push(("x-service", SERVICE_NAME.to_owned()));
        headers.push(("x-user-agent", user_agent.to_owned()));
        headers.push(("x-antiabuse-ip", ANTIABUSE_IP.to_owned()));
    }
    headers
}
