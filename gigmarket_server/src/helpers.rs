use actix_web::HttpRequest;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Calculate the HMAC-SHA256 signature over `body` and return it as a lowercase hex string, the format Razorpay
/// uses in its `x-razorpay-signature` header.
pub fn calculate_hmac(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take a key of any size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Check a webhook signature against the raw request body.
///
/// The comparison runs in constant time. Returns `false` for signatures that are not valid hex as well as for
/// signatures that do not match.
pub fn verify_webhook_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(signature) = hex::decode(signature.trim()) else {
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take a key of any size");
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}

/// Best-effort client address for log messages.
///
/// Proxy headers are trivially forged, so `X-Forwarded-For` is only consulted when the server is configured to
/// trust the proxy in front of it. Otherwise the peer address of the connection is used.
pub fn client_ip(req: &HttpRequest, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        if let Some(forwarded) = req.headers().get("X-Forwarded-For").and_then(|v| v.to_str().ok()) {
            if let Some(ip) = forwarded.split(',').next() {
                let ip = ip.trim();
                if !ip.is_empty() {
                    return ip.to_string();
                }
            }
        }
    }
    req.connection_info().peer_addr().unwrap_or("unknown").to_string()
}
