use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine as _;
use rand::RngCore;
use sha2::{Digest, Sha256};

const SEAL_VERSION: &str = "v1";

fn derive_key(secret: &str) -> Key<Aes256Gcm> {
    let mut hasher = Sha256::new();
    hasher.update(b"wanderlust.session.v1:");
    hasher.update(secret.as_bytes());
    let out = hasher.finalize();
    *Key::<Aes256Gcm>::from_slice(&out)
}

/// 32 random bytes, base64url without padding. Goes into the cookie.
pub fn new_session_id() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Store key for a cookie value. The raw id never reaches the store.
pub fn session_key(session_id: &str) -> String {
    let digest = Sha256::digest(session_id.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn seal(secret: &str, plaintext: &str) -> anyhow::Result<String> {
    let cipher = Aes256Gcm::new(&derive_key(secret));
    let mut nonce_bytes = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);
    let ct = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| anyhow::anyhow!("encrypt failed: {}", e))?;
    let b64 = base64::engine::general_purpose::STANDARD;
    Ok(format!("{SEAL_VERSION}:{}:{}", b64.encode(nonce_bytes), b64.encode(ct)))
}

pub fn open(secret: &str, sealed: &str) -> anyhow::Result<String> {
    let mut parts = sealed.splitn(3, ':');
    let (Some(SEAL_VERSION), Some(n_b64), Some(c_b64)) = (parts.next(), parts.next(), parts.next())
    else {
        anyhow::bail!("invalid sealed payload");
    };
    let b64 = base64::engine::general_purpose::STANDARD;
    let nonce_bytes = b64
        .decode(n_b64)
        .map_err(|e| anyhow::anyhow!("b64 decode nonce: {}", e))?;
    if nonce_bytes.len() != 12 {
        anyhow::bail!("invalid nonce length");
    }
    let ct_bytes = b64
        .decode(c_b64)
        .map_err(|e| anyhow::anyhow!("b64 decode ct: {}", e))?;
    let cipher = Aes256Gcm::new(&derive_key(secret));
    let pt = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ct_bytes.as_ref())
        .map_err(|e| anyhow::anyhow!("decrypt failed: {}", e))?;
    Ok(String::from_utf8(pt)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sealed_payload_opens_only_with_the_same_secret() {
        let sealed = seal("s3cret", r#"{"user_id":null}"#).unwrap();
        assert!(sealed.starts_with("v1:"));
        assert_eq!(open("s3cret", &sealed).unwrap(), r#"{"user_id":null}"#);
        assert!(open("other", &sealed).is_err());
        assert!(open("s3cret", "plain text").is_err());
    }

    #[test]
    fn session_ids_are_random_and_keys_are_hex_digests() {
        let a = new_session_id();
        let b = new_session_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        let key = session_key(&a);
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, session_key(&a));
    }
}
