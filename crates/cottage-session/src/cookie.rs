use anyhow::{Result, anyhow};
use cottage_protocol::SessionId;
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const SESSION_COOKIE: &str = "cottage_session";

type HmacSha256 = Hmac<Sha256>;

/// Signs session ids into `<id>.<hex tag>` cookie values so clients cannot
/// forge or guess another session's id.
#[derive(Clone)]
pub struct CookieSigner {
    mac: HmacSha256,
}

impl std::fmt::Debug for CookieSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSigner").finish_non_exhaustive()
    }
}

impl CookieSigner {
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.is_empty() {
            return Err(anyhow!("session signing key must not be empty"));
        }
        let mac = HmacSha256::new_from_slice(key)
            .map_err(|error| anyhow!("invalid session signing key: {error}"))?;
        Ok(Self { mac })
    }

    /// Signer with a fresh key. Cookies it issues die with the process.
    pub fn random() -> Result<Self> {
        let key: [u8; 32] = rand::random();
        Self::new(&key)
    }

    fn tag(&self, value: &str) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(value.as_bytes());
        mac
    }

    pub fn sign(&self, session_id: &SessionId) -> String {
        let tag = self.tag(session_id.as_str()).finalize().into_bytes();
        format!("{}.{}", session_id.as_str(), hex::encode(tag))
    }

    pub fn verify(&self, cookie_value: &str) -> Option<SessionId> {
        let (id, tag_hex) = cookie_value.trim().rsplit_once('.')?;
        let tag = hex::decode(tag_hex).ok()?;
        self.tag(id).verify_slice(&tag).ok()?;

        let session_id = SessionId::from_string(id);
        session_id.is_well_formed().then_some(session_id)
    }

    /// Find and verify the session cookie in a raw `Cookie` header.
    pub fn session_from_cookie_header(&self, header: &str) -> Option<SessionId> {
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| *name == SESSION_COOKIE)
            .find_map(|(_, value)| self.verify(value))
    }

    pub fn set_cookie(&self, session_id: &SessionId, max_age_secs: u64) -> String {
        format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}",
            self.sign(session_id)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_ids_verify() {
        let signer = CookieSigner::new(b"test-key").unwrap();
        let id = SessionId::new_uuid();
        let value = signer.sign(&id);
        assert!(value.starts_with(id.as_str()));
        assert_eq!(signer.verify(&value), Some(id));
    }

    #[test]
    fn tampered_values_are_rejected() {
        let signer = CookieSigner::new(b"test-key").unwrap();
        let value = signer.sign(&SessionId::from_string("abc"));
        let (_, tag) = value.rsplit_once('.').unwrap();

        assert!(signer.verify(&format!("abd.{tag}")).is_none());
        assert!(signer.verify("abc").is_none());
        assert!(signer.verify("abc.zz").is_none());
        assert!(signer.verify("").is_none());
    }

    #[test]
    fn other_keys_do_not_verify() {
        let first = CookieSigner::new(b"one").unwrap();
        let second = CookieSigner::new(b"two").unwrap();
        let value = first.sign(&SessionId::new_uuid());
        assert!(second.verify(&value).is_none());
        assert!(CookieSigner::random().unwrap().verify(&value).is_none());
    }

    #[test]
    fn empty_key_is_refused() {
        assert!(CookieSigner::new(b"").is_err());
    }

    #[test]
    fn reads_cookie_among_others() {
        let signer = CookieSigner::new(b"k").unwrap();
        let id = SessionId::new_uuid();
        let header = format!("theme=dark; {SESSION_COOKIE}={}; lang=en", signer.sign(&id));
        assert_eq!(signer.session_from_cookie_header(&header), Some(id));
        assert!(signer.session_from_cookie_header("theme=dark").is_none());
    }

    #[test]
    fn set_cookie_carries_attributes() {
        let signer = CookieSigner::new(b"k").unwrap();
        let header = signer.set_cookie(&SessionId::from_string("s1"), 3600);
        assert!(header.starts_with("cottage_session=s1."));
        assert!(header.contains("HttpOnly"));
        assert!(header.ends_with("Max-Age=3600"));
    }
}
