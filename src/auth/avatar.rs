use md5::{Digest, Md5};

const GRAVATAR_BASE: &str = "//www.gravatar.com/avatar";

/// Query options appended to the avatar URL.
#[derive(Debug, Clone, Copy)]
pub struct AvatarOptions {
    pub size: u16,
    pub rating: &'static str,
    pub default: &'static str,
}

impl Default for AvatarOptions {
    fn default() -> Self {
        Self {
            size: 200,
            rating: "pg",
            default: "mm",
        }
    }
}

/// Gravatar URL for an email. The address is trimmed and lowercased before
/// hashing, as Gravatar expects. MD5 keeps URLs identical to the ones the
/// `gravatar` JS package produced for existing accounts.
pub fn gravatar_url(email: &str, opts: AvatarOptions) -> String {
    let normalized = email.trim().to_lowercase();
    let digest = hex::encode(Md5::digest(normalized.as_bytes()));
    format!(
        "{}/{}?s={}&r={}&d={}",
        GRAVATAR_BASE, digest, opts.size, opts.rating, opts.default
    )
}
