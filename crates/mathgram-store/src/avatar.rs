/// Avatar size used in the feed, in pixels.
pub const DEFAULT_AVATAR_SIZE: u32 = 40;

/// Gravatar URL for `email`, falling back to a generated identicon.
///
/// The hash is taken over the lower-cased address, so the same person gets the same avatar
/// however they typed their email.
pub fn avatar_url(email: &str, size: u32) -> String {
    let digest = md5::compute(email.to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{digest:x}?s={size}&d=identicon")
}
