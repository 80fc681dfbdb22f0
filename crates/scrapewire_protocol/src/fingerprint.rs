//! Change-detection fingerprints for rendered jobs.
//!
//! Consumers re-render their config on every relation event; comparing
//! fingerprints of the rendered fragments is how they decide whether the
//! target file actually changed.

use blake3::Hasher;

const SEP: u8 = 0x1f;

/// Stable hex fingerprint of a rendered job fragment.
pub fn render_fingerprint(rendered: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(rendered.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Fingerprint of a whole rendered job set, order-independent.
///
/// Fragments are sorted before hashing so the result does not depend on the
/// order jobs were read out of the databag.
pub fn set_fingerprint<S: AsRef<str>>(fragments: &[S]) -> String {
    let mut sorted: Vec<&str> = fragments.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();

    let mut hasher = Hasher::new();
    for fragment in sorted {
        hasher.update(fragment.as_bytes());
        hasher.update(&[SEP]);
    }
    hasher.finalize().to_hex().to_string()
}
