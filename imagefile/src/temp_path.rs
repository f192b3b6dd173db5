use std::path::PathBuf;

use rand::distributions::{Alphanumeric, DistString};

/// Returns a random, not yet existing path in the system temporary directory with the given extension.
pub fn tmp_path(prefix: &str, ext: &str) -> PathBuf {
    const LEN: usize = 16;

    let mut name = String::with_capacity(prefix.len() + LEN + ext.len());
    name.push_str(prefix);
    Alphanumeric.append_string(&mut rand::thread_rng(), &mut name, LEN);
    name.push_str(ext);
    std::env::temp_dir().join(name)
}

/// Returns `len` random lowercase alphanumeric characters. Image repository names may not contain uppercase letters.
pub fn lowercase_alphanumeric(len: usize) -> String {
    let mut out = Alphanumeric.sample_string(&mut rand::thread_rng(), len);
    out.make_ascii_lowercase();
    out
}
