/// Upper bound on slug length, applied after substitution.
pub const MAX_SLUG_LEN: usize = 140;

/// URL-safe form of `s`.
///
/// Lower-cases the input, replaces every run of characters outside
/// `[a-z0-9-]` with a single `-`, cuts the result to [`MAX_SLUG_LEN`] bytes and
/// finally trims `-` from both ends.
pub fn slugify(s: &str) -> String {
    let mut slug = String::with_capacity(s.len());
    let mut in_run = false;

    for c in s.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
            in_run = false;
        } else if !in_run {
            slug.push('-');
            in_run = true;
        }
    }

    // Only ASCII is pushed above, so any byte index is a char boundary.
    slug.truncate(MAX_SLUG_LEN);
    slug.trim_matches('-').to_string()
}
