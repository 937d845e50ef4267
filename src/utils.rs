//! Shared utility helpers.

/// Truncate a string to `max` bytes (on a char boundary), appending `…`
/// if trimmed.
pub fn truncate_str(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) && end > 0 {
            end -= 1;
        }
        format!("{}…", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_strings_untouched() {
        assert_eq!(truncate_str("hello", 50), "hello");
    }

    #[test]
    fn long_strings_cut_on_char_boundary() {
        assert_eq!(truncate_str("abcdef", 3), "abc…");
        // 'é' is two bytes; cutting at 2 would split it.
        assert_eq!(truncate_str("aéb", 2), "a…");
    }
}
