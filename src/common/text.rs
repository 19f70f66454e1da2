use unicode_normalization::UnicodeNormalization;

/// Canonical form for administrative names: uppercase, decomposed, ASCII-only
/// (diacritics fall out with the combining marks).
pub(crate) fn normalize_name(raw: &str) -> String {
    raw.to_uppercase().nfkd().filter(char::is_ascii).collect()
}

/// File-name-safe slug: ASCII fold, keep alphanumerics and dashes, collapse
/// whitespace/underscore runs into single dashes.
pub(crate) fn slugify(text: &str) -> String {
    let folded: String = text.nfkd().filter(char::is_ascii).collect();
    let kept: String = folded
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | ' ' | '_'))
        .collect();
    kept.to_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Left-pad with zeros to `width` characters; longer inputs pass through.
pub(crate) fn zfill(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{}{}", "0".repeat(width - len), s)
    }
}

/// First `n` characters.
pub(crate) fn first_n(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Last `n` characters (the whole string when shorter).
pub(crate) fn last_n(s: &str, n: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    chars[chars.len().saturating_sub(n)..].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_fold_to_ascii_uppercase() {
        assert_eq!(normalize_name("Cusco"), "CUSCO");
        assert_eq!(normalize_name("Cúźco"), "CUSCO");
        assert_eq!(normalize_name("Junín"), "JUNIN");
        assert_eq!(normalize_name("apurímac"), "APURIMAC");
    }

    #[test]
    fn slug_collapses_separators() {
        assert_eq!(slugify("Tmin Perú_2020  v2"), "tmin-peru-2020-v2");
        assert_eq!(slugify("raster.tif!"), "rastertif");
    }

    #[test]
    fn zfill_pads_never_truncates() {
        assert_eq!(zfill("1234", 6), "001234");
        assert_eq!(zfill("123456789", 6), "123456789");
        assert_eq!(zfill("", 2), "00");
    }

    #[test]
    fn char_windows() {
        assert_eq!(first_n("123456789", 6), "123456");
        assert_eq!(last_n("0023", 2), "23");
        assert_eq!(last_n("4", 2), "4");
    }
}
