//! Diacritic folding for accent-insensitive comparisons

/// Combining diacritical marks block (decomposed accents)
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036F}';

/// Replace accented Latin letters by their base letter
///
/// Handles both precomposed letters (`é`) and decomposed sequences
/// (`e` + U+0301). Ligatures expand to two letters.
///
/// # Examples
/// ```
/// use fr_text::fold_diacritics;
/// assert_eq!(fold_diacritics("Société"), "Societe");
/// assert_eq!(fold_diacritics("Échéance"), "Echeance");
/// ```
pub fn fold_diacritics(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if COMBINING_MARKS.contains(&c) {
            continue;
        }
        match fold_char(c) {
            Folded::Same => out.push(c),
            Folded::One(base) => out.push(base),
            Folded::Two(a, b) => {
                out.push(a);
                out.push(b);
            }
        }
    }
    out
}

/// Fold diacritics, lowercase, and trim surrounding whitespace
pub fn fold_key(text: &str) -> String {
    fold_diacritics(text.trim()).to_lowercase()
}

/// Case-insensitive equality
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Case- and accent-insensitive equality
pub fn eq_folded(a: &str, b: &str) -> bool {
    fold_key(a) == fold_key(b)
}

enum Folded {
    Same,
    One(char),
    Two(char, char),
}

fn fold_char(c: char) -> Folded {
    let base = match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => 'A',
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'Ç' | 'Ć' | 'Ĉ' | 'Ċ' | 'Č' => 'C',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'Ď' | 'Đ' => 'D',
        'ď' | 'đ' => 'd',
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ĕ' | 'Ė' | 'Ę' | 'Ě' => 'E',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'Ĝ' | 'Ğ' | 'Ġ' | 'Ģ' => 'G',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ĩ' | 'Ī' | 'Ĭ' | 'Į' | 'İ' => 'I',
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'Ł' | 'Ĺ' | 'Ļ' | 'Ľ' => 'L',
        'ł' | 'ĺ' | 'ļ' | 'ľ' => 'l',
        'Ñ' | 'Ń' | 'Ņ' | 'Ň' => 'N',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' | 'Ŏ' | 'Ő' => 'O',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'Ŕ' | 'Ŗ' | 'Ř' => 'R',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'Ś' | 'Ŝ' | 'Ş' | 'Š' => 'S',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'Ţ' | 'Ť' => 'T',
        'ţ' | 'ť' => 't',
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ũ' | 'Ū' | 'Ŭ' | 'Ů' | 'Ű' | 'Ų' => 'U',
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'Ý' | 'Ÿ' | 'Ŷ' => 'Y',
        'ý' | 'ÿ' | 'ŷ' => 'y',
        'Ź' | 'Ż' | 'Ž' => 'Z',
        'ź' | 'ż' | 'ž' => 'z',
        'Œ' => return Folded::Two('O', 'E'),
        'œ' => return Folded::Two('o', 'e'),
        'Æ' => return Folded::Two('A', 'E'),
        'æ' => return Folded::Two('a', 'e'),
        'ß' => return Folded::Two('s', 's'),
        _ => return Folded::Same,
    };
    Folded::One(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_precomposed() {
        assert_eq!(fold_diacritics("Société"), "Societe");
        assert_eq!(fold_diacritics("DATE ÉCHÉANCE"), "DATE ECHEANCE");
        assert_eq!(fold_diacritics("garçon naïf"), "garcon naif");
    }

    #[test]
    fn test_fold_decomposed() {
        // "e" followed by combining acute accent
        assert_eq!(fold_diacritics("Socie\u{0301}te\u{0301}"), "Societe");
    }

    #[test]
    fn test_fold_ligatures() {
        assert_eq!(fold_diacritics("Œuvre cœur"), "OEuvre coeur");
    }

    #[test]
    fn test_fold_untouched() {
        assert_eq!(fold_diacritics("E Mail 2"), "E Mail 2");
        assert_eq!(fold_diacritics(""), "");
    }

    #[test]
    fn test_fold_key() {
        assert_eq!(fold_key("  Société "), "societe");
    }

    #[test]
    fn test_eq_helpers() {
        assert!(eq_ignore_case("SOCIETE", "societe"));
        assert!(!eq_ignore_case("SOCIETE", "société"));
        assert!(eq_folded("SOCIETE", "Société"));
        assert!(!eq_folded("VILLE", "Villes"));
    }
}
