// 🔤 Spanish collation for animal identifiers
//
// Three-level comparison, same shape as the CLDR "es" tailoring:
//   1. Primary:   base letters (accents and case ignored), ñ sorts after n
//   2. Secondary: accents (unaccented first)
//   3. Tertiary:  case (lowercase first)
//
// Spaces < punctuation/symbols < digits < Latin letters < other scripts.
// Digits compare one at a time ("10" < "9"), there is no numeric collation.

use std::cmp::Ordering;

// ============================================================================
// WEIGHTS
// ============================================================================

const CLASS_SPACE: u32 = 0x0100_0000;
const CLASS_SYMBOL: u32 = 0x0200_0000;
const CLASS_DIGIT: u32 = 0x0300_0000;
const CLASS_LATIN: u32 = 0x0400_0000;
const CLASS_OTHER: u32 = 0x0500_0000;

// Accent order follows the root collation: a á à ă â ǎ å ä ã ȧ ą ā
const NO_ACCENT: u8 = 0;
const ACUTE: u8 = 1;
const GRAVE: u8 = 2;
const BREVE: u8 = 3;
const CIRCUMFLEX: u8 = 4;
const CARON: u8 = 5;
const RING: u8 = 6;
const DIAERESIS: u8 = 7;
const DOUBLE_ACUTE: u8 = 8;
const TILDE: u8 = 9;
const DOT_ABOVE: u8 = 10;
const CEDILLA: u8 = 11;
const OGONEK: u8 = 12;
const MACRON: u8 = 13;
const STROKE: u8 = 14;
const OTHER_MARK: u8 = 15;

const LOWER: u8 = 0;
const UPPER: u8 = 1;
const LIGATURE: u8 = 2;

/// Punctuation and symbols in root collation order. Anything not listed
/// sorts after these by code point, and currency signs come last.
const SYMBOL_ORDER: &[char] = &[
    '_', '-', ',', ';', ':', '!', '¡', '?', '¿', '.', '\'', '"', '«', '»', '(', ')', '[', ']',
    '{', '}', '§', '¶', '@', '*', '/', '\\', '&', '#', '%', '`', '^', '©', '®', '°', '+', '±',
    '<', '=', '>', '|', '~',
];

const CURRENCY_ORDER: &[char] = &['¤', '¢', '$', '£', '¥', '€'];

const UNLISTED_SYMBOL: u32 = 0x0000_1000;
const CURRENCY: u32 = 0x0020_0000;

/// Precomposed lowercase Latin letters → (base letter, accent)
const LATIN_FOLDS: &[(char, char, u8)] = &[
    ('á', 'a', ACUTE),
    ('à', 'a', GRAVE),
    ('â', 'a', CIRCUMFLEX),
    ('ă', 'a', BREVE),
    ('ä', 'a', DIAERESIS),
    ('ã', 'a', TILDE),
    ('å', 'a', RING),
    ('ą', 'a', OGONEK),
    ('ā', 'a', MACRON),
    ('ç', 'c', CEDILLA),
    ('č', 'c', CARON),
    ('ċ', 'c', DOT_ABOVE),
    ('é', 'e', ACUTE),
    ('è', 'e', GRAVE),
    ('ê', 'e', CIRCUMFLEX),
    ('ë', 'e', DIAERESIS),
    ('ē', 'e', MACRON),
    ('ě', 'e', CARON),
    ('ė', 'e', DOT_ABOVE),
    ('ę', 'e', OGONEK),
    ('í', 'i', ACUTE),
    ('ì', 'i', GRAVE),
    ('î', 'i', CIRCUMFLEX),
    ('ï', 'i', DIAERESIS),
    ('ī', 'i', MACRON),
    ('ó', 'o', ACUTE),
    ('ò', 'o', GRAVE),
    ('ô', 'o', CIRCUMFLEX),
    ('ö', 'o', DIAERESIS),
    ('õ', 'o', TILDE),
    ('ő', 'o', DOUBLE_ACUTE),
    ('ō', 'o', MACRON),
    ('ø', 'o', STROKE),
    ('ř', 'r', CARON),
    ('š', 's', CARON),
    ('ú', 'u', ACUTE),
    ('ù', 'u', GRAVE),
    ('û', 'u', CIRCUMFLEX),
    ('ü', 'u', DIAERESIS),
    ('ū', 'u', MACRON),
    ('ů', 'u', RING),
    ('ű', 'u', DOUBLE_ACUTE),
    ('ý', 'y', ACUTE),
    ('ÿ', 'y', DIAERESIS),
    ('ž', 'z', CARON),
    ('ż', 'z', DOT_ABOVE),
];

/// Combining diacritical marks → accent weight
fn combining_accent(c: char) -> Option<u8> {
    match c {
        '\u{0301}' => Some(ACUTE),
        '\u{0300}' => Some(GRAVE),
        '\u{0306}' => Some(BREVE),
        '\u{0302}' => Some(CIRCUMFLEX),
        '\u{030C}' => Some(CARON),
        '\u{030A}' => Some(RING),
        '\u{0308}' => Some(DIAERESIS),
        '\u{030B}' => Some(DOUBLE_ACUTE),
        '\u{0303}' => Some(TILDE),
        '\u{0307}' => Some(DOT_ABOVE),
        '\u{0327}' => Some(CEDILLA),
        '\u{0328}' => Some(OGONEK),
        '\u{0304}' => Some(MACRON),
        '\u{0300}'..='\u{036F}' => Some(OTHER_MARK),
        _ => None,
    }
}

fn latin_primary(base: char) -> u32 {
    // a=0, b=2, ..., n=26, ñ=27, o=28, ... z=50
    CLASS_LATIN + (base as u32 - 'a' as u32) * 2
}

fn enye_primary() -> u32 {
    latin_primary('n') + 1
}

fn symbol_primary(c: char) -> u32 {
    let listed = |table: &[char]| table.iter().position(|&s| s == c).map(|i| i as u32);

    if let Some(i) = listed(SYMBOL_ORDER) {
        CLASS_SYMBOL + i
    } else if let Some(i) = listed(CURRENCY_ORDER) {
        CLASS_SYMBOL + CURRENCY + i
    } else {
        CLASS_SYMBOL + UNLISTED_SYMBOL + c as u32
    }
}

// ============================================================================
// COLLATION KEY
// ============================================================================

/// Sort key for one string. Derived `Ord` compares the levels in order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollationKey {
    primary: Vec<u32>,
    secondary: Vec<u8>,
    tertiary: Vec<u8>,
}

impl CollationKey {
    pub fn new(s: &str) -> Self {
        let mut key = CollationKey {
            primary: Vec::with_capacity(s.len()),
            secondary: Vec::with_capacity(s.len()),
            tertiary: Vec::with_capacity(s.len()),
        };

        for c in s.chars() {
            if let Some(accent) = combining_accent(c) {
                key.attach_mark(accent);
            } else {
                key.push_char(c);
            }
        }

        key
    }

    fn push(&mut self, primary: u32, secondary: u8, tertiary: u8) {
        self.primary.push(primary);
        self.secondary.push(secondary);
        self.tertiary.push(tertiary);
    }

    fn push_char(&mut self, c: char) {
        let case = if c.is_uppercase() { UPPER } else { LOWER };
        let lower = c.to_lowercase().next().unwrap_or(c);

        match lower {
            'a'..='z' => self.push(latin_primary(lower), NO_ACCENT, case),
            'ñ' => self.push(enye_primary(), NO_ACCENT, case),
            'ß' => {
                self.push(latin_primary('s'), NO_ACCENT, LIGATURE);
                self.push(latin_primary('s'), NO_ACCENT, LIGATURE);
            }
            'æ' => {
                self.push(latin_primary('a'), NO_ACCENT, LIGATURE);
                self.push(latin_primary('e'), NO_ACCENT, LIGATURE);
            }
            'œ' => {
                self.push(latin_primary('o'), NO_ACCENT, LIGATURE);
                self.push(latin_primary('e'), NO_ACCENT, LIGATURE);
            }
            _ => {
                if let Some(&(_, base, accent)) =
                    LATIN_FOLDS.iter().find(|(folded, _, _)| *folded == lower)
                {
                    self.push(latin_primary(base), accent, case);
                } else if let Some(digit) = lower.to_digit(10) {
                    self.push(CLASS_DIGIT + digit, NO_ACCENT, LOWER);
                } else if lower.is_whitespace() {
                    self.push(CLASS_SPACE + lower as u32, NO_ACCENT, LOWER);
                } else if lower.is_alphanumeric() {
                    self.push(CLASS_OTHER + lower as u32, NO_ACCENT, case);
                } else {
                    self.push(symbol_primary(lower), NO_ACCENT, LOWER);
                }
            }
        }
    }

    /// A combining mark modifies the element before it. "n" + tilde is ñ,
    /// a letter of its own, not an accented n.
    fn attach_mark(&mut self, accent: u8) {
        let Some(last) = self.primary.len().checked_sub(1) else {
            self.push(CLASS_SYMBOL, accent, LOWER);
            return;
        };

        if accent == TILDE && self.primary[last] == latin_primary('n') {
            self.primary[last] = enye_primary();
        } else {
            self.secondary[last] = accent;
        }
    }
}

// ============================================================================
// COMPARISON
// ============================================================================

/// Locale-aware comparison of two strings. Distinct strings can compare
/// `Equal` (e.g. precomposed vs decomposed accents).
pub fn collate(a: &str, b: &str) -> Ordering {
    CollationKey::new(a).cmp(&CollationKey::new(b))
}

/// Total order over identifiers: byte-identical strings are equal, otherwise
/// collation decides and byte order breaks remaining ties.
pub fn compare_identifiers(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    collate(a, b).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut ids: Vec<&str>) -> Vec<&str> {
        ids.sort_by(|a, b| compare_identifiers(a, b));
        ids
    }

    #[test]
    fn test_case_is_only_a_tiebreak() {
        assert_eq!(sorted(vec!["b", "A", "a", "B"]), vec!["a", "A", "b", "B"]);
        assert_eq!(collate("lote", "LOTE"), Ordering::Less);
        assert_eq!(collate("Lote-2", "lote-3"), Ordering::Less);
    }

    #[test]
    fn test_accents_do_not_move_primary_order() {
        // Byte order would put "Ángel" after "Zorro"
        assert_eq!(
            sorted(vec!["Zorro", "Ángel", "Beto"]),
            vec!["Ángel", "Beto", "Zorro"]
        );
        assert_eq!(
            sorted(vec!["cerdo-é", "cerdo-e", "cerdo-f"]),
            vec!["cerdo-e", "cerdo-é", "cerdo-f"]
        );
    }

    #[test]
    fn test_accent_order() {
        let order = vec!["a", "á", "à", "ă", "â", "å", "ä", "ã", "ą", "ā"];
        let mut shuffled = order.clone();
        shuffled.reverse();
        assert_eq!(sorted(shuffled), order);
    }

    #[test]
    fn test_enye_is_its_own_letter() {
        assert_eq!(sorted(vec!["ño", "oa", "nz"]), vec!["nz", "ño", "oa"]);
        assert_eq!(collate("Ñandú", "Nube"), Ordering::Greater);
    }

    #[test]
    fn test_decomposed_matches_precomposed() {
        assert_eq!(collate("Jose\u{0301}", "José"), Ordering::Equal);
        assert_eq!(collate("n\u{0303}o", "ño"), Ordering::Equal);
        assert_eq!(collate("a\u{030A}", "å"), Ordering::Equal);
        // Still a total order for identifiers
        assert_ne!(compare_identifiers("Jose\u{0301}", "José"), Ordering::Equal);
    }

    #[test]
    fn test_digits_and_punctuation_before_letters() {
        assert_eq!(
            sorted(vec!["a1", "10", "9", "-1", " x"]),
            vec![" x", "-1", "10", "9", "a1"]
        );
    }

    #[test]
    fn test_symbol_order() {
        let order = vec![
            "_", "-", ",", ";", ":", "!", "?", ".", "'", "\"", "(", ")", "@", "*", "/", "&", "#",
            "%", "+", "<", "=", ">", "|", "~", "$",
        ];
        let mut shuffled = order.clone();
        shuffled.reverse();
        assert_eq!(sorted(shuffled), order);
    }

    #[test]
    fn test_currency_after_other_symbols() {
        assert_eq!(sorted(vec!["€", "$", "~", "¢"]), vec!["~", "¢", "$", "€"]);
        // Unlisted symbols still come before currency and digits
        assert_eq!(sorted(vec!["1", "$", "→", "~"]), vec!["~", "→", "$", "1"]);
    }

    #[test]
    fn test_mixed_identifiers() {
        assert_eq!(
            sorted(vec!["A$1", "A+1", "A#1", "A-1", "A_1", "ä", "å"]),
            vec!["å", "ä", "A_1", "A-1", "A#1", "A+1", "A$1"]
        );
        assert_eq!(
            sorted(vec!["Lote-1", "Lote_1", "Lote 1"]),
            vec!["Lote 1", "Lote_1", "Lote-1"]
        );
    }

    #[test]
    fn test_identical_identifiers_are_equal() {
        assert_eq!(
            compare_identifiers("Lote-12 / 045", "Lote-12 / 045"),
            Ordering::Equal
        );
    }
}
