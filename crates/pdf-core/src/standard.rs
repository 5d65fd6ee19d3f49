//! Standard 14 fonts with WinAnsi encoding
//!
//! Text is written with the non-embedded base fonts every PDF viewer ships,
//! so filled documents stay small and need no font files at runtime.

/// Base fonts available for text insertion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StandardFont {
    #[default]
    Helvetica,
    HelveticaBold,
}

/// Helvetica advance widths for WinAnsi 0x20..=0x7E (1/1000 em)
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70
];

/// Helvetica-Bold advance widths for WinAnsi 0x20..=0x7E (1/1000 em)
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0x30
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 0x50
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 0x60
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 0x70
];

/// Width used for glyphs outside the tables
const DEFAULT_WIDTH: u16 = 556;

impl StandardFont {
    /// PostScript name written to the font dictionary
    pub fn base_font(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            StandardFont::Helvetica => &HELVETICA_WIDTHS,
            StandardFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    /// Advance width of a single character in 1/1000 em
    pub fn char_width(self, c: char) -> u16 {
        let c = latin1_base_letter(c).unwrap_or(c);
        match c as u32 {
            code @ 0x20..=0x7E => self.widths()[(code - 0x20) as usize],
            _ => DEFAULT_WIDTH,
        }
    }

    /// Width of `text` in points at `font_size`
    pub fn text_width_points(self, text: &str, font_size: f32) -> f64 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f64 * font_size as f64 / 1000.0
    }
}

/// Accented Latin-1 letters share the advance width of their base letter
fn latin1_base_letter(c: char) -> Option<char> {
    let base = match c {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => return None,
    };
    Some(base)
}

/// Encode a character into its WinAnsi byte
///
/// Returns `None` when the character has no WinAnsi code point.
pub fn win_ansi_byte(c: char) -> Option<u8> {
    match c {
        ' '..='~' => Some(c as u8),
        '\u{00A0}'..='\u{00FF}' => Some(c as u32 as u8),
        '€' => Some(0x80),
        '‚' => Some(0x82),
        '„' => Some(0x84),
        '…' => Some(0x85),
        '‘' => Some(0x91),
        '’' => Some(0x92),
        '“' => Some(0x93),
        '”' => Some(0x94),
        '•' => Some(0x95),
        '–' => Some(0x96),
        '—' => Some(0x97),
        'Œ' => Some(0x8C),
        'œ' => Some(0x9C),
        'Ÿ' => Some(0x9F),
        _ => None,
    }
}

/// Encode text as a PDF literal string (including the parentheses)
///
/// Characters outside WinAnsi are replaced by `?`. Delimiters and
/// non-ASCII bytes are escaped so the content stream stays 7-bit clean.
pub fn encode_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for c in text.chars() {
        let byte = win_ansi_byte(c).unwrap_or(b'?');
        match byte {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(byte as char);
            }
            0x20..=0x7E => out.push(byte as char),
            _ => out.push_str(&format!("\\{byte:03o}")),
        }
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_font_names() {
        assert_eq!(StandardFont::Helvetica.base_font(), "Helvetica");
        assert_eq!(StandardFont::HelveticaBold.base_font(), "Helvetica-Bold");
    }

    #[test]
    fn test_char_widths() {
        assert_eq!(StandardFont::Helvetica.char_width(' '), 278);
        assert_eq!(StandardFont::Helvetica.char_width('W'), 944);
        assert_eq!(StandardFont::HelveticaBold.char_width('b'), 611);
        // accented letter uses base letter width
        assert_eq!(
            StandardFont::Helvetica.char_width('é'),
            StandardFont::Helvetica.char_width('e')
        );
    }

    #[test]
    fn test_text_width_points() {
        // "ii" = 2 * 222 units at 10pt
        let width = StandardFont::Helvetica.text_width_points("ii", 10.0);
        assert!((width - 4.44).abs() < 1e-9);
    }

    #[test]
    fn test_encode_literal_plain() {
        assert_eq!(encode_literal("E Mail 2: -"), "(E Mail 2: -)");
    }

    #[test]
    fn test_encode_literal_escapes() {
        assert_eq!(encode_literal("a(b)c\\"), "(a\\(b\\)c\\\\)");
        assert_eq!(encode_literal("é"), "(\\351)");
        assert_eq!(encode_literal("€"), "(\\200)");
        assert_eq!(encode_literal("日"), "(?)");
    }
}
