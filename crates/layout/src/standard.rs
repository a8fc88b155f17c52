//! PDF base-14 fallback fonts: WinAnsi encoding and AFM advance widths.

/// The two standard fonts used when no TrueType face is available for a
/// family. Sans families fall back to Helvetica, serif ones to Times-Roman.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    TimesRoman,
}

// Advance widths for ASCII 0x20..=0x7E in 1/1000 em, from the Adobe AFM files.
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

const TIMES_ASCII: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, // ' '../
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444, // 0..?
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, // @..O
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500, // P.._
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, // `..o
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541, // p..~
];

impl StandardFont {
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::TimesRoman => "Times-Roman",
        }
    }

    /// Ascender in 1/1000 em.
    pub fn ascent(&self) -> f32 {
        match self {
            StandardFont::Helvetica => 718.0,
            StandardFont::TimesRoman => 683.0,
        }
    }

    /// Descender depth in 1/1000 em, as a positive number.
    pub fn descent(&self) -> f32 {
        match self {
            StandardFont::Helvetica => 207.0,
            StandardFont::TimesRoman => 217.0,
        }
    }

    /// Advance width of a WinAnsi code in 1/1000 em. Codes outside ASCII
    /// use the font's average lowercase width.
    pub fn width(&self, code: u8) -> u16 {
        let table = match self {
            StandardFont::Helvetica => &HELVETICA_ASCII,
            StandardFont::TimesRoman => &TIMES_ASCII,
        };
        match code {
            0x20..=0x7E => table[(code - 0x20) as usize],
            _ => match self {
                StandardFont::Helvetica => 556,
                StandardFont::TimesRoman => 500,
            },
        }
    }

    pub fn text_width(&self, codes: &[u8], font_size: f32) -> f32 {
        let units: u32 = codes.iter().map(|&c| u32::from(self.width(c))).sum();
        units as f32 * font_size / 1000.0
    }
}

/// Maps a character to its WinAnsi (Windows-1252) code.
pub fn winansi_encode(ch: char) -> Option<u8> {
    let code = match ch as u32 {
        0x0020..=0x007E => ch as u8,
        0x00A0..=0x00FF => ch as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => return None,
    };
    Some(code)
}
