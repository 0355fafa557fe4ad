//! Name line measuring and encoding for the built-in Helvetica-Bold face.
//!
//! Widths come from the standard Type 1 font metrics, in thousandths of the
//! font size. Text is written with WinAnsiEncoding; characters outside it
//! are replaced by `?`.

use super::types::FontSizing;

/// PDF base font used for every text line.
pub const FONT_NAME: &str = "Helvetica-Bold";

const REPLACEMENT: u8 = b'?';

/// Upper bound on candidate sizes tried by [`fit_font_size`].
pub const MAX_FIT_STEPS: usize = 10_000;

/// Widths for codes 32..=126.
const ASCII_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0..?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P.._
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `..o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p..~
];

/// Widths for codes 0xA0..=0xFF.
const LATIN1_WIDTHS: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333, // A0
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611, // B0
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // C0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // D0
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278, // E0
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556, // F0
];

/// WinAnsi code for `c`, if the encoding has one.
fn win_ansi_code(c: char) -> Option<u8> {
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) || (0xA0..=0xFF).contains(&code) {
        return Some(code as u8);
    }
    match c {
        '€' => Some(0x80),
        '…' => Some(0x85),
        'Š' => Some(0x8A),
        'Œ' => Some(0x8C),
        'Ž' => Some(0x8E),
        '‘' => Some(0x91),
        '’' => Some(0x92),
        '“' => Some(0x93),
        '”' => Some(0x94),
        '–' => Some(0x96),
        '—' => Some(0x97),
        'š' => Some(0x9A),
        'œ' => Some(0x9C),
        'ž' => Some(0x9E),
        'Ÿ' => Some(0x9F),
        _ => None,
    }
}

fn code_width(code: u8) -> u16 {
    match code {
        0x20..=0x7E => ASCII_WIDTHS[(code - 0x20) as usize],
        0xA0..=0xFF => LATIN1_WIDTHS[(code - 0xA0) as usize],
        0x80 | 0x9A => 556,
        0x85 | 0x8C | 0x97 => 1000,
        0x8A | 0x9F => 667,
        0x8E => 611,
        0x91 | 0x92 => 278,
        0x93 | 0x94 => 500,
        0x96 => 556,
        0x9C => 944,
        0x9E => 500,
        _ => ASCII_WIDTHS[(REPLACEMENT - 0x20) as usize],
    }
}

/// Encodes `text` as WinAnsi bytes for a PDF string operand.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| win_ansi_code(c).unwrap_or(REPLACEMENT))
        .collect()
}

/// Rendered width of `text` at `font_size`, in page units.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = encode_win_ansi(text)
        .into_iter()
        .map(|code| code_width(code) as u32)
        .sum();
    units as f32 * font_size / 1000.0
}

/// Largest size from `max_size` downwards, in `step` decrements, at which
/// `text` fits `max_width`. Never returns less than `min_size`: text that
/// does not fit even then overflows at the minimum size.
///
/// Candidate sizes are computed from the step index, so a step too small to
/// change the size still ends after at most [`MAX_FIT_STEPS`] candidates.
pub fn fit_font_size(text: &str, sizing: &FontSizing) -> f32 {
    let FontSizing {
        max_width,
        max_size,
        min_size,
        step,
    } = *sizing;

    let steps = ((max_size - min_size) / step).ceil();
    let steps = if steps.is_finite() && steps > 0.0 {
        (steps as usize).min(MAX_FIT_STEPS)
    } else {
        0
    };

    for i in 0..=steps {
        let size = if i == 0 { max_size } else { max_size - i as f32 * step };
        if size <= min_size {
            break;
        }
        if text_width(text, size) <= max_width {
            return size;
        }
    }
    min_size
}
