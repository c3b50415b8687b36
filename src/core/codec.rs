//! Transmit framing and receive rendering.
//!
//! Both directions are stateless: framing only appends the selected
//! terminator, and decoding renders exactly the bytes of one chunk without
//! buffering partial lines or UTF-8 sequences across chunks.

use crate::domain::config::{DisplayMode, LineEndingMode};

/// UTF-8 bytes of `text` followed by the terminator of `mode`.
///
/// `LineEndingMode::None` sends the text as-is; nothing is ever added twice,
/// so text that already ends in `"\n"` gets a second one under `Lf`.
pub fn frame_for_send(text: &str, mode: LineEndingMode) -> Vec<u8> {
    let suffix = mode.suffix();
    let mut framed = Vec::with_capacity(text.len() + suffix.len());
    framed.extend_from_slice(text.as_bytes());
    framed.extend_from_slice(suffix.as_bytes());
    framed
}

/// Renders a received chunk for display.
///
/// `Text` decodes UTF-8 and substitutes U+FFFD for invalid sequences.
/// `Hex` renders `HELLO` as `48 45 4C 4C 4F`.
pub fn decode_for_display(bytes: &[u8], mode: DisplayMode) -> String {
    match mode {
        DisplayMode::Text => String::from_utf8_lossy(bytes).into_owned(),
        DisplayMode::Hex => to_spaced_hex(bytes),
    }
}

fn to_spaced_hex(bytes: &[u8]) -> String {
    let upper = hex::encode_upper(bytes);
    let mut out = String::with_capacity(bytes.len().saturating_mul(3));
    for (i, pair) in upper.as_bytes().chunks(2).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push(pair[0] as char);
        out.push(pair[1] as char);
    }
    out
}
