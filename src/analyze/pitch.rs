//! Character-to-pitch mapping.

/// The lookup alphabet. The leading placeholder slot shifts every letter up
/// one position, so 'a' maps to 59, not 58. This offset is load-bearing for
/// the sound of the piece and must not be "fixed".
const PITCH_ALPHABET: &str = "_abcdefghijklmnopqrstuvwxyz";

const PITCH_OFFSET: u32 = 58;

/// Map a character to its pitch.
///
/// Letters land on a compact band above the offset, case-insensitively.
/// Other printable characters sound at their own code point. Whitespace has
/// no pitch: the note still occupies a playback slot, but nothing is played
/// for it.
pub fn pitch_for(ch: char) -> Option<u32> {
    if ch.is_ascii_alphabetic() {
        PITCH_ALPHABET
            .find(ch.to_ascii_lowercase())
            .map(|index| index as u32 + PITCH_OFFSET)
    } else if !ch.is_whitespace() {
        Some(ch as u32)
    } else {
        None
    }
}
