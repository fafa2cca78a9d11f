use super::bar::STRING_COUNT;
use super::duration::Duration;

pub const NOTES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Standard guitar tuning by string index (top staff line first)
pub const STANDARD_E: [u8; STRING_COUNT] = [76, 71, 67, 62, 57, 52];

/// `76` → `"E4"`
pub fn midi_to_note_name(note: u8) -> String {
    let n = note.saturating_sub(24) as usize;
    format!("{}{}", NOTES[n % NOTES.len()], n / NOTES.len())
}

/// Inverse of [`midi_to_note_name`]; case-insensitive on the letter.
pub fn parse_note_name(name: &str) -> Option<u8> {
    let split = name.find(|c: char| c.is_ascii_digit())?;
    let (pitch, octave) = name.split_at(split);
    let octave: u32 = octave.parse().ok()?;
    let mut pitch = pitch.to_string();
    if let Some(first) = pitch.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    let idx = NOTES.iter().position(|n| *n == pitch)? as u32;
    u8::try_from(24 + octave * 12 + idx).ok()
}

/// Human-readable tuning, lowest string first
pub fn tuning_str(tuning: &[u8; STRING_COUNT]) -> String {
    if *tuning == STANDARD_E {
        return "Standard E".to_string();
    }
    tuning
        .iter()
        .rev()
        .map(|&n| midi_to_note_name(n))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse six note names, lowest string first, into string-index order.
/// `standard` gives [`STANDARD_E`].
pub fn parse_tuning(args: &[&str]) -> Option<[u8; STRING_COUNT]> {
    if let [word] = args
        && word.eq_ignore_ascii_case("standard")
    {
        return Some(STANDARD_E);
    }
    if args.len() != STRING_COUNT {
        return None;
    }
    let mut tuning = [0u8; STRING_COUNT];
    for (slot, name) in tuning.iter_mut().rev().zip(args) {
        *slot = parse_note_name(name)?;
    }
    Some(tuning)
}

fn length_name(d: Duration) -> Option<&'static str> {
    match (d.numer(), d.denom()) {
        (1, 1) => Some("W"),
        (1, 2) => Some("H"),
        (1, 4) => Some("Q"),
        (1, 8) => Some("E"),
        (1, 16) => Some("S"),
        _ => None,
    }
}

/// Short name of a note length: `Q`, dotted `Q.`, triplet `E3`, else `n/d`
pub fn len_str(length: Duration) -> String {
    if let Some(name) = length_name(length) {
        return name.to_string();
    }
    if let Some(name) = length_name(length.scaled(2, 3)) {
        return format!("{name}.");
    }
    if let Some(name) = length_name(length.scaled(3, 2)) {
        return format!("{name}3");
    }
    length.to_string()
}
