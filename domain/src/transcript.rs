//! Subtitle (SRT) transcript handling.

/// Marker separating the start and end timestamps of a subtitle cue.
const TIMESTAMP_MARKER: &str = "-->";

/// Extracts the spoken text from a subtitle-formatted transcript.
///
/// Drops blank lines, cue sequence numbers (lines made only of digits, full-width included) and
/// timestamp lines containing `-->`. Every other line is trimmed and kept in its
/// original order, joined with `\n`. Plain text passes through unchanged, and
/// input with nothing left to keep yields an empty string.
pub fn parse_srt(srt_text: &str) -> String {
    srt_text
        .lines()
        .map(str::trim)
        .filter(|line| is_spoken_text(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_spoken_text(line: &str) -> bool {
    !line.is_empty() && !is_sequence_number(line) && !line.contains(TIMESTAMP_MARKER)
}

fn is_sequence_number(line: &str) -> bool {
    line.chars().all(char::is_numeric)
}
