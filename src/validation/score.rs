/// Marker the score is read after.
pub const RATING_MARKER: &str = "Rating:";
/// Score used when the model's reply has no readable rating.
pub const DEFAULT_SCORE: u8 = 3;

/// Read a 1-5 score out of a free-form validation report.
///
/// Takes the text after the last `Rating:` (the whole reply if the marker
/// is absent), parses its first whitespace-separated token as an integer
/// and clamps it to `1..=5`. Anything unparsable yields [`DEFAULT_SCORE`].
pub fn extract_score(response: &str) -> u8 {
    let tail = response.rsplit(RATING_MARKER).next().unwrap_or(response);
    tail.split_whitespace()
        .next()
        .and_then(|token| token.parse::<i64>().ok())
        .map(|score| score.clamp(1, 5) as u8)
        .unwrap_or(DEFAULT_SCORE)
}
