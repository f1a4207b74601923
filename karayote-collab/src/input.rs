/// Reads a song position typed by a user. Anything that isn't a whole,
/// non-negative number is rejected.
pub fn parse_position(input: &str) -> Option<usize> {
    input.trim().trim_start_matches('#').parse().ok()
}
