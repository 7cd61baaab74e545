/// Serde default for counters that start at one (rooms, participants).
pub fn default_one() -> i64 {
    1
}
