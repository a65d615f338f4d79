// Minutes are never wrapped into hours.
pub fn format_countdown(total_seconds: u64) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

pub fn format_stopwatch(total_ms: u64) -> String {
    let minutes = total_ms / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let centis = (total_ms % 1000) / 10;
    format!("{minutes:02}:{seconds:02}.{centis:02}")
}
