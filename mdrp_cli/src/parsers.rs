use jiff::{SignedDuration, Span, SpanRelativeTo};

/// Accepts `30s`, `5m`, `PT1H30M`, or a plain number of seconds.
pub fn parse_duration(input: &str) -> Result<SignedDuration, String> {
    if let Ok(duration) = input.parse::<SignedDuration>() {
        return Ok(duration);
    }

    if let Ok(duration) = input
        .parse::<Span>()
        .and_then(|span| span.to_duration(SpanRelativeTo::days_are_24_hours()))
    {
        return Ok(duration);
    }

    input
        .parse::<u64>()
        .map(|seconds| SignedDuration::from_secs(seconds as i64))
        .map_err(|_| format!("Invalid duration '{input}'"))
}
