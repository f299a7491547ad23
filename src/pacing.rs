//! Human-like pacing: jittered pauses and key-by-key typing.

use anyhow::Result;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

use crate::browser::BrowserSession;

/// `base` plus a uniformly random extra in `[0, jitter]`.
pub fn jittered(base: Duration, jitter: Duration) -> Duration {
    if jitter.is_zero() {
        return base;
    }
    let extra_ms = rand::thread_rng().gen_range(0..=jitter.as_millis() as u64);
    base + Duration::from_millis(extra_ms)
}

/// Sleep for `base` plus a random jitter so requests don't follow a fixed cadence.
pub async fn wait_with_jitter(base: Duration, jitter: Duration) {
    sleep(jittered(base, jitter)).await;
}

/// Send `text` one character at a time with a jittered pause after each key.
pub async fn type_like_human<S: BrowserSession>(
    session: &mut S,
    element: &S::Element,
    text: &str,
    delay: Duration,
    jitter: Duration,
) -> Result<()> {
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        session.send_keys(element, ch.encode_utf8(&mut buf)).await?;
        wait_with_jitter(delay, jitter).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_within_bounds() {
        let base = Duration::from_millis(200);
        let jitter = Duration::from_millis(200);
        for _ in 0..200 {
            let d = jittered(base, jitter);
            assert!(d >= base && d <= base + jitter, "{d:?}");
        }
    }

    #[test]
    fn zero_jitter_is_exact() {
        assert_eq!(
            jittered(Duration::from_secs(4), Duration::ZERO),
            Duration::from_secs(4)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn wait_advances_the_clock_by_at_least_base() {
        let start = tokio::time::Instant::now();
        wait_with_jitter(Duration::from_secs(4), Duration::from_secs(1)).await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(4) && elapsed <= Duration::from_secs(5));
    }
}
