use std::time::Duration;

/// Execute `op` up to `retries + 1` times, sleeping `delay` between attempts.
///
/// Every failed attempt is reported to `on_failure` with the 1-based attempt
/// number. When the final attempt fails the error is swallowed and `None` is
/// returned; callers treat the missing value as "the native call did not
/// produce an answer this time" rather than an error to propagate.
pub fn retry<T, E, F>(
    mut op: F,
    retries: u32,
    delay: Duration,
    mut on_failure: impl FnMut(u32, &E),
) -> Option<T>
where
    F: FnMut() -> Result<T, E>,
{
    let attempts = retries.saturating_add(1);
    for attempt in 1..=attempts {
        match op() {
            Ok(value) => return Some(value),
            Err(e) => {
                on_failure(attempt, &e);
                if attempt < attempts && !delay.is_zero() {
                    std::thread::sleep(delay);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_returns_first_success() {
        let mut calls = 0;
        let result = retry(
            || {
                calls += 1;
                Ok::<_, String>(42)
            },
            3,
            Duration::ZERO,
            |_, _| {},
        );
        assert_eq!(result, Some(42));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_retry_succeeds_after_failures() {
        let mut calls = 0;
        let result = retry(
            || {
                calls += 1;
                if calls < 3 {
                    Err("transient".to_string())
                } else {
                    Ok(calls)
                }
            },
            3,
            Duration::ZERO,
            |_, _| {},
        );
        assert_eq!(result, Some(3));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_retry_exhaustion_returns_none() {
        let mut calls = 0;
        let result: Option<i32> = retry(
            || {
                calls += 1;
                Err::<i32, _>("broken")
            },
            2,
            Duration::ZERO,
            |_, _| {},
        );
        assert_eq!(result, None);
        // 2 retries means 3 attempts total
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_retry_reports_every_failed_attempt() {
        let mut reported = Vec::new();
        let _: Option<i32> = retry(
            || Err::<i32, _>("nope".to_string()),
            2,
            Duration::ZERO,
            |attempt, e: &String| reported.push((attempt, e.clone())),
        );
        assert_eq!(
            reported,
            vec![
                (1, "nope".to_string()),
                (2, "nope".to_string()),
                (3, "nope".to_string())
            ]
        );
    }

    #[test]
    fn test_retry_zero_retries_is_single_attempt() {
        let mut calls = 0;
        let result: Option<i32> = retry(
            || {
                calls += 1;
                Err::<i32, _>("no")
            },
            0,
            Duration::ZERO,
            |_, _| {},
        );
        assert_eq!(result, None);
        assert_eq!(calls, 1);
    }
}
