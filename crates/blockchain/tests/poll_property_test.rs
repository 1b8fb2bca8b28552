// Property tests for the confirmation polling schedule

use blockchain::PollConfig;
use proptest::prelude::*;
use std::time::Duration;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Delays never shrink between attempts and never exceed the cap.
    #[test]
    fn prop_delays_monotonic_and_capped(
        interval_ms in 1u64..=1_000,
        max_interval_ms in 1u64..=5_000,
        multiplier in 1.0f64..=3.0,
        attempts in 1u32..=20,
    ) {
        let config = PollConfig {
            interval: Duration::from_millis(interval_ms),
            max_interval: Duration::from_millis(max_interval_ms),
            backoff_multiplier: multiplier,
            timeout: Duration::from_secs(60),
        };

        let mut previous = Duration::ZERO;
        for attempt in 0..attempts {
            let delay = config.delay_for(attempt);
            prop_assert!(delay <= config.max_interval);
            prop_assert!(delay >= previous);
            previous = delay;
        }
    }

    /// The first delay is the configured interval unless the cap is lower.
    #[test]
    fn prop_first_delay_is_interval(interval_ms in 1u64..=1_000) {
        let config = PollConfig::new(Duration::from_millis(interval_ms), Duration::from_secs(5));
        prop_assert_eq!(
            config.delay_for(0),
            Duration::from_millis(interval_ms).min(config.max_interval)
        );
    }
}
