//! Property-based invariant tests for the throttle and event coalescer.
//!
//! 1. The last offered value of a burst is always delivered once the interval
//!    has elapsed after the final offer.
//! 2. Deliveries are spaced by at least the interval.
//! 3. Coalescing a scroll burst yields exactly the final offset.

use core::time::Duration;

use folio_core::event::Event;
use folio_core::event_coalescer::EventCoalescer;
use folio_core::throttle::Throttle;
use proptest::prelude::*;

fn burst_strategy() -> impl Strategy<Value = Vec<(u64, i32)>> {
    prop::collection::vec((0u64..=40, -5000i32..=5000), 1..64)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Trailing value is never lost
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn trailing_value_delivered(interval_ms in 1u64..=200, burst in burst_strategy()) {
        let interval = Duration::from_millis(interval_ms);
        let mut throttle = Throttle::new(interval);
        let mut now = Duration::ZERO;
        let mut last_delivered = None;

        for (gap, value) in &burst {
            now += Duration::from_millis(*gap);
            if let Some(v) = throttle.poll(now) {
                last_delivered = Some(v);
            }
            if let Some(v) = throttle.offer(*value, now) {
                last_delivered = Some(v);
            }
        }

        now += interval;
        if let Some(v) = throttle.poll(now) {
            last_delivered = Some(v);
        }

        let final_value = burst.last().map(|(_, v)| *v);
        prop_assert_eq!(last_delivered, final_value);
        prop_assert!(!throttle.has_pending());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Deliveries respect the interval
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn deliveries_are_spaced(interval_ms in 1u64..=200, burst in burst_strategy()) {
        let interval = Duration::from_millis(interval_ms);
        let mut throttle = Throttle::new(interval);
        let mut now = Duration::ZERO;
        let mut fire_times: Vec<Duration> = Vec::new();

        for (gap, value) in burst {
            now += Duration::from_millis(gap);
            if throttle.poll(now).is_some() {
                fire_times.push(now);
            }
            if throttle.offer(value, now).is_some() {
                fire_times.push(now);
            }
        }

        for pair in fire_times.windows(2) {
            prop_assert!(pair[1] - pair[0] >= interval, "fired too soon: {:?}", pair);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Scroll bursts coalesce to the final offset
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn scroll_burst_coalesces_to_last(offsets in prop::collection::vec(-1.0e5f64..1.0e5, 1..128)) {
        let mut coalescer = EventCoalescer::new();
        for y in &offsets {
            let passthrough = coalescer.push(Event::Scroll { offset_y: *y });
            prop_assert!(passthrough.is_none());
        }
        let flushed = coalescer.flush();
        prop_assert_eq!(flushed.len(), 1);
        prop_assert_eq!(
            &flushed[0],
            &Event::Scroll { offset_y: *offsets.last().unwrap() }
        );
    }
}
