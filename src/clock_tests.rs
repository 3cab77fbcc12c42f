/// Tests for the frame timing clock

use super::*;

// ============================================================================
// Tests: Frame Counting
// ============================================================================

#[test]
fn test_frame_count_starts_at_zero() {
    let c = Clock::new();
    assert_eq!(c.frame_count(), 0);
}

#[test]
fn test_tick_increments_frame_count() {
    let c = Clock::new();
    c.tick();
    c.tick();
    c.tick();
    assert_eq!(c.frame_count(), 3);
}

// ============================================================================
// Tests: Delta and Frame Rate
// ============================================================================

#[test]
fn test_frame_rate_zero_before_ticks() {
    let c = Clock::new();
    assert_eq!(c.frame_rate(), 0.0);
    assert_eq!(c.delta(), Duration::ZERO);
}

#[test]
fn test_delta_positive_after_two_ticks() {
    let c = Clock::new();
    c.tick();
    thread::sleep(Duration::from_millis(5));
    c.tick();
    assert!(c.delta() >= Duration::from_millis(5));
    assert!(c.frame_rate() > 0.0);
}

#[test]
fn test_frame_rate_zero_after_stall() {
    let c = Clock::new();
    c.set_max_frame_rate(200.0);
    for _ in 0..20 {
        c.tick();
    }
    assert!(c.frame_rate() > 0.0);

    // Stall long past the recent frame time.
    thread::sleep(Duration::from_millis(400));
    assert_eq!(c.frame_rate(), 0.0);
}

// ============================================================================
// Tests: Frame Rate Cap and Average
// ============================================================================

#[test]
fn test_max_frame_rate_limits_average() {
    let c = Clock::new();
    c.set_max_frame_rate(200.0);
    c.set_avg_samples(10);
    for _ in 0..=10 {
        c.tick();
    }
    let avg = c.avg_frame_rate();
    // Sleep granularity makes the cap approximate; it must at least
    // keep the average in the right ballpark.
    assert!(avg > 50.0, "avg {}", avg);
    assert!(avg <= 220.0, "avg {}", avg);
}

#[test]
fn test_readers_do_not_block_behind_the_cap_sleep() {
    use std::sync::Arc;

    let c = Arc::new(Clock::new());
    c.set_max_frame_rate(10.0); // 100ms frame budget
    c.tick();

    let ticker = {
        let c = c.clone();
        thread::spawn(move || c.tick())
    };
    // Let the ticker enter its pacing sleep, then read through it.
    thread::sleep(Duration::from_millis(20));
    let started = Instant::now();
    let _ = c.frame_rate();
    let _ = c.frame_count();
    assert!(
        started.elapsed() < Duration::from_millis(50),
        "readers stalled behind tick()"
    );
    ticker.join().unwrap();
}

#[test]
fn test_avg_samples_accessors() {
    let c = Clock::new();
    c.set_avg_samples(30);
    assert_eq!(c.avg_samples(), 30);
    c.set_avg_samples(0);
    assert_eq!(c.avg_samples(), 1);
}

#[test]
fn test_max_frame_rate_accessors() {
    let c = Clock::new();
    assert_eq!(c.max_frame_rate(), 0.0);
    c.set_max_frame_rate(60.0);
    assert_eq!(c.max_frame_rate(), 60.0);
}
