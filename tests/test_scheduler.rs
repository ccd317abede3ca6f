use neon_aim::scheduler::*;

#[test]
fn timer_fires_once_at_its_deadline() {
    let mut t = Timer::default();
    assert!(!t.is_armed());
    assert_eq!(t.poll(1_000), None);

    t.arm_at(500);
    assert_eq!(t.due_at(), Some(500));
    assert_eq!(t.poll(499), None);
    assert!(t.is_armed());
    assert_eq!(t.poll(700), Some(500));
    assert!(!t.is_armed());
    assert_eq!(t.poll(800), None);
}

#[test]
fn cancelled_timer_never_fires() {
    let mut t = Timer::default();
    t.arm_at(10);
    t.cancel();
    assert_eq!(t.poll(u64::MAX), None);
}

#[test]
fn frame_request_must_be_renewed() {
    let mut f = FrameRequest::default();
    assert!(!f.take());
    f.request();
    assert!(f.is_pending());
    assert!(f.take());
    assert!(!f.take());

    f.request();
    f.cancel();
    assert!(!f.take());
}

#[test]
fn next_due_returns_earliest_deadline_first() {
    let mut timers = SessionTimers::default();
    timers.spawn.arm_at(300);
    timers.sweep.arm_at(100);
    timers.clock.arm_at(200);

    assert_eq!(timers.next_due(1_000), Some((Activity::Sweep, 100)));
    assert_eq!(timers.next_due(1_000), Some((Activity::Clock, 200)));
    assert_eq!(timers.next_due(1_000), Some((Activity::Spawn, 300)));
    assert_eq!(timers.next_due(1_000), None);
}

#[test]
fn next_due_breaks_ties_spawn_sweep_clock() {
    let mut timers = SessionTimers::default();
    timers.clock.arm_at(100);
    timers.sweep.arm_at(100);
    timers.spawn.arm_at(100);

    assert_eq!(timers.next_due(100).map(|(a, _)| a), Some(Activity::Spawn));
    assert_eq!(timers.next_due(100).map(|(a, _)| a), Some(Activity::Sweep));
    assert_eq!(timers.next_due(100).map(|(a, _)| a), Some(Activity::Clock));
}

#[test]
fn next_due_ignores_future_deadlines() {
    let mut timers = SessionTimers::default();
    timers.spawn.arm_at(50);
    timers.sweep.arm_at(150);
    assert_eq!(timers.next_due(100), Some((Activity::Spawn, 50)));
    assert_eq!(timers.next_due(100), None);
    assert!(timers.sweep.is_armed());
}

#[test]
fn cancel_all_clears_every_slot() {
    let mut timers = SessionTimers::default();
    timers.spawn.arm_at(1);
    timers.sweep.arm_at(2);
    timers.clock.arm_at(3);
    timers.frame.request();
    assert!(timers.any_armed());

    timers.cancel_all();
    assert!(!timers.any_armed());
    assert_eq!(timers.next_due(u64::MAX), None);
}
