use super::*;
use crate::time::SimulatedTimeSource;
use chrono::{DateTime, TimeZone};
use chrono_tz::America::Los_Angeles;
use chrono_tz::Europe::Berlin;
use rust_decimal_macros::dec;

fn san_jose() -> Location {
    Location::new(dec!(37.35), dec!(-121.95)).unwrap()
}

fn la(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Los_Angeles
        .with_ymd_and_hms(y, m, d, h, min, s)
        .unwrap()
        .with_timezone(&Utc)
}

fn emitter_at(clock: SimulatedTimeSource) -> SolarEventEmitter {
    SolarEventEmitter::new(san_jose(), Los_Angeles, Arc::new(clock))
}

/// Test that a new emitter is idle and uses civil twilight by default
#[test]
fn test_new_emitter_defaults() {
    let emitter = emitter_at(SimulatedTimeSource::starting_at(la(2024, 1, 23, 12, 0, 0)));
    assert_eq!(emitter.state(), SchedulerState::Idle);
    assert_eq!(emitter.minimum_sunlight(), SunlightLevel::CivilTwilight);
    assert_eq!(emitter.zone(), Los_Angeles);
    assert_eq!(emitter.location(), &san_jose());
}

/// Test the current level and activity queries against the injected clock
#[test]
fn test_current_sunlight_follows_clock() {
    let noon = emitter_at(SimulatedTimeSource::starting_at(la(2024, 1, 23, 12, 0, 0)));
    assert_eq!(noon.current_sunlight().unwrap(), SunlightLevel::Daylight);
    assert!(noon.should_be_active_now().unwrap());

    let before_dawn = emitter_at(SimulatedTimeSource::starting_at(la(2024, 1, 23, 6, 0, 0)));
    assert_eq!(
        before_dawn.current_sunlight().unwrap(),
        SunlightLevel::AstronomicalTwilight
    );
    assert!(!before_dawn.should_be_active_now().unwrap());

    let night_minimum = emitter_at(SimulatedTimeSource::starting_at(la(2024, 1, 23, 6, 0, 0)))
        .with_minimum_sunlight(SunlightLevel::AstronomicalTwilight);
    assert!(night_minimum.should_be_active_now().unwrap());
}

/// Test that a dropped receiver stops the loop at the first send
#[test]
fn test_run_stops_when_receiver_dropped() {
    let emitter = emitter_at(SimulatedTimeSource::starting_at(la(2024, 1, 23, 12, 0, 0)));
    let (tx, rx) = channel();
    drop(rx);

    let outcome = emitter.run(&tx, &CancellationToken::new()).unwrap();

    assert_eq!(outcome, RunOutcome::ReceiverDropped);
    assert_eq!(emitter.state(), SchedulerState::Cancelled);
}

/// Test that a cancelled token stops the loop before anything is published
#[test]
fn test_run_with_cancelled_token() {
    let emitter = emitter_at(SimulatedTimeSource::starting_at(la(2024, 1, 23, 12, 0, 0)));
    let (tx, rx) = channel();
    let token = CancellationToken::new();
    token.cancel();

    assert_eq!(emitter.run(&tx, &token).unwrap(), RunOutcome::Cancelled);
    assert!(rx.try_recv().is_err());
    assert_eq!(emitter.state(), SchedulerState::Cancelled);
}

/// Test that a clock ending before the change suppresses the emission
#[test]
fn test_clock_end_before_change_emits_nothing() {
    let clock = SimulatedTimeSource::between(la(2024, 1, 23, 17, 50, 0), la(2024, 1, 23, 17, 50, 30));
    let emitter = emitter_at(clock);
    let (tx, rx) = channel();

    let outcome = emitter.run(&tx, &CancellationToken::new()).unwrap();
    drop(tx);
    let events: Vec<_> = rx.iter().collect();

    assert_eq!(outcome, RunOutcome::ClockEnded);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], EmitterEvent::Waiting(_)));
}

/// Test that a polar day produces no events and ends with the clock
#[test]
fn test_polar_day_has_no_events() {
    let location = Location::new(dec!(78.92), dec!(11.93)).unwrap();
    let start = Berlin.with_ymd_and_hms(2024, 4, 17, 0, 0, 0).unwrap();
    let end = Berlin.with_ymd_and_hms(2024, 4, 17, 23, 0, 0).unwrap();
    let clock = Arc::new(SimulatedTimeSource::between(
        start.with_timezone(&Utc),
        end.with_timezone(&Utc),
    ));
    let emitter = SolarEventEmitter::new(location, Berlin, clock.clone());
    let (tx, rx) = channel();

    let outcome = emitter.run(&tx, &CancellationToken::new()).unwrap();
    drop(tx);

    assert_eq!(outcome, RunOutcome::ClockEnded);
    assert_eq!(rx.iter().count(), 0);
    // The quiet day is slept through until the next midnight
    assert_eq!(clock.recorded_sleeps(), vec![Duration::from_secs(24 * 3600)]);
}

/// Test that a minimum nothing can cross sleeps a day at a time instead of scanning ahead
#[test]
fn test_night_minimum_sleeps_until_each_day() {
    let clock = Arc::new(SimulatedTimeSource::between(
        la(2024, 1, 23, 12, 0, 0),
        la(2024, 1, 26, 12, 0, 0),
    ));
    let emitter = SolarEventEmitter::new(san_jose(), Los_Angeles, clock.clone())
        .with_minimum_sunlight(SunlightLevel::Night);
    let (tx, rx) = channel();

    let outcome = emitter.run(&tx, &CancellationToken::new()).unwrap();
    drop(tx);

    assert_eq!(outcome, RunOutcome::ClockEnded);
    assert_eq!(rx.iter().count(), 0);
    assert_eq!(
        clock.recorded_sleeps(),
        vec![
            Duration::from_secs(12 * 3600),
            Duration::from_secs(24 * 3600),
            Duration::from_secs(24 * 3600),
            Duration::from_secs(24 * 3600),
        ]
    );
    assert_eq!(clock.now(), la(2024, 1, 26, 12, 0, 0));
}

/// Test that cancelling while a quiet day is slept through stops the loop
#[test]
fn test_night_minimum_cancelled_while_waiting_for_next_day() {
    let emitter = emitter_at(SimulatedTimeSource::starting_at(la(2024, 1, 23, 12, 0, 0)))
        .with_minimum_sunlight(SunlightLevel::Night);
    let (handle, events) = emitter.spawn().unwrap();

    std::thread::sleep(Duration::from_millis(50));
    handle.cancel();

    assert_eq!(handle.join().unwrap(), RunOutcome::Cancelled);
    assert_eq!(events.iter().count(), 0);
}

/// Test that the event accessor returns the wrapped change
#[test]
fn test_event_change_accessor() {
    let emitter = emitter_at(SimulatedTimeSource::between(
        la(2024, 1, 23, 17, 50, 0),
        la(2024, 1, 23, 18, 0, 0),
    ));
    let (tx, rx) = channel();
    emitter.run(&tx, &CancellationToken::new()).unwrap();
    drop(tx);

    let events: Vec<_> = rx.iter().collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].change(), events[1].change());
    assert!(matches!(events[1], EmitterEvent::Changed(_)));
    assert_eq!(events[1].change().new_level, SunlightLevel::NauticalTwilight);
}

/// Test serialized form of an event
#[test]
fn test_event_serializes_with_tag() {
    let time = Los_Angeles.with_ymd_and_hms(2024, 1, 23, 17, 51, 0).unwrap();
    let event = EmitterEvent::Changed(SunlightChange {
        time,
        previous_level: SunlightLevel::CivilTwilight,
        new_level: SunlightLevel::NauticalTwilight,
        is_rising: false,
        solar_elevation: dec!(-6.12),
    });

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event"], "changed");
    assert_eq!(json["change"]["previous_level"], "civil-twilight");
    assert_eq!(json["change"]["new_level"], "nautical-twilight");
    assert_eq!(json["change"]["is_rising"], false);
}

#[test]
fn test_format_delay() {
    assert_eq!(format_delay(Duration::from_secs(45)), "45s");
    assert_eq!(format_delay(Duration::from_secs(60)), "1m 00s");
    assert_eq!(format_delay(Duration::from_secs(12 * 60 + 30)), "12m 30s");
    assert_eq!(format_delay(Duration::from_secs(3600 + 5 * 60)), "1h 05m");
    assert_eq!(
        format_delay(Duration::from_secs(2 * 86_400 + 3 * 3600 + 60)),
        "2d 3h 01m"
    );
}
