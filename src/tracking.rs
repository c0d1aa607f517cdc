//! Timetable derived bus position. There is no GPS feed; the position
//! shown to riders is interpolated from the stop chain's arrival and
//! departure times, including routes whose running time crosses
//! midnight.

use crate::SECONDS_PER_DAY;
use crate::format_time_of_day;
use crate::route_model::Route;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BusPosition {
    NotStarted {
        departs_at: String,
    },
    AtStop {
        stop_name: String,
        stop_order: usize,
        departs_at: String,
    },
    EnRoute {
        from_stop: String,
        to_stop: String,
        progress_percent: u8,
        arrives_at: String,
    },
    Completed {
        arrived_at: String,
    },
}

/// Arrival and departure instants per stop on a monotonic clock. Times
/// that run backwards roll into the next day, so a 23:00 departure
/// arriving at 06:00 yields an arrival 7 hours later rather than 17
/// hours earlier.
fn normalized_timeline(route: &Route) -> Vec<(i64, i64)> {
    let mut timeline = Vec::with_capacity(route.stops().len());
    let mut clock: i64 = 0;

    for (index, stop) in route.stops().iter().enumerate() {
        let mut arrival = match stop.arrival_seconds {
            Some(seconds) if index > 0 => seconds as i64,
            _ => stop.departure_seconds as i64,
        };
        while arrival < clock {
            arrival += SECONDS_PER_DAY as i64;
        }
        let mut departure = stop.departure_seconds as i64;
        while departure < arrival {
            departure += SECONDS_PER_DAY as i64;
        }
        clock = departure;
        timeline.push((arrival, departure));
    }

    timeline
}

/// Where the bus is at the given time of day.
pub fn locate_bus(route: &Route, time_of_day_seconds: i32) -> BusPosition {
    let timeline = normalized_timeline(route);
    let stops = route.stops();
    let start = timeline[0].1;
    let end = timeline[timeline.len() - 1].0;

    let mut t = time_of_day_seconds.rem_euclid(SECONDS_PER_DAY) as i64;
    // A service that crosses midnight is still running in the small
    // hours even though the raw clock reads earlier than its departure.
    if t < start && t + SECONDS_PER_DAY as i64 <= end {
        t += SECONDS_PER_DAY as i64;
    }

    if t < start {
        return BusPosition::NotStarted {
            departs_at: format_time_of_day(start as i32),
        };
    }

    for index in 1..stops.len() {
        let (arrival, departure) = timeline[index];
        if t < arrival {
            let previous_departure = timeline[index - 1].1;
            let span = arrival - previous_departure;
            let progress = if span <= 0 {
                100
            } else {
                (((t - previous_departure) * 100) / span).clamp(0, 100) as u8
            };
            return BusPosition::EnRoute {
                from_stop: stops[index - 1].name.clone(),
                to_stop: stops[index].name.clone(),
                progress_percent: progress,
                arrives_at: format_time_of_day(arrival as i32),
            };
        }
        if t < departure {
            return BusPosition::AtStop {
                stop_name: stops[index].name.clone(),
                stop_order: index,
                departs_at: format_time_of_day(departure as i32),
            };
        }
    }

    BusPosition::Completed {
        arrived_at: format_time_of_day(end as i32),
    }
}
