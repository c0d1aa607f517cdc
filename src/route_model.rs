//! In-memory projection of one bus schedule: the ordered stop chain with
//! cumulative fares, plus segment resolution for booking requests.
//!
//! Rows are tolerated rather than trusted. Stops with blank names are
//! dropped, orders are re-indexed densely after sorting, and a schedule
//! whose stop list projects to nothing is reported as not found.

use crate::errors::BookingError;
use crate::models::ScheduleRow;
use crate::models::StopRow;
use crate::normalize_stop_name;
use crate::seat_layout::SeatLayout;
use diesel::prelude::*;
use diesel_async::AsyncPgConnection;
use diesel_async::RunQueryDsl;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct RouteStop {
    pub name: String,
    pub arrival_seconds: Option<i32>,
    pub departure_seconds: i32,
    pub fare_from_origin: Decimal,
}

#[derive(Clone, Debug)]
pub struct Route {
    pub schedule_id: String,
    pub bus_name: String,
    pub seat_layout: SeatLayout,
    pub booking_enabled: bool,
    stops: Vec<RouteStop>,
    name_index: HashMap<String, usize>,
}

impl Route {
    /// Project database rows into a usable route. Returns `Ok(None)` when
    /// no stop survives the blank name filter, which callers surface as
    /// `ScheduleNotFound`.
    pub fn from_rows(
        schedule: &ScheduleRow,
        mut stop_rows: Vec<StopRow>,
    ) -> Result<Option<Route>, BookingError> {
        let seat_layout = SeatLayout::from_tag(&schedule.seat_layout)?;

        stop_rows.sort_by_key(|row| row.stop_order);

        let mut stops = Vec::with_capacity(stop_rows.len());
        let mut name_index: HashMap<String, usize> = HashMap::new();
        for row in stop_rows {
            if row.stop_name.trim().is_empty() {
                log::warn!(
                    "schedule {}: dropping unnamed stop at order {}",
                    schedule.schedule_id,
                    row.stop_order
                );
                continue;
            }
            let index = stops.len();
            name_index
                .entry(normalize_stop_name(&row.stop_name))
                .or_insert(index);
            stops.push(RouteStop {
                name: row.stop_name.trim().to_string(),
                arrival_seconds: row.arrival_seconds,
                departure_seconds: row.departure_seconds,
                fare_from_origin: row.fare_from_origin,
            });
        }

        if stops.is_empty() {
            return Ok(None);
        }

        Ok(Some(Route {
            schedule_id: schedule.schedule_id.clone(),
            bus_name: schedule.bus_name.clone(),
            seat_layout,
            booking_enabled: schedule.booking_enabled,
            stops,
            name_index,
        }))
    }

    pub fn stops(&self) -> &[RouteStop] {
        &self.stops
    }

    pub fn origin(&self) -> &RouteStop {
        &self.stops[0]
    }

    pub fn destination(&self) -> &RouteStop {
        &self.stops[self.stops.len() - 1]
    }

    /// Stop names between origin and destination, in travel order.
    pub fn via(&self) -> Vec<&str> {
        if self.stops.len() <= 2 {
            return vec![];
        }
        self.stops[1..self.stops.len() - 1]
            .iter()
            .map(|stop| stop.name.as_str())
            .collect()
    }

    pub fn resolve_stop(&self, name: &str) -> Option<usize> {
        self.name_index.get(&normalize_stop_name(name)).copied()
    }

    /// Resolve a requested origin and destination pair into stop indices.
    /// Both must exist on the route and the origin must precede the
    /// destination in travel order.
    pub fn resolve_segment(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<(usize, usize), BookingError> {
        let origin_index = self
            .resolve_stop(origin)
            .ok_or(BookingError::InvalidSegment)?;
        let destination_index = self
            .resolve_stop(destination)
            .ok_or(BookingError::InvalidSegment)?;
        if origin_index >= destination_index {
            return Err(BookingError::InvalidSegment);
        }
        Ok((origin_index, destination_index))
    }

    /// Base fare for a resolved segment, the cumulative fare difference
    /// floored at zero so dirty fare columns cannot produce a negative
    /// charge.
    pub fn segment_fare(&self, origin_index: usize, destination_index: usize) -> Decimal {
        let fare = self.stops[destination_index].fare_from_origin
            - self.stops[origin_index].fare_from_origin;
        fare.max(Decimal::ZERO)
    }

    pub fn total_fare(&self) -> Decimal {
        self.segment_fare(0, self.stops.len() - 1)
    }

    pub fn summary(&self) -> RouteSummary {
        let destination = self.destination();
        RouteSummary {
            schedule_id: self.schedule_id.clone(),
            bus_name: self.bus_name.clone(),
            seat_layout: self.seat_layout.tag().to_string(),
            seat_capacity: self.seat_layout.capacity(),
            booking_enabled: self.booking_enabled,
            origin: self.origin().name.clone(),
            destination: destination.name.clone(),
            via: self.via().iter().map(|name| name.to_string()).collect(),
            departure_time: crate::format_time_of_day(self.origin().departure_seconds),
            arrival_time: crate::format_time_of_day(
                destination
                    .arrival_seconds
                    .unwrap_or(destination.departure_seconds),
            ),
            total_fare: self.total_fare(),
            stops: self
                .stops
                .iter()
                .map(|stop| RouteSummaryStop {
                    name: stop.name.clone(),
                    arrival_time: stop.arrival_seconds.map(crate::format_time_of_day),
                    departure_time: crate::format_time_of_day(stop.departure_seconds),
                    fare_from_origin: stop.fare_from_origin,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RouteSummary {
    pub schedule_id: String,
    pub bus_name: String,
    pub seat_layout: String,
    pub seat_capacity: u32,
    pub booking_enabled: bool,
    pub origin: String,
    pub destination: String,
    pub via: Vec<String>,
    pub departure_time: String,
    pub arrival_time: String,
    pub total_fare: Decimal,
    pub stops: Vec<RouteSummaryStop>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RouteSummaryStop {
    pub name: String,
    pub arrival_time: Option<String>,
    pub departure_time: String,
    pub fare_from_origin: Decimal,
}

/// Load the stop chain for an already fetched schedule row.
pub async fn route_for_schedule(
    conn: &mut AsyncPgConnection,
    schedule: &ScheduleRow,
) -> Result<Route, BookingError> {
    let stop_rows = crate::schema::roadways::stops::dsl::stops
        .filter(crate::schema::roadways::stops::dsl::schedule_id.eq(&schedule.schedule_id))
        .select(StopRow::as_select())
        .load::<StopRow>(conn)
        .await?;

    Route::from_rows(schedule, stop_rows)?.ok_or(BookingError::ScheduleNotFound)
}

pub async fn load_route(
    conn: &mut AsyncPgConnection,
    schedule_id: &str,
) -> Result<Route, BookingError> {
    let schedule = crate::schema::roadways::schedules::dsl::schedules
        .filter(crate::schema::roadways::schedules::dsl::schedule_id.eq(schedule_id))
        .select(ScheduleRow::as_select())
        .first::<ScheduleRow>(conn)
        .await
        .optional()?;

    let Some(schedule) = schedule else {
        return Err(BookingError::ScheduleNotFound);
    };

    route_for_schedule(conn, &schedule).await
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;

    pub(crate) fn schedule_row(schedule_id: &str, layout: &str) -> ScheduleRow {
        ScheduleRow {
            schedule_id: schedule_id.to_string(),
            bus_name: "Haryana Roadways Express".to_string(),
            seat_layout: layout.to_string(),
            booking_enabled: true,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn stop_row(
        schedule_id: &str,
        order: i32,
        name: &str,
        arrival: Option<&str>,
        departure: &str,
        fare: i64,
    ) -> StopRow {
        StopRow {
            schedule_id: schedule_id.to_string(),
            stop_order: order,
            stop_name: name.to_string(),
            arrival_seconds: arrival.map(|time| crate::parse_time_of_day(time).unwrap()),
            departure_seconds: crate::parse_time_of_day(departure).unwrap(),
            fare_from_origin: Decimal::from(fare),
        }
    }

    /// Rohtak to Chandigarh with two intermediate stops, used across the
    /// crate's unit tests.
    pub(crate) fn rohtak_route() -> Route {
        let schedule = schedule_row("HR-101", "2x2");
        let rows = vec![
            stop_row("HR-101", 0, "Rohtak", None, "06:00", 0),
            stop_row("HR-101", 1, "Gohana", Some("06:45"), "06:50", 50),
            stop_row("HR-101", 2, "Panipat", Some("07:30"), "07:40", 100),
            stop_row("HR-101", 3, "Chandigarh", Some("10:30"), "10:30", 250),
        ];
        Route::from_rows(&schedule, rows).unwrap().unwrap()
    }

    #[test]
    fn projection_orders_and_indexes_stops() {
        let schedule = schedule_row("HR-101", "2x2");
        // deliberately shuffled row order
        let rows = vec![
            stop_row("HR-101", 2, "Panipat", Some("07:30"), "07:40", 100),
            stop_row("HR-101", 0, "Rohtak", None, "06:00", 0),
            stop_row("HR-101", 3, "Chandigarh", Some("10:30"), "10:30", 250),
            stop_row("HR-101", 1, "Gohana", Some("06:45"), "06:50", 50),
        ];
        let route = Route::from_rows(&schedule, rows).unwrap().unwrap();

        assert_eq!(route.origin().name, "Rohtak");
        assert_eq!(route.destination().name, "Chandigarh");
        assert_eq!(route.via(), vec!["Gohana", "Panipat"]);
        assert_eq!(route.resolve_stop("  pAnIpAt "), Some(2));
    }

    #[test]
    fn projection_is_stable_across_reads() {
        let schedule = schedule_row("HR-101", "2x2");
        let rows = vec![
            stop_row("HR-101", 0, "Rohtak", None, "06:00", 0),
            stop_row("HR-101", 1, "Gohana", Some("06:45"), "06:50", 50),
            stop_row("HR-101", 2, "Panipat", Some("07:30"), "07:40", 100),
            stop_row("HR-101", 3, "Chandigarh", Some("10:30"), "10:30", 250),
        ];
        // two reads of the same rows, one shuffled, must project identically
        let mut shuffled = rows.clone();
        shuffled.reverse();

        let first = Route::from_rows(&schedule, rows).unwrap().unwrap();
        let second = Route::from_rows(&schedule, shuffled).unwrap().unwrap();

        assert_eq!(
            serde_json::to_value(first.summary()).unwrap(),
            serde_json::to_value(second.summary()).unwrap()
        );
    }

    #[test]
    fn blank_stops_are_dropped() {
        let schedule = schedule_row("HR-102", "2x2");
        let rows = vec![
            stop_row("HR-102", 0, "Rohtak", None, "06:00", 0),
            stop_row("HR-102", 1, "   ", Some("06:45"), "06:50", 50),
            stop_row("HR-102", 2, "Panipat", Some("07:30"), "07:40", 100),
        ];
        let route = Route::from_rows(&schedule, rows).unwrap().unwrap();

        assert_eq!(route.stops().len(), 2);
        assert_eq!(route.resolve_segment("Rohtak", "Panipat").unwrap(), (0, 1));
    }

    #[test]
    fn all_blank_projects_to_none() {
        let schedule = schedule_row("HR-103", "2x2");
        let rows = vec![stop_row("HR-103", 0, " ", None, "06:00", 0)];
        assert!(Route::from_rows(&schedule, rows).unwrap().is_none());
    }

    #[test]
    fn unknown_layout_is_malformed() {
        let schedule = schedule_row("HR-104", "4x4");
        let rows = vec![stop_row("HR-104", 0, "Rohtak", None, "06:00", 0)];
        assert!(matches!(
            Route::from_rows(&schedule, rows),
            Err(BookingError::MalformedRow(_))
        ));
    }

    #[test]
    fn segment_resolution_rejects_reversed_and_same_stop() {
        let route = rohtak_route();

        assert_eq!(route.resolve_segment("Rohtak", "Panipat").unwrap(), (0, 2));
        assert!(matches!(
            route.resolve_segment("Panipat", "Rohtak"),
            Err(BookingError::InvalidSegment)
        ));
        assert!(matches!(
            route.resolve_segment("Gohana", "Gohana"),
            Err(BookingError::InvalidSegment)
        ));
        assert!(matches!(
            route.resolve_segment("Rohtak", "Delhi"),
            Err(BookingError::InvalidSegment)
        ));
    }

    #[test]
    fn segment_fares_are_cumulative_differences() {
        let route = rohtak_route();

        assert_eq!(route.segment_fare(0, 2), Decimal::from(100));
        assert_eq!(route.segment_fare(1, 3), Decimal::from(200));
        assert_eq!(route.total_fare(), Decimal::from(250));
    }

    #[test]
    fn negative_fare_difference_floors_at_zero() {
        let schedule = schedule_row("HR-105", "2x2");
        // dirty data: fare column decreases along the route
        let rows = vec![
            stop_row("HR-105", 0, "Rohtak", None, "06:00", 0),
            stop_row("HR-105", 1, "Gohana", Some("06:45"), "06:50", 80),
            stop_row("HR-105", 2, "Panipat", Some("07:30"), "07:40", 60),
        ];
        let route = Route::from_rows(&schedule, rows).unwrap().unwrap();

        assert_eq!(route.segment_fare(1, 2), Decimal::ZERO);
    }

    #[test]
    fn summary_carries_timetable_and_fares() {
        let route = rohtak_route();
        let summary = route.summary();

        assert_eq!(summary.departure_time, "06:00");
        assert_eq!(summary.arrival_time, "10:30");
        assert_eq!(summary.total_fare, Decimal::from(250));
        assert_eq!(summary.stops.len(), 4);
        assert_eq!(summary.seat_capacity, 40);
        assert_eq!(summary.stops[1].arrival_time.as_deref(), Some("06:45"));
        assert_eq!(summary.stops[0].arrival_time, None);
    }
}
