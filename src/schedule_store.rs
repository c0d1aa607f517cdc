//! Write side of schedule management: validating uploaded timetables and
//! storing them. Uploads are rejected wholesale when the schedule id is
//! already taken; edits to a live schedule replace the stop chain inside
//! one transaction while the schedule row is locked, so no booking can
//! interleave with a half swapped route.

use crate::errors::BookingError;
use crate::models::ScheduleRow;
use crate::models::StopRow;
use crate::seat_layout::SeatLayout;
use chrono::DateTime;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel_async::AsyncConnection;
use diesel_async::AsyncPgConnection;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Deserialize;

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
pub struct ParsedStop {
    pub stop_order: i32,
    pub stop_name: String,
    pub arrival_time: Option<String>,
    pub departure_time: String,
    pub fare_from_origin: Decimal,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ParsedSchedule {
    pub schedule_id: String,
    pub bus_name: String,
    pub seat_layout: SeatLayout,
    #[serde(default = "default_true")]
    pub booking_enabled: bool,
    pub stops: Vec<ParsedStop>,
}

/// Validate an uploaded stop chain and render it into rows. The first
/// stop's arrival is always stored null; later stops must carry one.
pub fn validate_stops(
    schedule_id: &str,
    stops: &[ParsedStop],
) -> Result<Vec<StopRow>, BookingError> {
    if stops.is_empty() {
        return Err(BookingError::InvalidSchedule(
            "a schedule needs at least one stop".to_string(),
        ));
    }

    let mut sorted: Vec<&ParsedStop> = stops.iter().collect();
    sorted.sort_by_key(|stop| stop.stop_order);

    if !sorted.iter().map(|stop| stop.stop_order).all_unique() {
        return Err(BookingError::InvalidSchedule(
            "stop orders must be unique".to_string(),
        ));
    }

    let mut rows = Vec::with_capacity(sorted.len());
    let mut previous_fare = Decimal::ZERO;
    for (position, stop) in sorted.iter().enumerate() {
        if stop.stop_name.trim().is_empty() {
            return Err(BookingError::InvalidSchedule(format!(
                "blank stop name at order {}",
                stop.stop_order
            )));
        }
        let departure_seconds =
            crate::parse_time_of_day(&stop.departure_time).ok_or_else(|| {
                BookingError::InvalidSchedule(format!(
                    "bad departure time {:?} at order {}",
                    stop.departure_time, stop.stop_order
                ))
            })?;

        let arrival_seconds = if position == 0 {
            None
        } else {
            let raw = stop.arrival_time.as_deref().ok_or_else(|| {
                BookingError::InvalidSchedule(format!(
                    "arrival time missing at order {}",
                    stop.stop_order
                ))
            })?;
            Some(crate::parse_time_of_day(raw).ok_or_else(|| {
                BookingError::InvalidSchedule(format!(
                    "bad arrival time {raw:?} at order {}",
                    stop.stop_order
                ))
            })?)
        };

        if stop.fare_from_origin < Decimal::ZERO {
            return Err(BookingError::InvalidSchedule(format!(
                "negative fare at order {}",
                stop.stop_order
            )));
        }
        if stop.fare_from_origin < previous_fare {
            log::warn!(
                "schedule {schedule_id}: fare decreases at order {} ({} -> {})",
                stop.stop_order,
                previous_fare,
                stop.fare_from_origin
            );
        }
        previous_fare = stop.fare_from_origin;

        rows.push(StopRow {
            schedule_id: schedule_id.to_string(),
            stop_order: stop.stop_order,
            stop_name: stop.stop_name.clone(),
            arrival_seconds,
            departure_seconds,
            fare_from_origin: stop.fare_from_origin,
        });
    }

    Ok(rows)
}

pub async fn create_schedule(
    conn: &mut AsyncPgConnection,
    parsed: &ParsedSchedule,
    now: DateTime<Utc>,
) -> Result<(), BookingError> {
    let schedule_id = parsed.schedule_id.trim().to_string();
    if schedule_id.is_empty() {
        return Err(BookingError::InvalidSchedule(
            "schedule id must not be blank".to_string(),
        ));
    }
    if parsed.bus_name.trim().is_empty() {
        return Err(BookingError::InvalidSchedule(
            "bus name must not be blank".to_string(),
        ));
    }
    let stop_rows = validate_stops(&schedule_id, &parsed.stops)?;

    let schedule_row = ScheduleRow {
        schedule_id: schedule_id.clone(),
        bus_name: parsed.bus_name.trim().to_string(),
        seat_layout: parsed.seat_layout.tag().to_string(),
        booking_enabled: parsed.booking_enabled,
        created_at: now,
    };

    conn.transaction::<_, BookingError, _>(|conn| {
        async move {
            let existing = crate::schema::roadways::schedules::dsl::schedules
                .filter(crate::schema::roadways::schedules::dsl::schedule_id.eq(&schedule_id))
                .select(ScheduleRow::as_select())
                .first::<ScheduleRow>(conn)
                .await
                .optional()?;
            if existing.is_some() {
                return Err(BookingError::DuplicateSchedule(schedule_id.clone()));
            }

            diesel::insert_into(crate::schema::roadways::schedules::dsl::schedules)
                .values(&schedule_row)
                .execute(conn)
                .await
                .map_err(|err| match err {
                    diesel::result::Error::DatabaseError(
                        DatabaseErrorKind::UniqueViolation,
                        _,
                    ) => BookingError::DuplicateSchedule(schedule_id.clone()),
                    other => BookingError::Storage(other),
                })?;

            diesel::insert_into(crate::schema::roadways::stops::dsl::stops)
                .values(&stop_rows)
                .execute(conn)
                .await?;

            Ok(())
        }
        .scope_boxed()
    })
    .await
}

/// Swap a schedule's stop chain for a new one. The seat layout and bus
/// name stay as they are; existing bookings keep their stored stop names
/// and simply stop resolving if a stop disappears.
pub async fn replace_stops(
    conn: &mut AsyncPgConnection,
    schedule_id: &str,
    stops: &[ParsedStop],
) -> Result<(), BookingError> {
    let stop_rows = validate_stops(schedule_id, stops)?;
    let schedule_id = schedule_id.to_string();

    conn.transaction::<_, BookingError, _>(|conn| {
        async move {
            let locked = crate::schema::roadways::schedules::dsl::schedules
                .filter(crate::schema::roadways::schedules::dsl::schedule_id.eq(&schedule_id))
                .select(ScheduleRow::as_select())
                .for_update()
                .first::<ScheduleRow>(conn)
                .await
                .optional()?;
            if locked.is_none() {
                return Err(BookingError::ScheduleNotFound);
            }

            diesel::delete(
                crate::schema::roadways::stops::dsl::stops
                    .filter(crate::schema::roadways::stops::dsl::schedule_id.eq(&schedule_id)),
            )
            .execute(conn)
            .await?;

            diesel::insert_into(crate::schema::roadways::stops::dsl::stops)
                .values(&stop_rows)
                .execute(conn)
                .await?;

            Ok(())
        }
        .scope_boxed()
    })
    .await
}

pub async fn set_booking_enabled(
    conn: &mut AsyncPgConnection,
    schedule_id: &str,
    enabled: bool,
) -> Result<(), BookingError> {
    let updated = diesel::update(
        crate::schema::roadways::schedules::dsl::schedules
            .filter(crate::schema::roadways::schedules::dsl::schedule_id.eq(schedule_id)),
    )
    .set(crate::schema::roadways::schedules::dsl::booking_enabled.eq(enabled))
    .execute(conn)
    .await?;

    if updated == 0 {
        return Err(BookingError::ScheduleNotFound);
    }
    Ok(())
}

pub async fn list_schedules(
    conn: &mut AsyncPgConnection,
) -> Result<Vec<ScheduleRow>, BookingError> {
    let rows = crate::schema::roadways::schedules::dsl::schedules
        .order(crate::schema::roadways::schedules::dsl::schedule_id.asc())
        .select(ScheduleRow::as_select())
        .load::<ScheduleRow>(conn)
        .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(order: i32, name: &str, arrival: Option<&str>, departure: &str, fare: i64) -> ParsedStop {
        ParsedStop {
            stop_order: order,
            stop_name: name.to_string(),
            arrival_time: arrival.map(|time| time.to_string()),
            departure_time: departure.to_string(),
            fare_from_origin: Decimal::from(fare),
        }
    }

    #[test]
    fn valid_chain_renders_rows() {
        let stops = vec![
            stop(0, "Rohtak", None, "06:00", 0),
            stop(1, "Gohana", Some("06:45"), "06:50", 50),
        ];
        let rows = validate_stops("HR-101", &stops).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].arrival_seconds, None);
        assert_eq!(rows[1].arrival_seconds, Some(24300));
        assert_eq!(rows[1].departure_seconds, 24600);
    }

    #[test]
    fn first_stop_arrival_is_discarded() {
        let stops = vec![
            stop(0, "Rohtak", Some("05:55"), "06:00", 0),
            stop(1, "Gohana", Some("06:45"), "06:50", 50),
        ];
        let rows = validate_stops("HR-101", &stops).unwrap();
        assert_eq!(rows[0].arrival_seconds, None);
    }

    #[test]
    fn duplicate_orders_are_rejected() {
        let stops = vec![
            stop(0, "Rohtak", None, "06:00", 0),
            stop(0, "Gohana", Some("06:45"), "06:50", 50),
        ];
        assert!(matches!(
            validate_stops("HR-101", &stops),
            Err(BookingError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn blank_stop_name_is_rejected() {
        let stops = vec![
            stop(0, "Rohtak", None, "06:00", 0),
            stop(1, "   ", Some("06:45"), "06:50", 50),
        ];
        assert!(matches!(
            validate_stops("HR-101", &stops),
            Err(BookingError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn later_stop_without_arrival_is_rejected() {
        let stops = vec![
            stop(0, "Rohtak", None, "06:00", 0),
            stop(1, "Gohana", None, "06:50", 50),
        ];
        assert!(matches!(
            validate_stops("HR-101", &stops),
            Err(BookingError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn unparseable_time_is_rejected() {
        let stops = vec![stop(0, "Rohtak", None, "6 am", 0)];
        assert!(matches!(
            validate_stops("HR-101", &stops),
            Err(BookingError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn negative_fare_is_rejected() {
        let stops = vec![
            stop(0, "Rohtak", None, "06:00", 0),
            stop(1, "Gohana", Some("06:45"), "06:50", -10),
        ];
        assert!(matches!(
            validate_stops("HR-101", &stops),
            Err(BookingError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn empty_chain_is_rejected() {
        assert!(matches!(
            validate_stops("HR-101", &[]),
            Err(BookingError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn rows_are_sorted_by_order() {
        let stops = vec![
            stop(2, "Panipat", Some("07:30"), "07:40", 100),
            stop(0, "Rohtak", None, "06:00", 0),
            stop(1, "Gohana", Some("06:45"), "06:50", 50),
        ];
        let rows = validate_stops("HR-101", &stops).unwrap();
        assert_eq!(
            rows.iter().map(|row| row.stop_order).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn upload_payload_deserializes() {
        let payload = r#"{
            "schedule_id": "HR-101",
            "bus_name": "Haryana Roadways Express",
            "seat_layout": "2x2",
            "stops": [
                {"stop_order": 0, "stop_name": "Rohtak", "arrival_time": null,
                 "departure_time": "06:00", "fare_from_origin": "0"},
                {"stop_order": 1, "stop_name": "Gohana", "arrival_time": "06:45",
                 "departure_time": "06:50", "fare_from_origin": "50"}
            ]
        }"#;
        let parsed: ParsedSchedule = serde_json::from_str(payload).unwrap();

        assert_eq!(parsed.seat_layout, SeatLayout::TwoByTwo);
        assert!(parsed.booking_enabled);
        assert_eq!(parsed.stops.len(), 2);
    }
}
