//! Segment level seat availability. A seat is unavailable for a requested
//! segment only when an occupancy row inside the rolling service window
//! overlaps it; disjoint legs of the same trip reuse the seat freely.

use crate::errors::BookingError;
use crate::models::SeatOccupancyRow;
use crate::route_model::Route;
use crate::route_model::load_route;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::AsyncPgConnection;
use diesel_async::RunQueryDsl;
use std::collections::BTreeSet;

/// Occupancy rows older than this no longer block seats. The window is
/// rolling: each day's service naturally ages the previous day's rows
/// out of contention.
pub const OCCUPANCY_WINDOW_HOURS: i64 = 24;

/// Half open interval overlap on stop indices. Sharing an endpoint is
/// not an overlap, so a passenger may board at the exact stop another
/// alights.
pub fn segments_overlap(a: (usize, usize), b: (usize, usize)) -> bool {
    a.0.max(b.0) < a.1.min(b.1)
}

/// Seats blocked for the requested segment, given the occupancy rows
/// already filtered to the service window. Rows whose stop names no
/// longer resolve on the route, or resolve out of order, are skipped.
pub fn occupied_seat_ids(
    route: &Route,
    requested: (usize, usize),
    occupancies: &[SeatOccupancyRow],
) -> BTreeSet<String> {
    let mut blocked = BTreeSet::new();
    for occupancy in occupancies {
        let Some(origin_index) = route.resolve_stop(&occupancy.origin) else {
            continue;
        };
        let Some(destination_index) = route.resolve_stop(&occupancy.destination) else {
            continue;
        };
        if origin_index >= destination_index {
            continue;
        }
        if segments_overlap(requested, (origin_index, destination_index)) {
            blocked.insert(occupancy.seat_id.clone());
        }
    }
    blocked
}

/// Unavailable seats for a route already loaded inside the current
/// transaction. Booking uses this after taking the schedule lock so the
/// availability it sees cannot go stale before its inserts land.
pub async fn unavailable_for_route(
    conn: &mut AsyncPgConnection,
    route: &Route,
    requested: (usize, usize),
    now: DateTime<Utc>,
) -> Result<BTreeSet<String>, BookingError> {
    let window_start = now - Duration::hours(OCCUPANCY_WINDOW_HOURS);

    let occupancies = crate::schema::roadways::seat_occupancy::dsl::seat_occupancy
        .filter(crate::schema::roadways::seat_occupancy::dsl::schedule_id.eq(&route.schedule_id))
        .filter(crate::schema::roadways::seat_occupancy::dsl::booked_at.gt(window_start))
        .select(SeatOccupancyRow::as_select())
        .load::<SeatOccupancyRow>(conn)
        .await?;

    Ok(occupied_seat_ids(route, requested, &occupancies))
}

/// Seat map input for the booking page: which seats cannot be taken for
/// the requested journey segment.
pub async fn unavailable_seats(
    conn: &mut AsyncPgConnection,
    schedule_id: &str,
    origin: &str,
    destination: &str,
    now: DateTime<Utc>,
) -> Result<BTreeSet<String>, BookingError> {
    let route = load_route(conn, schedule_id).await?;
    let requested = route.resolve_segment(origin, destination)?;
    unavailable_for_route(conn, &route, requested, now).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route_model::tests::rohtak_route;
    use chrono::Utc;
    use uuid::Uuid;

    fn occupancy(seat_id: &str, origin: &str, destination: &str) -> SeatOccupancyRow {
        SeatOccupancyRow {
            booking_id: Uuid::new_v4(),
            seat_id: seat_id.to_string(),
            schedule_id: "HR-101".to_string(),
            origin: origin.to_string(),
            destination: destination.to_string(),
            booked_at: Utc::now(),
        }
    }

    #[test]
    fn overlap_is_half_open() {
        // [0,2) vs [2,3): touching at stop 2 is not a conflict
        assert!(!segments_overlap((0, 2), (2, 3)));
        assert!(!segments_overlap((2, 3), (0, 2)));
        // [0,2) vs [1,3): both cover the leg 1 -> 2
        assert!(segments_overlap((0, 2), (1, 3)));
        // nested segments conflict
        assert!(segments_overlap((0, 3), (1, 2)));
        // identical segments conflict
        assert!(segments_overlap((1, 3), (1, 3)));
        // disjoint segments do not
        assert!(!segments_overlap((0, 1), (2, 3)));
    }

    #[test]
    fn overlapping_occupancy_blocks_seat() {
        let route = rohtak_route();
        let occupancies = vec![occupancy("A1", "Rohtak", "Panipat")];

        let requested = route.resolve_segment("Gohana", "Chandigarh").unwrap();
        let blocked = occupied_seat_ids(&route, requested, &occupancies);
        assert!(blocked.contains("A1"));
    }

    #[test]
    fn disjoint_leg_frees_seat_for_reuse() {
        let route = rohtak_route();
        let occupancies = vec![occupancy("A1", "Rohtak", "Panipat")];

        let requested = route.resolve_segment("Panipat", "Chandigarh").unwrap();
        let blocked = occupied_seat_ids(&route, requested, &occupancies);
        assert!(blocked.is_empty());
    }

    #[test]
    fn unresolvable_occupancy_rows_are_skipped() {
        let route = rohtak_route();
        let occupancies = vec![
            occupancy("B2", "Hisar", "Panipat"),
            occupancy("B3", "Panipat", "Gohana"),
        ];

        let requested = route.resolve_segment("Rohtak", "Chandigarh").unwrap();
        let blocked = occupied_seat_ids(&route, requested, &occupancies);
        assert!(blocked.is_empty());
    }

    #[test]
    fn multiple_seats_accumulate() {
        let route = rohtak_route();
        let occupancies = vec![
            occupancy("A1", "Rohtak", "Gohana"),
            occupancy("B1", "Gohana", "Panipat"),
            occupancy("C1", "Panipat", "Chandigarh"),
        ];

        let requested = route.resolve_segment("Rohtak", "Chandigarh").unwrap();
        let blocked = occupied_seat_ids(&route, requested, &occupancies);
        assert_eq!(
            blocked.iter().cloned().collect::<Vec<_>>(),
            vec!["A1", "B1", "C1"]
        );
    }
}
