//! Seat level cancellation. Refund maths must conserve money: the sum of
//! refunded seat fares plus the booking's remaining fare always equals
//! the original fare. Eligibility closes one hour before the booking's
//! origin stop departs.

use crate::codes::BookingStatus;
use crate::codes::PassengerStatus;
use crate::errors::BookingError;
use crate::models::BookingRow;
use crate::models::PassengerDetailRow;
use crate::route_model::load_route;
use crate::settings::SettingsSnapshot;
use chrono::DateTime;
use chrono::Days;
use chrono::Duration;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::AsyncConnection;
use diesel_async::AsyncPgConnection;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

pub const CANCELLATION_CUTOFF_HOURS: i64 = 1;

#[derive(Clone, Debug, Deserialize)]
pub struct CancellationRequest {
    pub booking_id: Uuid,
    pub seat_ids: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CancellationOutcome {
    pub booking_id: Uuid,
    pub cancelled_seats: Vec<String>,
    pub refund_amount: Decimal,
    pub remaining_fare: Decimal,
    pub status: BookingStatus,
}

/// The departure instant for a booking: the booking's calendar day
/// combined with the origin stop's departure time of day. A departure
/// time earlier in the day than the booking instant rolls over to the
/// next day.
pub fn departure_instant(booked_at: DateTime<Utc>, departure_seconds: i32) -> DateTime<Utc> {
    let booked_naive = booked_at.naive_utc();
    let seconds = departure_seconds.rem_euclid(crate::SECONDS_PER_DAY) as u32;
    let departure_time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
        .unwrap_or(NaiveTime::MIN);

    let mut departure_date = booked_naive.date();
    if departure_time < booked_naive.time() {
        departure_date = departure_date + Days::new(1);
    }

    DateTime::from_naive_utc_and_offset(NaiveDateTime::new(departure_date, departure_time), Utc)
}

/// Cancellation is allowed strictly before the cutoff, which sits one
/// hour ahead of departure.
pub fn cancellation_allowed_at(
    booked_at: DateTime<Utc>,
    departure_seconds: i32,
    now: DateTime<Utc>,
) -> bool {
    let cutoff =
        departure_instant(booked_at, departure_seconds) - Duration::hours(CANCELLATION_CUTOFF_HOURS);
    now < cutoff
}

/// Derive the booking level status from seat counts.
pub fn recompute_status(total_seats: usize, cancelled_seats: usize) -> BookingStatus {
    if cancelled_seats == 0 {
        BookingStatus::Confirmed
    } else if cancelled_seats < total_seats {
        BookingStatus::PartiallyCancelled
    } else {
        BookingStatus::Cancelled
    }
}

/// Rows eligible for a refund: seats named in the request that are still
/// booked. Seats the booking never held, or that were cancelled earlier,
/// fall through silently.
pub fn refundable<'a>(
    passengers: &'a [PassengerDetailRow],
    requested: &[String],
) -> Vec<&'a PassengerDetailRow> {
    passengers
        .iter()
        .filter(|row| {
            PassengerStatus::from_code(&row.status).ok() == Some(PassengerStatus::Booked)
                && requested.contains(&row.seat_id)
        })
        .collect()
}

/// Cancel a subset of a booking's seats. Seats that are not part of the
/// booking, or are already cancelled, are skipped; if nothing at all is
/// cancellable the whole request fails and rolls back.
pub async fn cancel_seats(
    conn: &mut AsyncPgConnection,
    settings: &SettingsSnapshot,
    request: &CancellationRequest,
    now: DateTime<Utc>,
) -> Result<CancellationOutcome, BookingError> {
    if !settings.cancellation_enabled {
        return Err(BookingError::FeatureDisabled("cancellation"));
    }
    if request.seat_ids.is_empty() {
        return Err(BookingError::NothingToCancel);
    }

    conn.transaction::<CancellationOutcome, BookingError, _>(|conn| {
        async move {
            let booking = crate::schema::roadways::bookings::dsl::bookings
                .filter(crate::schema::roadways::bookings::dsl::booking_id.eq(request.booking_id))
                .select(BookingRow::as_select())
                .for_update()
                .first::<BookingRow>(conn)
                .await
                .optional()?;
            let Some(booking) = booking else {
                return Err(BookingError::BookingNotFound);
            };

            if BookingStatus::from_code(&booking.status)? == BookingStatus::Cancelled {
                return Err(BookingError::AlreadyCancelled);
            }

            let route = load_route(conn, &booking.schedule_id).await?;
            let origin_index = route
                .resolve_stop(&booking.origin)
                .ok_or(BookingError::InvalidSegment)?;
            let departure_seconds = route.stops()[origin_index].departure_seconds;
            if !cancellation_allowed_at(booking.booked_at, departure_seconds, now) {
                return Err(BookingError::WindowClosed);
            }

            let passengers = crate::schema::roadways::passenger_details::dsl::passenger_details
                .filter(
                    crate::schema::roadways::passenger_details::dsl::booking_id
                        .eq(booking.booking_id),
                )
                .select(PassengerDetailRow::as_select())
                .load::<PassengerDetailRow>(conn)
                .await?;

            let requested: Vec<String> = request
                .seat_ids
                .iter()
                .map(|seat_id| seat_id.trim().to_uppercase())
                .collect();

            let to_cancel = refundable(&passengers, &requested);
            if to_cancel.is_empty() {
                return Err(BookingError::NothingToCancel);
            }

            let cancelled_seat_ids: Vec<String> = to_cancel
                .iter()
                .map(|row| row.seat_id.clone())
                .collect();
            let refund_amount: Decimal = to_cancel.iter().map(|row| row.fare).sum();

            diesel::update(
                crate::schema::roadways::passenger_details::dsl::passenger_details
                    .filter(
                        crate::schema::roadways::passenger_details::dsl::booking_id
                            .eq(booking.booking_id),
                    )
                    .filter(
                        crate::schema::roadways::passenger_details::dsl::seat_id
                            .eq_any(&cancelled_seat_ids),
                    ),
            )
            .set(
                crate::schema::roadways::passenger_details::dsl::status
                    .eq(PassengerStatus::Cancelled.as_code()),
            )
            .execute(conn)
            .await?;

            diesel::delete(
                crate::schema::roadways::seat_occupancy::dsl::seat_occupancy
                    .filter(
                        crate::schema::roadways::seat_occupancy::dsl::booking_id
                            .eq(booking.booking_id),
                    )
                    .filter(
                        crate::schema::roadways::seat_occupancy::dsl::seat_id
                            .eq_any(&cancelled_seat_ids),
                    ),
            )
            .execute(conn)
            .await?;

            let previously_cancelled = passengers
                .iter()
                .filter(|row| {
                    PassengerStatus::from_code(&row.status).ok()
                        == Some(PassengerStatus::Cancelled)
                })
                .count();
            let status =
                recompute_status(passengers.len(), previously_cancelled + to_cancel.len());
            let remaining_fare = (booking.fare - refund_amount).max(Decimal::ZERO);

            diesel::update(
                crate::schema::roadways::bookings::dsl::bookings.filter(
                    crate::schema::roadways::bookings::dsl::booking_id.eq(booking.booking_id),
                ),
            )
            .set((
                crate::schema::roadways::bookings::dsl::fare.eq(remaining_fare),
                crate::schema::roadways::bookings::dsl::status.eq(status.as_code()),
            ))
            .execute(conn)
            .await?;

            log::info!(
                "cancelled {} seat(s) on booking {} (refund {refund_amount}, now {})",
                cancelled_seat_ids.len(),
                booking.booking_id,
                status.as_code()
            );

            Ok(CancellationOutcome {
                booking_id: booking.booking_id,
                cancelled_seats: cancelled_seat_ids,
                refund_amount,
                remaining_fare,
                status,
            })
        }
        .scope_boxed()
    })
    .await
}
