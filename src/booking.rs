// Copyright Sarathi Roadways Platform Team
// Attribution cannot be removed

//! Paid and free ticket booking. All writes for one booking happen in a
//! single transaction that first locks the schedule row, re-reads
//! availability, and re-prices every seat server side. Client supplied
//! fares are never trusted.

use crate::availability::unavailable_for_route;
use crate::codes::BookingStatus;
use crate::codes::DiscountType;
use crate::codes::PassengerCategory;
use crate::codes::PassengerStatus;
use crate::codes::classify_discount;
use crate::errors::BookingError;
use crate::fares::price_segment;
use crate::models::BeneficiaryRow;
use crate::models::BookingRow;
use crate::models::PassengerDetailRow;
use crate::models::ScheduleRow;
use crate::models::SeatOccupancyRow;
use crate::route_model::route_for_schedule;
use crate::settings::SettingsSnapshot;
use chrono::DateTime;
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

pub const DOCUMENT_NUMBER_LENGTH: usize = 12;

#[derive(Clone, Debug, Deserialize)]
pub struct SeatRequest {
    pub seat_id: String,
    pub passenger_name: String,
    pub category: PassengerCategory,
    pub document_number: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PaidBookingRequest {
    pub user_id: String,
    pub schedule_id: String,
    pub origin: String,
    pub destination: String,
    pub seats: Vec<SeatRequest>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FreeBookingRequest {
    pub user_id: String,
    pub schedule_id: String,
    pub origin: String,
    pub destination: String,
    pub seat_ids: Vec<String>,
    pub passenger_name: String,
    pub registration_number: String,
    pub phone: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct SeatCharge {
    pub seat_id: String,
    pub passenger_name: String,
    pub category: PassengerCategory,
    pub fare: Decimal,
}

#[derive(Clone, Debug, Serialize)]
pub struct BookingReceipt {
    pub booking_id: Uuid,
    pub schedule_id: String,
    pub bus_name: String,
    pub origin: String,
    pub destination: String,
    pub status: BookingStatus,
    pub discount_type: DiscountType,
    pub total_fare: Decimal,
    pub is_free_ticket: bool,
    pub booked_at: DateTime<Utc>,
    pub seats: Vec<SeatCharge>,
}

/// Name and identity document checks that need no database access.
pub fn validate_passenger_details(seats: &[SeatRequest]) -> Result<(), BookingError> {
    for seat in seats {
        if seat.passenger_name.trim().is_empty() {
            return Err(BookingError::InvalidPassenger(format!(
                "passenger name is required for seat {}",
                seat.seat_id
            )));
        }
        if seat.category.requires_document() {
            let document = seat
                .document_number
                .as_deref()
                .map(str::trim)
                .unwrap_or_default();
            if document.len() != DOCUMENT_NUMBER_LENGTH
                || !document.chars().all(|c| c.is_ascii_digit())
            {
                return Err(BookingError::InvalidPassenger(format!(
                    "a {} digit identity document number is required for {} fares",
                    DOCUMENT_NUMBER_LENGTH,
                    seat.category.as_code()
                )));
            }
        }
    }
    Ok(())
}

/// Shape checks for a free ticket claim before touching the database.
pub fn validate_free_request(request: &FreeBookingRequest) -> Result<(), BookingError> {
    match request.seat_ids.len() {
        0 => {
            return Err(BookingError::InvalidPassenger(
                "a seat must be selected".to_string(),
            ));
        }
        1 => {}
        _ => return Err(BookingError::TooManySeats),
    }
    if request.passenger_name.trim().is_empty() {
        return Err(BookingError::InvalidPassenger(
            "passenger name is required".to_string(),
        ));
    }
    if request.registration_number.trim().is_empty() || request.phone.trim().is_empty() {
        return Err(BookingError::InvalidPassenger(
            "beneficiary registration number and phone are required".to_string(),
        ));
    }
    Ok(())
}

pub(crate) async fn lock_schedule(
    conn: &mut AsyncPgConnection,
    schedule_id: &str,
) -> Result<ScheduleRow, BookingError> {
    let row = crate::schema::roadways::schedules::dsl::schedules
        .filter(crate::schema::roadways::schedules::dsl::schedule_id.eq(schedule_id))
        .select(ScheduleRow::as_select())
        .for_update()
        .first::<ScheduleRow>(conn)
        .await
        .optional()?;

    row.ok_or(BookingError::ScheduleNotFound)
}

/// Book one or more paid seats over a segment.
pub async fn book_paid(
    conn: &mut AsyncPgConnection,
    settings: &SettingsSnapshot,
    request: &PaidBookingRequest,
    now: DateTime<Utc>,
) -> Result<BookingReceipt, BookingError> {
    if !settings.booking_online {
        return Err(BookingError::FeatureDisabled("online booking"));
    }
    if request.seats.is_empty() {
        return Err(BookingError::InvalidPassenger(
            "at least one seat must be selected".to_string(),
        ));
    }
    validate_passenger_details(&request.seats)?;

    conn.transaction::<BookingReceipt, BookingError, _>(|conn| {
        async move {
            let schedule = lock_schedule(conn, &request.schedule_id).await?;
            if !schedule.booking_enabled {
                return Err(BookingError::FeatureDisabled("booking for this schedule"));
            }
            let route = route_for_schedule(conn, &schedule).await?;

            let mut seat_ids = Vec::with_capacity(request.seats.len());
            for seat in &request.seats {
                let canonical = route
                    .seat_layout
                    .canonicalize(&seat.seat_id)
                    .ok_or_else(|| BookingError::InvalidSeat(seat.seat_id.clone()))?;
                if seat_ids.contains(&canonical) {
                    return Err(BookingError::SeatConflict(vec![canonical]));
                }
                seat_ids.push(canonical);
            }

            let segment = route.resolve_segment(&request.origin, &request.destination)?;
            let blocked = unavailable_for_route(conn, &route, segment, now).await?;
            let conflicts: Vec<String> = seat_ids
                .iter()
                .filter(|seat_id| blocked.contains(*seat_id))
                .cloned()
                .collect();
            if !conflicts.is_empty() {
                return Err(BookingError::SeatConflict(conflicts));
            }

            let origin_name = route.stops()[segment.0].name.clone();
            let destination_name = route.stops()[segment.1].name.clone();

            let mut charges = Vec::with_capacity(request.seats.len());
            for (seat, seat_id) in request.seats.iter().zip(&seat_ids) {
                charges.push(SeatCharge {
                    seat_id: seat_id.clone(),
                    passenger_name: seat.passenger_name.trim().to_string(),
                    category: seat.category,
                    fare: price_segment(&route, settings, segment, seat.category),
                });
            }
            let total_fare: Decimal = charges.iter().map(|charge| charge.fare).sum();
            let discount_type = classify_discount(
                &request
                    .seats
                    .iter()
                    .map(|seat| seat.category)
                    .collect::<Vec<_>>(),
            );

            let booking_id = Uuid::new_v4();
            let booking_row = BookingRow {
                booking_id,
                user_id: request.user_id.trim().to_string(),
                schedule_id: schedule.schedule_id.clone(),
                origin: origin_name.clone(),
                destination: destination_name.clone(),
                fare: total_fare,
                original_fare: total_fare,
                status: BookingStatus::Confirmed.as_code().to_string(),
                is_free_ticket: false,
                discount_type: discount_type.as_code().to_string(),
                booked_at: now,
            };

            let passenger_rows: Vec<PassengerDetailRow> = request
                .seats
                .iter()
                .zip(&charges)
                .map(|(seat, charge)| PassengerDetailRow {
                    booking_id,
                    seat_id: charge.seat_id.clone(),
                    passenger_name: charge.passenger_name.clone(),
                    category: seat.category.as_code().to_string(),
                    document_number: seat
                        .document_number
                        .as_deref()
                        .map(str::trim)
                        .filter(|document| !document.is_empty())
                        .map(str::to_string),
                    fare: charge.fare,
                    status: PassengerStatus::Booked.as_code().to_string(),
                })
                .collect();

            let occupancy_rows: Vec<SeatOccupancyRow> = charges
                .iter()
                .map(|charge| SeatOccupancyRow {
                    booking_id,
                    seat_id: charge.seat_id.clone(),
                    schedule_id: schedule.schedule_id.clone(),
                    origin: origin_name.clone(),
                    destination: destination_name.clone(),
                    booked_at: now,
                })
                .collect();

            diesel::insert_into(crate::schema::roadways::bookings::dsl::bookings)
                .values(&booking_row)
                .execute(conn)
                .await?;
            diesel::insert_into(crate::schema::roadways::passenger_details::dsl::passenger_details)
                .values(&passenger_rows)
                .execute(conn)
                .await?;
            diesel::insert_into(crate::schema::roadways::seat_occupancy::dsl::seat_occupancy)
                .values(&occupancy_rows)
                .execute(conn)
                .await?;

            log::info!(
                "booked {} seat(s) on {} for {} ({} to {}), fare {}",
                charges.len(),
                schedule.schedule_id,
                booking_row.user_id,
                origin_name,
                destination_name,
                total_fare
            );

            Ok(BookingReceipt {
                booking_id,
                schedule_id: schedule.schedule_id.clone(),
                bus_name: schedule.bus_name.clone(),
                origin: origin_name,
                destination: destination_name,
                status: BookingStatus::Confirmed,
                discount_type,
                total_fare,
                is_free_ticket: false,
                booked_at: now,
                seats: charges,
            })
        }
        .scope_boxed()
    })
    .await
}

/// Claim the one free seat a registered beneficiary is entitled to. The
/// beneficiary row is locked for the duration so two concurrent claims
/// against the same registration cannot both succeed.
pub async fn book_free(
    conn: &mut AsyncPgConnection,
    settings: &SettingsSnapshot,
    request: &FreeBookingRequest,
    now: DateTime<Utc>,
) -> Result<BookingReceipt, BookingError> {
    if !settings.booking_online {
        return Err(BookingError::FeatureDisabled("online booking"));
    }
    if !settings.free_booking_enabled {
        return Err(BookingError::FeatureDisabled("free ticket booking"));
    }
    validate_free_request(request)?;

    conn.transaction::<BookingReceipt, BookingError, _>(|conn| {
        async move {
            let schedule = lock_schedule(conn, &request.schedule_id).await?;
            if !schedule.booking_enabled {
                return Err(BookingError::FeatureDisabled("booking for this schedule"));
            }
            let route = route_for_schedule(conn, &schedule).await?;

            let seat_id = route
                .seat_layout
                .canonicalize(&request.seat_ids[0])
                .ok_or_else(|| BookingError::InvalidSeat(request.seat_ids[0].clone()))?;

            let segment = route.resolve_segment(&request.origin, &request.destination)?;
            let blocked = unavailable_for_route(conn, &route, segment, now).await?;
            if blocked.contains(&seat_id) {
                return Err(BookingError::SeatConflict(vec![seat_id]));
            }

            let beneficiary = crate::schema::roadways::beneficiaries::dsl::beneficiaries
                .filter(
                    crate::schema::roadways::beneficiaries::dsl::registration_number
                        .eq(request.registration_number.trim()),
                )
                .select(BeneficiaryRow::as_select())
                .for_update()
                .first::<BeneficiaryRow>(conn)
                .await
                .optional()?;
            let Some(beneficiary) = beneficiary else {
                return Err(BookingError::EligibilityNotFound);
            };
            if beneficiary.phone.trim() != request.phone.trim() {
                return Err(BookingError::EligibilityNotFound);
            }
            if beneficiary.ticket_claimed {
                return Err(BookingError::AlreadyClaimed);
            }

            let origin_name = route.stops()[segment.0].name.clone();
            let destination_name = route.stops()[segment.1].name.clone();
            let booking_id = Uuid::new_v4();

            let booking_row = BookingRow {
                booking_id,
                user_id: request.user_id.trim().to_string(),
                schedule_id: schedule.schedule_id.clone(),
                origin: origin_name.clone(),
                destination: destination_name.clone(),
                fare: Decimal::ZERO,
                original_fare: Decimal::ZERO,
                status: BookingStatus::Confirmed.as_code().to_string(),
                is_free_ticket: true,
                discount_type: DiscountType::None.as_code().to_string(),
                booked_at: now,
            };
            let passenger_row = PassengerDetailRow {
                booking_id,
                seat_id: seat_id.clone(),
                passenger_name: request.passenger_name.trim().to_string(),
                category: PassengerCategory::Normal.as_code().to_string(),
                document_number: None,
                fare: Decimal::ZERO,
                status: PassengerStatus::Booked.as_code().to_string(),
            };
            let occupancy_row = SeatOccupancyRow {
                booking_id,
                seat_id: seat_id.clone(),
                schedule_id: schedule.schedule_id.clone(),
                origin: origin_name.clone(),
                destination: destination_name.clone(),
                booked_at: now,
            };

            diesel::insert_into(crate::schema::roadways::bookings::dsl::bookings)
                .values(&booking_row)
                .execute(conn)
                .await?;
            diesel::insert_into(crate::schema::roadways::passenger_details::dsl::passenger_details)
                .values(&passenger_row)
                .execute(conn)
                .await?;
            diesel::insert_into(crate::schema::roadways::seat_occupancy::dsl::seat_occupancy)
                .values(&occupancy_row)
                .execute(conn)
                .await?;

            diesel::update(
                crate::schema::roadways::beneficiaries::dsl::beneficiaries.filter(
                    crate::schema::roadways::beneficiaries::dsl::registration_number
                        .eq(&beneficiary.registration_number),
                ),
            )
            .set((
                crate::schema::roadways::beneficiaries::dsl::ticket_claimed.eq(true),
                crate::schema::roadways::beneficiaries::dsl::claimed_booking.eq(Some(booking_id)),
            ))
            .execute(conn)
            .await?;

            log::info!(
                "free ticket claimed on {} by registration {} (seat {seat_id})",
                schedule.schedule_id,
                beneficiary.registration_number
            );

            Ok(BookingReceipt {
                booking_id,
                schedule_id: schedule.schedule_id.clone(),
                bus_name: schedule.bus_name.clone(),
                origin: origin_name,
                destination: destination_name,
                status: BookingStatus::Confirmed,
                discount_type: DiscountType::None,
                total_fare: Decimal::ZERO,
                is_free_ticket: true,
                booked_at: now,
                seats: vec![SeatCharge {
                    seat_id,
                    passenger_name: request.passenger_name.trim().to_string(),
                    category: PassengerCategory::Normal,
                    fare: Decimal::ZERO,
                }],
            })
        }
        .scope_boxed()
    })
    .await
}

/// Register a beneficiary for the free ticket programme. Admin gated at
/// the HTTP layer.
pub async fn register_beneficiary(
    conn: &mut AsyncPgConnection,
    registration_number: &str,
    full_name: &str,
    phone: &str,
    now: DateTime<Utc>,
) -> Result<(), BookingError> {
    let row = BeneficiaryRow {
        registration_number: registration_number.trim().to_string(),
        full_name: full_name.trim().to_string(),
        phone: phone.trim().to_string(),
        ticket_claimed: false,
        claimed_booking: None,
        created_at: now,
    };
    if row.registration_number.is_empty() || row.full_name.is_empty() || row.phone.is_empty() {
        return Err(BookingError::InvalidPassenger(
            "registration number, name and phone are all required".to_string(),
        ));
    }

    diesel::insert_into(crate::schema::roadways::beneficiaries::dsl::beneficiaries)
        .values(&row)
        .execute(conn)
        .await
        .map_err(|err| match err {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => BookingError::DuplicateBeneficiary(row.registration_number.clone()),
            other => BookingError::Storage(other),
        })?;

    Ok(())
}

/// A stored booking with its seats, shaped for responses. Document
/// numbers are masked before they leave the crate.
#[derive(Clone, Debug, Serialize)]
pub struct BookingView {
    pub booking_id: Uuid,
    pub user_id: String,
    pub schedule_id: String,
    pub origin: String,
    pub destination: String,
    pub fare: Decimal,
    pub original_fare: Decimal,
    pub status: BookingStatus,
    pub is_free_ticket: bool,
    pub discount_type: DiscountType,
    pub booked_at: DateTime<Utc>,
    pub seats: Vec<PassengerView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PassengerView {
    pub seat_id: String,
    pub passenger_name: String,
    pub category: PassengerCategory,
    pub document_number: Option<String>,
    pub fare: Decimal,
    pub status: PassengerStatus,
}

pub fn booking_view(
    booking: &BookingRow,
    passengers: &[PassengerDetailRow],
) -> Result<BookingView, BookingError> {
    let mut seats = Vec::with_capacity(passengers.len());
    for passenger in passengers {
        seats.push(PassengerView {
            seat_id: passenger.seat_id.clone(),
            passenger_name: passenger.passenger_name.clone(),
            category: PassengerCategory::from_code(&passenger.category)?,
            document_number: passenger.masked_document(),
            fare: passenger.fare,
            status: PassengerStatus::from_code(&passenger.status)?,
        });
    }
    seats.sort_by(|a, b| a.seat_id.cmp(&b.seat_id));

    Ok(BookingView {
        booking_id: booking.booking_id,
        user_id: booking.user_id.clone(),
        schedule_id: booking.schedule_id.clone(),
        origin: booking.origin.clone(),
        destination: booking.destination.clone(),
        fare: booking.fare,
        original_fare: booking.original_fare,
        status: BookingStatus::from_code(&booking.status)?,
        is_free_ticket: booking.is_free_ticket,
        discount_type: DiscountType::from_code(&booking.discount_type)?,
        booked_at: booking.booked_at,
        seats,
    })
}

pub async fn bookings_for_user(
    conn: &mut AsyncPgConnection,
    user_id: &str,
) -> Result<Vec<BookingView>, BookingError> {
    let booking_rows = crate::schema::roadways::bookings::dsl::bookings
        .filter(crate::schema::roadways::bookings::dsl::user_id.eq(user_id))
        .order(crate::schema::roadways::bookings::dsl::booked_at.desc())
        .select(BookingRow::as_select())
        .load::<BookingRow>(conn)
        .await?;

    let booking_ids: Vec<Uuid> = booking_rows.iter().map(|row| row.booking_id).collect();
    let passenger_rows = crate::schema::roadways::passenger_details::dsl::passenger_details
        .filter(crate::schema::roadways::passenger_details::dsl::booking_id.eq_any(&booking_ids))
        .select(PassengerDetailRow::as_select())
        .load::<PassengerDetailRow>(conn)
        .await?;

    let mut views = Vec::with_capacity(booking_rows.len());
    for booking in &booking_rows {
        let passengers: Vec<PassengerDetailRow> = passenger_rows
            .iter()
            .filter(|row| row.booking_id == booking.booking_id)
            .cloned()
            .collect();
        views.push(booking_view(booking, &passengers)?);
    }
    Ok(views)
}

pub async fn booking_by_id(
    conn: &mut AsyncPgConnection,
    booking_id: Uuid,
) -> Result<BookingView, BookingError> {
    let booking = crate::schema::roadways::bookings::dsl::bookings
        .filter(crate::schema::roadways::bookings::dsl::booking_id.eq(booking_id))
        .select(BookingRow::as_select())
        .first::<BookingRow>(conn)
        .await
        .optional()?;
    let Some(booking) = booking else {
        return Err(BookingError::BookingNotFound);
    };

    let passengers = crate::schema::roadways::passenger_details::dsl::passenger_details
        .filter(crate::schema::roadways::passenger_details::dsl::booking_id.eq(booking_id))
        .select(PassengerDetailRow::as_select())
        .load::<PassengerDetailRow>(conn)
        .await?;

    booking_view(&booking, &passengers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(seat_id: &str, name: &str, category: PassengerCategory, doc: Option<&str>) -> SeatRequest {
        SeatRequest {
            seat_id: seat_id.to_string(),
            passenger_name: name.to_string(),
            category,
            document_number: doc.map(|d| d.to_string()),
        }
    }

    #[test]
    fn normal_passenger_needs_no_document() {
        let seats = vec![seat("A1", "Ram Kumar", PassengerCategory::Normal, None)];
        assert!(validate_passenger_details(&seats).is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let seats = vec![seat("A1", "   ", PassengerCategory::Normal, None)];
        assert!(matches!(
            validate_passenger_details(&seats),
            Err(BookingError::InvalidPassenger(_))
        ));
    }

    #[test]
    fn concession_document_must_be_twelve_digits() {
        let ok = vec![seat(
            "A1",
            "Sita Devi",
            PassengerCategory::Senior,
            Some("123456789012"),
        )];
        assert!(validate_passenger_details(&ok).is_ok());

        let missing = vec![seat("A1", "Sita Devi", PassengerCategory::Senior, None)];
        assert!(validate_passenger_details(&missing).is_err());

        let short = vec![seat(
            "A1",
            "Mohan Lal",
            PassengerCategory::Child,
            Some("12345678901"),
        )];
        assert!(validate_passenger_details(&short).is_err());

        let letters = vec![seat(
            "A1",
            "Mohan Lal",
            PassengerCategory::Child,
            Some("12345678901a"),
        )];
        assert!(validate_passenger_details(&letters).is_err());

        let padded = vec![seat(
            "A1",
            "Sita Devi",
            PassengerCategory::Senior,
            Some(" 123456789012 "),
        )];
        assert!(validate_passenger_details(&padded).is_ok());
    }

    fn free_request(seat_ids: &[&str]) -> FreeBookingRequest {
        FreeBookingRequest {
            user_id: "user9".to_string(),
            schedule_id: "HR-101".to_string(),
            origin: "Rohtak".to_string(),
            destination: "Panipat".to_string(),
            seat_ids: seat_ids.iter().map(|s| s.to_string()).collect(),
            passenger_name: "Shanti Devi".to_string(),
            registration_number: "LADLI-0042".to_string(),
            phone: "9876543210".to_string(),
        }
    }

    #[test]
    fn free_ticket_is_single_seat() {
        assert!(validate_free_request(&free_request(&["A1"])).is_ok());
        assert!(matches!(
            validate_free_request(&free_request(&["A1", "A2"])),
            Err(BookingError::TooManySeats)
        ));
        assert!(matches!(
            validate_free_request(&free_request(&[])),
            Err(BookingError::InvalidPassenger(_))
        ));
    }

    #[test]
    fn free_ticket_needs_proof_fields() {
        let mut request = free_request(&["A1"]);
        request.registration_number = " ".to_string();
        assert!(matches!(
            validate_free_request(&request),
            Err(BookingError::InvalidPassenger(_))
        ));

        let mut request = free_request(&["A1"]);
        request.phone = String::new();
        assert!(validate_free_request(&request).is_err());
    }

    #[test]
    fn booking_view_masks_documents() {
        let booking_id = Uuid::new_v4();
        let booking = BookingRow {
            booking_id,
            user_id: "user1".to_string(),
            schedule_id: "HR-101".to_string(),
            origin: "Rohtak".to_string(),
            destination: "Panipat".to_string(),
            fare: Decimal::from(160),
            original_fare: Decimal::from(160),
            status: "CONFIRMED".to_string(),
            is_free_ticket: false,
            discount_type: "CHILD".to_string(),
            booked_at: Utc::now(),
        };
        let passengers = vec![PassengerDetailRow {
            booking_id,
            seat_id: "A1".to_string(),
            passenger_name: "Mohan Lal".to_string(),
            category: "CHILD".to_string(),
            document_number: Some("123456789012".to_string()),
            fare: Decimal::from(60),
            status: "BOOKED".to_string(),
        }];

        let view = booking_view(&booking, &passengers).unwrap();
        assert_eq!(view.seats[0].document_number.as_deref(), Some("********9012"));
        assert_eq!(view.status, BookingStatus::Confirmed);
        assert_eq!(view.discount_type, DiscountType::Child);
    }

    #[test]
    fn booking_view_rejects_unknown_codes() {
        let booking_id = Uuid::new_v4();
        let booking = BookingRow {
            booking_id,
            user_id: "user1".to_string(),
            schedule_id: "HR-101".to_string(),
            origin: "Rohtak".to_string(),
            destination: "Panipat".to_string(),
            fare: Decimal::from(100),
            original_fare: Decimal::from(100),
            status: "LOST".to_string(),
            is_free_ticket: false,
            discount_type: "NONE".to_string(),
            booked_at: Utc::now(),
        };
        assert!(matches!(
            booking_view(&booking, &[]),
            Err(BookingError::MalformedRow(_))
        ));
    }
}
