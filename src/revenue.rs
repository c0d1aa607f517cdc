//! Revenue reporting over paid bookings. Free tickets never count.
//! Every bucket carries its own booked, cancelled and net figures,
//! computed from the seat rows in that bucket rather than distributed
//! from the overall total.

use crate::codes::PassengerCategory;
use crate::codes::PassengerStatus;
use crate::errors::BookingError;
use crate::models::BookingRow;
use crate::models::PassengerDetailRow;
use crate::normalize_stop_name;
use crate::operators::load_operator;
use diesel::prelude::*;
use diesel_async::AsyncPgConnection;
use diesel_async::RunQueryDsl;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// What slice of the network an operator may see.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevenueScope {
    All,
    /// Normalised district names.
    Districts(Vec<String>),
}

impl RevenueScope {
    pub fn allows_district(&self, district: &str) -> bool {
        match self {
            RevenueScope::All => true,
            RevenueScope::Districts(districts) => {
                districts.contains(&normalize_stop_name(district))
            }
        }
    }

    fn allows_booking(&self, booking: &BookingRow) -> bool {
        self.allows_district(&booking.origin)
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct RevenueLine {
    pub booked_amount: Decimal,
    pub booked_tickets: u64,
    pub cancelled_amount: Decimal,
    pub cancelled_tickets: u64,
    pub net_amount: Decimal,
}

impl RevenueLine {
    /// Gross side: every seat ever sold counts here, including seats
    /// that were later cancelled.
    fn add_seat(&mut self, fare: Decimal, status: PassengerStatus) {
        self.booked_amount += fare;
        self.booked_tickets += 1;
        if status == PassengerStatus::Cancelled {
            self.cancelled_amount += fare;
            self.cancelled_tickets += 1;
        }
        self.net_amount = self.booked_amount - self.cancelled_amount;
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RevenueReport {
    pub summary: RevenueLine,
    pub by_category: BTreeMap<String, RevenueLine>,
    pub by_district: BTreeMap<String, RevenueLine>,
    pub by_route: BTreeMap<String, RevenueLine>,
}

/// Fold paid bookings and their seat rows into a report. Free ticket
/// bookings are skipped even if a caller passes them in.
pub fn fold_report(
    bookings: &[BookingRow],
    passengers: &[PassengerDetailRow],
) -> Result<RevenueReport, BookingError> {
    let mut by_booking: BTreeMap<Uuid, &BookingRow> = BTreeMap::new();
    for booking in bookings {
        if !booking.is_free_ticket {
            by_booking.insert(booking.booking_id, booking);
        }
    }

    let mut summary = RevenueLine::default();
    let mut by_category: BTreeMap<String, RevenueLine> = BTreeMap::new();
    let mut by_district: BTreeMap<String, RevenueLine> = BTreeMap::new();
    let mut by_route: BTreeMap<String, RevenueLine> = BTreeMap::new();

    for passenger in passengers {
        let Some(booking) = by_booking.get(&passenger.booking_id) else {
            continue;
        };
        let status = PassengerStatus::from_code(&passenger.status)?;
        let category = PassengerCategory::from_code(&passenger.category)?;

        summary.add_seat(passenger.fare, status);
        by_category
            .entry(category.as_code().to_string())
            .or_default()
            .add_seat(passenger.fare, status);
        by_district
            .entry(booking.origin.clone())
            .or_default()
            .add_seat(passenger.fare, status);
        by_route
            .entry(booking.schedule_id.clone())
            .or_default()
            .add_seat(passenger.fare, status);
    }

    Ok(RevenueReport {
        summary,
        by_category,
        by_district,
        by_route,
    })
}

/// Build the report visible to a given scope, optionally narrowed to one
/// district. Asking for a district outside the scope is refused rather
/// than silently emptied.
pub async fn revenue_report(
    conn: &mut AsyncPgConnection,
    scope: &RevenueScope,
    district_filter: Option<&str>,
) -> Result<RevenueReport, BookingError> {
    if let Some(district) = district_filter {
        if !scope.allows_district(district) {
            return Err(BookingError::Unauthorized);
        }
    }

    let booking_rows = crate::schema::roadways::bookings::dsl::bookings
        .filter(crate::schema::roadways::bookings::dsl::is_free_ticket.eq(false))
        .select(BookingRow::as_select())
        .load::<BookingRow>(conn)
        .await?;

    let visible: Vec<BookingRow> = booking_rows
        .into_iter()
        .filter(|booking| scope.allows_booking(booking))
        .filter(|booking| match district_filter {
            Some(district) => {
                normalize_stop_name(&booking.origin) == normalize_stop_name(district)
            }
            None => true,
        })
        .collect();

    let booking_ids: Vec<Uuid> = visible.iter().map(|booking| booking.booking_id).collect();
    let passenger_rows = crate::schema::roadways::passenger_details::dsl::passenger_details
        .filter(crate::schema::roadways::passenger_details::dsl::booking_id.eq_any(&booking_ids))
        .select(PassengerDetailRow::as_select())
        .load::<PassengerDetailRow>(conn)
        .await?;

    fold_report(&visible, &passenger_rows)
}

/// Entry point for the console: resolves the operator, derives their
/// scope and builds the report. Unknown operators get `Unauthorized`.
pub async fn revenue_for_operator(
    conn: &mut AsyncPgConnection,
    username: &str,
    district_filter: Option<&str>,
) -> Result<RevenueReport, BookingError> {
    let Some(operator) = load_operator(conn, username).await? else {
        return Err(BookingError::Unauthorized);
    };
    let scope = match operator.district_scope() {
        None => RevenueScope::All,
        Some(districts) => RevenueScope::Districts(districts),
    };
    revenue_report(conn, &scope, district_filter).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn booking(id_byte: u8, schedule_id: &str, origin: &str, free: bool) -> BookingRow {
        BookingRow {
            booking_id: Uuid::from_bytes([id_byte; 16]),
            user_id: "user1".to_string(),
            schedule_id: schedule_id.to_string(),
            origin: origin.to_string(),
            destination: "Chandigarh".to_string(),
            fare: Decimal::ZERO,
            original_fare: Decimal::ZERO,
            status: "CONFIRMED".to_string(),
            is_free_ticket: free,
            discount_type: "NONE".to_string(),
            booked_at: Utc::now(),
        }
    }

    fn passenger(
        booking_byte: u8,
        seat_id: &str,
        category: &str,
        fare: i64,
        status: &str,
    ) -> PassengerDetailRow {
        PassengerDetailRow {
            booking_id: Uuid::from_bytes([booking_byte; 16]),
            seat_id: seat_id.to_string(),
            passenger_name: "Ram Kumar".to_string(),
            category: category.to_string(),
            document_number: None,
            fare: Decimal::from(fare),
            status: status.to_string(),
        }
    }

    #[test]
    fn gross_refund_and_net_per_bucket() {
        let bookings = vec![booking(1, "HR-101", "Rohtak", false)];
        let passengers = vec![
            passenger(1, "A1", "NORMAL", 100, "BOOKED"),
            passenger(1, "A2", "CHILD", 60, "CANCELLED"),
        ];

        let report = fold_report(&bookings, &passengers).unwrap();

        assert_eq!(report.summary.booked_amount, Decimal::from(160));
        assert_eq!(report.summary.booked_tickets, 2);
        assert_eq!(report.summary.cancelled_amount, Decimal::from(60));
        assert_eq!(report.summary.cancelled_tickets, 1);
        assert_eq!(report.summary.net_amount, Decimal::from(100));

        let child = report.by_category.get("CHILD").unwrap();
        assert_eq!(child.booked_amount, Decimal::from(60));
        assert_eq!(child.net_amount, Decimal::ZERO);

        let normal = report.by_category.get("NORMAL").unwrap();
        assert_eq!(normal.net_amount, Decimal::from(100));
    }

    #[test]
    fn free_tickets_never_count() {
        let bookings = vec![
            booking(1, "HR-101", "Rohtak", false),
            booking(2, "HR-101", "Rohtak", true),
        ];
        let passengers = vec![
            passenger(1, "A1", "NORMAL", 100, "BOOKED"),
            passenger(2, "B1", "NORMAL", 0, "BOOKED"),
        ];

        let report = fold_report(&bookings, &passengers).unwrap();
        assert_eq!(report.summary.booked_tickets, 1);
        assert_eq!(report.summary.booked_amount, Decimal::from(100));
    }

    #[test]
    fn buckets_split_by_district_and_route() {
        let bookings = vec![
            booking(1, "HR-101", "Rohtak", false),
            booking(2, "HR-202", "Sonipat", false),
        ];
        let passengers = vec![
            passenger(1, "A1", "NORMAL", 100, "BOOKED"),
            passenger(2, "A1", "SENIOR", 50, "BOOKED"),
        ];

        let report = fold_report(&bookings, &passengers).unwrap();

        assert_eq!(report.by_district.len(), 2);
        assert_eq!(
            report.by_district.get("Rohtak").unwrap().booked_amount,
            Decimal::from(100)
        );
        assert_eq!(
            report.by_route.get("HR-202").unwrap().booked_amount,
            Decimal::from(50)
        );
    }

    #[test]
    fn scope_membership() {
        let scope = RevenueScope::Districts(vec!["rohtak".to_string()]);
        assert!(scope.allows_district("Rohtak"));
        assert!(scope.allows_district(" ROHTAK "));
        assert!(!scope.allows_district("Sonipat"));
        assert!(RevenueScope::All.allows_district("anything"));
    }

    #[test]
    fn unknown_category_code_is_malformed() {
        let bookings = vec![booking(1, "HR-101", "Rohtak", false)];
        let passengers = vec![passenger(1, "A1", "STAFF", 10, "BOOKED")];
        assert!(matches!(
            fold_report(&bookings, &passengers),
            Err(BookingError::MalformedRow(_))
        ));
    }
}
