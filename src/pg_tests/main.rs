use chrono::Timelike;
use chrono::Utc;
use diesel_async::AsyncConnection;
use diesel_async::AsyncPgConnection;
use diesel_async::scoped_futures::ScopedFutureExt;
use dotenvy::dotenv;
use rust_decimal::Decimal;
use sarathi::availability::unavailable_seats;
use sarathi::booking;
use sarathi::booking::{FreeBookingRequest, PaidBookingRequest, SeatRequest};
use sarathi::cancellation;
use sarathi::cancellation::CancellationRequest;
use sarathi::codes::{BookingStatus, DiscountType, PassengerCategory};
use sarathi::errors::BookingError;
use sarathi::format_time_of_day;
use sarathi::operators::add_operator;
use sarathi::revenue::revenue_for_operator;
use sarathi::route_model::load_route;
use sarathi::schedule_store::{ParsedSchedule, ParsedStop, create_schedule};
use sarathi::settings::{SettingsPatch, load_settings, seed_default_settings, update_settings};
use std::error::Error;

fn stop(order: i32, name: &str, arrival: Option<i32>, departure: i32, fare: i64) -> ParsedStop {
    ParsedStop {
        stop_order: order,
        stop_name: name.to_string(),
        arrival_time: arrival.map(format_time_of_day),
        departure_time: format_time_of_day(departure),
        fare_from_origin: Decimal::from(fare),
    }
}

fn seat(
    seat_id: &str,
    name: &str,
    category: PassengerCategory,
    document: Option<&str>,
) -> SeatRequest {
    SeatRequest {
        seat_id: seat_id.to_string(),
        passenger_name: name.to_string(),
        category,
        document_number: document.map(str::to_string),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + std::marker::Send + Sync>> {
    dotenv().ok();
    // round trip against a live database: schedule upload, paid and free
    // booking, seat conflict, cancellation, revenue

    let mut conn = AsyncPgConnection::establish(&std::env::var("DATABASE_URL")?).await?;

    conn.test_transaction::<_, BookingError, _>(|conn| {
        async move {
            let now = Utc::now();
            // departure three hours out keeps the cancellation window open
            // no matter what wall clock time the test runs at
            let base = now.time().num_seconds_from_midnight() as i32;

            let parsed = ParsedSchedule {
                schedule_id: "HR-SMOKE-101".to_string(),
                bus_name: "Rohtak Chandigarh Express".to_string(),
                seat_layout: sarathi::seat_layout::SeatLayout::TwoByTwo,
                booking_enabled: true,
                stops: vec![
                    stop(0, "Rohtak", None, base + 3 * 3600, 0),
                    stop(1, "Gohana", Some(base + 13500), base + 13800, 50),
                    stop(2, "Panipat", Some(base + 16200), base + 16800, 100),
                    stop(3, "Chandigarh", Some(base + 27000), base + 27000, 250),
                ],
            };
            create_schedule(conn, &parsed, now).await?;
            println!("Created schedule HR-SMOKE-101");

            let route = load_route(conn, "HR-SMOKE-101").await?;
            assert_eq!(route.summary().total_fare, Decimal::from(250));

            seed_default_settings(conn, now).await?;
            // both keys of the patch must land together
            let patch = SettingsPatch {
                child_discount_percent: Some(25),
                discount_districts: Some(vec!["Rohtak".to_string()]),
                ..SettingsPatch::default()
            };
            let settings = update_settings(conn, &patch, now).await?;
            assert!(settings.discount_districts.contains("rohtak"));
            assert_eq!(settings.child_discount_percent, 25);

            // a rejected patch must leave every key as it was, including
            // the valid ones it carried
            let rejected = update_settings(
                conn,
                &SettingsPatch {
                    booking_online: Some(false),
                    child_discount_percent: Some(250),
                    ..SettingsPatch::default()
                },
                now,
            )
            .await;
            assert!(matches!(rejected, Err(BookingError::InvalidSetting(_))));
            let settings = load_settings(conn).await?;
            assert!(settings.booking_online);
            assert_eq!(settings.child_discount_percent, 25);
            println!("Settings patch applied atomically");

            let first = booking::book_paid(
                conn,
                &settings,
                &PaidBookingRequest {
                    user_id: "9876500001".to_string(),
                    schedule_id: "HR-SMOKE-101".to_string(),
                    origin: "Rohtak".to_string(),
                    destination: "Panipat".to_string(),
                    seats: vec![
                        seat("A1", "Mahesh Kumar", PassengerCategory::Normal, None),
                        seat(
                            "B1",
                            "Shanti Devi",
                            PassengerCategory::Senior,
                            Some("123456789012"),
                        ),
                    ],
                },
                now,
            )
            .await?;
            assert_eq!(first.total_fare, Decimal::from(150));
            assert_eq!(first.discount_type, DiscountType::Senior);
            println!(
                "Booked A1 and B1 Rohtak to Panipat for {}",
                first.total_fare
            );

            // A1 is committed across Gohana, so an overlapping segment must
            // be refused
            let conflict = booking::book_paid(
                conn,
                &settings,
                &PaidBookingRequest {
                    user_id: "9876500002".to_string(),
                    schedule_id: "HR-SMOKE-101".to_string(),
                    origin: "Gohana".to_string(),
                    destination: "Chandigarh".to_string(),
                    seats: vec![seat("A1", "Rekha Rani", PassengerCategory::Normal, None)],
                },
                now,
            )
            .await;
            assert!(matches!(
                conflict,
                Err(BookingError::SeatConflict(ref seats)) if seats.contains(&"A1".to_string())
            ));
            println!("Overlapping booking for A1 refused");

            // the same seat past Panipat does not overlap
            let second = booking::book_paid(
                conn,
                &settings,
                &PaidBookingRequest {
                    user_id: "9876500002".to_string(),
                    schedule_id: "HR-SMOKE-101".to_string(),
                    origin: "Panipat".to_string(),
                    destination: "Chandigarh".to_string(),
                    seats: vec![seat("A1", "Rekha Rani", PassengerCategory::Normal, None)],
                },
                now,
            )
            .await?;
            assert_eq!(second.total_fare, Decimal::from(150));
            println!("Booked A1 Panipat to Chandigarh");

            let blocked =
                unavailable_seats(conn, "HR-SMOKE-101", "Rohtak", "Panipat", now).await?;
            assert!(blocked.contains("A1"));
            assert!(blocked.contains("B1"));

            let outcome = cancellation::cancel_seats(
                conn,
                &settings,
                &CancellationRequest {
                    booking_id: first.booking_id,
                    seat_ids: vec!["A1".to_string()],
                },
                now,
            )
            .await?;
            assert_eq!(outcome.refund_amount, Decimal::from(100));
            assert_eq!(outcome.remaining_fare, Decimal::from(50));
            assert_eq!(outcome.status, BookingStatus::PartiallyCancelled);
            println!("Cancelled A1, refunded {}", outcome.refund_amount);

            let blocked =
                unavailable_seats(conn, "HR-SMOKE-101", "Rohtak", "Panipat", now).await?;
            assert!(!blocked.contains("A1"));
            assert!(blocked.contains("B1"));

            booking::register_beneficiary(conn, "HR-BEN-0001", "Tara Devi", "9876511111", now)
                .await?;
            let free = booking::book_free(
                conn,
                &settings,
                &FreeBookingRequest {
                    user_id: "9876500003".to_string(),
                    schedule_id: "HR-SMOKE-101".to_string(),
                    origin: "Rohtak".to_string(),
                    destination: "Chandigarh".to_string(),
                    seat_ids: vec!["C1".to_string()],
                    passenger_name: "Tara Devi".to_string(),
                    registration_number: "HR-BEN-0001".to_string(),
                    phone: "9876511111".to_string(),
                },
                now,
            )
            .await?;
            assert_eq!(free.total_fare, Decimal::ZERO);
            assert!(free.is_free_ticket);
            println!("Free ticket issued on C1");

            let second_claim = booking::book_free(
                conn,
                &settings,
                &FreeBookingRequest {
                    user_id: "9876500004".to_string(),
                    schedule_id: "HR-SMOKE-101".to_string(),
                    origin: "Rohtak".to_string(),
                    destination: "Chandigarh".to_string(),
                    seat_ids: vec!["D1".to_string()],
                    passenger_name: "Tara Devi".to_string(),
                    registration_number: "HR-BEN-0001".to_string(),
                    phone: "9876511111".to_string(),
                },
                now,
            )
            .await;
            assert!(matches!(second_claim, Err(BookingError::AlreadyClaimed)));

            add_operator(conn, "control_room", "Control Room", true, vec![]).await?;
            add_operator(
                conn,
                "rohtak_depot",
                "Rohtak Depot",
                false,
                vec!["Rohtak".to_string()],
            )
            .await?;

            let report = revenue_for_operator(conn, "control_room", None).await?;
            assert_eq!(report.summary.booked_amount, Decimal::from(300));
            assert_eq!(report.summary.cancelled_amount, Decimal::from(100));
            assert_eq!(report.summary.net_amount, Decimal::from(200));
            println!(
                "Revenue booked {} cancelled {} net {}",
                report.summary.booked_amount,
                report.summary.cancelled_amount,
                report.summary.net_amount
            );

            let scoped = revenue_for_operator(conn, "rohtak_depot", None).await?;
            assert_eq!(scoped.summary.booked_amount, Decimal::from(150));
            assert_eq!(scoped.summary.net_amount, Decimal::from(50));

            let refused = revenue_for_operator(conn, "rohtak_depot", Some("Panipat")).await;
            assert!(matches!(refused, Err(BookingError::Unauthorized)));

            let history = booking::bookings_for_user(conn, "9876500001").await?;
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].status, BookingStatus::PartiallyCancelled);

            println!("All live database checks passed");
            Ok(())
        }
        .scope_boxed()
    })
    .await;

    Ok(())
}
