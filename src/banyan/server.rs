// Copyright Sarathi Roadways Platform Team
// Other contributors are in their respective files
// Attribution cannot be removed

#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::arc_with_non_send_sync,
    clippy::single_char_pattern,
    clippy::for_kv_map,
    clippy::let_unit_value,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect,
    clippy::bytes_nth,
    clippy::deprecated_clippy_cfg_attr,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::cmp_null,
    clippy::op_ref,
    clippy::useless_vec
)]

mod admin_api;
mod availability_api;
mod booking_api;
mod cancellation_api;
mod fare_api;
mod revenue_api;
mod schedule_api;
mod tracking_api;

use actix_cors::Cors;
use actix_web::middleware::DefaultHeaders;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, Responder, middleware, web};
use sarathi::postgres_tools::make_async_pool;
use std::sync::Arc;

async fn index(_req: HttpRequest) -> impl Responder {
    HttpResponse::Ok()
        .insert_header(("Content-Type", "text/plain"))
        .body("Hello World from the Sarathi Banyan HTTP endpoint!")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    // Connect to the database.
    let pool = Arc::new(make_async_pool().await.unwrap());

    let builder = HttpServer::new(move || {
        App::new()
            .wrap(
                DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Server", "Sarathi")),
            )
            .wrap(Cors::permissive())
            .wrap(middleware::Compress::default())
            .app_data(actix_web::web::Data::new(Arc::clone(&pool)))
            .route("/", web::get().to(index))
            .service(schedule_api::create_schedule)
            .service(schedule_api::replace_schedule_stops)
            .service(schedule_api::set_schedule_booking)
            .service(schedule_api::list_schedules)
            .service(schedule_api::route_summary)
            .service(availability_api::availability)
            .service(fare_api::fare_quote)
            .service(booking_api::book_seats)
            .service(booking_api::book_free_seat)
            .service(booking_api::bookings_for_user)
            .service(booking_api::booking_by_id)
            .service(cancellation_api::cancel_seats)
            .service(revenue_api::revenue)
            .service(admin_api::read_settings)
            .service(admin_api::update_settings)
            .service(admin_api::register_beneficiary)
            .service(tracking_api::track_bus)
    })
    .workers(8);

    let _ = builder.bind("127.0.0.1:17451").unwrap().run().await;

    Ok(())
}
