use actix_web::web::Query;
use actix_web::{HttpResponse, web};
use sarathi::SarathiPostgresPool;
use sarathi::booking;
use sarathi::booking::{FreeBookingRequest, PaidBookingRequest};
use sarathi::errors::BookingError;
use sarathi::postgres_tools::acquire;
use sarathi::settings::load_settings;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[actix_web::post("/bookings")]
pub async fn book_seats(
    pool: web::Data<Arc<SarathiPostgresPool>>,
    body: web::Json<PaidBookingRequest>,
) -> Result<HttpResponse, BookingError> {
    let conn_pool = pool.as_ref();
    let conn = &mut acquire(conn_pool).await?;

    let settings = load_settings(conn).await?;
    let receipt = booking::book_paid(conn, &settings, &body, chrono::Utc::now()).await?;

    Ok(HttpResponse::Ok().json(receipt))
}

#[actix_web::post("/bookings/free")]
pub async fn book_free_seat(
    pool: web::Data<Arc<SarathiPostgresPool>>,
    body: web::Json<FreeBookingRequest>,
) -> Result<HttpResponse, BookingError> {
    let conn_pool = pool.as_ref();
    let conn = &mut acquire(conn_pool).await?;

    let settings = load_settings(conn).await?;
    let receipt = booking::book_free(conn, &settings, &body, chrono::Utc::now()).await?;

    Ok(HttpResponse::Ok().json(receipt))
}

// query the client sends to the API
#[derive(Deserialize, Clone)]
struct BookingHistoryQuery {
    user_id: String,
}

#[actix_web::get("/bookings")]
pub async fn bookings_for_user(
    pool: web::Data<Arc<SarathiPostgresPool>>,
    query: Query<BookingHistoryQuery>,
) -> Result<HttpResponse, BookingError> {
    let conn_pool = pool.as_ref();
    let conn = &mut acquire(conn_pool).await?;

    let views = booking::bookings_for_user(conn, &query.user_id).await?;

    Ok(HttpResponse::Ok().json(views))
}

#[actix_web::get("/bookings/{booking_id}")]
pub async fn booking_by_id(
    pool: web::Data<Arc<SarathiPostgresPool>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, BookingError> {
    let conn_pool = pool.as_ref();
    let conn = &mut acquire(conn_pool).await?;

    let view = booking::booking_by_id(conn, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(view))
}
