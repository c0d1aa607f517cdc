use actix_web::web::Query;
use actix_web::{HttpResponse, web};
use sarathi::SarathiPostgresPool;
use sarathi::availability::unavailable_for_route;
use sarathi::errors::BookingError;
use sarathi::postgres_tools::acquire;
use sarathi::route_model::load_route;
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;

// query the client sends to the API
#[derive(Deserialize, Clone)]
struct AvailabilityQuery {
    schedule_id: String,
    origin: String,
    destination: String,
}

#[derive(Serialize)]
struct AvailabilityResponse {
    schedule_id: String,
    origin: String,
    destination: String,
    seat_layout: String,
    seat_capacity: u32,
    seats: Vec<String>,
    unavailable_seats: Vec<String>,
    available_count: usize,
}

/// Seats already committed on any segment that overlaps the requested
/// one. The client greys these out on the seat map.
#[actix_web::get("/availability")]
pub async fn availability(
    pool: web::Data<Arc<SarathiPostgresPool>>,
    query: Query<AvailabilityQuery>,
) -> Result<HttpResponse, BookingError> {
    let conn_pool = pool.as_ref();
    let conn = &mut acquire(conn_pool).await?;

    let route = load_route(conn, &query.schedule_id).await?;
    let segment = route.resolve_segment(&query.origin, &query.destination)?;
    let unavailable = unavailable_for_route(conn, &route, segment, chrono::Utc::now()).await?;

    let capacity = route.seat_layout.capacity();
    let response = AvailabilityResponse {
        schedule_id: route.schedule_id.clone(),
        origin: route.stops()[segment.0].name.clone(),
        destination: route.stops()[segment.1].name.clone(),
        seat_layout: route.seat_layout.tag().to_string(),
        seat_capacity: capacity,
        seats: route.seat_layout.seat_ids(),
        available_count: capacity as usize - unavailable.len(),
        unavailable_seats: unavailable.into_iter().collect(),
    };

    Ok(HttpResponse::Ok().json(response))
}
