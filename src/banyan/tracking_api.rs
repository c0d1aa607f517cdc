use actix_web::error::ErrorBadRequest;
use actix_web::web::Query;
use actix_web::{HttpResponse, web};
use chrono::Timelike;
use sarathi::SarathiPostgresPool;
use sarathi::postgres_tools::acquire;
use sarathi::route_model::load_route;
use sarathi::tracking::{BusPosition, locate_bus};
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;

// query the client sends to the API
#[derive(Deserialize, Clone)]
struct TrackBusQuery {
    schedule_id: String,
    // optional HH:MM, defaults to the current time of day
    at: Option<String>,
}

#[derive(Serialize)]
struct TrackBusResponse {
    schedule_id: String,
    bus_name: String,
    queried_at: String,
    position: BusPosition,
}

/// Timetable interpolated position. There is no live feed; riders see
/// where the bus should be if it is running to schedule.
#[actix_web::get("/track_bus")]
pub async fn track_bus(
    pool: web::Data<Arc<SarathiPostgresPool>>,
    query: Query<TrackBusQuery>,
) -> Result<HttpResponse, actix_web::Error> {
    let time_of_day = match &query.at {
        Some(raw) => sarathi::parse_time_of_day(raw)
            .ok_or_else(|| ErrorBadRequest("at must be HH:MM or HH:MM:SS"))?,
        None => chrono::Utc::now().time().num_seconds_from_midnight() as i32,
    };

    let conn_pool = pool.as_ref();
    let conn = &mut acquire(conn_pool).await?;

    let route = load_route(conn, &query.schedule_id).await?;

    Ok(HttpResponse::Ok().json(TrackBusResponse {
        schedule_id: route.schedule_id.clone(),
        bus_name: route.bus_name.clone(),
        queried_at: sarathi::format_time_of_day(time_of_day),
        position: locate_bus(&route, time_of_day),
    }))
}
