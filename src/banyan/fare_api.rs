use actix_web::web::Query;
use actix_web::{HttpResponse, web};
use sarathi::SarathiPostgresPool;
use sarathi::errors::BookingError;
use sarathi::fares;
use sarathi::fares::FareQuote;
use sarathi::postgres_tools::acquire;
use sarathi::route_model::load_route;
use sarathi::settings::load_settings;
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;

// query the client sends to the API
#[derive(Deserialize, Clone)]
struct FareQuoteQuery {
    schedule_id: String,
    origin: String,
    destination: String,
}

#[derive(Serialize)]
struct FareQuoteResponse {
    schedule_id: String,
    bus_name: String,
    quote: FareQuote,
}

#[actix_web::get("/fare_quote")]
pub async fn fare_quote(
    pool: web::Data<Arc<SarathiPostgresPool>>,
    query: Query<FareQuoteQuery>,
) -> Result<HttpResponse, BookingError> {
    let conn_pool = pool.as_ref();
    let conn = &mut acquire(conn_pool).await?;

    let route = load_route(conn, &query.schedule_id).await?;
    let segment = route.resolve_segment(&query.origin, &query.destination)?;
    let settings = load_settings(conn).await?;

    Ok(HttpResponse::Ok().json(FareQuoteResponse {
        schedule_id: route.schedule_id.clone(),
        bus_name: route.bus_name.clone(),
        quote: fares::quote(&route, &settings, segment),
    }))
}
