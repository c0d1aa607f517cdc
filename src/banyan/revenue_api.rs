use actix_web::web::Query;
use actix_web::{HttpResponse, web};
use sarathi::SarathiPostgresPool;
use sarathi::errors::BookingError;
use sarathi::postgres_tools::acquire;
use sarathi::revenue::revenue_for_operator;
use serde::Deserialize;
use std::sync::Arc;

// query the client sends to the API
#[derive(Deserialize, Clone)]
struct RevenueQuery {
    operator: String,
    district: Option<String>,
}

/// Revenue rollup for the operator console. District scoped operators
/// only see bookings whose route originates in one of their districts.
#[actix_web::get("/revenue")]
pub async fn revenue(
    pool: web::Data<Arc<SarathiPostgresPool>>,
    query: Query<RevenueQuery>,
) -> Result<HttpResponse, BookingError> {
    let conn_pool = pool.as_ref();
    let conn = &mut acquire(conn_pool).await?;

    let report = revenue_for_operator(conn, &query.operator, query.district.as_deref()).await?;

    Ok(HttpResponse::Ok().json(report))
}
