use actix_web::{HttpResponse, web};
use sarathi::SarathiPostgresPool;
use sarathi::cancellation;
use sarathi::cancellation::CancellationRequest;
use sarathi::errors::BookingError;
use sarathi::postgres_tools::acquire;
use sarathi::settings::load_settings;
use std::sync::Arc;

#[actix_web::post("/cancellations")]
pub async fn cancel_seats(
    pool: web::Data<Arc<SarathiPostgresPool>>,
    body: web::Json<CancellationRequest>,
) -> Result<HttpResponse, BookingError> {
    let conn_pool = pool.as_ref();
    let conn = &mut acquire(conn_pool).await?;

    let settings = load_settings(conn).await?;
    let outcome = cancellation::cancel_seats(conn, &settings, &body, chrono::Utc::now()).await?;

    Ok(HttpResponse::Ok().json(outcome))
}
