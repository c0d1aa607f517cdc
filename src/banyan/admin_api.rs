use actix_web::web::Query;
use actix_web::{HttpResponse, web};
use sarathi::SarathiPostgresPool;
use sarathi::booking;
use sarathi::errors::BookingError;
use sarathi::operators::{load_operator, require_admin};
use sarathi::postgres_tools::acquire;
use sarathi::settings;
use sarathi::settings::SettingsPatch;
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;

// query the client sends to the API
#[derive(Deserialize, Clone)]
struct SettingsQuery {
    operator: String,
}

/// Any known operator may read the settings. Only admins may change them.
#[actix_web::get("/settings")]
pub async fn read_settings(
    pool: web::Data<Arc<SarathiPostgresPool>>,
    query: Query<SettingsQuery>,
) -> Result<HttpResponse, BookingError> {
    let conn_pool = pool.as_ref();
    let conn = &mut acquire(conn_pool).await?;

    if load_operator(conn, &query.operator).await?.is_none() {
        return Err(BookingError::Unauthorized);
    }
    let snapshot = settings::load_settings(conn).await?;

    Ok(HttpResponse::Ok().json(snapshot))
}

#[derive(Deserialize, Clone)]
struct UpdateSettingsBody {
    operator: String,
    #[serde(flatten)]
    patch: SettingsPatch,
}

#[actix_web::post("/settings")]
pub async fn update_settings(
    pool: web::Data<Arc<SarathiPostgresPool>>,
    body: web::Json<UpdateSettingsBody>,
) -> Result<HttpResponse, BookingError> {
    let conn_pool = pool.as_ref();
    let conn = &mut acquire(conn_pool).await?;

    require_admin(conn, &body.operator).await?;
    let snapshot = settings::update_settings(conn, &body.patch, chrono::Utc::now()).await?;

    Ok(HttpResponse::Ok().json(snapshot))
}

#[derive(Deserialize, Clone)]
struct RegisterBeneficiaryBody {
    operator: String,
    registration_number: String,
    full_name: String,
    phone: String,
}

#[derive(Serialize)]
struct BeneficiaryRegistered {
    registration_number: String,
}

#[actix_web::post("/beneficiaries")]
pub async fn register_beneficiary(
    pool: web::Data<Arc<SarathiPostgresPool>>,
    body: web::Json<RegisterBeneficiaryBody>,
) -> Result<HttpResponse, BookingError> {
    let conn_pool = pool.as_ref();
    let conn = &mut acquire(conn_pool).await?;

    require_admin(conn, &body.operator).await?;
    booking::register_beneficiary(
        conn,
        &body.registration_number,
        &body.full_name,
        &body.phone,
        chrono::Utc::now(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(BeneficiaryRegistered {
        registration_number: body.registration_number.trim().to_string(),
    }))
}
