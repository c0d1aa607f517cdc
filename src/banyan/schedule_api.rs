use actix_web::web::Query;
use actix_web::{HttpResponse, web};
use futures::future::join_all;
use sarathi::SarathiPostgresPool;
use sarathi::errors::BookingError;
use sarathi::operators::require_admin;
use sarathi::postgres_tools::acquire;
use sarathi::route_model;
use sarathi::schedule_store;
use sarathi::schedule_store::{ParsedSchedule, ParsedStop};
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;

#[derive(Deserialize, Clone)]
struct CreateScheduleBody {
    operator: String,
    schedule: ParsedSchedule,
}

#[derive(Serialize)]
struct ScheduleWritten {
    schedule_id: String,
}

#[actix_web::post("/schedules")]
pub async fn create_schedule(
    pool: web::Data<Arc<SarathiPostgresPool>>,
    body: web::Json<CreateScheduleBody>,
) -> Result<HttpResponse, BookingError> {
    let conn_pool = pool.as_ref();
    let conn = &mut acquire(conn_pool).await?;

    require_admin(conn, &body.operator).await?;
    schedule_store::create_schedule(conn, &body.schedule, chrono::Utc::now()).await?;

    Ok(HttpResponse::Ok().json(ScheduleWritten {
        schedule_id: body.schedule.schedule_id.trim().to_string(),
    }))
}

#[derive(Deserialize, Clone)]
struct ReplaceStopsBody {
    operator: String,
    schedule_id: String,
    stops: Vec<ParsedStop>,
}

#[actix_web::post("/schedules/replace_stops")]
pub async fn replace_schedule_stops(
    pool: web::Data<Arc<SarathiPostgresPool>>,
    body: web::Json<ReplaceStopsBody>,
) -> Result<HttpResponse, BookingError> {
    let conn_pool = pool.as_ref();
    let conn = &mut acquire(conn_pool).await?;

    require_admin(conn, &body.operator).await?;
    schedule_store::replace_stops(conn, &body.schedule_id, &body.stops).await?;

    Ok(HttpResponse::Ok().json(ScheduleWritten {
        schedule_id: body.schedule_id.clone(),
    }))
}

#[derive(Deserialize, Clone)]
struct SetBookingBody {
    operator: String,
    schedule_id: String,
    booking_enabled: bool,
}

#[actix_web::post("/schedules/set_booking")]
pub async fn set_schedule_booking(
    pool: web::Data<Arc<SarathiPostgresPool>>,
    body: web::Json<SetBookingBody>,
) -> Result<HttpResponse, BookingError> {
    let conn_pool = pool.as_ref();
    let conn = &mut acquire(conn_pool).await?;

    require_admin(conn, &body.operator).await?;
    schedule_store::set_booking_enabled(conn, &body.schedule_id, body.booking_enabled).await?;

    Ok(HttpResponse::Ok().json(ScheduleWritten {
        schedule_id: body.schedule_id.clone(),
    }))
}

#[actix_web::get("/schedules")]
pub async fn list_schedules(
    pool: web::Data<Arc<SarathiPostgresPool>>,
) -> Result<HttpResponse, BookingError> {
    let conn_pool = pool.as_ref();
    let conn = &mut acquire(conn_pool).await?;

    let schedule_rows = schedule_store::list_schedules(conn).await?;

    // load the stop chains in parallel, one pooled connection each
    let mut summary_futures = Vec::with_capacity(schedule_rows.len());
    for schedule in schedule_rows {
        let pool = Arc::clone(conn_pool);
        summary_futures.push(async move {
            let result = match acquire(&pool).await {
                Ok(mut conn) => route_model::route_for_schedule(&mut conn, &schedule)
                    .await
                    .map(|route| route.summary()),
                Err(err) => Err(err),
            };
            (schedule.schedule_id, result)
        });
    }

    let mut summaries = Vec::with_capacity(summary_futures.len());
    for (schedule_id, result) in join_all(summary_futures).await {
        match result {
            Ok(summary) => summaries.push(summary),
            Err(BookingError::ScheduleNotFound) => {
                log::warn!("schedule {schedule_id} has no usable stops, skipping from listing");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(HttpResponse::Ok().json(summaries))
}

// query the client sends to the API
#[derive(Deserialize, Clone)]
struct RouteSummaryQuery {
    schedule_id: String,
}

#[actix_web::get("/route_summary")]
pub async fn route_summary(
    pool: web::Data<Arc<SarathiPostgresPool>>,
    query: Query<RouteSummaryQuery>,
) -> Result<HttpResponse, BookingError> {
    let conn_pool = pool.as_ref();
    let conn = &mut acquire(conn_pool).await?;

    let route = route_model::load_route(conn, &query.schedule_id).await?;

    Ok(HttpResponse::Ok().json(route.summary()))
}
