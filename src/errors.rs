//! Error taxonomy for the booking engine. Every fallible operation in the
//! crate surfaces one of these variants; the HTTP layer maps them onto
//! status codes through `ResponseError` so handlers can just use `?`.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("origin and destination do not form a valid forward segment on this route")]
    InvalidSegment,
    #[error("seats are no longer available for this segment: {}", .0.join(", "))]
    SeatConflict(Vec<String>),
    #[error("invalid passenger details: {0}")]
    InvalidPassenger(String),
    #[error("seat {0} does not exist in this coach layout")]
    InvalidSeat(String),
    #[error("free tickets cover exactly one seat")]
    TooManySeats,
    #[error("{0} is currently switched off")]
    FeatureDisabled(&'static str),
    #[error("no matching beneficiary registration was found")]
    EligibilityNotFound,
    #[error("this beneficiary registration has already claimed its ticket")]
    AlreadyClaimed,
    #[error("beneficiary registration {0} already exists")]
    DuplicateBeneficiary(String),
    #[error("the cancellation window for this booking has closed")]
    WindowClosed,
    #[error("booking is already fully cancelled")]
    AlreadyCancelled,
    #[error("none of the requested seats were cancellable")]
    NothingToCancel,
    #[error("booking not found")]
    BookingNotFound,
    #[error("schedule {0} already exists")]
    DuplicateSchedule(String),
    #[error("schedule not found")]
    ScheduleNotFound,
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
    #[error("invalid setting: {0}")]
    InvalidSetting(String),
    #[error("operator is not authorised for this operation")]
    Unauthorized,
    #[error("malformed row in storage: {0}")]
    MalformedRow(String),
    #[error("database error: {0}")]
    Storage(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(String),
}

impl BookingError {
    /// Stable machine readable code, independent of the display text.
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::InvalidSegment => "InvalidSegment",
            BookingError::SeatConflict(_) => "SeatConflict",
            BookingError::InvalidPassenger(_) => "InvalidPassenger",
            BookingError::InvalidSeat(_) => "InvalidSeat",
            BookingError::TooManySeats => "TooManySeats",
            BookingError::FeatureDisabled(_) => "FeatureDisabled",
            BookingError::EligibilityNotFound => "EligibilityNotFound",
            BookingError::AlreadyClaimed => "AlreadyClaimed",
            BookingError::DuplicateBeneficiary(_) => "DuplicateBeneficiary",
            BookingError::WindowClosed => "WindowClosed",
            BookingError::AlreadyCancelled => "AlreadyCancelled",
            BookingError::NothingToCancel => "NothingToCancel",
            BookingError::BookingNotFound => "BookingNotFound",
            BookingError::DuplicateSchedule(_) => "DuplicateSchedule",
            BookingError::ScheduleNotFound => "ScheduleNotFound",
            BookingError::InvalidSchedule(_) => "InvalidSchedule",
            BookingError::InvalidSetting(_) => "InvalidSetting",
            BookingError::Unauthorized => "Unauthorized",
            BookingError::MalformedRow(_) => "MalformedRow",
            BookingError::Storage(_) => "Storage",
            BookingError::Pool(_) => "Pool",
        }
    }

    /// Whether a caller may retry the same request unchanged. Conflict
    /// style failures clear once the contended seats change hands;
    /// validation failures never will.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BookingError::SeatConflict(_) | BookingError::Storage(_) | BookingError::Pool(_)
        )
    }
}

impl actix_web::ResponseError for BookingError {
    fn status_code(&self) -> StatusCode {
        match self {
            BookingError::InvalidSegment
            | BookingError::InvalidPassenger(_)
            | BookingError::InvalidSeat(_)
            | BookingError::TooManySeats
            | BookingError::NothingToCancel
            | BookingError::InvalidSchedule(_)
            | BookingError::InvalidSetting(_) => StatusCode::BAD_REQUEST,
            BookingError::SeatConflict(_)
            | BookingError::AlreadyClaimed
            | BookingError::DuplicateBeneficiary(_)
            | BookingError::WindowClosed
            | BookingError::AlreadyCancelled
            | BookingError::DuplicateSchedule(_) => StatusCode::CONFLICT,
            BookingError::EligibilityNotFound
            | BookingError::BookingNotFound
            | BookingError::ScheduleNotFound => StatusCode::NOT_FOUND,
            BookingError::FeatureDisabled(_) | BookingError::Unauthorized => {
                StatusCode::FORBIDDEN
            }
            BookingError::MalformedRow(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BookingError::Storage(_) | BookingError::Pool(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
            "retryable": self.is_retryable(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn conflict_errors_are_retryable() {
        assert!(BookingError::SeatConflict(vec!["A1".to_string()]).is_retryable());
        assert!(!BookingError::InvalidSegment.is_retryable());
        assert!(!BookingError::InvalidPassenger("no name".to_string()).is_retryable());
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            BookingError::SeatConflict(vec![]).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            BookingError::ScheduleNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BookingError::FeatureDisabled("cancellation").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            BookingError::InvalidSetting("percent".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn seat_conflict_lists_seats() {
        let err = BookingError::SeatConflict(vec!["A1".to_string(), "B2".to_string()]);
        assert!(err.to_string().contains("A1, B2"));
    }
}
