//! Fare computation. Base fares come off the route's cumulative fare
//! column; concession discounts apply per seat, gated on the global
//! toggle and on the schedule's origin district.

use crate::codes::PassengerCategory;
use crate::route_model::Route;
use crate::settings::SettingsSnapshot;
use rust_decimal::Decimal;
use serde::Serialize;

/// Whether concession fares apply to this schedule at all. Both the
/// global discount toggle and the origin district gate must pass; the
/// gate looks at the route's own origin, not the passenger's boarding
/// stop.
pub fn discounts_active(route: &Route, settings: &SettingsSnapshot) -> bool {
    settings.discounts_enabled && settings.district_active(&route.origin().name)
}

fn discounted(base: Decimal, percent: u32) -> Decimal {
    let keep = Decimal::from(100 - percent.min(100));
    (base * keep / Decimal::from(100)).round_dp(2)
}

/// Price one seat over a resolved segment. `Normal` passengers always
/// pay the base fare regardless of any toggle state.
pub fn price_segment(
    route: &Route,
    settings: &SettingsSnapshot,
    segment: (usize, usize),
    category: PassengerCategory,
) -> Decimal {
    let base = route.segment_fare(segment.0, segment.1);

    if category == PassengerCategory::Normal || !discounts_active(route, settings) {
        return base;
    }

    match settings.discount_percent(category) {
        Some(percent) => discounted(base, percent),
        None => base,
    }
}

/// Everything the booking page needs to show prices for one segment.
#[derive(Clone, Debug, Serialize)]
pub struct FareQuote {
    pub origin: String,
    pub destination: String,
    pub base_fare: Decimal,
    pub normal_fare: Decimal,
    pub child_fare: Decimal,
    pub senior_fare: Decimal,
    pub discounts_active: bool,
}

pub fn quote(route: &Route, settings: &SettingsSnapshot, segment: (usize, usize)) -> FareQuote {
    FareQuote {
        origin: route.stops()[segment.0].name.clone(),
        destination: route.stops()[segment.1].name.clone(),
        base_fare: route.segment_fare(segment.0, segment.1),
        normal_fare: price_segment(route, settings, segment, PassengerCategory::Normal),
        child_fare: price_segment(route, settings, segment, PassengerCategory::Child),
        senior_fare: price_segment(route, settings, segment, PassengerCategory::Senior),
        discounts_active: discounts_active(route, settings),
    }
}
