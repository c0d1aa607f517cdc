//! Operator controlled runtime settings. Stored as one row per key so a
//! toggle can be flipped without a deploy; loaded into an immutable
//! snapshot at the top of each request so one request never sees two
//! different configurations.

use crate::errors::BookingError;
use crate::models::SystemSettingRow;
use crate::normalize_stop_name;
use chrono::DateTime;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::AsyncConnection;
use diesel_async::AsyncPgConnection;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;

pub const KEY_BOOKING_ONLINE: &str = "booking_online";
pub const KEY_FREE_BOOKING_ENABLED: &str = "free_booking_enabled";
pub const KEY_CANCELLATION_ENABLED: &str = "cancellation_enabled";
pub const KEY_DISCOUNTS_ENABLED: &str = "discounts_enabled";
pub const KEY_CHILD_DISCOUNT_PERCENT: &str = "child_discount_percent";
pub const KEY_SENIOR_DISCOUNT_PERCENT: &str = "senior_discount_percent";
pub const KEY_DISCOUNT_DISTRICTS: &str = "discount_districts";

pub const DEFAULT_CHILD_DISCOUNT_PERCENT: u32 = 40;
pub const DEFAULT_SENIOR_DISCOUNT_PERCENT: u32 = 50;

/// Point in time view of every setting the engines read. Handed into the
/// booking, cancellation and fare paths rather than re-read inside them.
#[derive(Clone, Debug, Serialize)]
pub struct SettingsSnapshot {
    pub booking_online: bool,
    pub free_booking_enabled: bool,
    pub cancellation_enabled: bool,
    pub discounts_enabled: bool,
    pub child_discount_percent: u32,
    pub senior_discount_percent: u32,
    /// District names, stored normalised. A schedule's origin stop must
    /// sit in this set for concession fares to apply.
    pub discount_districts: BTreeSet<String>,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        SettingsSnapshot {
            booking_online: true,
            free_booking_enabled: true,
            cancellation_enabled: true,
            discounts_enabled: true,
            child_discount_percent: DEFAULT_CHILD_DISCOUNT_PERCENT,
            senior_discount_percent: DEFAULT_SENIOR_DISCOUNT_PERCENT,
            discount_districts: BTreeSet::new(),
        }
    }
}

impl SettingsSnapshot {
    pub fn district_active(&self, origin_name: &str) -> bool {
        self.discount_districts
            .contains(&normalize_stop_name(origin_name))
    }

    pub fn discount_percent(&self, category: crate::codes::PassengerCategory) -> Option<u32> {
        match category {
            crate::codes::PassengerCategory::Normal => None,
            crate::codes::PassengerCategory::Child => Some(self.child_discount_percent),
            crate::codes::PassengerCategory::Senior => Some(self.senior_discount_percent),
        }
    }

    fn apply_row(&mut self, row: &SystemSettingRow) {
        match row.setting_name.as_str() {
            KEY_BOOKING_ONLINE => apply_bool(&mut self.booking_online, row),
            KEY_FREE_BOOKING_ENABLED => apply_bool(&mut self.free_booking_enabled, row),
            KEY_CANCELLATION_ENABLED => apply_bool(&mut self.cancellation_enabled, row),
            KEY_DISCOUNTS_ENABLED => apply_bool(&mut self.discounts_enabled, row),
            KEY_CHILD_DISCOUNT_PERCENT => apply_percent(&mut self.child_discount_percent, row),
            KEY_SENIOR_DISCOUNT_PERCENT => apply_percent(&mut self.senior_discount_percent, row),
            KEY_DISCOUNT_DISTRICTS => match serde_json::from_str::<Vec<String>>(&row.setting_value)
            {
                Ok(names) => {
                    self.discount_districts = names
                        .iter()
                        .map(|name| normalize_stop_name(name))
                        .filter(|name| !name.is_empty())
                        .collect();
                }
                Err(err) => {
                    log::warn!("ignoring malformed {} value: {err}", row.setting_name);
                }
            },
            other => {
                log::warn!("ignoring unknown setting {other}");
            }
        }
    }
}

fn apply_bool(target: &mut bool, row: &SystemSettingRow) {
    match row.setting_value.as_str() {
        "true" => *target = true,
        "false" => *target = false,
        other => log::warn!("ignoring malformed {} value {other}", row.setting_name),
    }
}

fn apply_percent(target: &mut u32, row: &SystemSettingRow) {
    match row.setting_value.parse::<u32>() {
        Ok(percent) if percent <= 100 => *target = percent,
        _ => log::warn!(
            "ignoring malformed {} value {}",
            row.setting_name,
            row.setting_value
        ),
    }
}

/// Build a snapshot from whatever rows exist. Missing keys keep their
/// defaults, unparseable values are logged and skipped.
pub fn snapshot_from_rows(rows: &[SystemSettingRow]) -> SettingsSnapshot {
    let mut snapshot = SettingsSnapshot::default();
    for row in rows {
        snapshot.apply_row(row);
    }
    snapshot
}

pub async fn load_settings(conn: &mut AsyncPgConnection) -> Result<SettingsSnapshot, BookingError> {
    let rows = crate::schema::roadways::system_settings::dsl::system_settings
        .select(SystemSettingRow::as_select())
        .load::<SystemSettingRow>(conn)
        .await?;

    Ok(snapshot_from_rows(&rows))
}

/// Partial update from the operator console. Only the supplied fields
/// change; percentages outside 0 to 100 are rejected, never clamped.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SettingsPatch {
    pub booking_online: Option<bool>,
    pub free_booking_enabled: Option<bool>,
    pub cancellation_enabled: Option<bool>,
    pub discounts_enabled: Option<bool>,
    pub child_discount_percent: Option<u32>,
    pub senior_discount_percent: Option<u32>,
    pub discount_districts: Option<Vec<String>>,
}

impl SettingsPatch {
    /// Render the patch into key value pairs, validating before anything
    /// is written.
    pub fn to_rows(&self, now: DateTime<Utc>) -> Result<Vec<SystemSettingRow>, BookingError> {
        let mut rows = Vec::new();

        let mut push = |name: &str, value: String| {
            rows.push(SystemSettingRow {
                setting_name: name.to_string(),
                setting_value: value,
                updated_at: now,
            });
        };

        if let Some(value) = self.booking_online {
            push(KEY_BOOKING_ONLINE, value.to_string());
        }
        if let Some(value) = self.free_booking_enabled {
            push(KEY_FREE_BOOKING_ENABLED, value.to_string());
        }
        if let Some(value) = self.cancellation_enabled {
            push(KEY_CANCELLATION_ENABLED, value.to_string());
        }
        if let Some(value) = self.discounts_enabled {
            push(KEY_DISCOUNTS_ENABLED, value.to_string());
        }
        if let Some(percent) = self.child_discount_percent {
            if percent > 100 {
                return Err(BookingError::InvalidSetting(format!(
                    "child discount percent {percent} is out of range"
                )));
            }
            push(KEY_CHILD_DISCOUNT_PERCENT, percent.to_string());
        }
        if let Some(percent) = self.senior_discount_percent {
            if percent > 100 {
                return Err(BookingError::InvalidSetting(format!(
                    "senior discount percent {percent} is out of range"
                )));
            }
            push(KEY_SENIOR_DISCOUNT_PERCENT, percent.to_string());
        }
        if let Some(districts) = &self.discount_districts {
            let cleaned: Vec<String> = districts
                .iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();
            let serialized = serde_json::to_string(&cleaned)
                .map_err(|err| BookingError::InvalidSetting(err.to_string()))?;
            push(KEY_DISCOUNT_DISTRICTS, serialized);
        }

        Ok(rows)
    }
}

/// Apply a patch and return the resulting snapshot. All keys in the
/// patch land in one transaction so a failed write never leaves the
/// console half applied.
pub async fn update_settings(
    conn: &mut AsyncPgConnection,
    patch: &SettingsPatch,
    now: DateTime<Utc>,
) -> Result<SettingsSnapshot, BookingError> {
    let rows = patch.to_rows(now)?;

    conn.transaction::<SettingsSnapshot, BookingError, _>(|conn| {
        async move {
            for row in rows {
                diesel::insert_into(
                    crate::schema::roadways::system_settings::dsl::system_settings,
                )
                .values(&row)
                .on_conflict(crate::schema::roadways::system_settings::dsl::setting_name)
                .do_update()
                .set((
                    crate::schema::roadways::system_settings::dsl::setting_value
                        .eq(&row.setting_value),
                    crate::schema::roadways::system_settings::dsl::updated_at.eq(row.updated_at),
                ))
                .execute(conn)
                .await?;
            }

            load_settings(conn).await
        }
        .scope_boxed()
    })
    .await
}

/// Write the default value for every key that has no row yet. Used by
/// the ingest tool when standing up a fresh database.
pub async fn seed_default_settings(
    conn: &mut AsyncPgConnection,
    now: DateTime<Utc>,
) -> Result<(), BookingError> {
    let defaults = SettingsSnapshot::default();
    let rows = vec![
        SystemSettingRow {
            setting_name: KEY_BOOKING_ONLINE.to_string(),
            setting_value: defaults.booking_online.to_string(),
            updated_at: now,
        },
        SystemSettingRow {
            setting_name: KEY_FREE_BOOKING_ENABLED.to_string(),
            setting_value: defaults.free_booking_enabled.to_string(),
            updated_at: now,
        },
        SystemSettingRow {
            setting_name: KEY_CANCELLATION_ENABLED.to_string(),
            setting_value: defaults.cancellation_enabled.to_string(),
            updated_at: now,
        },
        SystemSettingRow {
            setting_name: KEY_DISCOUNTS_ENABLED.to_string(),
            setting_value: defaults.discounts_enabled.to_string(),
            updated_at: now,
        },
        SystemSettingRow {
            setting_name: KEY_CHILD_DISCOUNT_PERCENT.to_string(),
            setting_value: defaults.child_discount_percent.to_string(),
            updated_at: now,
        },
        SystemSettingRow {
            setting_name: KEY_SENIOR_DISCOUNT_PERCENT.to_string(),
            setting_value: defaults.senior_discount_percent.to_string(),
            updated_at: now,
        },
        SystemSettingRow {
            setting_name: KEY_DISCOUNT_DISTRICTS.to_string(),
            setting_value: "[]".to_string(),
            updated_at: now,
        },
    ];

    diesel::insert_into(crate::schema::roadways::system_settings::dsl::system_settings)
        .values(&rows)
        .on_conflict_do_nothing()
        .execute(conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, value: &str) -> SystemSettingRow {
        SystemSettingRow {
            setting_name: name.to_string(),
            setting_value: value.to_string(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn defaults_without_rows() {
        let snapshot = snapshot_from_rows(&[]);
        assert!(snapshot.booking_online);
        assert!(snapshot.discounts_enabled);
        assert_eq!(snapshot.child_discount_percent, 40);
        assert_eq!(snapshot.senior_discount_percent, 50);
        assert!(snapshot.discount_districts.is_empty());
    }

    #[test]
    fn rows_override_defaults() {
        let rows = vec![
            row(KEY_BOOKING_ONLINE, "false"),
            row(KEY_CHILD_DISCOUNT_PERCENT, "25"),
            row(KEY_DISCOUNT_DISTRICTS, r#"["Rohtak", " Sonipat "]"#),
        ];
        let snapshot = snapshot_from_rows(&rows);

        assert!(!snapshot.booking_online);
        assert_eq!(snapshot.child_discount_percent, 25);
        assert!(snapshot.district_active("rohtak"));
        assert!(snapshot.district_active("SONIPAT"));
        assert!(!snapshot.district_active("Hisar"));
    }

    #[test]
    fn malformed_rows_keep_defaults() {
        let rows = vec![
            row(KEY_BOOKING_ONLINE, "maybe"),
            row(KEY_SENIOR_DISCOUNT_PERCENT, "150"),
            row(KEY_DISCOUNT_DISTRICTS, "not json"),
            row("mystery_key", "1"),
        ];
        let snapshot = snapshot_from_rows(&rows);

        assert!(snapshot.booking_online);
        assert_eq!(snapshot.senior_discount_percent, 50);
        assert!(snapshot.discount_districts.is_empty());
    }

    #[test]
    fn patch_rejects_out_of_range_percent() {
        let patch = SettingsPatch {
            child_discount_percent: Some(101),
            ..Default::default()
        };
        assert!(matches!(
            patch.to_rows(Utc::now()),
            Err(BookingError::InvalidSetting(_))
        ));
    }

    #[test]
    fn invalid_field_rejects_whole_patch() {
        // a bad percent must not let the valid keys beside it through
        let patch = SettingsPatch {
            booking_online: Some(false),
            senior_discount_percent: Some(250),
            ..Default::default()
        };
        assert!(matches!(
            patch.to_rows(Utc::now()),
            Err(BookingError::InvalidSetting(_))
        ));
    }

    #[test]
    fn patch_renders_only_supplied_fields() {
        let patch = SettingsPatch {
            cancellation_enabled: Some(false),
            discount_districts: Some(vec!["Rohtak".to_string(), "  ".to_string()]),
            ..Default::default()
        };
        let rows = patch.to_rows(Utc::now()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].setting_name, KEY_CANCELLATION_ENABLED);
        assert_eq!(rows[0].setting_value, "false");
        assert_eq!(rows[1].setting_value, r#"["Rohtak"]"#);
    }
}
