//! Console operator accounts. Operators are either admins or district
//! scoped; the scope limits which revenue they may read and who may
//! change settings or register beneficiaries.

use crate::errors::BookingError;
use crate::models::OperatorRow;
use crate::normalize_stop_name;
use diesel::prelude::*;
use diesel_async::AsyncPgConnection;
use diesel_async::RunQueryDsl;

pub async fn load_operator(
    conn: &mut AsyncPgConnection,
    username: &str,
) -> Result<Option<OperatorRow>, BookingError> {
    let row = crate::schema::roadways::operators::dsl::operators
        .filter(crate::schema::roadways::operators::dsl::username.eq(username))
        .select(OperatorRow::as_select())
        .first::<OperatorRow>(conn)
        .await
        .optional()?;

    Ok(row)
}

/// An unknown username and a known non admin both map to `Unauthorized`,
/// so probing cannot distinguish the two.
pub async fn require_admin(
    conn: &mut AsyncPgConnection,
    username: &str,
) -> Result<OperatorRow, BookingError> {
    match load_operator(conn, username).await? {
        Some(operator) if operator.is_admin => Ok(operator),
        _ => Err(BookingError::Unauthorized),
    }
}

impl OperatorRow {
    /// Districts this operator may read, normalised. `None` means
    /// unrestricted (admin).
    pub fn district_scope(&self) -> Option<Vec<String>> {
        if self.is_admin {
            return None;
        }
        Some(
            self.assigned_districts
                .iter()
                .flatten()
                .map(|district| normalize_stop_name(district))
                .filter(|district| !district.is_empty())
                .collect(),
        )
    }
}

pub async fn add_operator(
    conn: &mut AsyncPgConnection,
    username: &str,
    display_name: &str,
    is_admin: bool,
    districts: Vec<String>,
) -> Result<(), BookingError> {
    let row = OperatorRow {
        username: username.trim().to_string(),
        display_name: display_name.trim().to_string(),
        is_admin,
        assigned_districts: districts.into_iter().map(Some).collect(),
    };
    if row.username.is_empty() {
        return Err(BookingError::InvalidSetting(
            "operator username must not be blank".to_string(),
        ));
    }

    diesel::insert_into(crate::schema::roadways::operators::dsl::operators)
        .values(&row)
        .on_conflict(crate::schema::roadways::operators::dsl::username)
        .do_update()
        .set((
            crate::schema::roadways::operators::dsl::display_name.eq(&row.display_name),
            crate::schema::roadways::operators::dsl::is_admin.eq(row.is_admin),
            crate::schema::roadways::operators::dsl::assigned_districts
                .eq(&row.assigned_districts),
        ))
        .execute(conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operator(is_admin: bool, districts: &[&str]) -> OperatorRow {
        OperatorRow {
            username: "console1".to_string(),
            display_name: "Depot Console".to_string(),
            is_admin,
            assigned_districts: districts.iter().map(|d| Some(d.to_string())).collect(),
        }
    }

    #[test]
    fn admin_scope_is_unrestricted() {
        assert_eq!(operator(true, &["Rohtak"]).district_scope(), None);
    }

    #[test]
    fn district_scope_is_normalized() {
        let scope = operator(false, &[" Rohtak ", "SONIPAT"])
            .district_scope()
            .unwrap();
        assert_eq!(scope, vec!["rohtak".to_string(), "sonipat".to_string()]);
    }

    #[test]
    fn null_districts_are_skipped() {
        let mut op = operator(false, &["Rohtak"]);
        op.assigned_districts.push(None);
        assert_eq!(op.district_scope().unwrap().len(), 1);
    }
}
