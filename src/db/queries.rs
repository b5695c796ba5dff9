use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use crate::errors::{AppError, AppResult};
use crate::models::{Company, Reservation, ReservationStatus, Role, User};

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// A UNIQUE violation on an email column becomes a conflict; anything else stays a database error.
fn unique_email(e: rusqlite::Error, message: &str) -> AppError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == ErrorCode::ConstraintViolation
                && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(e),
    }
}

// ── Users ──

const USER_COLUMNS: &str = "id, name, email, password_hash, phone, created_at, updated_at";

fn parse_user_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        phone: row.get(4)?,
        role: Role::User,
        created_at: parse_timestamp(row, 5)?,
        updated_at: parse_timestamp(row, 6)?,
    })
}

pub fn insert_user(conn: &Connection, user: &User) -> AppResult<()> {
    conn.execute(
        "INSERT INTO users (id, name, email, password_hash, phone, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user.id,
            user.name,
            user.email,
            user.password_hash,
            user.phone,
            format_timestamp(&user.created_at),
            format_timestamp(&user.updated_at),
        ],
    )
    .map_err(|e| unique_email(e, "User already exists with this email"))?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &str) -> AppResult<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            parse_user_row,
        )
        .optional()?;
    Ok(user)
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> AppResult<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            parse_user_row,
        )
        .optional()?;
    Ok(user)
}

pub fn list_users(conn: &Connection) -> AppResult<Vec<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, rowid DESC"
    ))?;
    let rows = stmt.query_map([], parse_user_row)?;

    let mut users = vec![];
    for row in rows {
        users.push(row?);
    }
    Ok(users)
}

/// Overwrites every mutable column. Returns false when the user no longer exists.
pub fn save_user(conn: &Connection, user: &User) -> AppResult<bool> {
    let count = conn
        .execute(
            "UPDATE users SET name = ?1, email = ?2, password_hash = ?3, phone = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                user.name,
                user.email,
                user.password_hash,
                user.phone,
                format_timestamp(&user.updated_at),
                user.id,
            ],
        )
        .map_err(|e| unique_email(e, "Email already in use"))?;
    Ok(count > 0)
}

pub fn delete_user(conn: &Connection, id: &str) -> AppResult<bool> {
    let count = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

/// Whether `email` belongs to a user other than `except_id`.
pub fn user_email_taken(conn: &Connection, email: &str, except_id: Option<&str>) -> AppResult<bool> {
    let taken: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE email = ?1 AND id != COALESCE(?2, '')",
        params![email, except_id],
        |row| row.get(0),
    )?;
    Ok(taken)
}

// ── Companies ──

const COMPANY_COLUMNS: &str = "id, name, email, password_hash, phone, category, description, address, image, services, opening_hours, rating, created_at, updated_at";

fn parse_company_row(row: &Row) -> rusqlite::Result<Company> {
    let services_json: String = row.get(9)?;
    let services: Vec<String> = serde_json::from_str(&services_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?;

    Ok(Company {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        phone: row.get(4)?,
        category: row.get(5)?,
        description: row.get(6)?,
        address: row.get(7)?,
        image: row.get(8)?,
        services,
        opening_hours: row.get(10)?,
        rating: row.get(11)?,
        role: Role::Company,
        created_at: parse_timestamp(row, 12)?,
        updated_at: parse_timestamp(row, 13)?,
    })
}

fn services_json(company: &Company) -> AppResult<String> {
    serde_json::to_string(&company.services)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode services: {e}")))
}

pub fn insert_company(conn: &Connection, company: &Company) -> AppResult<()> {
    conn.execute(
        "INSERT INTO companies (id, name, email, password_hash, phone, category, description, address, image, services, opening_hours, rating, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            company.id,
            company.name,
            company.email,
            company.password_hash,
            company.phone,
            company.category,
            company.description,
            company.address,
            company.image,
            services_json(company)?,
            company.opening_hours,
            company.rating,
            format_timestamp(&company.created_at),
            format_timestamp(&company.updated_at),
        ],
    )
    .map_err(|e| unique_email(e, "Company already exists with this email"))?;
    Ok(())
}

pub fn get_company(conn: &Connection, id: &str) -> AppResult<Option<Company>> {
    let company = conn
        .query_row(
            &format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE id = ?1"),
            params![id],
            parse_company_row,
        )
        .optional()?;
    Ok(company)
}

pub fn find_company_by_email(conn: &Connection, email: &str) -> AppResult<Option<Company>> {
    let company = conn
        .query_row(
            &format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE email = ?1"),
            params![email],
            parse_company_row,
        )
        .optional()?;
    Ok(company)
}

pub fn list_companies(conn: &Connection) -> AppResult<Vec<Company>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COMPANY_COLUMNS} FROM companies ORDER BY created_at DESC, rowid DESC"
    ))?;
    let rows = stmt.query_map([], parse_company_row)?;

    let mut companies = vec![];
    for row in rows {
        companies.push(row?);
    }
    Ok(companies)
}

pub fn save_company(conn: &Connection, company: &Company) -> AppResult<bool> {
    let count = conn
        .execute(
            "UPDATE companies SET
               name = ?1, email = ?2, password_hash = ?3, phone = ?4, category = ?5,
               description = ?6, address = ?7, image = ?8, services = ?9, opening_hours = ?10,
               rating = ?11, updated_at = ?12
             WHERE id = ?13",
            params![
                company.name,
                company.email,
                company.password_hash,
                company.phone,
                company.category,
                company.description,
                company.address,
                company.image,
                services_json(company)?,
                company.opening_hours,
                company.rating,
                format_timestamp(&company.updated_at),
                company.id,
            ],
        )
        .map_err(|e| unique_email(e, "Email already in use"))?;
    Ok(count > 0)
}

pub fn delete_company(conn: &Connection, id: &str) -> AppResult<bool> {
    let count = conn.execute("DELETE FROM companies WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn company_email_taken(
    conn: &Connection,
    email: &str,
    except_id: Option<&str>,
) -> AppResult<bool> {
    let taken: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM companies WHERE email = ?1 AND id != COALESCE(?2, '')",
        params![email, except_id],
        |row| row.get(0),
    )?;
    Ok(taken)
}

// ── Reservations ──

const RESERVATION_COLUMNS: &str = "id, user_name, user_phone, service, date, time, notes, status, company_id, user_id, created_at, updated_at";

/// Which reservations a listing returns.
#[derive(Debug, Clone, Copy)]
pub enum ReservationFilter<'a> {
    All,
    ByUser(&'a str),
    ByCompany(&'a str),
}

fn parse_reservation_row(row: &Row) -> rusqlite::Result<Reservation> {
    let status_str: String = row.get(7)?;
    let status = ReservationStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            7,
            Type::Text,
            format!("unknown reservation status: {status_str}").into(),
        )
    })?;

    Ok(Reservation {
        id: row.get(0)?,
        user_name: row.get(1)?,
        user_phone: row.get(2)?,
        service: row.get(3)?,
        date: row.get(4)?,
        time: row.get(5)?,
        notes: row.get(6)?,
        status,
        company_id: row.get(8)?,
        user_id: row.get(9)?,
        created_at: parse_timestamp(row, 10)?,
        updated_at: parse_timestamp(row, 11)?,
    })
}

pub fn insert_reservation(conn: &Connection, reservation: &Reservation) -> AppResult<()> {
    conn.execute(
        "INSERT INTO reservations (id, user_name, user_phone, service, date, time, notes, status, company_id, user_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            reservation.id,
            reservation.user_name,
            reservation.user_phone,
            reservation.service,
            reservation.date,
            reservation.time,
            reservation.notes,
            reservation.status.as_str(),
            reservation.company_id,
            reservation.user_id,
            format_timestamp(&reservation.created_at),
            format_timestamp(&reservation.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_reservation(conn: &Connection, id: &str) -> AppResult<Option<Reservation>> {
    let reservation = conn
        .query_row(
            &format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?1"),
            params![id],
            parse_reservation_row,
        )
        .optional()?;
    Ok(reservation)
}

/// Newest first.
pub fn list_reservations(
    conn: &Connection,
    filter: ReservationFilter<'_>,
) -> AppResult<Vec<Reservation>> {
    let (clause, key) = match filter {
        ReservationFilter::All => ("", None),
        ReservationFilter::ByUser(id) => ("WHERE user_id = ?1", Some(id)),
        ReservationFilter::ByCompany(id) => ("WHERE company_id = ?1", Some(id)),
    };

    let mut stmt = conn.prepare(&format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservations {clause} ORDER BY created_at DESC, rowid DESC"
    ))?;
    let rows = match key {
        Some(id) => stmt.query_map(params![id], parse_reservation_row)?,
        None => stmt.query_map([], parse_reservation_row)?,
    };

    let mut reservations = vec![];
    for row in rows {
        reservations.push(row?);
    }
    Ok(reservations)
}

pub fn save_reservation(conn: &Connection, reservation: &Reservation) -> AppResult<bool> {
    let count = conn.execute(
        "UPDATE reservations SET
           user_name = ?1, user_phone = ?2, service = ?3, date = ?4, time = ?5,
           notes = ?6, status = ?7, updated_at = ?8
         WHERE id = ?9",
        params![
            reservation.user_name,
            reservation.user_phone,
            reservation.service,
            reservation.date,
            reservation.time,
            reservation.notes,
            reservation.status.as_str(),
            format_timestamp(&reservation.updated_at),
            reservation.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_reservation(conn: &Connection, id: &str) -> AppResult<bool> {
    let count = conn.execute("DELETE FROM reservations WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::db::init_db;

    fn user(id: &str, email: &str) -> User {
        let now = Utc::now();
        User {
            id: id.to_string(),
            name: "Anna".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            phone: "+36 20 111 2222".to_string(),
            role: Role::User,
            created_at: now,
            updated_at: now,
        }
    }

    fn reservation(id: &str, company_id: &str, offset_secs: i64) -> Reservation {
        let at = Utc::now() + Duration::seconds(offset_secs);
        Reservation {
            id: id.to_string(),
            user_name: "Anna".to_string(),
            user_phone: "+36 20 111 2222".to_string(),
            service: "Haircut".to_string(),
            date: "2025-11-20".to_string(),
            time: "10:00".to_string(),
            notes: String::new(),
            status: ReservationStatus::Pending,
            company_id: company_id.to_string(),
            user_id: "u1".to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn duplicate_user_email_is_a_conflict() {
        let conn = init_db(":memory:").unwrap();
        insert_user(&conn, &user("u1", "anna@test.com")).unwrap();
        let err = insert_user(&conn, &user("u2", "anna@test.com")).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(user_email_taken(&conn, "anna@test.com", None).unwrap());
        assert!(!user_email_taken(&conn, "anna@test.com", Some("u1")).unwrap());
    }

    #[test]
    fn reservations_list_newest_first() {
        let conn = init_db(":memory:").unwrap();
        insert_reservation(&conn, &reservation("r1", "c1", 0)).unwrap();
        insert_reservation(&conn, &reservation("r2", "c1", 5)).unwrap();
        insert_reservation(&conn, &reservation("r3", "c2", 10)).unwrap();

        let all = list_reservations(&conn, ReservationFilter::All).unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r3", "r2", "r1"]);

        let by_company = list_reservations(&conn, ReservationFilter::ByCompany("c1")).unwrap();
        assert_eq!(by_company.len(), 2);
        assert_eq!(by_company[0].id, "r2");

        let by_user = list_reservations(&conn, ReservationFilter::ByUser("nobody")).unwrap();
        assert!(by_user.is_empty());
    }

    #[test]
    fn save_and_delete_report_missing_rows() {
        let conn = init_db(":memory:").unwrap();
        let r = reservation("r1", "c1", 0);
        assert!(!save_reservation(&conn, &r).unwrap());
        insert_reservation(&conn, &r).unwrap();
        assert!(save_reservation(&conn, &r).unwrap());
        assert!(delete_reservation(&conn, "r1").unwrap());
        assert!(!delete_reservation(&conn, "r1").unwrap());
    }
}
