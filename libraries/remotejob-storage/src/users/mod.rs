//! User accounts and credentials

use remotejob_core::{
    error::Result,
    types::{normalize_email, Amount, CreateUser, Gender, ProfileType, UpdateProfile, User, UserId},
    MarketError,
};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

const USER_COLUMNS: &str = "id, profile_type, first_name, last_name, email, phone, gender, \
     country, wallet_balance, verify_pin_hash IS NOT NULL AS has_verify_pin, registered_at";

pub(crate) fn map_user(row: &SqliteRow) -> Result<User> {
    let profile_type: String = row.get("profile_type");
    let gender: String = row.get("gender");

    Ok(User {
        id: UserId::new(row.get::<String, _>("id")),
        profile_type: ProfileType::from_str(&profile_type).ok_or_else(|| {
            MarketError::storage(format!("Unknown profile type: {}", profile_type))
        })?,
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        gender: Gender::from_str(&gender)
            .ok_or_else(|| MarketError::storage(format!("Unknown gender: {}", gender)))?,
        country: row.get("country"),
        wallet_balance: Amount::from_cents(row.get("wallet_balance"))?,
        has_verify_pin: row.get::<i64, _>("has_verify_pin") != 0,
        registered_at: row.get("registered_at"),
    })
}

/// Register a new user
///
/// The email is stored lowercased. Returns `Duplicate` if another account
/// already uses the same email, regardless of case.
pub async fn create(pool: &SqlitePool, user: CreateUser) -> Result<User> {
    let id = UserId::generate();
    let email = normalize_email(&user.email);

    let result = sqlx::query(
        r#"
        INSERT INTO users (id, profile_type, first_name, last_name, email, phone, gender,
                           country, password_hash, wallet_balance, registered_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)
        "#,
    )
    .bind(id.as_str())
    .bind(user.profile_type.as_str())
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&email)
    .bind(&user.phone)
    .bind(user.gender.as_str())
    .bind(&user.country)
    .bind(&user.password_hash)
    .bind(crate::now())
    .execute(pool)
    .await;

    match result {
        Ok(_) => {}
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(MarketError::Duplicate("Email already registered".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| MarketError::storage("Failed to retrieve created user"))
}

/// Get user by ID
pub async fn get_by_id(pool: &SqlitePool, id: &UserId) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_user).transpose()
}

/// Get user by email, case-insensitive
pub async fn get_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_user).transpose()
}

/// Get all users, newest registration first
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY registered_at DESC, rowid DESC"
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_user).collect()
}

/// Get a user and their password hash for login
pub async fn get_credentials(pool: &SqlitePool, email: &str) -> Result<Option<(User, String)>> {
    let row = sqlx::query(&format!(
        "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?"
    ))
    .bind(normalize_email(email))
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let user = map_user(&row)?;
            Ok(Some((user, row.get("password_hash"))))
        }
        None => Ok(None),
    }
}

/// Update profile fields, keeping the current value where the update is `None`
pub async fn update_profile(pool: &SqlitePool, id: &UserId, update: UpdateProfile) -> Result<User> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET first_name = COALESCE(?, first_name),
            last_name = COALESCE(?, last_name),
            country = COALESCE(?, country)
        WHERE id = ?
        "#,
    )
    .bind(update.first_name)
    .bind(update.last_name)
    .bind(update.country)
    .bind(id.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(MarketError::not_found("User", id.as_str()));
    }

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| MarketError::not_found("User", id.as_str()))
}

/// Store the hash of a user's withdrawal PIN
pub async fn set_verify_pin_hash(pool: &SqlitePool, id: &UserId, pin_hash: &str) -> Result<()> {
    let result = sqlx::query("UPDATE users SET verify_pin_hash = ? WHERE id = ?")
        .bind(pin_hash)
        .bind(id.as_str())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(MarketError::not_found("User", id.as_str()));
    }

    Ok(())
}

/// Get the hash of a user's withdrawal PIN
///
/// Returns `Ok(None)` when the user exists but has no PIN, and `NotFound`
/// when the user does not exist.
pub async fn get_verify_pin_hash(pool: &SqlitePool, id: &UserId) -> Result<Option<String>> {
    let row = sqlx::query("SELECT verify_pin_hash FROM users WHERE id = ?")
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| MarketError::not_found("User", id.as_str()))?;

    Ok(row.get("verify_pin_hash"))
}
