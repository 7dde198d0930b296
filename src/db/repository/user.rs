use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::enums::Role;
use crate::models::*;

const USER_COLUMNS: &str = "id, first_name, last_name, email, role, password_hash";

pub fn email_exists(conn: &Connection, email: &str) -> Result<bool, DatabaseError> {
    let found = conn
        .query_row("SELECT id FROM users WHERE email = ?1", params![email], |row| {
            row.get::<_, i64>(0)
        })
        .optional()?;
    Ok(found.is_some())
}

pub fn insert_user(conn: &Connection, user: &NewUser) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO users (first_name, last_name, email, role, password_hash)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user.first_name,
            user.last_name,
            user.email,
            user.role.as_str(),
            user.password_hash,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
    let row = conn.query_row(&sql, params![email], read_user_row).optional()?;
    row.map(user_from_row).transpose()
}

pub fn get_user_by_id(conn: &Connection, id: i64) -> Result<Option<User>, DatabaseError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
    let row = conn.query_row(&sql, params![id], read_user_row).optional()?;
    row.map(user_from_row).transpose()
}

type UserRow = (i64, String, String, String, String, String);

fn read_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn user_from_row(row: UserRow) -> Result<User, DatabaseError> {
    let (id, first_name, last_name, email, role, password_hash) = row;
    Ok(User {
        id,
        first_name,
        last_name,
        email,
        role: Role::from_str(&role)?,
        password_hash,
    })
}
