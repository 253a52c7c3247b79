// src/db/properties.rs
//
// Registry of tracked buildings.

use crate::domain::snapshot::Property;
use crate::errors::ServerError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use url::Url;

/// Derives a stable id from a SUUMO library URL: the trailing
/// `/to_<digits>/` segment becomes `property_<digits>`.
pub fn property_id_from_url(raw: &str) -> Result<String, ServerError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ServerError::BadRequest(format!("invalid URL '{raw}': {e}")))?;

    let last = url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .unwrap_or("");

    match last.strip_prefix("to_") {
        Some(digits) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
            Ok(format!("property_{digits}"))
        }
        _ => Err(ServerError::BadRequest(format!(
            "URL must end with /to_<number>/ (e.g. https://suumo.jp/library/tf_27/sc_27107/to_000000000/): {raw}"
        ))),
    }
}

pub fn list_properties(conn: &Connection) -> Result<Vec<Property>, ServerError> {
    let mut stmt = conn
        .prepare("SELECT id, name, url FROM properties ORDER BY rowid")
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map([], |row| {
            Ok(Property {
                id: row.get(0)?,
                name: row.get(1)?,
                url: row.get(2)?,
            })
        })
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}

fn find_property(conn: &Connection, identifier: &str) -> Result<Option<Property>, ServerError> {
    conn.query_row(
        "SELECT id, name, url FROM properties WHERE id = ?1 OR name = ?1 ORDER BY rowid LIMIT 1",
        params![identifier],
        |row| {
            Ok(Property {
                id: row.get(0)?,
                name: row.get(1)?,
                url: row.get(2)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(e.to_string()))
}

/// Registers a building. Rejects URLs without a `to_<digits>` segment and
/// ids that are already tracked.
pub fn add_property(conn: &Connection, name: &str, url: &str) -> Result<Property, ServerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServerError::BadRequest("property name is required".into()));
    }

    let property = Property {
        id: property_id_from_url(url)?,
        name: name.to_string(),
        url: url.trim().to_string(),
    };

    insert_property(conn, &property)?;
    Ok(property)
}

fn insert_property(conn: &Connection, property: &Property) -> Result<(), ServerError> {
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM properties WHERE id = ?)",
            params![property.id],
            |row| row.get(0),
        )
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    if exists {
        return Err(ServerError::BadRequest(format!(
            "property id '{}' already exists",
            property.id
        )));
    }

    conn.execute(
        "INSERT INTO properties (id, name, url, added_at) VALUES (?, ?, ?, ?)",
        params![property.id, property.name, property.url, Utc::now()],
    )
    .map_err(|e| ServerError::DbError(e.to_string()))?;

    Ok(())
}

/// Removes by exact name or id; returns what was removed.
pub fn remove_property(conn: &Connection, identifier: &str) -> Result<Property, ServerError> {
    let property = find_property(conn, identifier.trim())?.ok_or(ServerError::NotFound)?;

    conn.execute("DELETE FROM properties WHERE id = ?", params![property.id])
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    Ok(property)
}

/// Bulk-loads a `properties.json` style list, skipping ids already present.
/// Returns how many were inserted.
pub fn import_properties(conn: &mut Connection, properties: &[Property]) -> Result<usize, ServerError> {
    let tx = conn
        .transaction()
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut inserted = 0;
    for property in properties {
        let changed = tx
            .execute(
                "INSERT OR IGNORE INTO properties (id, name, url, added_at) VALUES (?, ?, ?, ?)",
                params![property.id, property.name, property.url, Utc::now()],
            )
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        inserted += changed;
    }

    tx.commit().map_err(|e| ServerError::DbError(e.to_string()))?;
    Ok(inserted)
}
