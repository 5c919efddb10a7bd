use super::{parse_enum_column, Store};
use crate::error::AppError;
use rusqlite::{params, Connection, OptionalExtension};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comuna {
    pub id: i64,
    pub name: String,
    pub region_id: i64,
}

impl Store {
    /// All regions ordered by id.
    pub fn regions(&self) -> Result<Vec<Region>, AppError> {
        let mut stmt = self
            .conn()
            .prepare("SELECT id, nombre FROM region ORDER BY id")?;
        let regions = stmt
            .query_map([], |row| {
                Ok(Region {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(regions)
    }

    /// All comunas ordered by id.
    pub fn comunas(&self) -> Result<Vec<Comuna>, AppError> {
        let mut stmt = self
            .conn()
            .prepare("SELECT id, nombre, region_id FROM comuna ORDER BY id")?;
        let comunas = stmt
            .query_map([], |row| {
                Ok(Comuna {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    region_id: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(comunas)
    }

    /// Declared value set of an enumerated column.
    ///
    /// Fails closed: a missing declaration or one that does not decode as
    /// `enum('a',...)` is an error, never an empty or partial list.
    pub fn enum_values(&self, table: &str, column: &str) -> Result<Vec<String>, AppError> {
        let raw: Option<String> = self
            .conn()
            .query_row(
                "SELECT column_type FROM column_type WHERE table_name = ?1 AND column_name = ?2",
                params![table, column],
                |row| row.get(0),
            )
            .optional()?;

        let column_name = format!("{table}.{column}");
        let raw = raw.ok_or_else(|| AppError::MalformedEnum {
            column: column_name.clone(),
            raw: String::new(),
        })?;
        parse_enum_column(&raw).ok_or(AppError::MalformedEnum {
            column: column_name,
            raw,
        })
    }

    pub fn food_types(&self) -> Result<Vec<String>, AppError> {
        self.enum_values("evento", "tipo")
    }

    pub fn social_networks(&self) -> Result<Vec<String>, AppError> {
        self.enum_values("red_social", "nombre")
    }

    pub fn comuna_id_by_name(&self, name: &str) -> Result<Option<i64>, AppError> {
        comuna_id_by_name(self.conn(), name)
    }

    pub fn comuna_by_id(&self, comuna_id: i64) -> Result<Option<Comuna>, AppError> {
        let comuna = self
            .conn()
            .query_row(
                "SELECT id, nombre, region_id FROM comuna WHERE id = ?1",
                params![comuna_id],
                |row| {
                    Ok(Comuna {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        region_id: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(comuna)
    }

    pub fn region_name_by_id(&self, region_id: i64) -> Result<Option<String>, AppError> {
        let name = self
            .conn()
            .query_row(
                "SELECT nombre FROM region WHERE id = ?1",
                params![region_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }
}

/// Id of the comuna with the given name. Comuna names are unique in the seed;
/// if that ever stops holding, the lowest id wins.
pub fn comuna_id_by_name(conn: &Connection, name: &str) -> Result<Option<i64>, AppError> {
    let id = conn
        .query_row(
            "SELECT id FROM comuna WHERE nombre = ?1 ORDER BY id LIMIT 1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}
