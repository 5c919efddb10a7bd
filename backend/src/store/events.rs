use super::Store;
use crate::error::AppError;
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Storage encoding of `evento.dia_hora_inicio` and `evento.dia_hora_termino`.
/// Lexicographic order of this text is chronological order.
const STORED_DATETIME: &str = "%Y-%m-%d %H:%M:%S";

const EVENT_COLUMNS: &str = "id, comuna_id, sector, nombre, email, celular, \
     dia_hora_inicio, dia_hora_termino, descripcion, tipo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    pub id: i64,
    pub comuna_id: i64,
    pub sector: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub description: String,
    pub food_type: String,
}

/// An `evento` row before insertion.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub comuna_id: i64,
    pub sector: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub description: String,
    pub food_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialNetworkRow {
    pub network: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRow {
    pub path: String,
    pub filename: String,
}

/// Tables whose size can be asked for.
#[derive(Debug, Clone, Copy)]
pub enum Table {
    Evento,
    Foto,
    RedSocial,
}

impl Table {
    fn name(self) -> &'static str {
        match self {
            Table::Evento => "evento",
            Table::Foto => "foto",
            Table::RedSocial => "red_social",
        }
    }
}

fn datetime_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let text: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&text, STORED_DATETIME)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        comuna_id: row.get(1)?,
        sector: row.get(2)?,
        contact_name: row.get(3)?,
        email: row.get(4)?,
        phone: row.get(5)?,
        start: datetime_column(row, 6)?,
        end: datetime_column(row, 7)?,
        description: row.get(8)?,
        food_type: row.get(9)?,
    })
}

impl Store {
    pub fn event_ids(&self) -> Result<Vec<i64>, AppError> {
        let mut stmt = self.conn().prepare("SELECT id FROM evento ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    /// Events, latest start first. `None` limit means no limit.
    pub fn events(&self, limit: Option<u32>, offset: Option<u32>) -> Result<Vec<EventRow>, AppError> {
        let limit = limit.map(i64::from).unwrap_or(-1);
        let offset = offset.map(i64::from).unwrap_or(0);
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM evento \
             ORDER BY dia_hora_inicio DESC, id DESC LIMIT ?1 OFFSET ?2"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let events = stmt
            .query_map(params![limit, offset], event_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }

    pub fn events_by_comuna_id(&self, comuna_id: i64) -> Result<Vec<EventRow>, AppError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM evento WHERE comuna_id = ?1 \
             ORDER BY dia_hora_inicio DESC, id DESC"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let events = stmt
            .query_map(params![comuna_id], event_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }

    pub fn event_by_id(&self, event_id: i64) -> Result<Option<EventRow>, AppError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM evento WHERE id = ?1");
        let event = self
            .conn()
            .query_row(&sql, params![event_id], event_from_row)
            .optional()?;
        Ok(event)
    }

    pub fn social_networks_by_event_id(&self, event_id: i64) -> Result<Vec<SocialNetworkRow>, AppError> {
        let mut stmt = self.conn().prepare(
            "SELECT nombre, identificador FROM red_social WHERE evento_id = ?1 ORDER BY id",
        )?;
        let links = stmt
            .query_map(params![event_id], |row| {
                Ok(SocialNetworkRow {
                    network: row.get(0)?,
                    url: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }

    pub fn photos_by_event_id(&self, event_id: i64) -> Result<Vec<PhotoRow>, AppError> {
        let mut stmt = self.conn().prepare(
            "SELECT ruta_archivo, nombre_archivo FROM foto WHERE evento_id = ?1 ORDER BY id",
        )?;
        let photos = stmt
            .query_map(params![event_id], |row| {
                Ok(PhotoRow {
                    path: row.get(0)?,
                    filename: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(photos)
    }

    /// `(comuna name, photo count)` for every comuna with at least one photo.
    pub fn image_count_per_comuna(&self) -> Result<Vec<(String, i64)>, AppError> {
        let mut stmt = self.conn().prepare(
            "SELECT co.nombre, COUNT(*) \
             FROM evento ev \
             JOIN comuna co ON ev.comuna_id = co.id \
             JOIN foto fo ON fo.evento_id = ev.id \
             GROUP BY co.nombre \
             ORDER BY co.nombre",
        )?;
        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    /// `(YYYY-MM-DD, event count)` per start day, oldest first.
    pub fn event_count_per_day(&self) -> Result<Vec<(String, i64)>, AppError> {
        self.grouped_counts(
            "SELECT strftime('%Y-%m-%d', dia_hora_inicio) AS dia, COUNT(*) \
             FROM evento GROUP BY dia ORDER BY dia",
            params![],
        )
    }

    /// `(food type, event count)` for every food type in use, by name.
    pub fn event_count_per_food_type(&self) -> Result<Vec<(String, i64)>, AppError> {
        self.grouped_counts(
            "SELECT tipo, COUNT(*) FROM evento GROUP BY tipo ORDER BY tipo",
            params![],
        )
    }

    /// `(YYYY-MM, event count)` per start month, oldest first, counting only
    /// events whose start time of day (`HH:MM`) lies in `from..=to`.
    pub fn event_count_per_month_between(&self, from: &str, to: &str) -> Result<Vec<(String, i64)>, AppError> {
        self.grouped_counts(
            "SELECT strftime('%Y-%m', dia_hora_inicio) AS mes, COUNT(*) \
             FROM evento \
             WHERE strftime('%H:%M', dia_hora_inicio) BETWEEN ?1 AND ?2 \
             GROUP BY mes ORDER BY mes",
            params![from, to],
        )
    }

    fn grouped_counts<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<(String, i64)>, AppError> {
        let mut stmt = self.conn().prepare(sql)?;
        let counts = stmt
            .query_map(params, |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }
}

pub fn count_rows(conn: &Connection, table: Table) -> Result<i64, AppError> {
    let sql = format!("SELECT COUNT(*) FROM {}", table.name());
    Ok(conn.query_row(&sql, [], |row| row.get(0))?)
}

/// Inserts an `evento` row and returns its id.
pub fn insert_event(conn: &Connection, event: &NewEvent) -> Result<i64, AppError> {
    conn.execute(
        "INSERT INTO evento \
         (comuna_id, sector, nombre, email, celular, dia_hora_inicio, dia_hora_termino, descripcion, tipo) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            event.comuna_id,
            event.sector,
            event.contact_name,
            event.email,
            event.phone,
            event.start.format(STORED_DATETIME).to_string(),
            event.end.format(STORED_DATETIME).to_string(),
            event.description,
            event.food_type,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_photo(conn: &Connection, path: &str, filename: &str, event_id: i64) -> Result<i64, AppError> {
    conn.execute(
        "INSERT INTO foto (ruta_archivo, nombre_archivo, evento_id) VALUES (?1, ?2, ?3)",
        params![path, filename, event_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_social_network(
    conn: &Connection,
    network: &str,
    url: &str,
    event_id: i64,
) -> Result<i64, AppError> {
    conn.execute(
        "INSERT INTO red_social (nombre, identificador, evento_id) VALUES (?1, ?2, ?3)",
        params![network, url, event_id],
    )?;
    Ok(conn.last_insert_rowid())
}
