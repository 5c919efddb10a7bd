//! Maps the `type` parameter of a data request to a read against the store.

use crate::error::AppError;
use crate::reference::ReferenceSnapshot;
use crate::store::{EventRow, Store};
use common::model::event::{EventRecord, PhotoRecord, SocialNetworkRecord};
use chrono::NaiveTime;
use common::model::reference::{ComunaImageCount, EventCount, ParamHint, RegionsComunas};
use common::requests::DataQuery;
use log::debug;
use serde_json::Value;

const TIME_OF_DAY: &str = "%H:%M";
const DAY_START: &str = "00:00";
const DAY_END: &str = "23:59";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    RegionsComunas,
    FoodTypes,
    SocialNetworks,
    ComunasImages,
    EventsComuna,
    Event,
    Events,
    EventsPerDay,
    EventsPerFoodType,
    EventsPerMonth,
}

impl RequestType {
    pub const ALL: [RequestType; 10] = [
        RequestType::RegionsComunas,
        RequestType::FoodTypes,
        RequestType::SocialNetworks,
        RequestType::ComunasImages,
        RequestType::EventsComuna,
        RequestType::Event,
        RequestType::Events,
        RequestType::EventsPerDay,
        RequestType::EventsPerFoodType,
        RequestType::EventsPerMonth,
    ];

    pub fn token(self) -> &'static str {
        match self {
            RequestType::RegionsComunas => "regions-comunas",
            RequestType::FoodTypes => "food-types",
            RequestType::SocialNetworks => "social-networks",
            RequestType::ComunasImages => "comunas-images",
            RequestType::EventsComuna => "events-comuna",
            RequestType::Event => "event",
            RequestType::Events => "events",
            RequestType::EventsPerDay => "events-per-day",
            RequestType::EventsPerFoodType => "events-per-food-type",
            RequestType::EventsPerMonth => "events-per-month",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.token() == token)
    }
}

pub struct QueryResolver<'a> {
    store: &'a Store,
    date_format: &'a str,
}

impl<'a> QueryResolver<'a> {
    pub fn new(store: &'a Store, date_format: &'a str) -> Self {
        Self { store, date_format }
    }

    pub fn resolve(&self, query: &DataQuery) -> Result<Value, AppError> {
        let Some(kind) = query.kind.as_deref().and_then(RequestType::from_token) else {
            let tokens = RequestType::ALL.iter().map(|t| t.token().to_string()).collect();
            return to_json(&hint("require type param", Some(tokens)));
        };
        debug!("Resolving data request {}", kind.token());

        match kind {
            RequestType::RegionsComunas => {
                let snapshot = ReferenceSnapshot::load(self.store)?;
                to_json(&RegionsComunas {
                    regions: snapshot.region_names(),
                    comunas: snapshot.comunas_by_region_position(),
                })
            }
            RequestType::FoodTypes => to_json(&self.store.food_types()?),
            RequestType::SocialNetworks => to_json(&self.store.social_networks()?),
            RequestType::ComunasImages => {
                let counts: Vec<ComunaImageCount> = self
                    .store
                    .image_count_per_comuna()?
                    .into_iter()
                    .map(|(name, count)| ComunaImageCount(name, count))
                    .collect();
                to_json(&counts)
            }
            RequestType::EventsComuna => self.events_by_comuna(query.comuna.as_deref()),
            RequestType::Event => self.event_by_id(query.id.as_deref()),
            RequestType::Events => {
                let limit = parse_count(query.limit.as_deref());
                let offset = parse_count(query.offset.as_deref());
                let events = self.hydrate_all(self.store.events(limit, offset)?)?;
                to_json(&events)
            }
            RequestType::EventsPerDay => to_json(&event_counts(self.store.event_count_per_day()?)),
            RequestType::EventsPerFoodType => {
                to_json(&event_counts(self.store.event_count_per_food_type()?))
            }
            RequestType::EventsPerMonth => {
                self.events_per_month(query.from.as_deref(), query.to.as_deref())
            }
        }
    }

    /// Events per start month within a start time-of-day window. A missing
    /// bound defaults to the start or end of the day; a malformed or reversed
    /// window answers with a hint.
    fn events_per_month(&self, from: Option<&str>, to: Option<&str>) -> Result<Value, AppError> {
        let window = parse_time_of_day(from.unwrap_or(DAY_START))
            .zip(parse_time_of_day(to.unwrap_or(DAY_END)))
            .filter(|(from, to)| from <= to);
        let Some((from, to)) = window else {
            return to_json(&hint("require valid from and to params (HH:MM)", None));
        };

        let counts = self.store.event_count_per_month_between(
            &from.format(TIME_OF_DAY).to_string(),
            &to.format(TIME_OF_DAY).to_string(),
        )?;
        to_json(&event_counts(counts))
    }

    /// Events of a comuna; an absent or unknown name answers with the list of
    /// valid comuna names instead.
    fn events_by_comuna(&self, comuna: Option<&str>) -> Result<Value, AppError> {
        let snapshot = ReferenceSnapshot::load(self.store)?;
        let comuna_id = match comuna.filter(|name| snapshot.has_comuna(name)) {
            Some(name) => self.store.comuna_id_by_name(name)?,
            None => None,
        };
        let Some(comuna_id) = comuna_id else {
            return to_json(&hint("require valid comuna param", Some(snapshot.all_comunas())));
        };

        let events = self.hydrate_all(self.store.events_by_comuna_id(comuna_id)?)?;
        to_json(&events)
    }

    fn event_by_id(&self, id: Option<&str>) -> Result<Value, AppError> {
        let event_id = id.and_then(|raw| raw.trim().parse::<i64>().ok());
        let row = match event_id {
            Some(event_id) if self.store.event_ids()?.contains(&event_id) => {
                self.store.event_by_id(event_id)?
            }
            _ => None,
        };

        match row {
            Some(row) => to_json(&self.hydrate(row)?),
            None => to_json(&hint("require valid id param", None)),
        }
    }

    fn hydrate_all(&self, rows: Vec<EventRow>) -> Result<Vec<EventRecord>, AppError> {
        rows.into_iter().map(|row| self.hydrate(row)).collect()
    }

    /// Joins names and child rows into an event row.
    pub fn hydrate(&self, row: EventRow) -> Result<EventRecord, AppError> {
        let comuna = self.store.comuna_by_id(row.comuna_id)?.ok_or_else(|| {
            AppError::Inconsistent(format!("event {} points to missing comuna {}", row.id, row.comuna_id))
        })?;
        let region = self.store.region_name_by_id(comuna.region_id)?.ok_or_else(|| {
            AppError::Inconsistent(format!(
                "comuna {} points to missing region {}",
                comuna.id, comuna.region_id
            ))
        })?;

        let social_networks = self
            .store
            .social_networks_by_event_id(row.id)?
            .into_iter()
            .map(|link| SocialNetworkRecord {
                network: link.network,
                url: link.url,
            })
            .collect();
        let photos = self
            .store
            .photos_by_event_id(row.id)?
            .into_iter()
            .map(|photo| PhotoRecord {
                basepath: photo.path,
                image_path: photo.filename,
            })
            .collect();

        Ok(EventRecord {
            id: row.id,
            region,
            comuna: comuna.name,
            sector: row.sector,
            contact_name: row.contact_name,
            email: row.email,
            phone: row.phone,
            start: row.start.format(self.date_format).to_string(),
            end: row.end.format(self.date_format).to_string(),
            description: row.description,
            food_type: row.food_type,
            social_networks,
            photos,
        })
    }
}

fn event_counts(counts: Vec<(String, i64)>) -> Vec<EventCount> {
    counts.into_iter().map(|(key, count)| EventCount(key, count)).collect()
}

/// `HH:MM`, zero padded.
fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    if raw.len() != 5 {
        return None;
    }
    NaiveTime::parse_from_str(raw, TIME_OF_DAY).ok()
}

fn hint(response: &str, values: Option<Vec<String>>) -> ParamHint {
    ParamHint {
        response: response.to_string(),
        values,
    }
}

/// Non-negative integer parameter; anything else is ignored.
fn parse_count(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|r| r.trim().parse().ok())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Inconsistent(format!("serialization failed: {e}")))
}
