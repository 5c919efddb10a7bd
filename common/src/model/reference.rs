use serde::{Deserialize, Serialize};

/// Region names ordered by region id, and for each region (same position) the
/// names of its comunas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionsComunas {
    pub regions: Vec<String>,
    pub comunas: Vec<Vec<String>>,
}

/// Number of photos attached to events of one comuna. Serialized as a
/// `[name, count]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComunaImageCount(pub String, pub i64);

/// Number of events sharing one key (a day, a month or a food type).
/// Serialized as a `[key, count]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCount(pub String, pub i64);

/// Reply for a data request whose parameters could not be resolved.
///
/// `values` lists what the caller may send instead, when such a list exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamHint {
    pub response: String,
    pub values: Option<Vec<String>>,
}
