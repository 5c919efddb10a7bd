use serde::Deserialize;

/// Query string accepted by the data endpoint.
///
/// All values arrive as raw strings; the resolver decides which ones matter
/// for the requested `type` and how to parse them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub comuna: Option<String>,
    pub id: Option<String>,
    /// Lower bound (`HH:MM`) of the start time-of-day window for `events-per-month`.
    pub from: Option<String>,
    /// Upper bound (`HH:MM`), inclusive.
    pub to: Option<String>,
}
