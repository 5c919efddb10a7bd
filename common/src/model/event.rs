use serde::{Deserialize, Serialize};

/// A food event with its foreign keys resolved into names and its child rows
/// (social network links and photos) joined in.
///
/// This is the shape returned by every event read of the data endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    pub region: String,
    pub comuna: String,
    pub sector: String,
    #[serde(rename = "nombre")]
    pub contact_name: String,
    pub email: String,
    #[serde(rename = "celular")]
    pub phone: String,
    /// Start time rendered as `YYYY-MM-DD HH:MM`.
    #[serde(rename = "dia-hora-inicio")]
    pub start: String,
    /// End time rendered as `YYYY-MM-DD HH:MM`.
    #[serde(rename = "dia-hora-termino")]
    pub end: String,
    #[serde(rename = "descripcion-evento")]
    pub description: String,
    #[serde(rename = "tipo-comida")]
    pub food_type: String,
    #[serde(rename = "red-social")]
    pub social_networks: Vec<SocialNetworkRecord>,
    #[serde(rename = "foto-comida")]
    pub photos: Vec<PhotoRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialNetworkRecord {
    #[serde(rename = "social-network")]
    pub network: String,
    pub url: String,
}

/// Location of a stored photo. The client joins `basepath` and `image-path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub basepath: String,
    #[serde(rename = "image-path")]
    pub image_path: String,
}
