//! Wire models shared between the food event backend and its clients.
//!
//! Every type here is plain serde data. Field renames follow the form field
//! names used by the browser client (`dia-hora-inicio`, `foto-comida`, ...), so
//! the JSON produced by the backend can be consumed without any mapping layer.

pub mod model;
pub mod requests;
