//! Field rules for an event submission.
//!
//! Every check is a pure function of the [`FieldBag`], the
//! [`ReferenceSnapshot`] and the [`ValidationConfig`]. Dependent checks (comuna
//! on region, end time on start time) re-run the check they depend on instead
//! of reading a shared result, so each one can be exercised on its own.

use super::fields::*;
use super::social::check_social_network_link;
use super::{FieldBag, UploadedFile};
use crate::config::ValidationConfig;
use crate::reference::ReferenceSnapshot;
use chrono::NaiveDateTime;
use common::model::submission::{FieldCheck, FieldResult};
use std::collections::BTreeMap;

const MSG_LENGTH_EXCEEDED: &str = "Largo máximo de caracteres excedido.";
const MSG_DATE_FORMAT: &str = "Formato incorrecto, ver ejemplo.";
pub(crate) const MSG_FILE_READ: &str = "Error al leer el archivo.";

/// Outcome of validating a whole submission.
#[derive(Debug, Clone)]
pub struct SubmissionCheck {
    /// `true` only when every field, and every element of the multi-valued
    /// ones, passed.
    pub valid: bool,
    pub fields: BTreeMap<String, FieldCheck>,
}

pub struct SubmissionValidator<'a> {
    config: &'a ValidationConfig,
}

impl<'a> SubmissionValidator<'a> {
    pub fn new(config: &'a ValidationConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, bag: &FieldBag, snapshot: &ReferenceSnapshot) -> SubmissionCheck {
        let mut fields = BTreeMap::new();
        let mut single = |name: &str, result: FieldResult| {
            fields.insert(name.to_string(), FieldCheck::Single(result));
        };

        single(REGION, self.check_region(bag, snapshot));
        single(COMUNA, self.check_comuna(bag, snapshot));
        single(SECTOR, self.check_sector(bag));
        single(NAME, self.check_name(bag));
        single(EMAIL, self.check_email(bag));
        single(PHONE, self.check_phone(bag));
        single(DESCRIPTION, self.check_description(bag));
        single(FOOD_TYPE, self.check_food_type(bag, snapshot));
        single(START, self.check_start(bag));
        single(END, self.check_end(bag));

        fields.insert(IMAGES.to_string(), FieldCheck::Many(self.check_images(bag.files(IMAGES))));
        fields.insert(
            SOCIAL_NETWORKS.to_string(),
            FieldCheck::Many(self.check_social_networks(bag.list(SOCIAL_NETWORKS), snapshot)),
        );

        let valid = fields.values().all(FieldCheck::is_valid);
        SubmissionCheck { valid, fields }
    }

    pub fn check_region(&self, bag: &FieldBag, snapshot: &ReferenceSnapshot) -> FieldResult {
        let region = bag.scalar(REGION);
        if snapshot.has_region(region) {
            FieldResult::ok()
        } else if region.is_empty() {
            FieldResult::invalid("Debe seleccionar una región.")
        } else {
            FieldResult::invalid("La región seleccionada no es una opción válida.")
        }
    }

    pub fn check_comuna(&self, bag: &FieldBag, snapshot: &ReferenceSnapshot) -> FieldResult {
        let comuna = bag.scalar(COMUNA);
        if !self.check_region(bag, snapshot).valid {
            FieldResult::invalid("Chequear región.")
        } else if snapshot
            .comunas_of(bag.scalar(REGION))
            .iter()
            .any(|c| c == comuna)
        {
            FieldResult::ok()
        } else if comuna.is_empty() {
            FieldResult::invalid("Debe seleccionar una comuna.")
        } else {
            FieldResult::invalid("La comuna seleccionada no es una opción válida.")
        }
    }

    pub fn check_sector(&self, bag: &FieldBag) -> FieldResult {
        if char_len(bag.scalar(SECTOR)) <= self.config.sector_max {
            FieldResult::ok()
        } else {
            FieldResult::invalid(MSG_LENGTH_EXCEEDED)
        }
    }

    pub fn check_name(&self, bag: &FieldBag) -> FieldResult {
        let name = bag.scalar(NAME);
        let len = char_len(name);
        if name.is_empty() {
            FieldResult::invalid("Debe ingresar un nombre de contacto.")
        } else if !(self.config.name_min..=self.config.name_max).contains(&len) {
            FieldResult::invalid(format!(
                "Al menos {} caracteres, máximo {}.",
                self.config.name_min, self.config.name_max
            ))
        } else {
            FieldResult::ok()
        }
    }

    pub fn check_email(&self, bag: &FieldBag) -> FieldResult {
        let email = bag.scalar(EMAIL);
        if email.is_empty() {
            FieldResult::invalid("Debe ingresar un email.")
        } else if !self.config.email.is_match(email) {
            FieldResult::invalid("Formato de email no válido.")
        } else {
            FieldResult::ok()
        }
    }

    /// The phone is optional; only a non-empty value is checked.
    pub fn check_phone(&self, bag: &FieldBag) -> FieldResult {
        let phone = bag.scalar(PHONE);
        if phone.is_empty() || self.config.phone.is_match(phone) {
            FieldResult::ok()
        } else {
            FieldResult::invalid("Número de celular no válido, ver ejemplo.")
        }
    }

    pub fn check_description(&self, bag: &FieldBag) -> FieldResult {
        if char_len(bag.scalar(DESCRIPTION)) <= self.config.description_max {
            FieldResult::ok()
        } else {
            FieldResult::invalid(MSG_LENGTH_EXCEEDED)
        }
    }

    pub fn check_food_type(&self, bag: &FieldBag, snapshot: &ReferenceSnapshot) -> FieldResult {
        let food_type = bag.scalar(FOOD_TYPE);
        if snapshot.food_types.iter().any(|t| t == food_type) {
            FieldResult::ok()
        } else if food_type.is_empty() {
            FieldResult::invalid("Debe seleccionar un tipo de comida.")
        } else {
            FieldResult::invalid("El tipo seleccionado no es válido.")
        }
    }

    pub fn check_start(&self, bag: &FieldBag) -> FieldResult {
        let start = bag.scalar(START);
        if start.is_empty() {
            FieldResult::invalid("Debe ingresar la fecha de inicio del evento.")
        } else if self.parse_date(start).is_none() {
            FieldResult::invalid(MSG_DATE_FORMAT)
        } else {
            FieldResult::ok()
        }
    }

    /// Ordering is only judged once the start time itself is valid.
    pub fn check_end(&self, bag: &FieldBag) -> FieldResult {
        let end = bag.scalar(END);
        if end.is_empty() {
            return FieldResult::invalid("Debe ingresar la fecha de término del evento.");
        }
        let Some(end) = self.parse_date(end) else {
            return FieldResult::invalid(MSG_DATE_FORMAT);
        };
        let Some(start) = self.parse_date(bag.scalar(START)) else {
            return FieldResult::invalid("Chequear la fecha de inicio.");
        };

        if start < end {
            FieldResult::ok()
        } else {
            FieldResult::invalid("El término debe ser después del inicio del evento.")
        }
    }

    /// At least one file must be sent; each one is then checked on its own.
    pub fn check_images(&self, files: Option<&[UploadedFile]>) -> Vec<FieldResult> {
        match files {
            Some(files) if !files.is_empty() => {
                files.iter().map(|file| self.check_image(file)).collect()
            }
            _ => vec![FieldResult::invalid("Subir una imagen.")],
        }
    }

    /// Checks the sniffed content type (never the file name) and the size.
    pub fn check_image(&self, file: &UploadedFile) -> FieldResult {
        if file.filename.is_empty() {
            return FieldResult::invalid("Debe subir una imagen.");
        }
        if file.read_error.is_some() {
            return FieldResult::invalid(MSG_FILE_READ);
        }

        let mime = image::guess_format(&file.bytes)
            .ok()
            .map(|format| format.to_mime_type());
        let allowed = mime.is_some_and(|m| self.config.allowed_mimes.iter().any(|a| a == m));

        if !allowed {
            FieldResult::invalid("Extensión del archivo debe ser (.jpg .jpeg .png).")
        } else if file.size > self.config.max_image_bytes {
            FieldResult::invalid(format!(
                "Tamaño del archivo {:.3} MB excede el máximo {:.3} MB.",
                file.size as f64 / 1_000_000.0,
                self.config.max_image_bytes as f64 / 1_000_000.0
            ))
        } else {
            FieldResult::ok()
        }
    }

    /// Links are checked in submission order; the first valid link of each
    /// network claims it and later links to the same network are rejected.
    pub fn check_social_networks(&self, links: &[String], snapshot: &ReferenceSnapshot) -> Vec<FieldResult> {
        let mut considered: Vec<String> = Vec::new();
        links
            .iter()
            .map(|link| {
                let checked = check_social_network_link(
                    link,
                    &considered,
                    &snapshot.social_networks,
                    &self.config.catch_all_network,
                );
                if let Some(network) = checked.network {
                    considered.push(network);
                }
                checked.result
            })
            .collect()
    }

    /// Parses a date in the fixed format, requiring the exact length as well
    /// so unpadded fields are refused.
    pub fn parse_date(&self, value: &str) -> Option<NaiveDateTime> {
        if value.len() != self.config.date_length {
            return None;
        }
        NaiveDateTime::parse_from_str(value, &self.config.date_format).ok()
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}
