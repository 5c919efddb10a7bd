//! # Event submission
//!
//! The write path for a new food event:
//!
//! 1. `multipart` decodes the request body into a [`FieldBag`], deciding once
//!    per field whether it is a scalar, a list of strings or a list of files.
//! 2. `validator` checks every field against fixed rules and a
//!    [`ReferenceSnapshot`](crate::reference::ReferenceSnapshot), with no side
//!    effects.
//! 3. `committer` writes the event, its photos and its social network links in
//!    one transaction, only when every field passed.

pub mod committer;
pub mod multipart;
pub mod social;
pub mod storage;
pub mod validator;

use std::collections::HashMap;

/// Form field names, as sent by the browser client.
pub mod fields {
    pub const REGION: &str = "region";
    pub const COMUNA: &str = "comuna";
    pub const SECTOR: &str = "sector";
    pub const NAME: &str = "nombre";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "celular";
    pub const DESCRIPTION: &str = "descripcion-evento";
    pub const FOOD_TYPE: &str = "tipo-comida";
    pub const START: &str = "dia-hora-inicio";
    pub const END: &str = "dia-hora-termino";
    pub const IMAGES: &str = "foto-comida";
    pub const SOCIAL_NETWORKS: &str = "red-social";
}

/// One uploaded file part.
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    /// Client-side file name; empty when the form was sent without a file.
    pub filename: String,
    /// Received bytes, capped at one byte past the configured maximum.
    pub bytes: Vec<u8>,
    /// Total size of the part as streamed, even past the cap.
    pub size: u64,
    /// Set when the part stream failed before its end.
    pub read_error: Option<String>,
}

#[cfg(test)]
impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            size: bytes.len() as u64,
            bytes,
            read_error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
    Files(Vec<UploadedFile>),
}

/// Decoded form fields of one submission.
#[derive(Debug, Clone, Default)]
pub struct FieldBag {
    values: HashMap<String, FieldValue>,
}

impl FieldBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a scalar field. The first value sent for a name wins.
    pub fn set_scalar(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.values
            .entry(name.to_string())
            .or_insert_with(|| FieldValue::Scalar(value.into()));
        self
    }

    pub fn push_value(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        let entry = self
            .values
            .entry(name.to_string())
            .or_insert_with(|| FieldValue::List(Vec::new()));
        if let FieldValue::List(list) = entry {
            list.push(value.into());
        }
        self
    }

    pub fn push_file(&mut self, name: &str, file: UploadedFile) -> &mut Self {
        let entry = self
            .values
            .entry(name.to_string())
            .or_insert_with(|| FieldValue::Files(Vec::new()));
        if let FieldValue::Files(files) = entry {
            files.push(file);
        }
        self
    }

    /// Value of a scalar field, or `""` when it was not sent.
    pub fn scalar(&self, name: &str) -> &str {
        match self.values.get(name) {
            Some(FieldValue::Scalar(value)) => value,
            _ => "",
        }
    }

    pub fn list(&self, name: &str) -> &[String] {
        match self.values.get(name) {
            Some(FieldValue::List(values)) => values,
            _ => &[],
        }
    }

    /// Files sent under `name`, or `None` when the field is absent altogether.
    pub fn files(&self, name: &str) -> Option<&[UploadedFile]> {
        match self.values.get(name) {
            Some(FieldValue::Files(files)) => Some(files),
            _ => None,
        }
    }
}
