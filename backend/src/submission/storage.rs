use crate::error::AppError;
use log::warn;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Destination for uploaded images.
pub trait ImageSink {
    /// Writes `bytes` under a new `name` and returns the size read back from
    /// the sink. An existing entry is never overwritten: that case fails with
    /// `io::ErrorKind::AlreadyExists`.
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<u64>;

    fn remove(&self, name: &str) -> io::Result<()>;

    /// Public path prefix recorded alongside each stored name.
    fn base_path(&self) -> &str;
}

impl<S: ImageSink + ?Sized> ImageSink for &S {
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<u64> {
        (**self).write(name, bytes)
    }

    fn remove(&self, name: &str) -> io::Result<()> {
        (**self).remove(name)
    }

    fn base_path(&self) -> &str {
        (**self).base_path()
    }
}

/// Stores images as plain files in one directory.
pub struct DiskImageSink {
    root: PathBuf,
    base_path: String,
}

impl DiskImageSink {
    pub fn new(root: impl Into<PathBuf>, base_path: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_path: base_path.into(),
        }
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(Path::new(name).file_name().unwrap_or_default())
    }
}

impl ImageSink for DiskImageSink {
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<u64> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_of(name);
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        Ok(fs::metadata(&path)?.len())
    }

    fn remove(&self, name: &str) -> io::Result<()> {
        match fs::remove_file(self.path_of(name)) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn base_path(&self) -> &str {
        &self.base_path
    }
}

/// Writes an image and checks the read-back size, retrying up to `attempts`
/// times. A failed attempt removes what it wrote before the next one. A name
/// that is already taken fails at once and the existing entry is left alone.
pub fn write_verified<S: ImageSink + ?Sized>(
    sink: &S,
    name: &str,
    bytes: &[u8],
    attempts: u32,
) -> Result<(), AppError> {
    let expected = bytes.len() as u64;
    for attempt in 1..=attempts {
        match sink.write(name, bytes) {
            Ok(written) if written == expected => return Ok(()),
            Ok(written) => warn!(
                "Image {name}: wrote {written} of {expected} bytes (attempt {attempt}/{attempts})"
            ),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                warn!("Image {name} already exists, refusing to overwrite it");
                return Err(AppError::ImageWrite {
                    name: name.to_string(),
                    attempts: attempt,
                });
            }
            Err(e) => warn!("Image {name}: write failed (attempt {attempt}/{attempts}): {e}"),
        }

        if let Err(e) = sink.remove(name) {
            warn!("Image {name}: could not remove partial write: {e}");
        }
    }

    Err(AppError::ImageWrite {
        name: name.to_string(),
        attempts,
    })
}
