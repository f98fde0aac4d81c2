use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::CoreError;
use crate::models::Routine;
use crate::normalize::normalize_routine;

/// Persistence seam for routine records.
///
/// The recurrence core never touches storage itself; this exists so the
/// command-line front end can load records, hand them to the engine, and
/// write back the outcome of a completion.
pub trait RoutineStore {
    /// Loads every record, normalizing legacy fields on the way in.
    fn load_all(&self) -> Result<Vec<Routine>, CoreError>;

    fn save_all(&self, routines: &[Routine]) -> Result<(), CoreError>;

    fn find(&self, id: &str) -> Result<Routine, CoreError> {
        self.load_all()?
            .into_iter()
            .find(|routine| routine.id == id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    /// Replaces the record with the same id.
    fn update(&self, routine: &Routine) -> Result<(), CoreError> {
        let mut routines = self.load_all()?;
        let slot = routines
            .iter_mut()
            .find(|existing| existing.id == routine.id)
            .ok_or_else(|| CoreError::NotFound(routine.id.clone()))?;
        *slot = routine.clone();
        self.save_all(&routines)
    }
}

/// Routines stored as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads records exactly as stored, without legacy normalization.
    pub fn load_raw(&self) -> Result<Vec<Routine>, CoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Vec::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "routine file missing, starting empty");
                Ok(Vec::new())
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl RoutineStore for JsonFileStore {
    fn load_all(&self) -> Result<Vec<Routine>, CoreError> {
        Ok(self.load_raw()?.into_iter().map(normalize_routine).collect())
    }

    fn save_all(&self, routines: &[Routine]) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(routines)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        info!(path = %self.path.display(), count = routines.len(), "saved routines");
        Ok(())
    }
}
