//! JSON session persistence for plan state.
//!
//! Sessions are pretty-printed JSON files under the application data
//! directory, written atomically via a temp file and rename so an interrupted
//! save never corrupts an existing session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::PlanError;
use crate::plan::PlanState;
use crate::utils::{ensure_dir, resolve_base};

const SESSION_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

pub const SESSION_SCHEMA_VERSION: u32 = 1;

/// On-disk envelope around a saved plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub schema_version: u32,
    pub saved_at: DateTime<Utc>,
    pub plan: PlanState,
}

/// Stores named plan sessions under `<base>/sessions`.
#[derive(Clone)]
pub struct SessionStore {
    sessions_dir: PathBuf,
}

impl SessionStore {
    pub fn new(root: Option<PathBuf>) -> Result<Self, PlanError> {
        let base = resolve_base(root);
        ensure_dir(&base)?;
        let sessions_dir = base.join("sessions");
        ensure_dir(&sessions_dir)?;
        Ok(Self { sessions_dir })
    }

    pub fn new_default() -> Result<Self, PlanError> {
        Self::new(None)
    }

    pub fn session_path(&self, name: &str) -> PathBuf {
        self.sessions_dir
            .join(format!("{}.{}", canonical_name(name), SESSION_EXTENSION))
    }

    pub fn save(&self, name: &str, plan: &PlanState) -> Result<PathBuf, PlanError> {
        let snapshot = SessionSnapshot {
            schema_version: SESSION_SCHEMA_VERSION,
            saved_at: Utc::now(),
            plan: plan.clone(),
        };
        let path = self.session_path(name);
        let json = serde_json::to_string_pretty(&snapshot)?;
        write_atomic(&path, &json)?;
        tracing::info!(session = name, path = %path.display(), "session saved");
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<PlanState, PlanError> {
        let path = self.session_path(name);
        if !path.exists() {
            return Err(PlanError::Session(format!(
                "session `{}` not found",
                name
            )));
        }
        let data = fs::read_to_string(&path)?;
        let snapshot: SessionSnapshot = serde_json::from_str(&data)?;
        if snapshot.schema_version > SESSION_SCHEMA_VERSION {
            return Err(PlanError::Session(format!(
                "session `{}` is from a newer schema version",
                name
            )));
        }
        tracing::info!(session = name, "session loaded");
        Ok(snapshot.plan)
    }

    /// Lists saved session names, sorted alphabetically.
    pub fn list(&self) -> Result<Vec<String>, PlanError> {
        if !self.sessions_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.sessions_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SESSION_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Lowercases and strips a user-supplied name down to a safe file stem.
fn canonical_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|ch| if ch.is_whitespace() { '_' } else { ch })
        .filter(|ch| ch.is_alphanumeric() || *ch == '_' || *ch == '-')
        .collect()
}

fn write_atomic(path: &Path, data: &str) -> std::io::Result<()> {
    let tmp_path = path.with_extension(TMP_SUFFIX);
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(data.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)
}
