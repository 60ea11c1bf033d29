// scoreboard-service/src/utils/store.rs
use crate::models::{JoinCode, Membership, ServiceError, Team};
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

// Document store over a directory tree, one JSON file per document:
//
//   <base>/teams/<team_id>.json
//   <base>/join_codes/<code>.json
//   <base>/members/<team_id>/<user_id>.json
//
// The store only promises per-document create/read/update/delete plus
// directory scans; there is no multi-document transaction primitive, so
// callers composing several writes must surface partial failures themselves.
#[derive(Clone, Debug)]
pub struct TeamStore {
    base_dir: PathBuf,
}

impl TeamStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        TeamStore {
            base_dir: base_dir.into(),
        }
    }

    fn teams_dir(&self) -> PathBuf {
        self.base_dir.join("teams")
    }

    fn join_codes_dir(&self) -> PathBuf {
        self.base_dir.join("join_codes")
    }

    fn members_dir(&self, team_id: &str) -> PathBuf {
        self.base_dir.join("members").join(team_id)
    }

    // Create the storage directories if they are missing
    pub fn init(&self) -> Result<(), ServiceError> {
        for dir in [self.teams_dir(), self.join_codes_dir(), self.base_dir.join("members")] {
            ensure_dir(&dir)?;
        }
        Ok(())
    }

    // ----- teams -----

    pub fn save_team(&self, team: &Team) -> Result<(), ServiceError> {
        ensure_dir(&self.teams_dir())?;
        write_doc(&self.teams_dir().join(format!("{}.json", team.id)), team)
    }

    pub fn find_team_by_id(&self, team_id: &str) -> Result<Option<Team>, ServiceError> {
        read_doc(&self.teams_dir().join(format!("{}.json", team_id)))
    }

    pub fn delete_team_doc(&self, team_id: &str) -> Result<bool, ServiceError> {
        delete_doc(&self.teams_dir().join(format!("{}.json", team_id)))
    }

    // Scan every team document. Used by the per-user projection, which is a
    // filter + join over all teams.
    pub fn list_teams(&self) -> Result<Vec<Team>, ServiceError> {
        scan_dir(&self.teams_dir())
    }

    // ----- join codes -----

    pub fn save_join_code(&self, mapping: &JoinCode) -> Result<(), ServiceError> {
        ensure_dir(&self.join_codes_dir())?;
        write_doc(
            &self.join_codes_dir().join(format!("{}.json", mapping.code)),
            mapping,
        )
    }

    pub fn find_join_code(&self, code: &str) -> Result<Option<JoinCode>, ServiceError> {
        read_doc(&self.join_codes_dir().join(format!("{}.json", code)))
    }

    pub fn join_code_exists(&self, code: &str) -> Result<bool, ServiceError> {
        Ok(self.find_join_code(code)?.is_some())
    }

    pub fn delete_join_code(&self, code: &str) -> Result<bool, ServiceError> {
        delete_doc(&self.join_codes_dir().join(format!("{}.json", code)))
    }

    // ----- memberships -----

    pub fn save_membership(&self, membership: &Membership) -> Result<(), ServiceError> {
        let dir = self.members_dir(&membership.team_id);
        ensure_dir(&dir)?;
        write_doc(
            &dir.join(format!("{}.json", membership.user_id)),
            membership,
        )
    }

    pub fn find_membership(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> Result<Option<Membership>, ServiceError> {
        read_doc(&self.members_dir(team_id).join(format!("{}.json", user_id)))
    }

    pub fn delete_membership(&self, team_id: &str, user_id: &str) -> Result<bool, ServiceError> {
        delete_doc(&self.members_dir(team_id).join(format!("{}.json", user_id)))
    }

    // Scan a team's membership sub-collection
    pub fn list_memberships(&self, team_id: &str) -> Result<Vec<Membership>, ServiceError> {
        scan_dir(&self.members_dir(team_id))
    }

    // Remove every membership record of a team, returning how many were deleted
    pub fn delete_team_memberships(&self, team_id: &str) -> Result<usize, ServiceError> {
        let dir = self.members_dir(team_id);
        if !dir.exists() {
            return Ok(0);
        }

        let members: Vec<Membership> = scan_dir(&dir)?;
        let count = members.len();

        fs::remove_dir_all(&dir).map_err(|e| {
            error!("Failed to remove membership directory {:?}: {:?}", dir, e);
            ServiceError::BackendUnavailable(format!("Failed to delete memberships: {}", e))
        })?;

        info!("✅ Deleted {} memberships for team: {}", count, team_id);
        Ok(count)
    }
}

fn ensure_dir(dir: &Path) -> Result<(), ServiceError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            error!("Failed to create storage directory {:?}: {:?}", dir, e);
            ServiceError::BackendUnavailable(format!("Failed to create directory: {}", e))
        })?;
    }
    Ok(())
}

fn write_doc<T: Serialize>(path: &Path, doc: &T) -> Result<(), ServiceError> {
    let json = serde_json::to_string_pretty(doc).map_err(|e| {
        error!("Failed to serialize document {:?}: {:?}", path, e);
        ServiceError::BackendUnavailable(format!("Failed to serialize document: {}", e))
    })?;

    fs::write(path, json).map_err(|e| {
        error!("Failed to write document {:?}: {:?}", path, e);
        ServiceError::BackendUnavailable(format!("Failed to write document: {}", e))
    })
}

fn read_doc<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ServiceError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        error!("Failed to read document {:?}: {:?}", path, e);
        ServiceError::BackendUnavailable(format!("Failed to read document: {}", e))
    })?;

    let doc = serde_json::from_str(&content).map_err(|e| {
        error!("Failed to parse document {:?}: {:?}", path, e);
        ServiceError::BackendUnavailable(format!("Failed to parse document: {}", e))
    })?;

    Ok(Some(doc))
}

fn delete_doc(path: &Path) -> Result<bool, ServiceError> {
    if !path.exists() {
        return Ok(false);
    }

    fs::remove_file(path).map_err(|e| {
        error!("Failed to delete document {:?}: {:?}", path, e);
        ServiceError::BackendUnavailable(format!("Failed to delete document: {}", e))
    })?;

    Ok(true)
}

fn scan_dir<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, ServiceError> {
    let mut docs = Vec::new();

    if !dir.exists() {
        return Ok(docs);
    }

    for entry_result in fs::read_dir(dir).map_err(|e| {
        error!("Failed to read storage directory {:?}: {:?}", dir, e);
        ServiceError::BackendUnavailable(format!("Failed to read directory: {}", e))
    })? {
        let entry = entry_result.map_err(|e| {
            error!("Failed to read directory entry: {:?}", e);
            ServiceError::BackendUnavailable(format!("Failed to read directory entry: {}", e))
        })?;

        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            let content = fs::read_to_string(&path).map_err(|e| {
                error!("Failed to read document {:?}: {:?}", path, e);
                ServiceError::BackendUnavailable(format!("Failed to read document: {}", e))
            })?;

            match serde_json::from_str(&content) {
                Ok(doc) => docs.push(doc),
                Err(e) => {
                    // A single corrupt document should not hide the rest of
                    // the collection
                    warn!("Skipping unparseable document {:?}: {:?}", path, e);
                    continue;
                }
            }
        }
    }

    Ok(docs)
}
