//! Layered nick to uuid databases.
//!
//! The first layer is the default database, owned by the user and kept in
//! step with the `known_nicks` settings map. Any number of read-only
//! secondary layers can be stacked behind it, loaded from json files on
//! disk. Lookups walk the layers in order, so a user-set denick always
//! beats a bundled one.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use hashbrown::HashMap;
use thiserror::Error as ThisError;


#[derive(Debug, ThisError)]
pub enum NickDatabaseError {
    #[error("failed to read the nick database at {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("the nick database at {} is not a json mapping of nick to uuid", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub struct NickDatabase {
    /// Layer 0 is the default database. Later layers are read-only.
    databases: Mutex<Vec<HashMap<String, String>>>,
}

impl NickDatabase {
    pub fn new(
        default_database: HashMap<String, String>,
        secondary_databases: Vec<HashMap<String, String>>,
    ) -> Self {
        let mut databases = vec![default_database];
        databases.extend(secondary_databases);
        Self {
            databases: Mutex::new(databases),
        }
    }

    /// Reads secondary databases from the given paths and stacks them
    /// behind the default database.
    pub fn from_disk(
        default_database: HashMap<String, String>,
        database_paths: &[PathBuf],
    ) -> Result<Self, NickDatabaseError> {
        let secondary_databases = database_paths
            .iter()
            .map(|path| read_database(path))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(default_database, secondary_databases))
    }

    /// Resolves a nick against every layer, earliest layer first.
    pub fn get(&self, nick: &str) -> Option<String> {
        let databases = self.databases.lock().ok()?;
        databases
            .iter()
            .find_map(|database| database.get(nick).cloned())
    }

    /// Resolves a nick against the default database only.
    pub fn get_default(&self, nick: &str) -> Option<String> {
        let databases = self.databases.lock().ok()?;
        databases.first().and_then(|database| database.get(nick).cloned())
    }

    /// Records a denick in the default database.
    pub fn insert_default(&self, nick: String, uuid: String) {
        let Ok(mut databases) = self.databases.lock() else {
            return;
        };
        if let Some(default_database) = databases.first_mut() {
            default_database.insert(nick, uuid);
        }
    }

    /// Drops a denick from the default database, if present.
    pub fn remove_default(&self, nick: &str) {
        let Ok(mut databases) = self.databases.lock() else {
            return;
        };
        if let Some(default_database) = databases.first_mut() {
            default_database.remove(nick);
        }
    }
}

impl Default for NickDatabase {
    fn default() -> Self {
        Self::new(HashMap::new(), Vec::new())
    }
}

fn read_database(path: &Path) -> Result<HashMap<String, String>, NickDatabaseError> {
    let contents = fs::read_to_string(path).map_err(|source| NickDatabaseError::Read {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| NickDatabaseError::Decode {
        path: path.to_owned(),
        source,
    })
}
