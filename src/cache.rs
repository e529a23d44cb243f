//! Persistent cache of downloaded sources JARs.
//!
//! JAR files live under `<home>/jars/` in the repository layout. An LMDB
//! environment (via heed) indexes them by coordinate so repeated runs skip the
//! download. An index row whose JAR is missing or has a different size counts
//! as a miss.

use anyhow::{Context, Result};
use heed::types::Str;
use heed::{Database, Env, EnvFlags, EnvOpenOptions, RoTxn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const ARTIFACTS_DB: &str = "artifacts";

const DEFAULT_MAP_SIZE: usize = 64 * 1024 * 1024;
const DEFAULT_MAX_DBS: u32 = 4;

type StrDb = Database<Str, Str>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedArtifact {
    pub coordinate: String,
    pub url: String,
    pub jar_path: PathBuf,
    pub sha256: String,
    pub size: u64,
    pub fetched_at: u64,
}

impl CachedArtifact {
    fn is_intact(&self) -> bool {
        std::fs::metadata(&self.jar_path).is_ok_and(|m| m.is_file() && m.len() == self.size)
    }
}

#[derive(Debug)]
pub struct PersistentCache {
    env: Env,
    db_path: PathBuf,
    artifacts: StrDb,
}

impl PersistentCache {
    pub fn open(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create cache directory: {}", parent.display())
            })?;
        }

        let env = open_env(&db_path)?;
        let mut wtxn = env.write_txn()?;
        let artifacts = env.create_database::<Str, Str>(&mut wtxn, Some(ARTIFACTS_DB))?;
        wtxn.commit()?;

        Ok(Self {
            env,
            db_path,
            artifacts,
        })
    }

    /// Rows that cannot be decoded or whose JAR is gone are pruned and
    /// reported as a miss.
    pub fn get_artifact(&self, key: &str) -> Result<Option<CachedArtifact>> {
        let parsed = {
            let rtxn = self.env.read_txn()?;
            let Some(raw) = self.artifacts.get(&rtxn, key)? else {
                return Ok(None);
            };
            serde_json::from_str::<CachedArtifact>(raw)
        };

        match parsed {
            Ok(artifact) if artifact.is_intact() => Ok(Some(artifact)),
            Ok(artifact) => {
                warn!(key, path = %artifact.jar_path.display(), "cached jar missing or truncated, dropping row");
                self.remove_artifact(key)?;
                Ok(None)
            }
            Err(err) => {
                warn!(key, error = %err, "unreadable cache row, dropping");
                self.remove_artifact(key)?;
                Ok(None)
            }
        }
    }

    pub fn put_artifact(&self, key: &str, artifact: &CachedArtifact) -> Result<()> {
        let json = serde_json::to_string(artifact)?;
        let mut wtxn = self.env.write_txn()?;
        self.artifacts.put(&mut wtxn, key, json.as_str())?;
        wtxn.commit()?;
        Ok(())
    }

    pub fn remove_artifact(&self, key: &str) -> Result<bool> {
        let mut wtxn = self.env.write_txn()?;
        let removed = self.artifacts.delete(&mut wtxn, key)?;
        wtxn.commit()?;
        Ok(removed)
    }

    pub fn stats(&self) -> Result<CacheStats> {
        let rtxn = self.env.read_txn()?;
        let artifacts = table_len(&self.artifacts, &rtxn)?;

        let mut total_bytes = 0u64;
        let mut missing_jars = 0u64;
        for item in self.artifacts.iter(&rtxn)? {
            let (_, v) = item?;
            let Ok(row) = serde_json::from_str::<CachedArtifact>(v) else {
                continue;
            };
            if row.is_intact() {
                total_bytes += row.size;
            } else {
                missing_jars += 1;
            }
        }

        Ok(CacheStats {
            db_path: self.db_path.to_string_lossy().to_string(),
            artifacts,
            total_bytes,
            missing_jars,
        })
    }
}

fn open_env(db_path: &Path) -> Result<Env> {
    let mut options = EnvOpenOptions::new();
    options.map_size(DEFAULT_MAP_SIZE);
    options.max_dbs(DEFAULT_MAX_DBS);
    // SAFETY: We keep default LMDB locking. NO_SUB_DIR stores the index as a
    // single file plus its `-lock` sibling.
    unsafe {
        options.flags(EnvFlags::NO_SUB_DIR);
        options
            .open(db_path)
            .with_context(|| format!("Failed to create/open db env: {}", db_path.display()))
    }
}

fn table_len(db: &StrDb, rtxn: &RoTxn<'_>) -> Result<u64> {
    let mut count = 0u64;
    for item in db.iter(rtxn)? {
        let _ = item?;
        count += 1;
    }
    Ok(count)
}

#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub db_path: String,
    pub artifacts: u64,
    pub total_bytes: u64,
    pub missing_jars: u64,
}
