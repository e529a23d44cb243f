use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::coordinate::MavenCoordinate;

pub const DEFAULT_REPOSITORY: &str = "https://repo1.maven.org/maven2";

const DB_FILE: &str = "db.lmdb";
const JARS_DIR: &str = "jars";

pub fn resolve_home(cli: &Cli) -> Result<PathBuf> {
    if let Some(p) = cli.home.clone() {
        return Ok(p);
    }
    default_home()
}

pub fn db_path(home: &Path) -> PathBuf {
    home.join(DB_FILE)
}

pub fn jars_dir(home: &Path) -> PathBuf {
    home.join(JARS_DIR)
}

/// Where the sources JAR for `coordinate` is kept inside the cache home.
pub fn cached_jar_path(home: &Path, coordinate: &MavenCoordinate, resolved_version: &str) -> PathBuf {
    jars_dir(home).join(coordinate.sources_jar_path(resolved_version))
}

/// Removes the index, its lock file and every cached JAR.
pub fn clear_home(home: &Path) -> Result<()> {
    let db = db_path(home);
    remove_file_if_exists(&db, "db")?;
    remove_file_if_exists(&lmdb_lock_path(&db), "db lock")?;

    let jars = jars_dir(home);
    if jars.exists() {
        std::fs::remove_dir_all(&jars)
            .with_context(|| format!("Failed to remove jar cache: {}", jars.display()))?;
    }
    Ok(())
}

fn default_home() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(dirs::cache_dir)
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow::anyhow!("Failed to resolve data directory"))?;
    Ok(base.join("mvn-docs"))
}

fn lmdb_lock_path(db_path: &Path) -> PathBuf {
    let mut os = db_path.as_os_str().to_os_string();
    os.push("-lock");
    PathBuf::from(os)
}

fn remove_file_if_exists(path: &Path, kind: &str) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove {kind} file: {}", path.display()))?;
    }
    Ok(())
}
