use anyhow::{Result, bail};
use std::fmt;
use std::str::FromStr;

const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl MavenCoordinate {
    pub fn parse(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.trim().split(':').map(str::trim).collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            bail!("Invalid coordinate `{input}`. Expected groupId:artifactId:version");
        }

        Ok(Self {
            group_id: parts[0].to_string(),
            artifact_id: parts[1].to_string(),
            version: parts[2].to_string(),
        })
    }

    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with(SNAPSHOT_SUFFIX)
    }

    /// `1.0-SNAPSHOT` -> `1.0`; release versions come back unchanged.
    pub fn base_version(&self) -> &str {
        self.version
            .strip_suffix(SNAPSHOT_SUFFIX)
            .unwrap_or(&self.version)
    }

    pub fn version_dir(&self) -> String {
        format!(
            "{}/{}/{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version
        )
    }

    pub fn sources_jar_path(&self, resolved_version: &str) -> String {
        format!(
            "{}/{}-{}-sources.jar",
            self.version_dir(),
            self.artifact_id,
            resolved_version
        )
    }

    pub fn metadata_path(&self) -> String {
        format!("{}/maven-metadata.xml", self.version_dir())
    }

    /// Same coordinate pinned to a resolved snapshot version, used as a cache key.
    pub fn with_version(&self, version: &str) -> Self {
        Self {
            version: version.to_string(),
            ..self.clone()
        }
    }
}

impl FromStr for MavenCoordinate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for MavenCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

pub fn repository_url(repo: &str, path: &str) -> String {
    format!(
        "{}/{}",
        repo.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
