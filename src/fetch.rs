//! Downloads of sources JARs and snapshot metadata from a Maven repository.

use anyhow::{Context, Result, bail};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::coordinate::{MavenCoordinate, repository_url};
use crate::snapshot::parse_snapshot_version;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const READ_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    pub http: Option<String>,
    pub https: Option<String>,
}

impl ProxyConfig {
    pub fn from_args_and_env(http: Option<String>, https: Option<String>) -> Self {
        Self::resolve(http, https, |key| std::env::var(key).ok())
    }

    /// Explicit values win over `HTTP_PROXY`/`http_proxy` and
    /// `HTTPS_PROXY`/`https_proxy`. Blank values count as unset.
    pub fn resolve(
        http: Option<String>,
        https: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let lookup = |upper: &str, lower: &str| {
            env(upper)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| env(lower).filter(|v| !v.trim().is_empty()))
        };

        Self {
            http: http
                .filter(|v| !v.trim().is_empty())
                .or_else(|| lookup("HTTP_PROXY", "http_proxy")),
            https: https
                .filter(|v| !v.trim().is_empty())
                .or_else(|| lookup("HTTPS_PROXY", "https_proxy")),
        }
    }

    /// The proxy used for all requests; HTTPS is preferred over HTTP.
    pub fn effective(&self) -> Option<&str> {
        self.https.as_deref().or(self.http.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct Download {
    pub url: String,
    pub path: PathBuf,
    pub size: u64,
    pub sha256: String,
}

pub struct Fetcher {
    agent: ureq::Agent,
    repo: String,
}

impl Fetcher {
    pub fn new(repo: &str, proxy: &ProxyConfig) -> Result<Self> {
        let mut builder = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT);

        if let Some(proxy_url) = proxy.effective() {
            debug!(proxy = proxy_url, "using proxy");
            let proxy = ureq::Proxy::new(proxy_url)
                .with_context(|| format!("Invalid proxy URL: {proxy_url}"))?;
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            agent: builder.build(),
            repo: repo.to_string(),
        })
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Release versions resolve to themselves; snapshots are looked up in the
    /// version-level metadata.
    pub fn resolve_version(&self, coordinate: &MavenCoordinate) -> Result<String> {
        if !coordinate.is_snapshot() {
            return Ok(coordinate.version.clone());
        }

        let url = repository_url(&self.repo, &coordinate.metadata_path());
        debug!(%url, "resolving snapshot version");
        let response = self.get(&url)?;
        let xml = response
            .into_string()
            .with_context(|| format!("Failed to read snapshot metadata: {url}"))?;
        let resolved = parse_snapshot_version(&xml, coordinate.base_version())
            .with_context(|| format!("Failed to resolve snapshot version from {url}"))?;
        info!(coordinate = %coordinate, resolved = %resolved, "resolved snapshot");
        Ok(resolved)
    }

    pub fn sources_jar_url(&self, coordinate: &MavenCoordinate, resolved_version: &str) -> String {
        repository_url(&self.repo, &coordinate.sources_jar_path(resolved_version))
    }

    /// Streams `url` to `dest` through a `.tmp` sibling that is renamed into
    /// place once the body is complete.
    pub fn download(&self, url: &str, dest: &Path) -> Result<Download> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        info!(%url, "downloading");
        let response = self.get(url)?;

        let mut tmp_os = dest.as_os_str().to_os_string();
        tmp_os.push(".tmp");
        let tmp = PathBuf::from(tmp_os);

        let written = copy_with_digest(response.into_reader(), &tmp);
        let (size, sha256) = match written {
            Ok(v) => v,
            Err(err) => {
                let _ = std::fs::remove_file(&tmp);
                return Err(err.context(format!("Failed to download {url}")));
            }
        };

        std::fs::rename(&tmp, dest).with_context(|| {
            format!("Failed to move download into place: {}", dest.display())
        })?;
        debug!(path = %dest.display(), size, "download complete");

        Ok(Download {
            url: url.to_string(),
            path: dest.to_path_buf(),
            size,
            sha256,
        })
    }

    fn get(&self, url: &str) -> Result<ureq::Response> {
        match self.agent.get(url).call() {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(404, _)) => {
                bail!("Could not resolve Maven coordinates. URL not found: {url}")
            }
            Err(ureq::Error::Status(code, _)) => {
                bail!("Failed to download {url}. Status code: {code}")
            }
            Err(err) => Err(anyhow::Error::new(err).context(format!("Request failed: {url}"))),
        }
    }
}

fn copy_with_digest(mut reader: impl Read, dest: &Path) -> Result<(u64, String)> {
    let file =
        File::create(dest).with_context(|| format!("Failed to create file: {}", dest.display()))?;
    let mut writer = BufWriter::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    let mut size = 0u64;

    loop {
        let n = reader.read(&mut buf).context("Failed to read response body")?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        writer.write_all(&buf[..n])?;
        size += n as u64;
    }
    writer.flush()?;

    Ok((size, hex::encode(hasher.finalize())))
}
