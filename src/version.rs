//! Staleness check for the installed `gh contrib` extension.
//!
//! `gh` keeps extensions under `<data dir>/extensions/gh-<name>`. Binary
//! extensions carry a `manifest.yml` naming the release and host they were
//! installed from; that tag is compared with the repository's latest release
//! on that host. Git extensions compare their `HEAD` with the remote's.
//! Every failure along the way only means no advisory is printed.

use std::{
    env,
    ffi::OsString,
    fmt::Display,
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use itertools::Itertools;
use serde::Deserialize;

use crate::{client::GitHubClient, config::Config};

pub const EXTENSION_NAME: &str = "contrib";

const MANIFEST_FILE: &str = "manifest.yml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BinaryManifest {
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub host: String,
    pub tag: String,
}

/// Where an installed extension came from, which decides how it is versioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionSource {
    /// Installed from a release, described by `manifest.yml`.
    Release(BinaryManifest),
    /// A git clone following its remote's `HEAD`.
    Git,
    /// Linked from a local directory, never upgraded.
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledExtension {
    pub name: String,
    pub path: PathBuf,
    pub source: ExtensionSource,
}

impl InstalledExtension {
    /// Release tag, or the checked out commit for git extensions.
    pub fn current_version(&self) -> Option<String> {
        match &self.source {
            ExtensionSource::Release(manifest) => Some(manifest.tag.clone()),
            ExtensionSource::Git => git_output(&self.path, &["rev-parse", "HEAD"]),
            ExtensionSource::Local => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalRegistry {
    root: PathBuf,
}

impl LocalRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalRegistry { root: root.into() }
    }

    /// Registry of the current user's `gh` install, if a data dir can be found.
    pub fn locate() -> Option<Self> {
        data_dir(|key| env::var_os(key).filter(|v| !v.is_empty())).map(Self::new)
    }

    pub fn list(&self) -> Vec<InstalledExtension> {
        let dir = self.root.join("extensions");
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("cannot read extension dir {}: {e}", dir.display());
                return Vec::new();
            }
        };
        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let file_name = entry.file_name();
                let name = file_name.to_str()?.strip_prefix("gh-")?.to_string();
                let path = entry.path();
                // binary extensions are dirs, local ones may be symlinks to dirs
                if !path.is_dir() {
                    return None;
                }
                let source = match read_manifest(&path) {
                    Some(manifest) => ExtensionSource::Release(manifest),
                    None if path.join(".git").exists() => ExtensionSource::Git,
                    None => ExtensionSource::Local,
                };
                Some(InstalledExtension { name, path, source })
            })
            .sorted_by(|a, b| a.name.cmp(&b.name))
            .collect()
    }

    pub fn find(&self, name: &str) -> Option<InstalledExtension> {
        self.list().into_iter().find(|ext| ext.name == name)
    }
}

fn read_manifest(ext_dir: &Path) -> Option<BinaryManifest> {
    let path = ext_dir.join(MANIFEST_FILE);
    let contents = fs::read_to_string(&path).ok()?;
    match serde_yaml::from_str(&contents) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            log::debug!("ignoring unreadable manifest {}: {e}", path.display());
            None
        }
    }
}

fn data_dir(lookup: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    if let Some(dir) = lookup("GH_DATA_DIR") {
        return Some(PathBuf::from(dir));
    }
    if let Some(dir) = lookup("XDG_DATA_HOME") {
        return Some(PathBuf::from(dir).join("gh"));
    }
    if cfg!(windows) {
        if let Some(dir) = lookup("LOCALAPPDATA") {
            return Some(PathBuf::from(dir).join("GitHub CLI"));
        }
    }
    lookup("HOME").map(|home| PathBuf::from(home).join(".local").join("share").join("gh"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub current: String,
    pub latest: String,
}

impl Advisory {
    pub fn compare(current: &str, latest: &str) -> Option<Self> {
        if latest.is_empty() || current == latest {
            return None;
        }
        Some(Advisory {
            current: current.to_string(),
            latest: latest.to_string(),
        })
    }
}

impl Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "your {EXTENSION_NAME} extension is out of date: {} -> {}",
            self.current, self.latest
        )?;
        write!(f, "run `gh extension upgrade {EXTENSION_NAME}` to update")
    }
}

/// Advisory for the installed extension, `None` when it is current or
/// cannot be checked.
pub async fn check_version(registry: &LocalRegistry, client: &GitHubClient) -> Option<Advisory> {
    let Some(extension) = registry.find(EXTENSION_NAME) else {
        log::debug!("{EXTENSION_NAME} extension not installed, skipping version check");
        return None;
    };
    match &extension.source {
        ExtensionSource::Release(manifest) => {
            let latest = latest_release_tag(manifest, client).await?;
            Advisory::compare(&manifest.tag, &latest)
        }
        ExtensionSource::Git => {
            let current = extension.current_version()?;
            let latest = remote_head(&extension.path)?;
            Advisory::compare(&current, &latest).map(|advisory| Advisory {
                current: short_hash(&advisory.current).to_string(),
                latest: short_hash(&advisory.latest).to_string(),
            })
        }
        ExtensionSource::Local => {
            log::debug!(
                "{} is a local extension, skipping version check",
                extension.path.display()
            );
            None
        }
    }
}

/// Latest release of the manifest's repository, asked of the host it was
/// installed from.
async fn latest_release_tag(manifest: &BinaryManifest, client: &GitHubClient) -> Option<String> {
    let (owner, name) = (&manifest.owner, &manifest.name);
    let result = if manifest.host.is_empty() || manifest.host.eq_ignore_ascii_case(client.host()) {
        client.latest_release(owner, name).await
    } else {
        // the configured token belongs to another host, so ask anonymously
        let other = Config::for_host(&manifest.host, None).and_then(|config| GitHubClient::new(&config));
        match other {
            Ok(other) => other.latest_release(owner, name).await,
            Err(e) => {
                log::debug!("cannot build client for {}: {e}", manifest.host);
                return None;
            }
        }
    };
    match result {
        Ok(tag) => Some(tag),
        Err(e) => {
            log::debug!("latest release lookup for {owner}/{name} on {} failed: {e}", manifest.host);
            None
        }
    }
}

fn remote_head(repo: &Path) -> Option<String> {
    let listing = git_output(repo, &["ls-remote", "origin", "HEAD"])?;
    listing.split_whitespace().next().map(str::to_string)
}

fn short_hash(hash: &str) -> &str {
    &hash[..7.min(hash.len())]
}

fn git_output(workdir: &Path, args: &[&str]) -> Option<String> {
    let output = match Command::new("git").current_dir(workdir).args(args).output() {
        Ok(output) => output,
        Err(e) => {
            log::debug!("cannot run git: {e}");
            return None;
        }
    };
    if !output.status.success() {
        log::debug!(
            "git {} failed in {}: {}",
            args.join(" "),
            workdir.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return None;
    }
    let stdout = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!stdout.is_empty()).then_some(stdout)
}
