use crate::schema::{GroupDocument, GroupId, GROUP_SCHEMA_VERSION};
use anyhow::{bail, Context};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const GROUP_FILE_EXT: &str = "json";

/// Path of a group's document inside `dir`.
pub fn group_path(dir: &Path, id: &GroupId) -> anyhow::Result<PathBuf> {
    let raw = id.as_str();
    let valid = !raw.is_empty()
        && raw
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    if !valid {
        bail!("invalid group id {raw:?}");
    }
    Ok(dir.join(format!("{raw}.{GROUP_FILE_EXT}")))
}

pub fn load_group_file(path: &Path) -> anyhow::Result<GroupDocument> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let doc: GroupDocument =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    if doc.version != GROUP_SCHEMA_VERSION {
        bail!(
            "unsupported group version {} in {} (expected {})",
            doc.version,
            path.display(),
            GROUP_SCHEMA_VERSION
        );
    }
    let stem = path.file_stem().and_then(|stem| stem.to_str());
    if stem != Some(doc.group.id.as_str()) {
        bail!(
            "{} holds group {}, expected the file to be named after it",
            path.display(),
            doc.group.id
        );
    }
    if doc.group.has_drawn != doc.draws.is_some() {
        bail!("{}: drawn flag and stored pairs disagree", path.display());
    }
    debug!(path = %path.display(), members = doc.group.members.len(), "loaded group");
    Ok(doc)
}

/// Write through a sibling temp file, sync it, and rename over the target, so
/// readers see either the old document or the new one, never a mix.
pub fn save_group_file(path: &Path, doc: &GroupDocument) -> anyhow::Result<()> {
    let body = serde_json::to_string_pretty(doc).context("serialize group")?;
    let tmp = path.with_extension(format!("{GROUP_FILE_EXT}.tmp"));
    let mut file = File::create(&tmp).with_context(|| format!("create {}", tmp.display()))?;
    file.write_all(body.as_bytes())
        .with_context(|| format!("write {}", tmp.display()))?;
    file.sync_all()
        .with_context(|| format!("sync {}", tmp.display()))?;
    drop(file);
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    debug!(path = %path.display(), drawn = doc.group.has_drawn, "saved group");
    Ok(())
}
