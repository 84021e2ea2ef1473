use crate::load::{group_path, load_group_file, save_group_file};
use crate::schema::{Assignment, GroupDocument, GroupId, GroupSnapshot};
use anyhow::bail;
use giftdraw_core::{check_against_roster, GroupStore, StoreError};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};

/// `GroupStore` over a directory holding one JSON document per group.
///
/// Commits are serialized by an in-process lock and published with an
/// atomic rename. Separate processes sharing a directory are not
/// coordinated.
#[derive(Debug)]
pub struct FileGroupStore {
    dir: PathBuf,
    commit_lock: Mutex<()>,
}

impl FileGroupStore {
    pub fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            commit_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a new group document; refuses to overwrite an existing group.
    pub fn create(&self, group: GroupSnapshot) -> anyhow::Result<PathBuf> {
        let _guard = self.commit_lock.lock();
        let path = group_path(&self.dir, &group.id)?;
        if path.exists() {
            bail!("group {} already exists at {}", group.id, path.display());
        }
        let mut doc = GroupDocument::new(group);
        doc.group.has_drawn = false;
        save_group_file(&path, &doc)?;
        Ok(path)
    }

    pub fn document(&self, group: &GroupId) -> Result<GroupDocument, StoreError> {
        let path = group_path(&self.dir, group).map_err(backend)?;
        if !path.exists() {
            return Err(StoreError::NotFound(group.clone()));
        }
        load_group_file(&path).map_err(backend)
    }

    pub fn list(&self) -> anyhow::Result<Vec<GroupId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(GroupId::new(stem));
            }
        }
        ids.sort();
        Ok(ids)
    }
}

fn backend(err: anyhow::Error) -> StoreError {
    StoreError::Backend(format!("{err:#}"))
}

impl GroupStore for FileGroupStore {
    fn snapshot(&self, group: &GroupId) -> Result<GroupSnapshot, StoreError> {
        Ok(self.document(group)?.group)
    }

    fn commit_draw(&self, group: &GroupId, assignment: &Assignment) -> Result<(), StoreError> {
        let _guard = self.commit_lock.lock();
        let mut doc = self.document(group)?;
        if doc.group.has_drawn {
            return Err(StoreError::AlreadyDrawn(group.clone()));
        }
        check_against_roster(&doc.group, assignment)?;
        doc.group.has_drawn = true;
        doc.draws = Some(assignment.clone());
        let path = group_path(&self.dir, group).map_err(backend)?;
        save_group_file(&path, &doc).map_err(backend)
    }

    fn assignment(&self, group: &GroupId) -> Result<Option<Assignment>, StoreError> {
        Ok(self.document(group)?.draws)
    }
}
