use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use zip::ZipArchive;

/// Read-only view of a zip container backed by a memory map.
///
/// Entry readers borrow from the map, so they never outlive the handle.
pub struct Archive {
    mmap: Mmap,
}

impl Archive {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open archive: {}", path.display()))?;
        // SAFETY: The file is opened read-only and nothing in this process writes to it
        // while the map is alive.
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("failed to mmap archive: {}", path.display()))?;
        Ok(Self { mmap })
    }

    pub fn entries(&self, path: &Path) -> Result<ZipArchive<Cursor<&[u8]>>> {
        ZipArchive::new(Cursor::new(&self.mmap[..]))
            .with_context(|| format!("failed to read zip structure: {}", path.display()))
    }
}

/// How the walker treats an entry, decided by its extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// jar, apk or aar: walked recursively.
    Archive,
    /// Android bytecode, walked after conversion to a jar.
    Dex,
    Class,
    Other,
}

impl EntryKind {
    pub fn of(entry_name: &str) -> Self {
        let Some(ext) = entry_extension(entry_name) else {
            return EntryKind::Other;
        };
        match ext.to_ascii_lowercase().as_str() {
            "jar" | "apk" | "aar" => EntryKind::Archive,
            "dex" => EntryKind::Dex,
            "class" => EntryKind::Class,
            _ => EntryKind::Other,
        }
    }
}

/// Extension of the last path component, without the dot.
pub fn entry_extension(entry_name: &str) -> Option<&str> {
    let base = file_name(entry_name);
    match base.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// Derives the fully-qualified class name from a `.class` entry path.
///
/// `org/example/Demo.class` becomes `org.example.Demo`; a class at the
/// archive root keeps its bare name.
pub fn class_name_for_entry(entry_name: &str) -> String {
    let (dir, base) = match entry_name.rsplit_once('/') {
        Some((dir, base)) => (dir, base),
        None => ("", entry_name),
    };
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => base,
    };

    if dir.is_empty() {
        stem.to_string()
    } else {
        format!("{}.{stem}", dir.replace('/', "."))
    }
}

pub fn join_origin(parent: &str, entry_name: &str) -> String {
    if parent.is_empty() {
        return entry_name.to_string();
    }
    format!("{}/{entry_name}", parent.trim_end_matches('/'))
}

/// Lexically cleans a slash-separated label: drops `.` and empty segments and
/// folds `..` into its parent, so `./libs//app.jar` becomes `libs/app.jar`.
pub fn clean_origin(label: &str) -> String {
    let rooted = label.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in label.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            _ => parts.push(segment),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

fn file_name(entry_name: &str) -> &str {
    entry_name.rsplit('/').next().unwrap_or(entry_name)
}
