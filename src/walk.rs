//! Depth-first walk over nested Java archives.
//!
//! Each archive level is opened, scanned in listing order, and closed before
//! the call returns. Nested containers are copied in full into the scratch
//! directory and walked immediately, before the next sibling entry, so output
//! follows the order entries appear in their archives.

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;
use tempfile::{Builder, NamedTempFile, TempPath};
use tracing::{debug, info, trace};

use crate::archive::{Archive, EntryKind, class_name_for_entry, join_origin};
use crate::filter::ClassFilter;
use crate::javap::{Converter, Disassembler};

const TEMP_PREFIX: &str = "jarwalk";
const COMPILED_FROM: &[u8] = b"Compiled from ";

#[derive(Debug, Clone, Copy, Default)]
pub struct WalkStats {
    pub archives: usize,
    pub classes: usize,
    pub filtered: usize,
    pub dex_skipped: usize,
    pub skipped: usize,
}

pub struct Walker<'a, W: Write> {
    disassembler: &'a dyn Disassembler,
    converter: Option<&'a dyn Converter>,
    filter: ClassFilter,
    extra_args: Vec<String>,
    scratch: &'a Path,
    out: W,
    stats: WalkStats,
}

impl<'a, W: Write> Walker<'a, W> {
    /// `scratch` must be a writable directory; it receives one file per nested archive.
    pub fn new(disassembler: &'a dyn Disassembler, scratch: &'a Path, out: W) -> Self {
        Self {
            disassembler,
            converter: None,
            filter: ClassFilter::default(),
            extra_args: Vec::new(),
            scratch,
            out,
            stats: WalkStats::default(),
        }
    }

    pub fn with_converter(mut self, converter: Option<&'a dyn Converter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn with_filter(mut self, filter: ClassFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    /// Returns the output writer, e.g. to inspect buffered output.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Walks `archive_path`, labelling its entries with `origin` in the output.
    pub fn walk(&mut self, archive_path: &Path, origin: &str) -> Result<()> {
        let archive = Archive::open(archive_path)?;
        let mut entries = archive.entries(archive_path)?;
        self.stats.archives += 1;
        debug!(archive = %archive_path.display(), origin, entries = entries.len(), "walking archive");

        for i in 0..entries.len() {
            // Headers only: skipped entries are never decompressed or decrypted.
            let (name, is_dir) = {
                let raw = entries
                    .by_index_raw(i)
                    .with_context(|| format!("failed to read entry #{i} of {origin}"))?;
                (raw.name().to_string(), raw.is_dir())
            };
            if is_dir {
                continue;
            }

            let trail = join_origin(origin, &name);

            match EntryKind::of(&name) {
                EntryKind::Archive => {
                    let nested = {
                        let mut entry = entries
                            .by_index(i)
                            .with_context(|| format!("failed to open {trail}"))?;
                        self.extract(&mut entry, &trail)?
                    };
                    info!(origin = %trail, "descending into nested archive");
                    self.walk(nested.path(), &trail)?;
                }
                EntryKind::Dex => {
                    let Some(converter) = self.converter else {
                        debug!(origin = %trail, "no dex2jar configured, skipping dex");
                        self.stats.dex_skipped += 1;
                        continue;
                    };
                    let dex = {
                        let mut entry = entries
                            .by_index(i)
                            .with_context(|| format!("failed to open {trail}"))?;
                        self.extract(&mut entry, &trail)?
                    };
                    let jar = self.converted_jar_path()?;
                    info!(origin = %trail, "converting dex to jar");
                    converter
                        .convert(dex.path(), &jar)
                        .with_context(|| format!("failed to convert {trail}"))?;
                    self.walk(&jar, &trail)?;
                }
                EntryKind::Class => {
                    self.disassemble(archive_path, &name, &trail)?;
                }
                EntryKind::Other => {
                    trace!(origin = %trail, "skipping entry");
                    self.stats.skipped += 1;
                }
            }
        }

        Ok(())
    }

    fn extract(&self, entry: &mut impl io::Read, trail: &str) -> Result<NamedTempFile> {
        let mut tmp = Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(self.scratch)
            .with_context(|| format!("failed to create temp file in {}", self.scratch.display()))?;
        io::copy(entry, tmp.as_file_mut())
            .with_context(|| format!("failed to extract {trail}"))?;
        tmp.as_file_mut()
            .flush()
            .with_context(|| format!("failed to extract {trail}"))?;
        Ok(tmp)
    }

    /// Reserves a unique path for converter output; the file itself is left for the converter
    /// to create.
    fn converted_jar_path(&self) -> Result<TempPath> {
        let path = Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".jar")
            .tempfile_in(self.scratch)
            .with_context(|| format!("failed to create temp file in {}", self.scratch.display()))?
            .into_temp_path();
        std::fs::remove_file(&path)
            .with_context(|| format!("failed to reserve {}", path.display()))?;
        Ok(path)
    }

    fn disassemble(&mut self, classpath: &Path, entry_name: &str, trail: &str) -> Result<()> {
        let class_name = class_name_for_entry(entry_name);
        if !self.filter.is_match(&class_name) {
            trace!(class = %class_name, "filtered out");
            self.stats.filtered += 1;
            return Ok(());
        }

        let text = self
            .disassembler
            .disassemble(classpath, &class_name, &self.extra_args)
            .with_context(|| format!("failed to disassemble {class_name} from {trail}"))?;

        writeln!(self.out, "// class '{class_name}' from '{trail}'")?;
        if text.starts_with(COMPILED_FROM) {
            self.out.write_all(b"// ")?;
        }
        self.out.write_all(&text)?;
        writeln!(self.out)?;
        self.out.flush()?;

        self.stats.classes += 1;
        Ok(())
    }
}
