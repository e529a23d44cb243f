//! Feeds source units to the association machine.
//!
//! A source unit is one `.java` file or one `.java` entry of a ZIP/JAR. Each
//! unit gets its own [`Scanner`]; archive entries are scanned in parallel and
//! reported in entry order.

use anyhow::{Context, Result};
use memmap2::Mmap;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::machine::Scanner;
use crate::record::PairedRecord;
use crate::scan::discover_inputs;

#[derive(Debug, Default)]
pub struct Extraction {
    pub units: usize,
    pub records: Vec<PairedRecord>,
}

impl Extraction {
    pub fn merge(&mut self, other: Extraction) {
        self.units += other.units;
        self.records.extend(other.records);
    }
}

pub fn extract_lines<I, S>(origin: &str, lines: I) -> Vec<PairedRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut scanner = Scanner::new(origin);
    let records: Vec<PairedRecord> = lines
        .into_iter()
        .filter_map(|line| scanner.push(line.as_ref()))
        .collect();
    if scanner.is_pending() {
        debug!(origin, "unit ended inside a doc comment or declaration");
    }
    records
}

pub fn extract_source(origin: &str, source: &str) -> Vec<PairedRecord> {
    extract_lines(origin, source.lines())
}

/// A unit that cannot be read in full contributes no records.
pub fn extract_reader<R: BufRead>(origin: &str, reader: R) -> Vec<PairedRecord> {
    match reader.lines().collect::<std::io::Result<Vec<String>>>() {
        Ok(lines) => extract_lines(origin, lines),
        Err(err) => {
            warn!(origin, error = %err, "failed to read source unit, skipping");
            Vec::new()
        }
    }
}

pub fn extract_file(path: &Path) -> Result<Extraction> {
    let file =
        File::open(path).with_context(|| format!("Failed to open source file: {}", path.display()))?;
    let origin = path.to_string_lossy();
    Ok(Extraction {
        units: 1,
        records: extract_reader(&origin, BufReader::new(file)),
    })
}

pub fn extract_archive(archive_path: &Path) -> Result<Extraction> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;
    // SAFETY: The file is opened read-only and outlives the mapping.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to mmap archive: {}", archive_path.display()))?;
    let mut archive = ZipArchive::new(Cursor::new(&mmap[..]))
        .with_context(|| format!("Failed to read zip structure: {}", archive_path.display()))?;

    let mut units = Vec::new();
    for i in 0..archive.len() {
        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(index = i, error = %err, "unreadable archive entry, skipping");
                continue;
            }
        };
        if entry.is_dir() || !entry.name().ends_with(".java") {
            continue;
        }

        let name = entry.name().to_string();
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        match entry.read_to_end(&mut bytes) {
            Ok(_) => units.push((name, String::from_utf8_lossy(&bytes).into_owned())),
            Err(err) => {
                warn!(entry = %name, error = %err, "failed to read archive entry, skipping");
                units.push((name, String::new()));
            }
        }
    }

    debug!(
        archive = %archive_path.display(),
        units = units.len(),
        "scanning source units"
    );

    let per_unit: Vec<Vec<PairedRecord>> = units
        .par_iter()
        .map(|(name, source)| extract_source(name, source))
        .collect();

    Ok(Extraction {
        units: units.len(),
        records: per_unit.into_iter().flatten().collect(),
    })
}

pub fn extract_path(path: &Path) -> Result<Extraction> {
    if path.is_dir() {
        let inputs = discover_inputs(path)?;
        let results: Vec<Result<Extraction>> =
            inputs.par_iter().map(|p| extract_single(p)).collect();

        let mut combined = Extraction::default();
        for result in results {
            combined.merge(result?);
        }
        return Ok(combined);
    }

    extract_single(path)
}

fn extract_single(path: &Path) -> Result<Extraction> {
    if is_archive(path) {
        extract_archive(path)
    } else {
        extract_file(path)
    }
}

pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jar") || e.eq_ignore_ascii_case("zip"))
}
