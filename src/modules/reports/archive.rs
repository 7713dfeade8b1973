//! Report files on disk: one JSON document per generated report.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bookstore_kernel::{Error, Result};

use super::models::Report;

const PREFIX: &str = "report_";
const EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct ReportArchive {
    dir: PathBuf,
}

impl ReportArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `report` as `report_YYYYMMDD_HHMMSS.json`, named after its
    /// `generated_at` in UTC.
    ///
    /// Existing files are never replaced: when the name is taken, a `_<n>`
    /// suffix with the smallest free `n` is appended.
    pub fn save(&self, report: &Report) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|err| Error::io(&self.dir, err))?;

        let stamp = report.generated_at.format("%Y%m%d_%H%M%S");
        let body = serde_json::to_vec_pretty(report).map_err(|err| Error::decode(&self.dir, err))?;

        let mut attempt = 0u32;
        loop {
            let name = match attempt {
                0 => format!("{PREFIX}{stamp}.{EXTENSION}"),
                n => format!("{PREFIX}{stamp}_{n}.{EXTENSION}"),
            };
            let path = self.dir.join(name);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    attempt += 1;
                    continue;
                }
                Err(err) => return Err(Error::io(&path, err)),
            };

            file.write_all(&body)
                .and_then(|()| file.sync_all())
                .map_err(|err| Error::io(&path, err))?;
            return Ok(path);
        }
    }

    /// Every archived report, oldest first. A missing directory is an empty archive.
    pub fn list(&self) -> Result<Vec<Report>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(Error::io(&self.dir, err)),
        };

        let mut reports = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| Error::io(&self.dir, err))?.path();
            if !is_report_file(&path) {
                continue;
            }
            let bytes = fs::read(&path).map_err(|err| Error::io(&path, err))?;
            let report: Report =
                serde_json::from_slice(&bytes).map_err(|err| Error::decode(&path, err))?;
            reports.push(report);
        }

        reports.sort_by_key(|report| report.generated_at);
        Ok(reports)
    }
}

fn is_report_file(path: &Path) -> bool {
    path.is_file()
        && path.extension().is_some_and(|ext| ext == EXTENSION)
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(PREFIX))
}
