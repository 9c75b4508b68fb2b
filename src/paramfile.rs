//! Parameter file load/save
//!
//! Plain text, one `<index>\t<value>\n` line per meaningful entry, indices
//! strictly increasing, gaps default to zero. Save backs up the existing
//! file to `.bak` before rewriting, preserving every previously-present
//! index alongside the required set.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, ParamFileError};
use crate::params::{required_parameters, ParameterTable};

/// Default parameter filename, used when a caller doesn't supply one.
pub const DEFAULT_PARAMETER_FILENAME: &str = "rs274ngc.var";

/// Load a parameter table from `path`.
///
/// # Errors
/// [`ParamFileError::UnableToOpen`] if the file can't be read,
/// [`ParamFileError::MalformedLine`] if a line isn't `<index>\t<value>`,
/// [`ParamFileError::OutOfOrder`] if indices aren't strictly increasing, and
/// [`ParamFileError::RequiredParameterMissing`] if any index from
/// [`required_parameters`] is absent.
pub fn load(path: &Path) -> Result<ParameterTable, Error> {
    let text = fs::read_to_string(path).map_err(|_| ParamFileError::UnableToOpen {
        path: path.display().to_string(),
    })?;

    let mut table = ParameterTable::new();
    let mut last_index: Option<i32> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.splitn(2, '\t');
        let (index_str, value_str) = match (parts.next(), parts.next()) {
            (Some(i), Some(v)) => (i, v),
            _ => {
                return Err(ParamFileError::MalformedLine {
                    line: raw_line.to_string(),
                }
                .into())
            }
        };

        let index: i32 = index_str.trim().parse().map_err(|_| ParamFileError::MalformedLine {
            line: raw_line.to_string(),
        })?;
        let value: f64 = value_str.trim().parse().map_err(|_| ParamFileError::MalformedLine {
            line: raw_line.to_string(),
        })?;

        if let Some(prev) = last_index {
            if index <= prev {
                return Err(ParamFileError::OutOfOrder { index }.into());
            }
        }
        last_index = Some(index);

        table.set(index, value);
    }

    for index in required_parameters() {
        if !has_index(&table, index) {
            return Err(ParamFileError::RequiredParameterMissing { index }.into());
        }
    }

    debug!(path = %path.display(), "loaded parameter file");
    Ok(table)
}

fn has_index(table: &ParameterTable, index: i32) -> bool {
    table.iter().any(|(i, _)| i == index)
}

/// Save `table` to `path`, backing up any existing file to `path` + `.bak`
/// first. Writes the required-parameter set plus every previously-present
/// index, in ascending order.
///
/// # Errors
/// [`ParamFileError::CannotCreateBackup`] if an existing file can't be
/// renamed aside, or [`ParamFileError::Io`] for any other I/O failure.
pub fn save(path: &Path, table: &ParameterTable) -> Result<(), Error> {
    if path.exists() {
        let backup = backup_path(path);
        fs::rename(path, &backup).map_err(|_| ParamFileError::CannotCreateBackup {
            path: backup.display().to_string(),
        })?;
    }

    let mut indices: Vec<i32> = required_parameters();
    for (index, _) in table.iter() {
        if !indices.contains(&index) {
            indices.push(index);
        }
    }
    indices.sort_unstable();
    indices.dedup();

    let mut out = String::new();
    for index in indices {
        out.push_str(&format!("{}\t{}\n", index, table.get(index)));
    }

    fs::write(path, out).map_err(|e| ParamFileError::Io(e.to_string()))?;
    info!(path = %path.display(), "saved parameter file");
    Ok(())
}

fn backup_path(path: &Path) -> std::path::PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    std::path::PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::required_parameters;

    fn minimal_table() -> ParameterTable {
        let mut t = ParameterTable::new();
        for index in required_parameters() {
            t.set(index, 0.0);
        }
        t
    }

    #[test]
    fn round_trips_through_tempfile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.var");

        let mut table = minimal_table();
        table.set(5220, 1.0);
        table.set(5221, 2.5);
        save(&path, &table).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.get(5220), 1.0);
        assert_eq!(loaded.get(5221), 2.5);
    }

    #[test]
    fn save_then_save_again_creates_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.var");
        let table = minimal_table();

        save(&path, &table).unwrap();
        save(&path, &table).unwrap();

        assert!(backup_path(&path).exists());
    }

    #[test]
    fn missing_required_parameter_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.var");
        fs::write(&path, "1\t0.0\n").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(
            err,
            Error::ParamFile(ParamFileError::RequiredParameterMissing { .. })
        ));
    }

    #[test]
    fn out_of_order_indices_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.var");
        fs::write(&path, "10\t1.0\n5\t2.0\n").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(
            err,
            Error::ParamFile(ParamFileError::OutOfOrder { index: 5 })
        ));
    }

    #[test]
    fn malformed_line_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.var");
        fs::write(&path, "not a valid line\n").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, Error::ParamFile(ParamFileError::MalformedLine { .. })));
    }
}
