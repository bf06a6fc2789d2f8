//! Checks applied to user supplied file locations
//!
//! Every failure is a [`WizardError::UserInput`] carrying the message shown
//! to the user.

use std::path::{Component, Path, PathBuf};

use crate::{DatastoreWizardContext, WizardError};

const SERVER_FILE_EXTENSIONS: [&str; 2] = [".csv", ".tsv"];

/// Turn a location typed by the user into a path.
///
/// Relative locations are resolved against the repository directory.
/// Empty locations, NUL bytes and `..` components are rejected.
pub fn resolve_location(
    context: &DatastoreWizardContext,
    filepath: &str,
) -> Result<PathBuf, WizardError> {
    let filepath = filepath.trim();
    if filepath.is_empty() {
        return Err(WizardError::user_input("Please enter a file location"));
    }
    if filepath.contains('\0') {
        return Err(WizardError::user_input(format!(
            "Invalid file location:\n{}",
            filepath.replace('\0', "\\0")
        )));
    }

    let path = Path::new(filepath);
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(WizardError::user_input(format!(
            "For security reasons, file locations may not contain '..':\n{}",
            filepath
        )));
    }

    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(context.repository_dir().join(path))
    }
}

/// Only `.csv` and `.tsv` files may be referenced on the server
pub fn check_server_file_extension(filepath: &str) -> Result<(), WizardError> {
    let lower = filepath.trim().to_lowercase();
    if SERVER_FILE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        Ok(())
    } else {
        Err(WizardError::user_input(
            "For security reasons, only existing .csv and .tsv files can be referenced on the server",
        ))
    }
}

/// Make sure the directory of `file` exists and accepts new files
pub fn ensure_writable_directory(filepath: &str, file: &Path) -> Result<(), WizardError> {
    let directory = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    if !directory.exists() {
        if let Err(e) = std::fs::create_dir_all(directory) {
            tracing::warn!(directory = %directory.display(), error = %e, "failed to create directory");
            return Err(WizardError::user_input(format!(
                "Could not create directory for file:\n{}",
                filepath
            )));
        }
        tracing::debug!(directory = %directory.display(), "created directory");
    }

    // Check with a throwaway file
    if let Err(e) = tempfile::tempfile_in(directory) {
        tracing::warn!(directory = %directory.display(), error = %e, "directory is not writable");
        return Err(WizardError::user_input(format!(
            "Cannot write data to directory of file:\n{}",
            filepath
        )));
    }
    Ok(())
}

/// Whether both paths name one existing file, however they are spelled
pub fn is_same_file(a: &Path, b: &Path) -> bool {
    let (Ok(a_meta), Ok(b_meta)) = (std::fs::metadata(a), std::fs::metadata(b)) else {
        return false;
    };
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        a_meta.dev() == b_meta.dev() && a_meta.ino() == b_meta.ino()
    }
    #[cfg(not(unix))]
    {
        let _ = (a_meta, b_meta);
        matches!(
            (std::fs::canonicalize(a), std::fs::canonicalize(b)),
            (Ok(a), Ok(b)) if a == b
        )
    }
}

/// An existing file must be readable. Missing files pass.
pub fn check_readable(filepath: &str, file: &Path) -> Result<(), WizardError> {
    if !file.exists() {
        return Ok(());
    }
    let readable = file.is_file() && std::fs::File::open(file).is_ok();
    if readable {
        Ok(())
    } else {
        Err(WizardError::user_input(format!(
            "Cannot read from file:\n{}",
            filepath
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn message(err: WizardError) -> String {
        match err {
            WizardError::UserInput(message) => message,
            other => panic!("expected user input error, got {:?}", other),
        }
    }

    #[test]
    fn extension_whitelist_ignores_case() {
        for ok in ["a.csv", "A.CSV", "dir/b.Tsv", "  c.tsv "] {
            assert!(check_server_file_extension(ok).is_ok(), "{}", ok);
        }
        for rejected in ["a.txt", "csv", "a.csv.bak", "/etc/passwd", "a.xlsx"] {
            let err = check_server_file_extension(rejected).unwrap_err();
            assert_eq!(
                message(err),
                "For security reasons, only existing .csv and .tsv files can be referenced on the server"
            );
        }
    }

    #[test]
    fn resolve_rejects_unsafe_locations() {
        let context = DatastoreWizardContext::new("/srv/repo");
        assert!(resolve_location(&context, "").is_err());
        assert!(resolve_location(&context, "   ").is_err());
        assert!(resolve_location(&context, "a\0.csv").is_err());
        assert!(resolve_location(&context, "../secret.csv").is_err());
        assert!(resolve_location(&context, "data/../../x.csv").is_err());
        assert!(resolve_location(&context, "/tmp/../etc/x.csv").is_err());
    }

    #[test]
    fn resolve_relative_and_absolute() {
        let context = DatastoreWizardContext::new("/srv/repo");
        assert_eq!(
            resolve_location(&context, " data/orders.csv ").unwrap(),
            PathBuf::from("/srv/repo/data/orders.csv")
        );
        assert_eq!(
            resolve_location(&context, "/data/orders.csv").unwrap(),
            PathBuf::from("/data/orders.csv")
        );
        assert_eq!(
            resolve_location(&context, "./orders..csv").unwrap(),
            PathBuf::from("/srv/repo/./orders..csv")
        );
    }

    #[test]
    fn missing_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a/b/c.csv");
        ensure_writable_directory("a/b/c.csv", &file).unwrap();
        assert!(dir.path().join("a/b").is_dir());
    }

    #[test]
    fn directory_under_a_file_cannot_be_created() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blocker"), "x").unwrap();
        let file = dir.path().join("blocker/sub/c.csv");

        let err = ensure_writable_directory("blocker/sub/c.csv", &file).unwrap_err();
        assert_eq!(message(err), "Could not create directory for file:\nblocker/sub/c.csv");
    }

    #[test]
    fn same_file_sees_through_spellings() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.csv");
        std::fs::write(&file, "a\n").unwrap();

        assert!(is_same_file(&file, &dir.path().join("./x.csv")));
        assert!(!is_same_file(&file, &dir.path().join("y.csv")));

        std::fs::write(dir.path().join("y.csv"), "a\n").unwrap();
        assert!(!is_same_file(&file, &dir.path().join("y.csv")));
    }

    #[test]
    fn readable_checks() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.csv");
        assert!(check_readable("x.csv", &file).is_ok());

        std::fs::write(&file, "a\n").unwrap();
        assert!(check_readable("x.csv", &file).is_ok());

        let err = check_readable("sub.csv", dir.path()).unwrap_err();
        assert!(message(err).starts_with("Cannot read from file:\n"));
    }
}
