//! Filesystem helpers used by value conversion and batch planning.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// True when `path` names something on disk.
pub fn exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

/// True when `path` names a regular file that can be opened.
pub fn is_readable_file(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    path.is_file() && File::open(path).is_ok()
}

/// Non-blank lines of a text file, trailing `\r` removed.
pub fn read_lines(path: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let file = File::open(path.as_ref())?;
    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        lines.push(line.to_string());
    }
    Ok(lines)
}

/// Regular files directly inside `dir` whose file name passes `keep`, sorted by name.
pub fn list_files<F>(dir: &Path, keep: F) -> io::Result<Vec<PathBuf>>
where
    F: Fn(&str) -> bool,
{
    if !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", dir.display()),
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!("skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if keep(name) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Write `contents` to `path`, refusing to replace an existing file unless `overwrite`.
pub fn write_new_file(path: &Path, contents: &str, overwrite: bool) -> io::Result<()> {
    if path.exists() && !overwrite {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!(
                "{} already exists, pass overwrite to replace it",
                path.display()
            ),
        ));
    }
    fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn read_lines_skips_blank_lines() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("values.txt");
        fs::write(&path, "3\n\n  \n4\r\n5\n").expect("write");
        assert_eq!(read_lines(&path).expect("read"), vec!["3", "4", "5"]);
    }

    #[test]
    fn list_files_is_flat_and_sorted() {
        let temp = TempDir::new().expect("temp dir");
        fs::write(temp.path().join("b.txt"), "").expect("write");
        fs::write(temp.path().join("a.txt"), "").expect("write");
        fs::write(temp.path().join("c.md"), "").expect("write");
        fs::create_dir(temp.path().join("nested.txt")).expect("mkdir");
        fs::write(temp.path().join("nested.txt").join("d.txt"), "").expect("write");

        let files = list_files(temp.path(), |name| name.ends_with(".txt")).expect("list");
        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn list_files_rejects_missing_dir() {
        let temp = TempDir::new().expect("temp dir");
        assert!(list_files(&temp.path().join("nope"), |_| true).is_err());
    }

    #[test]
    fn write_new_file_respects_overwrite() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("params.tab.txt");
        write_new_file(&path, "one", false).expect("first write");
        let err = write_new_file(&path, "two", false).expect_err("second write");
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        write_new_file(&path, "two", true).expect("overwrite");
        assert_eq!(fs::read_to_string(&path).expect("read"), "two");
    }
}
