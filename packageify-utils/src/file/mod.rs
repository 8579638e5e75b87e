//! File system helpers
//!
//! Shallow directory listing, text reading with a lossy fallback, and the
//! overwrite-style copies used by the passthrough phase.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// List the immediate children of `dir`, sorted by file name
///
/// Never descends into subdirectories.
pub fn list_entries(dir: &Path) -> crate::Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        entries.push(entry?.path());
    }
    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(entries)
}

/// Whether the file name of `path` ends with `.{extension}`
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(&format!(".{extension}")))
        .unwrap_or(false)
}

/// Read file as text, decoding invalid UTF-8 lossily
pub fn read_text_file(path: &Path) -> crate::Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            let bytes = fs::read(path)?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        Err(e) => Err(e.into()),
    }
}

/// Ensure directory exists, creating parents as needed
pub fn ensure_dir(path: &Path) -> crate::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    } else if !path.is_dir() {
        return Err(crate::UtilError::PathOperation(
            format!("Path exists but is not a directory: {}", path.display())
        ));
    }
    Ok(())
}

/// Copy `src` to `dst` byte for byte, replacing any existing file
pub fn copy_file_overwrite(src: &Path, dst: &Path) -> crate::Result<u64> {
    Ok(fs::copy(src, dst)?)
}

/// Copy a directory tree into `dst`, overwriting files that already exist
///
/// Returns the number of files copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> crate::Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src).map_err(|e| {
            crate::UtilError::PathOperation(format!(
                "{} is not under {}: {}", entry.path().display(), src.display(), e
            ))
        })?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_list_entries_is_shallow_and_sorted() -> crate::Result<()> {
        let temp_dir = tempdir()?;
        let root = temp_dir.path();
        fs::write(root.join("b.txt"), "b")?;
        fs::write(root.join("a.java"), "a")?;
        fs::create_dir_all(root.join("nested"))?;
        fs::write(root.join("nested").join("deep.java"), "deep")?;

        let names: Vec<String> = list_entries(root)?
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["a.java", "b.txt", "nested"]);
        Ok(())
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("src/Game.java"), "java"));
        assert!(!has_extension(Path::new("src/Game.javax"), "java"));
        assert!(!has_extension(Path::new("java"), "java"));
        assert!(has_extension(Path::new(".java"), "java"));
    }

    #[test]
    fn test_read_text_file_lossy() -> crate::Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("latin1.txt");
        fs::write(&path, [b'c', b'a', b'f', 0xE9])?;

        let text = read_text_file(&path)?;
        assert!(text.starts_with("caf"));
        assert!(text.contains('\u{FFFD}'));
        Ok(())
    }

    #[test]
    fn test_ensure_dir_rejects_file() -> crate::Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("occupied");
        fs::write(&path, "file")?;

        assert!(ensure_dir(&path).is_err());
        ensure_dir(&temp_dir.path().join("x").join("y"))?;
        assert!(temp_dir.path().join("x").join("y").is_dir());
        Ok(())
    }

    #[test]
    fn test_copy_file_overwrite_is_idempotent() -> crate::Result<()> {
        let temp_dir = tempdir()?;
        let src = temp_dir.path().join("notes.txt");
        let dst = temp_dir.path().join("copy.txt");
        fs::write(&src, "payload")?;
        fs::write(&dst, "older and longer content")?;

        copy_file_overwrite(&src, &dst)?;
        copy_file_overwrite(&src, &dst)?;

        assert_eq!(fs::read(&dst)?, b"payload");
        Ok(())
    }

    #[test]
    fn test_copy_dir_recursive() -> crate::Result<()> {
        let temp_dir = tempdir()?;
        let src = temp_dir.path().join("assets");
        fs::create_dir_all(src.join("img"))?;
        fs::write(src.join("readme.md"), "hi")?;
        fs::write(src.join("img").join("logo.png"), [0u8, 1, 2])?;

        let dst = temp_dir.path().join("out").join("assets");
        let copied = copy_dir_recursive(&src, &dst)?;

        assert_eq!(copied, 2);
        assert_eq!(fs::read(dst.join("img").join("logo.png"))?, vec![0u8, 1, 2]);
        Ok(())
    }
}
