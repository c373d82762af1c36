use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The name of the file, without its directories.
pub fn simplify_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Paths in the configuration file are relative to the directory of this file.
pub fn resolve_path(root: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

/// Reads the non-empty lines of a file.
///
/// Lines may end with CR, LF or NUL characters.
pub fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let bytes = fs::read(path)?;
    Ok(split_lines(&bytes))
}

fn split_lines(bytes: &[u8]) -> Vec<String> {
    bytes
        .split(|b| matches!(*b, b'\r' | b'\n' | 0))
        .filter(|line| !line.is_empty())
        .map(|line| String::from_utf8_lossy(line).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_on_all_line_endings() {
        let names = split_lines(b"Alice\r\nBob\n\n\0Carol\rDave");
        assert_eq!(names, vec!["Alice", "Bob", "Carol", "Dave"]);
    }

    #[test]
    fn spaces_are_kept() {
        assert_eq!(split_lines(b" Alice Smith \n"), vec![" Alice Smith "]);
        assert!(split_lines(b"\n\r\n").is_empty());
    }

    #[test]
    fn relative_paths() {
        let root = Path::new("/data/election");
        assert_eq!(
            resolve_path(root, "votes.txt"),
            PathBuf::from("/data/election/votes.txt")
        );
        assert_eq!(resolve_path(root, "/tmp/votes.txt"), PathBuf::from("/tmp/votes.txt"));
        assert_eq!(simplify_file_name(Path::new("/tmp/votes.txt")), "votes.txt");
    }
}
