#![allow(dead_code)]

use skelly::constants::{MARKER_FILE, SKELETONS_DIR};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Writes a skeleton with the given marker file content and files into a repository root.
///
/// # Arguments
/// * `repository` - Root of the repository; the skeleton goes below `skeletons/`.
/// * `name` - Skeleton name, may contain `/`.
/// * `marker` - Content of the marker file.
/// * `files` - Relative paths and contents of the skeleton files.
pub fn write_skeleton(
    repository: &Path,
    name: &str,
    marker: &str,
    files: &[(&str, &str)],
) -> PathBuf {
    let dir = repository.join(SKELETONS_DIR).join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(MARKER_FILE), marker).unwrap();
    write_tree(&dir, files);
    dir
}

/// Writes files below `root`, creating parent directories as needed.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

/// Relative paths of all regular files below `root`, sorted.
pub fn list_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path().strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}

/// Prints a diff of files and their contents between two directories.
/// Shows files only present in one directory and content differences for files present in both.
///
/// # Arguments
/// * `dir1` - The first directory to compare (actual output).
/// * `dir2` - The second directory to compare (expected output).
pub fn print_dir_diff(dir1: &Path, dir2: &Path) {
    let files1 = list_files(dir1);
    let files2 = list_files(dir2);

    println!("\n=== Directory Comparison ===");
    println!("Actual output:   {:?}", dir1);
    println!("Expected output: {:?}", dir2);

    for file in files1.iter().filter(|f| !files2.contains(f)) {
        println!("  + {file}");
    }
    for file in files2.iter().filter(|f| !files1.contains(f)) {
        println!("  - {file}");
    }
    for file in files1.iter().filter(|f| files2.contains(f)) {
        let actual = fs::read(dir1.join(file)).unwrap();
        let expected = fs::read(dir2.join(file)).unwrap();
        if actual != expected {
            println!("\n  File: {file}");
            println!("  --- Actual content:\n{}", String::from_utf8_lossy(&actual));
            println!("  --- Expected content:\n{}", String::from_utf8_lossy(&expected));
        }
    }
    println!("=== End of Comparison ===\n");
}

/// Asserts that two directory trees are identical, printing the differences otherwise.
pub fn assert_dirs_equal(actual: &Path, expected: &Path) {
    if dir_diff::is_different(actual, expected).unwrap() {
        print_dir_diff(actual, expected);
        panic!("Directories differ. See above for details.");
    }
}
