//! Safety checks on output locations.
//!
//! The library and incoming trees are read-only inputs. These checks make
//! sure the Upload root and the report path never land inside them or wrap
//! around them, so a run can't write into (or overwrite files in) a source
//! tree.

use std::path::{Component, Path, PathBuf};

use crate::error::{DedupError, Result};

/// Absolute, symlink-resolved form of a path that may not exist yet.
///
/// The deepest existing ancestor is canonicalized and the remaining
/// components are appended lexically.
fn resolve(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut existing = absolute.as_path();
    let mut rest: Vec<&std::ffi::OsStr> = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            let mut resolved = canonical;
            for part in rest.iter().rev() {
                resolved.push(part);
            }
            return lexical(&resolved);
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name);
                existing = parent;
            }
            _ => return lexical(&absolute),
        }
    }
}

/// Drop `.` and fold `..` without touching the filesystem.
fn lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Validates that an output location is safe to write.
///
/// Checks:
/// - Output cannot be the same as any protected root
/// - Output cannot be inside any protected root
/// - Output cannot contain any protected root (a staging tree wrapped
///   around the library would write into it)
///
/// # Arguments
/// * `output` - File or directory the run will create or write into
/// * `protected` - Source roots that must stay untouched
///
/// # Returns
/// * `Ok(())` if the output path is safe
/// * `Err(DedupError::Configuration)` naming the output and the root it
///   collides with
pub fn validate_output_path(output: &Path, protected: &[&Path]) -> Result<()> {
    let resolved_output = resolve(output);

    for root in protected {
        let resolved_root = resolve(root);
        if resolved_output == resolved_root {
            return Err(DedupError::config(
                output,
                format!(
                    "Safety check failed: output cannot be the same as source '{}'",
                    root.display()
                ),
            ));
        }
        if resolved_output.starts_with(&resolved_root) {
            return Err(DedupError::config(
                output,
                format!(
                    "Safety check failed: output cannot be inside source '{}'",
                    root.display()
                ),
            ));
        }
        if resolved_root.starts_with(&resolved_output) {
            return Err(DedupError::config(
                output,
                format!(
                    "Safety check failed: output cannot contain source '{}'",
                    root.display()
                ),
            ));
        }
    }

    Ok(())
}
