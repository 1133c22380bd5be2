// TeleSift - app/descriptor_mgr.rs
//
// Manages loading of subsystem descriptors from both built-in sources
// (embedded in the binary) and user-defined TOML files on disk.
// User descriptors override built-in descriptors with the same ID.

use crate::core::descriptor;
use crate::core::model::Subsystem;
use crate::util::constants;
use crate::util::error::DescriptorError;
use std::path::Path;

/// Load all available descriptors: built-in first, then user-defined overrides.
///
/// User descriptors with the same ID as a built-in replace the built-in in
/// place, so output order stays stable. Invalid descriptors are logged and
/// skipped (non-fatal).
///
/// Returns the merged list and any non-fatal errors encountered.
pub fn load_all_descriptors(
    user_descriptor_dir: Option<&Path>,
) -> (Vec<Subsystem>, Vec<DescriptorError>) {
    let mut subsystems = descriptor::load_builtin_descriptors();
    let mut errors = Vec::new();

    tracing::info!(builtin_count = subsystems.len(), "Loaded built-in descriptors");

    if let Some(dir) = user_descriptor_dir {
        if dir.is_dir() {
            let (user_subsystems, user_errors) = load_user_descriptors(dir);
            errors.extend(user_errors);

            for user in user_subsystems {
                if let Some(err) = table_conflict(&subsystems, &user) {
                    tracing::warn!(error = %err, "Skipping descriptor with conflicting table");
                    errors.push(err);
                    continue;
                }
                if let Some(pos) = subsystems.iter().position(|s| s.id == user.id) {
                    tracing::info!(subsystem_id = %user.id, "User descriptor overrides built-in");
                    subsystems[pos] = user;
                } else {
                    tracing::info!(subsystem_id = %user.id, "Loaded user-defined descriptor");
                    subsystems.push(user);
                }
            }
        } else {
            tracing::debug!(
                dir = %dir.display(),
                "User descriptor directory does not exist (skipping)"
            );
        }
    }

    if subsystems.len() > constants::MAX_DESCRIPTORS {
        tracing::warn!(
            count = subsystems.len(),
            max = constants::MAX_DESCRIPTORS,
            "Too many descriptors loaded, truncating"
        );
        errors.push(DescriptorError::TooManyDescriptors {
            count: subsystems.len(),
            max: constants::MAX_DESCRIPTORS,
        });
        subsystems.truncate(constants::MAX_DESCRIPTORS);
    }

    tracing::info!(total = subsystems.len(), "Descriptor loading complete");

    (subsystems, errors)
}

/// A sink replaces tables by name, so two subsystems sharing a table would
/// silently overwrite each other. `candidate` may reuse the tables of the
/// subsystem it replaces.
fn table_conflict(loaded: &[Subsystem], candidate: &Subsystem) -> Option<DescriptorError> {
    for table in candidate.extraction.table_names() {
        let owner = loaded.iter().filter(|s| s.id != candidate.id).find(|s| {
            s.extraction
                .table_names()
                .iter()
                .any(|t| t.eq_ignore_ascii_case(table))
        });
        if let Some(owner) = owner {
            return Some(DescriptorError::DuplicateTable {
                subsystem_id: candidate.id.clone(),
                table: table.to_string(),
                owner: owner.id.clone(),
            });
        }
    }
    None
}

/// Load user-defined descriptors from a directory, in file name order.
fn load_user_descriptors(dir: &Path) -> (Vec<Subsystem>, Vec<DescriptorError>) {
    let mut subsystems = Vec::new();
    let mut errors = Vec::new();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            errors.push(DescriptorError::Io {
                path: dir.to_path_buf(),
                source: e,
            });
            return (subsystems, errors);
        }
    };

    let mut paths = Vec::new();
    for entry_result in entries {
        match entry_result {
            Ok(entry) => paths.push(entry.path()),
            Err(e) => errors.push(DescriptorError::Io {
                path: dir.to_path_buf(),
                source: e,
            }),
        }
    }
    paths.sort();

    for path in paths {
        if path.extension().and_then(|e| e.to_str()) != Some("toml") {
            continue;
        }

        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                errors.push(DescriptorError::Io {
                    path: path.clone(),
                    source: e,
                });
                continue;
            }
        };

        if metadata.len() > constants::MAX_DESCRIPTOR_FILE_SIZE {
            errors.push(DescriptorError::FileTooLarge {
                path: path.clone(),
                size: metadata.len(),
                max_size: constants::MAX_DESCRIPTOR_FILE_SIZE,
            });
            continue;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                errors.push(DescriptorError::Io {
                    path: path.clone(),
                    source: e,
                });
                continue;
            }
        };

        match descriptor::parse_descriptor_toml(&content, &path)
            .and_then(|def| descriptor::validate_and_compile(def, false))
        {
            Ok(s) => subsystems.push(s),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping invalid descriptor");
                errors.push(e);
            }
        }
    }

    (subsystems, errors)
}
