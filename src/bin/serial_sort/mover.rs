use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serial_sort::{get_normalized_file_name_and_extension, path_to_filename_string};

use crate::category::Category;
use crate::logger::Logger;
use crate::serial::SerialNumber;

/// Result of one relocation attempt.
#[derive(Debug)]
pub enum MoveOutcome {
    /// File now lives at the given destination path.
    Moved(PathBuf),
    /// File stays at its source path; the reason has been logged.
    Skipped(String),
}

/// Relocates files into `<root>/<prefix>/<serial>/<category>/`.
///
/// A move either fully succeeds or leaves the source file untouched;
/// no intermediate state is created before the relocation call.
#[derive(Debug)]
pub struct Mover {
    destination_root: PathBuf,
    dryrun: bool,
}

impl Mover {
    pub const fn new(destination_root: PathBuf, dryrun: bool) -> Self {
        Self {
            destination_root,
            dryrun,
        }
    }

    /// Directory a file with this serial and category belongs in.
    pub fn target_directory(&self, serial: &SerialNumber, category: Category) -> PathBuf {
        self.destination_root
            .join(serial.prefix())
            .join(serial.as_str())
            .join(category.folder_name())
    }

    /// Move one file into its destination directory, creating the directory
    /// tree as needed and picking a collision-free filename.
    /// Failures are logged as warnings and reported as `Skipped`; the caller
    /// owns the moved/skipped counters.
    pub fn move_file(&self, serial: &SerialNumber, source: &Path, category: Category, logger: &Logger) -> MoveOutcome {
        let file_name = path_to_filename_string(source);
        let target_dir = self.target_directory(serial, category);

        if self.dryrun {
            let destination = target_dir.join(&file_name);
            logger.info(&format!("Dryrun: would move to {}", destination.display()));
            return MoveOutcome::Moved(destination);
        }

        if !target_dir.exists() {
            if let Err(e) = fs::create_dir_all(&target_dir) {
                let reason = format!("Error creating destination folder {}: {e}", target_dir.display());
                logger.warning(&reason);
                return MoveOutcome::Skipped(reason);
            }
            logger.detail(&format!("Created destination folder: {}", target_dir.display()));
        }

        let destination = match unique_destination(&target_dir, &file_name) {
            Ok(path) => path,
            Err(e) => {
                let reason = format!("Error resolving destination name for {file_name}: {e}");
                logger.warning(&reason);
                return MoveOutcome::Skipped(reason);
            }
        };

        match relocate(source, &destination) {
            Ok(()) => {
                logger.info(&format!("Moved to: {}", destination.display()));
                MoveOutcome::Moved(destination)
            }
            Err(e) => {
                let reason = format!("Error moving {file_name} to {}: {e}", target_dir.display());
                logger.warning(&reason);
                MoveOutcome::Skipped(reason)
            }
        }
    }
}

/// First free filename in `folder`: `name.ext`, then `name_1.ext`, `name_2.ext`, and so on.
///
/// The existence probe is not atomic against concurrent writers.
/// Acceptable since the batch runner is single-threaded and nothing else is
/// expected to write into the same target directory during a run.
pub fn unique_destination(folder: &Path, filename: &str) -> anyhow::Result<PathBuf> {
    let (stem, extension) = get_normalized_file_name_and_extension(Path::new(filename))?;
    let mut candidate = folder.join(filename);
    let mut counter: u32 = 1;
    while candidate.exists() {
        let name = if extension.is_empty() {
            format!("{stem}_{counter}")
        } else {
            format!("{stem}_{counter}.{extension}")
        };
        candidate = folder.join(name);
        counter += 1;
    }
    Ok(candidate)
}

/// Move with rename, falling back to copy plus remove when rename fails,
/// e.g. across filesystems when the destination root is a network share.
fn relocate(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(source, destination)?;
            fs::remove_file(source)
        }
    }
}
