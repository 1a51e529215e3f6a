use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use colored::Colorize;
use itertools::Itertools;

use serial_sort::{path_to_filename_string, print_warning};

use crate::Args;
use crate::category::Category;
use crate::config::{Config, DEFAULT_SOURCE_DIR};
use crate::logger::Logger;
use crate::mover::{MoveOutcome, Mover};
use crate::serial::{PrefixRegistry, SerialNumber};
use crate::stats::RunStats;

/// How the destination category is chosen for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Destination {
    /// One category fixed for the whole batch.
    Explicit(Category),
    /// Category inferred per file from the second filename token.
    Inferred,
}

#[derive(Debug)]
pub struct SerialSorter {
    source_dir: PathBuf,
    config: Config,
    preselected: Option<Category>,
}

impl SerialSorter {
    pub fn new(args: Args) -> Result<Self> {
        let source_dir = args
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_DIR));
        let config = Config::from_args(&args);
        let preselected = match config.category.as_deref() {
            Some(key) => Some(Category::from_key(key).with_context(|| format!("Invalid category key: '{key}'"))?),
            None => None,
        };
        if config.debug {
            eprintln!("Config: {config:#?}");
            eprintln!("Source: {}", source_dir.display());
        }
        Ok(Self {
            source_dir,
            config,
            preselected,
        })
    }

    pub fn run(&self) -> Result<()> {
        let logger = Logger::new(Path::new("."), self.config.verbose);

        let registry = match PrefixRegistry::load(&self.config.prefix_file) {
            Ok(registry) => registry,
            Err(e) => {
                logger.warning(&e.to_string());
                return Err(e.into());
            }
        };
        if self.config.debug {
            eprintln!("Loaded {} valid prefixes", registry.len());
        }

        let Some(destination) = self.resolve_destination()? else {
            println!("Exiting, goodbye!");
            return Ok(());
        };

        let source_dir = self.ensure_source_dir(&logger)?;

        logger.info(&"*".repeat(80));
        logger.info("File transfer run started.");

        let stats = self.process_directory(&source_dir, destination, &registry, &logger)?;

        let summary_destination = match destination {
            Destination::Explicit(category) if self.config.stats => Some(category),
            _ => None,
        };
        for line in stats.summary_lines(summary_destination, self.config.stats) {
            logger.info(&line);
        }
        logger.info("File transfer run completed.");
        logger.info(&"*".repeat(80));
        println!("\nLog file saved to: {}", logger.path().display());
        Ok(())
    }

    /// Pick the destination strategy for this run.
    /// Returns `None` when the user quits at the menu, before any file is touched.
    fn resolve_destination(&self) -> Result<Option<Destination>> {
        if self.config.auto {
            return Ok(Some(Destination::Inferred));
        }
        if let Some(category) = self.preselected {
            return Ok(Some(Destination::Explicit(category)));
        }
        let Some(category) = Self::prompt_for_category()? else {
            return Ok(None);
        };
        self.wait_for_files(category)?;
        Ok(Some(Destination::Explicit(category)))
    }

    fn prompt_for_category() -> Result<Option<Category>> {
        println!("Please select the destination folder:");
        println!(
            "{}",
            Category::ALL
                .iter()
                .map(|category| format!("{}. {}", category.key(), category.folder_name()))
                .join("\n")
        );
        loop {
            print!(
                "{}",
                "Enter the number corresponding to your choice (0-8), or 'q' to quit: ".magenta()
            );
            std::io::stdout().flush()?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            let input = input.trim();
            if input.eq_ignore_ascii_case("q") {
                return Ok(None);
            }
            match Category::from_key(input) {
                Some(category) => return Ok(Some(category)),
                None => print_warning!("Invalid input."),
            }
        }
    }

    fn wait_for_files(&self, category: Category) -> Result<()> {
        println!("You selected: {}", category.folder_name().cyan().bold());
        print!(
            "{}",
            format!(
                "Copy all files into the '{}' folder and press Enter to begin...",
                self.source_dir.display()
            )
            .magenta()
        );
        std::io::stdout().flush()?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        Ok(())
    }

    /// Create the source directory if missing and resolve it to an absolute path.
    fn ensure_source_dir(&self, logger: &Logger) -> Result<PathBuf> {
        if self.source_dir.exists() {
            if !self.source_dir.is_dir() {
                bail!("'{}' exists but is not a directory", self.source_dir.display());
            }
        } else {
            fs::create_dir_all(&self.source_dir)
                .with_context(|| format!("Error creating source folder '{}'", self.source_dir.display()))?;
            logger.info(&format!("Source folder created at: {}", self.source_dir.display()));
        }
        serial_sort::resolve_input_path(Some(&self.source_dir))
    }

    /// Process every regular file directly inside the source directory,
    /// in enumeration order. Subdirectories are ignored.
    fn process_directory(
        &self,
        source_dir: &Path,
        destination: Destination,
        registry: &PrefixRegistry,
        logger: &Logger,
    ) -> Result<RunStats> {
        let mover = Mover::new(self.config.destination_root.clone(), self.config.dryrun);
        let mut stats = RunStats::new();

        let entries = fs::read_dir(source_dir)
            .with_context(|| format!("Failed to read source directory {}", source_dir.display()))?;
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            stats.processed += 1;
            Self::process_file(&entry.path(), destination, registry, &mover, logger, &mut stats);
        }
        Ok(stats)
    }

    /// Run one file through the extract, validate, resolve, move pipeline.
    fn process_file(
        path: &Path,
        destination: Destination,
        registry: &PrefixRegistry,
        mover: &Mover,
        logger: &Logger,
        stats: &mut RunStats,
    ) {
        let file_name = path_to_filename_string(path);
        let token = file_name.split(['_', '-']).next().unwrap_or_default();

        let Some(serial) = SerialNumber::parse(token) else {
            stats.skipped += 1;
            logger.warning(&format!("{file_name}: Invalid or missing serial number. Skipping move."));
            return;
        };

        let prefix = serial.prefix();
        if !registry.contains(&prefix) {
            stats.skipped += 1;
            logger.warning(&format!(
                "{file_name}: The detected prefix '{prefix}' is not in the valid prefixes list. Skipping move."
            ));
            return;
        }

        let category = match destination {
            Destination::Explicit(category) => category,
            Destination::Inferred => Category::infer(&file_name),
        };

        match mover.move_file(&serial, path, category, logger) {
            MoveOutcome::Moved(_) => {
                stats.moved += 1;
                stats.record_prefix(&prefix);
                stats.record_category(category);
            }
            MoveOutcome::Skipped(_) => stats.skipped += 1,
        }
    }
}

#[cfg(test)]
mod sorter_tests {
    use super::*;

    use std::fs::File;

    use tempfile::{TempDir, tempdir};

    struct TestSetup {
        _source: TempDir,
        _dest: TempDir,
        source_dir: PathBuf,
        dest_root: PathBuf,
        sorter: SerialSorter,
        registry: PrefixRegistry,
        logger: Logger,
    }

    fn make_setup(prefixes: &str) -> TestSetup {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let source_dir = source.path().to_path_buf();
        let dest_root = dest.path().join("root");

        let prefix_path = dest.path().join("valid_prefixes.txt");
        let mut file = File::create(&prefix_path).unwrap();
        write!(file, "{prefixes}").unwrap();
        let registry = PrefixRegistry::load(&prefix_path).unwrap();

        let config = Config {
            auto: false,
            category: None,
            debug: false,
            destination_root: dest_root.clone(),
            dryrun: false,
            prefix_file: prefix_path,
            stats: false,
            verbose: false,
        };
        let sorter = SerialSorter {
            source_dir: source_dir.clone(),
            config,
            preselected: None,
        };
        let logger = Logger::new(dest.path(), false);

        TestSetup {
            _source: source,
            _dest: dest,
            source_dir,
            dest_root,
            sorter,
            registry,
            logger,
        }
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).unwrap();
        path
    }

    #[test]
    fn explicit_run_moves_valid_file() {
        let setup = make_setup("AB1234\n");
        touch(&setup.source_dir, "AB12345678_FinalOutgoing_IMG01.jpg");

        let stats = setup
            .sorter
            .process_directory(
                &setup.source_dir,
                Destination::Explicit(Category::FinalOutgoing),
                &setup.registry,
                &setup.logger,
            )
            .unwrap();

        assert_eq!(stats.processed, 1);
        assert_eq!(stats.moved, 1);
        assert_eq!(stats.skipped, 0);
        assert!(
            setup
                .dest_root
                .join("AB1234")
                .join("AB12345678")
                .join("5__Final Outgoing")
                .join("AB12345678_FinalOutgoing_IMG01.jpg")
                .is_file()
        );
    }

    #[test]
    fn short_serial_is_skipped() {
        let setup = make_setup("AB1234\n");
        let source = touch(&setup.source_dir, "short_Misc.jpg");

        let stats = setup
            .sorter
            .process_directory(
                &setup.source_dir,
                Destination::Explicit(Category::Misc),
                &setup.registry,
                &setup.logger,
            )
            .unwrap();

        assert_eq!(stats.processed, 1);
        assert_eq!(stats.moved, 0);
        assert_eq!(stats.skipped, 1);
        assert!(source.exists());
    }

    #[test]
    fn unknown_prefix_is_skipped() {
        let setup = make_setup("CD5678\n");
        let source = touch(&setup.source_dir, "AB12345678_QI_IMG01.jpg");

        let stats = setup
            .sorter
            .process_directory(
                &setup.source_dir,
                Destination::Explicit(Category::Qi),
                &setup.registry,
                &setup.logger,
            )
            .unwrap();

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.moved, 0);
        assert!(source.exists());
    }

    #[test]
    fn filename_without_separator_is_skipped() {
        let setup = make_setup("AB1234\n");
        touch(&setup.source_dir, "AB12345678.jpg");

        let stats = setup
            .sorter
            .process_directory(
                &setup.source_dir,
                Destination::Explicit(Category::Misc),
                &setup.registry,
                &setup.logger,
            )
            .unwrap();

        // The whole filename becomes the token and fails validation on the dot
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.moved, 0);
    }

    #[test]
    fn inferred_run_routes_by_keyword() {
        let setup = make_setup("AB1234\n");
        touch(&setup.source_dir, "AB12345678_Assembly_01.jpg");
        touch(&setup.source_dir, "AB12345678_Unknown_part.jpg");

        let stats = setup
            .sorter
            .process_directory(
                &setup.source_dir,
                Destination::Inferred,
                &setup.registry,
                &setup.logger,
            )
            .unwrap();

        assert_eq!(stats.moved, 2);
        let serial_dir = setup.dest_root.join("AB1234").join("AB12345678");
        assert!(serial_dir.join("4__Assembly").join("AB12345678_Assembly_01.jpg").is_file());
        assert!(serial_dir.join("6__Misc").join("AB12345678_Unknown_part.jpg").is_file());
    }

    #[test]
    fn empty_directory_yields_zero_counters() {
        let setup = make_setup("AB1234\n");
        let empty = setup.source_dir.join("empty");
        fs::create_dir(&empty).unwrap();

        let stats = setup
            .sorter
            .process_directory(&empty, Destination::Explicit(Category::Misc), &setup.registry, &setup.logger)
            .unwrap();

        assert_eq!(stats.processed, 0);
        assert_eq!(stats.moved, 0);
        assert_eq!(stats.skipped, 0);
        let lines = stats.summary_lines(None, false);
        assert!(lines.contains(&"Average time per file: 0.00 second(s)".to_string()));
    }

    #[test]
    fn subdirectories_are_ignored() {
        let setup = make_setup("AB1234\n");
        let empty = setup.source_dir.join("batch");
        fs::create_dir(&empty).unwrap();
        fs::create_dir(empty.join("AB12345678_QI")).unwrap();

        let stats = setup
            .sorter
            .process_directory(&empty, Destination::Explicit(Category::Qi), &setup.registry, &setup.logger)
            .unwrap();

        assert_eq!(stats.processed, 0);
    }

    #[test]
    fn colliding_names_get_numeric_suffixes() {
        let setup = make_setup("AB1234\n");
        let batch = setup.source_dir.join("batch");
        fs::create_dir(&batch).unwrap();
        touch(&batch, "AB12345678_QI_IMG01.jpg");

        let target_dir = setup
            .dest_root
            .join("AB1234")
            .join("AB12345678")
            .join("0__QI");
        fs::create_dir_all(&target_dir).unwrap();
        touch(&target_dir, "AB12345678_QI_IMG01.jpg");

        let stats = setup
            .sorter
            .process_directory(&batch, Destination::Explicit(Category::Qi), &setup.registry, &setup.logger)
            .unwrap();

        assert_eq!(stats.moved, 1);
        assert!(target_dir.join("AB12345678_QI_IMG01_1.jpg").is_file());
    }
}
