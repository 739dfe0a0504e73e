use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use mediabench_core::constants::WORKBENCH_DIR_ENV;
use mediabench_core::{LocalizeOptions, WorkbenchConfig, WorkbenchLease, WorkbenchManager};
use mediabench_storage::FileSystemStorage;
use mediabench_types::{FileName, LogicalPath};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mediabench")]
#[command(about = "Workbench tooling for media processing jobs")]
struct Cli {
    /// Base directory for workbenches (overrides MEDIABENCH_WORKBENCH_DIR)
    #[arg(long, global = true)]
    workbench_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug)]
struct StorageArgs {
    /// Root directory of the media storage
    #[arg(long)]
    storage_dir: PathBuf,
    /// Never read the storage in place; always copy into the workbench
    #[arg(long)]
    detached: bool,
}

impl StorageArgs {
    fn open(&self) -> FileSystemStorage {
        if self.detached {
            FileSystemStorage::detached(&self.storage_dir)
        } else {
            FileSystemStorage::new(&self.storage_dir)
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a workbench and print its path
    Create,
    /// Destroy a workbench and everything in it
    Destroy {
        /// Workbench path
        path: PathBuf,
    },
    /// Make a stored file available as a local path inside a workbench
    Localize {
        /// Workbench path
        workbench: PathBuf,
        /// Logical path inside the storage (e.g. uploads/cat.jpg)
        logical_path: LogicalPath,
        #[command(flatten)]
        storage: StorageArgs,
        /// File name to use if the file has to be copied
        #[arg(long)]
        name: Option<FileName>,
        /// Do not append the source extension to --name
        #[arg(long)]
        drop_extension: bool,
    },
    /// Localize files concurrently, each in its own workbench, and report their sizes
    Probe {
        /// Logical paths inside the storage
        #[arg(required = true)]
        logical_paths: Vec<LogicalPath>,
        #[command(flatten)]
        storage: StorageArgs,
    },
}

struct ProbeReport {
    logical_path: LogicalPath,
    copied: bool,
    size: u64,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mediabench=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match cli.workbench_dir {
        Some(dir) => WorkbenchConfig::new(dir),
        None => WorkbenchConfig::from_env_value(std::env::var(WORKBENCH_DIR_ENV).ok()),
    };

    let Some(command) = cli.command else {
        println!("Use 'mediabench --help' for commands");
        return Ok(());
    };

    let manager = WorkbenchManager::new(&config)
        .with_context(|| format!("cannot use workbench dir {}", config.base_dir().display()))?;

    match command {
        Commands::Create => {
            let path = manager.create_workbench()?;
            println!("{}", path.display());
        }
        Commands::Destroy { path } => {
            manager.destroy_workbench(&path)?;
            println!("Destroyed workbench: {}", path.display());
        }
        Commands::Localize {
            workbench,
            logical_path,
            storage,
            name,
            drop_extension,
        } => {
            if !manager.contains(&workbench) {
                anyhow::bail!(
                    "{} is not a workbench under {}",
                    workbench.display(),
                    manager.base_dir().display()
                );
            }

            let mut options = LocalizeOptions::new().keep_extension(!drop_extension);
            if let Some(name) = name {
                options = options.with_name(name);
            }

            let localized = mediabench_core::localize(
                &workbench,
                &storage.open(),
                &logical_path,
                &options,
            )?;
            println!("path: {}", localized.path.display());
            println!("copied: {}", localized.copied);
        }
        Commands::Probe {
            logical_paths,
            storage,
        } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(probe(
                Arc::new(manager),
                Arc::new(storage.open()),
                logical_paths,
            ))?;
        }
    }

    Ok(())
}

/// Runs one job per logical path, each with its own leased workbench.
async fn probe(
    manager: Arc<WorkbenchManager>,
    storage: Arc<FileSystemStorage>,
    logical_paths: Vec<LogicalPath>,
) -> anyhow::Result<()> {
    let total = logical_paths.len();
    let mut jobs = tokio::task::JoinSet::new();

    for logical_path in logical_paths {
        let manager = Arc::clone(&manager);
        let storage = Arc::clone(&storage);
        jobs.spawn(probe_one(manager, storage, logical_path));
    }

    let mut failures = 0usize;
    while let Some(joined) = jobs.join_next().await {
        match joined? {
            Ok(report) => println!(
                "{}: {} bytes ({})",
                report.logical_path,
                report.size,
                if report.copied { "copied" } else { "local" }
            ),
            Err(e) => {
                failures += 1;
                tracing::error!("probe failed: {:#}", e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} probes failed", failures, total);
    }
    Ok(())
}

async fn probe_one(
    manager: Arc<WorkbenchManager>,
    storage: Arc<FileSystemStorage>,
    logical_path: LogicalPath,
) -> anyhow::Result<ProbeReport> {
    let lease = WorkbenchLease::acquire(manager).await?;

    let outcome = async {
        let localized = lease
            .localize(storage, logical_path.clone(), LocalizeOptions::new())
            .await
            .with_context(|| format!("cannot localize {}", logical_path))?;
        let size = tokio::fs::metadata(&localized.path)
            .await
            .with_context(|| format!("cannot stat {}", localized.path.display()))?
            .len();

        Ok::<_, anyhow::Error>(ProbeReport {
            logical_path: logical_path.clone(),
            copied: localized.copied,
            size,
        })
    }
    .await;

    lease.release().await?;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_localize() {
        let cli = Cli::try_parse_from([
            "mediabench",
            "--workbench-dir",
            "/tmp/wb",
            "localize",
            "/tmp/wb/abc",
            "uploads/cat.jpg",
            "--storage-dir",
            "/srv/media",
            "--detached",
            "--name",
            "source",
            "--drop-extension",
        ])
        .unwrap();

        assert_eq!(cli.workbench_dir, Some(PathBuf::from("/tmp/wb")));
        match cli.command {
            Some(Commands::Localize {
                workbench,
                logical_path,
                storage,
                name,
                drop_extension,
            }) => {
                assert_eq!(workbench, PathBuf::from("/tmp/wb/abc"));
                assert_eq!(logical_path.to_string(), "uploads/cat.jpg");
                assert!(storage.detached);
                assert_eq!(name.unwrap().as_str(), "source");
                assert!(drop_extension);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_traversal_in_logical_path() {
        let result = Cli::try_parse_from([
            "mediabench",
            "localize",
            "/tmp/wb/abc",
            "../etc/passwd",
            "--storage-dir",
            "/srv/media",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_probe_requires_paths() {
        let result = Cli::try_parse_from(["mediabench", "probe", "--storage-dir", "/srv/media"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_probe_reports_and_cleans_up() {
        let temp = tempfile::TempDir::new().unwrap();
        let manager = Arc::new(WorkbenchManager::with_base_dir(temp.path().join("wb")).unwrap());
        let storage = Arc::new(FileSystemStorage::detached(temp.path().join("store")));
        let paths = vec![
            LogicalPath::parse("a/one.jpg").unwrap(),
            LogicalPath::parse("b/two.png").unwrap(),
        ];
        for path in &paths {
            storage.put(path, b"bytes").unwrap();
        }

        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime
            .block_on(probe(Arc::clone(&manager), storage, paths))
            .unwrap();

        assert_eq!(std::fs::read_dir(manager.base_dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_probe_missing_file_fails_but_cleans_up() {
        let temp = tempfile::TempDir::new().unwrap();
        let manager = Arc::new(WorkbenchManager::with_base_dir(temp.path().join("wb")).unwrap());
        let storage = Arc::new(FileSystemStorage::detached(temp.path().join("store")));

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let result = runtime.block_on(probe(
            Arc::clone(&manager),
            storage,
            vec![LogicalPath::parse("missing.jpg").unwrap()],
        ));

        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(manager.base_dir()).unwrap().count(), 0);
    }
}
