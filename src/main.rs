//! commitgen CLI - write long synthetic commit chains into a git object store

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commitgen::object::{parse_commit, parse_tree};
use commitgen::ops::{fsck, generate, log, ChainPlan};
use commitgen::{encode_blob, Blob, Config, Hash, ObjectKind, Repo};

#[derive(Parser)]
#[command(name = "commitgen")]
#[command(about = "offline git history generator - writes commit chains as loose objects")]
#[command(version)]
struct Cli {
    /// git directory holding `objects/`
    #[arg(short = 'g', long, env = "COMMITGEN_GIT_DIR", default_value = ".git")]
    git_dir: PathBuf,

    /// toml config file
    #[arg(short, long, env = "COMMITGEN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// generate a commit chain
    Generate {
        /// timestamp of the first commit
        #[arg(long, allow_hyphen_values = true)]
        start: Option<i64>,

        /// exclusive upper bound on timestamps
        #[arg(long, allow_hyphen_values = true)]
        end: Option<i64>,

        /// seconds between commits
        #[arg(long)]
        step: Option<u64>,

        /// author and committer name
        #[arg(long)]
        name: Option<String>,

        /// author and committer email
        #[arg(long)]
        email: Option<String>,

        /// utc offset as signed HHMM, e.g. -0500
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<i32>,

        /// commit message template ({index}, {timestamp})
        #[arg(short, long)]
        message: Option<String>,

        /// file content template ({index}, {timestamp})
        #[arg(long)]
        content: Option<String>,

        /// report progress every N commits (0 disables)
        #[arg(long)]
        progress_interval: Option<u64>,
    },

    /// show contents of an object
    CatFile {
        /// object hash
        object: String,
    },

    /// walk a chain from a commit
    Log {
        /// commit to start from
        head: String,

        /// maximum number of commits to show
        #[arg(short = 'n', long)]
        max_count: Option<usize>,
    },

    /// verify stored objects, and reachability from the given heads
    Fsck {
        /// commits to check reachability from
        heads: Vec<String>,
    },

    /// compute the blob id of some text
    HashObject {
        /// blob content
        content: String,

        /// also write the blob to the store
        #[arg(short, long)]
        write: bool,
    },

    /// write the default configuration to a file
    InitConfig {
        /// where to write the config
        #[arg(default_value = "commitgen.toml")]
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn load_config(cli: &Cli) -> commitgen::Result<Config> {
    match &cli.config {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    }
}

fn stdout_error(source: io::Error) -> commitgen::Error {
    commitgen::Error::Io {
        path: "stdout".into(),
        source,
    }
}

fn run(cli: Cli) -> commitgen::Result<()> {
    let mut config = load_config(&cli)?;

    match cli.command {
        Commands::Generate {
            start,
            end,
            step,
            name,
            email,
            offset,
            message,
            content,
            progress_interval,
        } => {
            let gen = &mut config.generation;
            gen.start = start.unwrap_or(gen.start);
            gen.end = end.unwrap_or(gen.end);
            gen.step = step.unwrap_or(gen.step);
            gen.progress_interval = progress_interval.unwrap_or(gen.progress_interval);
            if let Some(message) = message {
                gen.message_template = message;
            }
            if let Some(content) = content {
                gen.content_template = content;
            }

            let id = &mut config.identity;
            id.offset = offset.unwrap_or(id.offset);
            if let Some(name) = name {
                id.name = name;
            }
            if let Some(email) = email {
                id.email = email;
            }

            let plan = ChainPlan::from_config(&config)?;
            let repo = Repo::init(&cli.git_dir)?;

            println!(
                "Creating commits from {} -> {}, {} commits",
                plan.generation().start,
                plan.generation().end,
                plan.commit_count()
            );

            let mut stdout = io::stdout();
            let mut progress_error = None;
            let report = generate(&repo, &plan, |index, hash| {
                if plan.should_report(index) && progress_error.is_none() {
                    progress_error = write!(stdout, "\rCommit {} '{}'", index, hash)
                        .and_then(|_| stdout.flush())
                        .err();
                }
            })?;
            if let Some(e) = progress_error {
                return Err(stdout_error(e));
            }

            match report.head {
                Some(head) => println!("\nHEAD commit: '{}'", head),
                None => println!("no commits in range"),
            }
        }

        Commands::CatFile { object } => {
            let repo = Repo::open(&cli.git_dir)?;
            let hash = Hash::from_hex(&object)?;
            let (kind, payload) = repo.read_object(&hash)?;

            match kind {
                ObjectKind::Blob => {
                    io::stdout().write_all(&payload).map_err(stdout_error)?;
                }
                ObjectKind::Tree => {
                    for entry in parse_tree(&payload)?.entries() {
                        println!(
                            "{:06} {} {}\t{}",
                            entry.mode,
                            entry.type_name(),
                            entry.hash,
                            entry.name
                        );
                    }
                }
                ObjectKind::Commit => {
                    // validate before echoing the raw text
                    parse_commit(&payload)?;
                    io::stdout().write_all(&payload).map_err(stdout_error)?;
                    println!();
                }
            }
        }

        Commands::Log { head, max_count } => {
            let repo = Repo::open(&cli.git_dir)?;
            let head = Hash::from_hex(&head)?;
            for entry in log(&repo, &head, max_count)? {
                println!("{}", entry);
            }
        }

        Commands::Fsck { heads } => {
            let repo = Repo::open(&cli.git_dir)?;
            let heads = heads
                .iter()
                .map(|h| Hash::from_hex(h))
                .collect::<commitgen::Result<Vec<_>>>()?;
            let report = fsck(&repo, &heads)?;

            for corrupt in &report.corrupt_objects {
                println!("corrupt {}: {}", corrupt.hash, corrupt.message);
            }
            for missing in &report.missing_objects {
                println!(
                    "missing {} {} (referenced by {})",
                    missing.object_type, missing.hash, missing.referenced_by
                );
            }
            for mismatch in &report.mismatched_objects {
                println!(
                    "wrong kind {}: expected {}, found {} (referenced by {})",
                    mismatch.hash, mismatch.expected, mismatch.found, mismatch.referenced_by
                );
            }
            for dangling in &report.dangling_objects {
                println!("dangling {}", dangling);
            }
            println!("checked {} objects", report.objects_checked);

            if !report.is_ok() {
                return Err(commitgen::Error::CorruptObjectMessage(format!(
                    "{} corrupt, {} missing, {} wrong kind",
                    report.corrupt_objects.len(),
                    report.missing_objects.len(),
                    report.mismatched_objects.len()
                )));
            }
        }

        Commands::HashObject { content, write } => {
            let encoded = encode_blob(&Blob::new(content))?;
            if write {
                let repo = Repo::init(&cli.git_dir)?;
                repo.write_object(&encoded)?;
            }
            println!("{}", encoded.hash);
        }

        Commands::InitConfig { path } => {
            config.save(&path)?;
            println!("wrote config to {}", path.display());
        }
    }

    Ok(())
}
