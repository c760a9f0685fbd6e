use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use groupwise::config::Config;
use groupwise::engine::{
    AnyComposition, CompositionValidator, GenderBalance, PairHistory, SessionOrchestrator, plan,
};
use groupwise::logging;
use groupwise::report;
use groupwise::roster::Roster;
use groupwise::store::groups_log::GroupsLog;
use groupwise::store::json_store::HistoryStore;

#[derive(Parser)]
#[command(
    name = "groupwise",
    version,
    about = "Form classroom work groups that spread partners around before repeating"
)]
struct Cli {
    #[arg(short, long, global = true, help = "Config file (defaults to the user config dir)")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Log every pick the composer makes")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Form the next set of groups from a comma separated roster
    /// (id, first name, last name, gender).
    Form {
        roster: PathBuf,

        #[arg(short = 'n', long, help = "Target number of members per group")]
        group_size: Option<usize>,

        #[arg(long, help = "Pairing history file")]
        history: Option<PathBuf>,

        #[arg(long, help = "File the group listing is prepended to")]
        groups: Option<PathBuf>,

        #[arg(long, help = "Seed for a reproducible run")]
        seed: Option<u64>,

        #[arg(long, help = "Give up after this many reshuffles")]
        max_attempts: Option<usize>,

        #[arg(long, help = "Allow any gender mix")]
        no_balance: bool,

        #[arg(long, help = "Print the groups without saving anything")]
        dry_run: bool,
    },
    /// Show how a class of TOTAL students would be split.
    Plan {
        total: usize,

        #[arg(short = 'n', long, help = "Target number of members per group")]
        group_size: Option<usize>,
    },
    /// Summarize a pairing history file.
    Stats {
        #[arg(long, help = "Pairing history file")]
        history: Option<PathBuf>,

        #[arg(long, default_value_t = 2, help = "List pairs grouped at least this often")]
        min_count: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    logging::init(&config.log_level, cli.verbose)?;

    match cli.command {
        Command::Form {
            roster,
            group_size,
            history,
            groups,
            seed,
            max_attempts,
            no_balance,
            dry_run,
        } => {
            if let Some(n) = group_size {
                config.group_size = n;
            }
            if let Some(path) = history {
                config.history_file = path;
            }
            if let Some(path) = groups {
                config.groups_file = path;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            if let Some(n) = max_attempts {
                config.max_attempts = n;
            }
            if no_balance {
                config.balance_gender = false;
            }
            form(&config, &roster, dry_run)
        }
        Command::Plan { total, group_size } => {
            let group_plan = plan(total, group_size.unwrap_or(config.group_size))?;
            println!("{total} students: {group_plan}");
            Ok(())
        }
        Command::Stats { history, min_count } => {
            let path = history.unwrap_or(config.history_file);
            stats(&path, min_count)
        }
    }
}

fn form(config: &Config, roster_path: &Path, dry_run: bool) -> Result<()> {
    config.validate()?;
    let roster = Roster::load(roster_path)?;

    let store = HistoryStore::new(&config.history_file);
    let mut history = match store.load_pairs()? {
        Some(pairs) => PairHistory::from_snapshot(&pairs, roster.ids()),
        None => PairHistory::new(roster.ids()),
    };

    let mut rng = match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let validator: &dyn CompositionValidator = if config.balance_gender {
        &GenderBalance
    } else {
        &AnyComposition
    };
    let orchestrator =
        SessionOrchestrator::new(validator).with_max_attempts(config.max_attempts);

    if dry_run {
        let (session, _) =
            orchestrator.preview(roster.students(), config.group_size, &mut history, &mut rng)?;
        let listing = report::render_groups(&session, &config.roles, Local::now().naive_local());
        println!("{listing}");
        return Ok(());
    }

    let (session, summary) =
        orchestrator.run(roster.students(), config.group_size, &mut history, &mut rng)?;
    let listing = report::render_groups(&session, &config.roles, Local::now().naive_local());

    println!();
    println!("Here's the next set of groups");
    println!();
    println!("{listing}");

    store.save(&history.snapshot())?;
    GroupsLog::new(&config.groups_file).prepend(&listing)?;
    tracing::info!(
        attempts = summary.attempts,
        plan = %summary.plan,
        "session recorded"
    );
    Ok(())
}

fn stats(path: &Path, min_count: u32) -> Result<()> {
    let store = HistoryStore::new(path);
    let Some(pairs) = store.load_pairs()? else {
        println!("No pairing history at {}", path.display());
        return Ok(());
    };
    let history = PairHistory::from_snapshot_only(&pairs);
    print!("{}", report::render_histogram(&history.histogram()));
    println!();
    print!(
        "{}",
        report::render_repeat_pairings(&history.repeat_pairings(min_count), min_count)
    );
    Ok(())
}
