//! Command-line front end for the chore wheel.
//!
//! # Responsibility
//! - Open the schedule database, call into `chorewheel_core` and save.
//! - Keep rotation logic out of this crate; only argument parsing and
//!   output formatting live here.

use anyhow::{bail, Context, Result};
use chorewheel_core::db::open_db;
use chorewheel_core::table::assignment_table::{import_assignment_table, write_assignment_table};
use chorewheel_core::table::history_table::{import_history_table, write_history_table};
use chorewheel_core::{
    default_log_level, init_logging, open_existing_db, Allocation, PeriodScheduler, Person,
    RandShuffler, RunReport, ScheduleState, ScheduleStore, SchedulerConfig, SqliteScheduleStore,
};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "chorewheel", version, about = "Fair weekly and monthly chore rotation")]
struct Cli {
    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true, default_value = default_log_level())]
    log_level: String,
    /// Directory for rolling log files; file logging is off when unset
    #[arg(long, global = true, env = "CHOREWHEEL_LOG_DIR")]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a schedule database, optionally from existing CSV tables
    Init(InitArgs),
    /// Roster maintenance
    Roster {
        #[command(subcommand)]
        cmd: RosterCmd,
    },
    /// Show the upcoming week and its monthly slate without assigning
    Plan(RunArgs),
    /// Assign one period and save it
    Assign(AssignArgs),
    /// Write the assignment and history tables as CSV
    Export(ExportArgs),
    /// Print or check a scheduler configuration
    Config(ConfigArgs),
}

#[derive(Args)]
struct DbArgs {
    /// Schedule database path
    #[arg(long)]
    db: PathBuf,
}

#[derive(Args)]
struct InitArgs {
    #[command(flatten)]
    db: DbArgs,
    /// Assignment table to bootstrap roster and periods from
    #[arg(long)]
    from: Option<PathBuf>,
    /// History table to bootstrap the ledger from
    #[arg(long, requires = "from")]
    history: Option<PathBuf>,
}

#[derive(Subcommand)]
enum RosterCmd {
    /// List everyone on the roster
    List(DbArgs),
    /// Add a person
    Add(PersonArgs),
    /// Mark a person out for upcoming runs
    Out(PersonArgs),
    /// Mark a person available again
    Back(PersonArgs),
}

#[derive(Args)]
struct PersonArgs {
    name: String,
    #[command(flatten)]
    db: DbArgs,
}

impl RosterCmd {
    fn db(&self) -> &Path {
        match self {
            RosterCmd::List(db) => &db.db,
            RosterCmd::Add(args) | RosterCmd::Out(args) | RosterCmd::Back(args) => &args.db.db,
        }
    }
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    db: DbArgs,
    /// Catalog configuration (TOML); the built-in catalog is used when unset
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct AssignArgs {
    #[command(flatten)]
    run: RunArgs,
    /// Seed for a reproducible shuffle
    #[arg(long)]
    seed: Option<u64>,
    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    db: DbArgs,
    /// Assignment table output; stdout when unset
    #[arg(long)]
    assignments: Option<PathBuf>,
    /// History table output
    #[arg(long)]
    history: Option<PathBuf>,
}

#[derive(Args)]
struct ConfigArgs {
    /// Print the built-in configuration
    #[arg(long, conflicts_with = "check")]
    default: bool,
    /// Validate a configuration file and print it normalized
    #[arg(long)]
    check: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(log_dir) = &cli.log_dir {
        start_logging(&cli.log_level, log_dir)?;
    }

    match cli.command {
        Commands::Init(args) => cmd_init(args),
        Commands::Roster { cmd } => cmd_roster(cmd),
        Commands::Plan(args) => cmd_plan(args),
        Commands::Assign(args) => cmd_assign(args),
        Commands::Export(args) => cmd_export(args),
        Commands::Config(args) => cmd_config(args),
    }
}

fn start_logging(level: &str, log_dir: &Path) -> Result<()> {
    let log_dir = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .context("resolving current directory for --log-dir")?
            .join(log_dir)
    };
    init_logging(level, &log_dir)?;
    Ok(())
}

fn cmd_init(args: InitArgs) -> Result<()> {
    let path = &args.db.db;
    if path.exists() {
        bail!("database already exists: {}", path.display());
    }

    let mut state = match &args.from {
        Some(table) => import_assignment_table(table)
            .with_context(|| format!("importing {}", table.display()))?,
        None => ScheduleState::default(),
    };
    if let Some(history) = &args.history {
        state.history = import_history_table(history)
            .with_context(|| format!("importing {}", history.display()))?;
    }

    let mut conn = open_db(path).with_context(|| format!("creating {}", path.display()))?;
    SqliteScheduleStore::new(&mut conn).save(&state)?;
    info!(
        "event=cli_init module=cli status=ok people={} periods={}",
        state.roster.len(),
        state.periods.len()
    );
    println!(
        "Initialized {} with {} people and {} periods",
        path.display(),
        state.roster.len(),
        state.periods.len()
    );
    Ok(())
}

fn cmd_roster(cmd: RosterCmd) -> Result<()> {
    let mut conn = open_existing_db(cmd.db())?;
    let mut store = SqliteScheduleStore::new(&mut conn);
    let mut state = store.load()?;

    match cmd {
        RosterCmd::List(_) => {
            for person in state.roster.people() {
                if person.available {
                    println!("{}", person.name);
                } else {
                    println!("{} (out)", person.name);
                }
            }
            return Ok(());
        }
        RosterCmd::Add(args) => {
            let person = Person::new(args.name);
            state.roster.add_person(person.clone())?;
            println!("Added {}", person.name);
        }
        RosterCmd::Out(args) => {
            state.roster.set_available(&args.name, false)?;
            println!("{} is out", args.name);
        }
        RosterCmd::Back(args) => {
            state.roster.set_available(&args.name, true)?;
            println!("{} is back", args.name);
        }
    }
    store.save(&state)?;
    Ok(())
}

fn load_scheduler(config: Option<&Path>) -> Result<PeriodScheduler> {
    let config = match config {
        Some(path) => SchedulerConfig::load(path)?,
        None => SchedulerConfig::default(),
    };
    Ok(PeriodScheduler::new(config)?)
}

fn cmd_plan(args: RunArgs) -> Result<()> {
    let scheduler = load_scheduler(args.config.as_deref())?;
    let mut conn = open_existing_db(&args.db.db)?;
    let state = SqliteScheduleStore::new(&mut conn).load()?;

    let plan = scheduler.preview(&state);
    println!(
        "Week {}: {} available, {} weekly slots",
        plan.week_number, plan.available_people, plan.weekly_slots
    );
    match &plan.monthly {
        Some(monthly) => println!(
            "Month {}: slate {} with {} slots",
            monthly.month_number, monthly.cycle, monthly.slots
        ),
        None => println!("No monthly slate this week"),
    }
    Ok(())
}

fn cmd_assign(args: AssignArgs) -> Result<()> {
    let scheduler = load_scheduler(args.run.config.as_deref())?;
    let mut conn = open_existing_db(&args.run.db.db)?;
    let mut store = SqliteScheduleStore::new(&mut conn);
    let mut state = store.load()?;

    let mut shuffler = match args.seed {
        Some(seed) => RandShuffler::seeded(seed),
        None => RandShuffler::from_os_rng(),
    };
    let report = scheduler.advance(&mut state, &mut shuffler)?;
    store.save(&state)?;

    if report.unfilled_slots() > 0 {
        warn!(
            "event=cli_assign module=cli status=shortfall week={} unfilled={}",
            report.week_number,
            report.unfilled_slots()
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    println!("Week {} (run {})", report.week_number, report.run_id);
    if let Some(monthly) = &report.monthly {
        println!("Month {} (slate {})", monthly.month_number, monthly.cycle);
        print_allocation(&monthly.allocation);
    }
    print_allocation(&report.weekly);
    if report.unfilled_slots() > 0 {
        println!("{} slots left unfilled", report.unfilled_slots());
    }
}

fn print_allocation(allocation: &Allocation) {
    for fill in &allocation.fills {
        let people = allocation.people_for(&fill.chore).join(", ");
        println!("  {} ({}/{}): {}", fill.chore, fill.filled, fill.required, people);
    }
}

fn cmd_export(args: ExportArgs) -> Result<()> {
    let mut conn = open_existing_db(&args.db.db)?;
    let state = SqliteScheduleStore::new(&mut conn).load()?;

    match &args.assignments {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            write_assignment_table(&state, file)?;
        }
        None => {
            let stdout = io::stdout();
            write_assignment_table(&state, stdout.lock())?;
        }
    }
    if let Some(path) = &args.history {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_history_table(&state.history, &state.roster, file)?;
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> Result<()> {
    let config = match (&args.check, args.default) {
        (Some(path), _) => SchedulerConfig::load(path)?,
        (None, true) => SchedulerConfig::default(),
        (None, false) => bail!("pass --default or --check FILE"),
    };
    let rendered = config.to_toml_string()?;
    io::stdout().write_all(rendered.as_bytes())?;
    Ok(())
}
