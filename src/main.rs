//! Lease ROI CLI
//!
//! Command-line interface for projecting lease investment projects,
//! managing saved projects, and keeping the fund ledger.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::debug;

use lease_roi::ledger::import_entries_csv_path;
use lease_roi::params::{
    load_overrides, load_overrides_or_default, load_parameters, write_overrides, write_parameters,
};
use lease_roi::projection::write_schedule_csv;
use lease_roi::{
    FundLedger, JsonFileStore, LedgerStore, OverrideField, OverrideMap, Party, ProfitBasis, ProjectDraft,
    ProjectParameters, ProjectStore, ProjectionConfig, ProjectionEngine, ProjectionResult, RawParameters,
    Scenario, ScenarioRunner, StoreConfig, YearMonth,
};

#[derive(Parser)]
#[command(name = "lease-roi", author, version, about)]
struct CliArgs {
    /// Directory holding saved projects and ledgers
    #[arg(long, env = "LEASE_ROI_STORE_DIR", default_value = ".lease_roi", global = true)]
    store_dir: PathBuf,
    /// User the saved projects and ledger belong to
    #[arg(long, env = "LEASE_ROI_USER", default_value = "local", global = true)]
    user: String,
    /// Author name recorded on saved projects (defaults to the user)
    #[arg(long, env = "LEASE_ROI_AUTHOR", global = true)]
    author: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default project parameters as JSON
    Defaults,
    /// Project a parameter file and report the results
    Project {
        /// Parameter JSON file
        #[arg(short, long)]
        input: PathBuf,
        /// Override JSON file
        #[arg(short, long)]
        overrides: Option<PathBuf>,
        /// Write the monthly schedule to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Print the full result as JSON instead of a report
        #[arg(long)]
        json: bool,
        /// Profit figure divided between investor and operator
        #[arg(long, value_enum, default_value_t = BasisArg::Cumulative)]
        basis: BasisArg,
    },
    /// Edit one month of an override file
    Override {
        /// Override JSON file (created if missing)
        #[arg(short, long)]
        file: PathBuf,
        /// Schedule month number, starting at 1
        #[arg(short, long, required_unless_present = "reset")]
        month: Option<u32>,
        /// Value to override
        #[arg(long, value_enum, required_unless_present = "reset")]
        field: Option<FieldArg>,
        /// New value; empty or non-numeric text clears the override
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        value: String,
        /// Remove every override in the file
        #[arg(long, conflicts_with_all = ["month", "field"])]
        reset: bool,
    },
    /// Save a project to the store
    Save {
        /// Parameter JSON file
        #[arg(short, long)]
        input: PathBuf,
        /// Override JSON file
        #[arg(short, long)]
        overrides: Option<PathBuf>,
    },
    /// List saved projects, newest first
    List,
    /// Restore a saved project into parameter and override files
    Load {
        id: u64,
        /// Parameter JSON output file
        #[arg(short, long)]
        output: PathBuf,
        /// Override JSON output file
        #[arg(long)]
        overrides_output: Option<PathBuf>,
    },
    /// Delete a saved project
    Delete { id: u64 },
    /// Project every saved project and compare the results
    Compare,
    /// Fund ledger commands
    Ledger {
        #[command(subcommand)]
        command: LedgerCommands,
    },
}

#[derive(Subcommand)]
enum LedgerCommands {
    /// Show entries, buckets and derived totals
    Show,
    /// Set the starting capital
    SetCapital {
        #[arg(allow_hyphen_values = true)]
        amount: f64,
    },
    /// Record a month's realized income and expense
    AddEntry {
        /// Month, YYYY-MM (defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
        #[arg(long, default_value = "")]
        income: String,
        #[arg(long, default_value = "")]
        expense: String,
    },
    /// Import entries from a CSV file with columns month,income,expense
    Import { file: PathBuf },
    /// Remove a ledger entry
    RemoveEntry { id: u64 },
    /// Add a savings bucket receiving a percentage of the surplus
    AddBucket {
        name: String,
        percentage: f64,
    },
    /// Remove a savings bucket
    RemoveBucket { id: u64 },
}

#[derive(Clone, Copy, ValueEnum)]
enum BasisArg {
    Cumulative,
    Blended,
}

impl From<BasisArg> for ProfitBasis {
    fn from(arg: BasisArg) -> Self {
        match arg {
            BasisArg::Cumulative => ProfitBasis::Cumulative,
            BasisArg::Blended => ProfitBasis::Blended,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FieldArg {
    Income,
    Expense,
}

impl From<FieldArg> for OverrideField {
    fn from(arg: FieldArg) -> Self {
        match arg {
            FieldArg::Income => OverrideField::Income,
            FieldArg::Expense => OverrideField::Expense,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    let mut store_config = StoreConfig::new(&args.store_dir, &args.user);
    if let Some(author) = &args.author {
        store_config = store_config.with_author(author);
    }
    debug!("store directory {}", store_config.user_dir().display());

    match args.command {
        Commands::Defaults => {
            let json = serde_json::to_string_pretty(&RawParameters::from(&ProjectParameters::default()))?;
            println!("{json}");
        }
        Commands::Project {
            input,
            overrides,
            csv,
            json,
            basis,
        } => run_project(input, overrides, csv, json, basis.into())?,
        Commands::Override {
            file,
            month,
            field,
            value,
            reset,
        } => run_override(file, month, field, &value, reset)?,
        Commands::Save { input, overrides } => {
            let (params, overrides) = read_project(&input, overrides.as_deref())?;
            let result = ProjectionEngine::default().project(&params, &overrides);

            let mut store = JsonFileStore::new(store_config);
            let saved = store
                .save(&ProjectDraft::new(params, overrides, &result))
                .context("Failed to save project")?;
            println!("Saved project {} ({})", saved.id, saved.project_name());
        }
        Commands::List => {
            let store = JsonFileStore::new(store_config);
            let projects = store.list().context("Failed to list projects")?;
            if projects.is_empty() {
                println!("No saved projects");
            }
            for project in &projects {
                println!(
                    "{:>4}  {}  {:<24} ROI {:>6.1}%  net profit {:>12.0}  by {}",
                    project.id,
                    project.created_at.format("%Y-%m-%d %H:%M"),
                    project.project_name(),
                    project.summary.roi,
                    project.summary.net_profit,
                    project.author_name,
                );
            }
        }
        Commands::Load {
            id,
            output,
            overrides_output,
        } => {
            let store = JsonFileStore::new(store_config);
            let project = store.get(id).with_context(|| format!("Failed to load project {id}"))?;
            let (params, overrides) = project.restore();

            write_parameters(&output, &params)?;
            println!("Parameters written to {}", output.display());
            if let Some(path) = overrides_output {
                write_overrides(&path, &overrides)?;
                println!("{} overridden months written to {}", overrides.len(), path.display());
            } else if !overrides.is_empty() {
                println!(
                    "Project has {} overridden months; pass --overrides-output to keep them",
                    overrides.len()
                );
            }
        }
        Commands::Delete { id } => {
            let mut store = JsonFileStore::new(store_config);
            store.delete(id).with_context(|| format!("Failed to delete project {id}"))?;
            println!("Deleted project {id}");
        }
        Commands::Compare => run_compare(store_config)?,
        Commands::Ledger { command } => run_ledger(store_config, command)?,
    }

    Ok(())
}

fn read_project(input: &Path, overrides: Option<&Path>) -> Result<(ProjectParameters, OverrideMap)> {
    let params = load_parameters(input).context("Failed to load parameters")?;
    let overrides = match overrides {
        Some(path) => load_overrides(path).context("Failed to load overrides")?,
        None => OverrideMap::new(),
    };
    Ok((params, overrides))
}

fn run_project(
    input: PathBuf,
    overrides: Option<PathBuf>,
    csv: Option<PathBuf>,
    json: bool,
    basis: ProfitBasis,
) -> Result<()> {
    let (params, overrides) = read_project(&input, overrides.as_deref())?;
    let engine = ProjectionEngine::new(ProjectionConfig {
        profit_basis: basis,
        ..Default::default()
    });
    let result = engine.project(&params, &overrides);

    if let Some(path) = &csv {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        write_schedule_csv(&result.monthly_data, BufWriter::new(file)).context("Failed to write schedule")?;
    }

    if json {
        serde_json::to_writer_pretty(io::stdout().lock(), &result)?;
        println!();
    } else {
        print_report(&params, &result);
        if let Some(path) = &csv {
            println!("\nMonthly schedule written to {}", path.display());
        }
    }
    Ok(())
}

fn print_report(params: &ProjectParameters, result: &ProjectionResult) {
    println!("{}", params.project_name);
    println!("{}", "=".repeat(40));
    println!(
        "Horizon: {} months from {} ({} adjusted)",
        params.contract_months,
        params.start_date,
        result.adjusted_months
    );
    match result.break_even.date() {
        Some(date) => println!("Break-even:          {date} (month {})", result.break_even.month().unwrap_or(0)),
        None => println!("Break-even:          not within contract"),
    }
    println!("Total revenue:       {:>14.0}", result.total_revenue);
    println!("Total expense:       {:>14.0}", result.total_expense);
    println!("Real net profit:     {:>14.0}", result.real_net_profit);
    println!("Blended net profit:  {:>14.0}", result.blended_net_profit);
    println!("Cost ratio:          {:>13.1}%", result.cost_ratio);
    println!("Monthly amortization:{:>14.0}", result.monthly_amortization);
    println!("NPV:                 {:>14.0}", result.npv);
    println!("IRR (annual):        {:>13.2}%", result.irr_annual_pct);
    println!();
    println!("{:<10} {:>14} {:>14} {:>8}", "Party", "Principal", "Profit", "ROI");
    println!("{}", "-".repeat(49));
    for (name, party) in [("Investor", Party::Investor), ("Operator", Party::Operator)] {
        let returns = result.party(party);
        println!(
            "{:<10} {:>14.0} {:>14.0} {:>7.1}%",
            name, returns.principal, returns.profit_share, returns.annualized_roi
        );
    }
}

fn run_override(
    file: PathBuf,
    month: Option<u32>,
    field: Option<FieldArg>,
    value: &str,
    reset: bool,
) -> Result<()> {
    let mut overrides = load_overrides_or_default(&file).context("Failed to load overrides")?;

    if reset {
        overrides.clear();
    } else {
        let (Some(month), Some(field)) = (month, field) else {
            bail!("--month and --field are required unless --reset is given");
        };
        if month == 0 {
            bail!("months are numbered from 1");
        }
        overrides.apply(month - 1, field.into(), value);
    }

    write_overrides(&file, &overrides).context("Failed to write overrides")?;
    println!("{} adjusted months", overrides.len());
    let show = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.0}"));
    for (index, entry) in overrides.iter() {
        println!(
            "  month {:>4}: income {:>10}  expense {:>10}",
            index + 1,
            show(entry.income),
            show(entry.expense)
        );
    }
    Ok(())
}

fn run_compare(store_config: StoreConfig) -> Result<()> {
    let store = JsonFileStore::new(store_config);
    let projects = store.list().context("Failed to list projects")?;
    if projects.is_empty() {
        println!("No saved projects");
        return Ok(());
    }

    let scenarios: Vec<Scenario> = projects
        .iter()
        .map(|p| {
            let (parameters, overrides) = p.restore();
            Scenario::new(parameters, overrides)
        })
        .collect();
    let results = ScenarioRunner::new().run_batch(&scenarios);

    println!(
        "{:>4}  {:<24} {:>12} {:>12} {:>8} {:>8} {:>10}",
        "ID", "Project", "Net profit", "NPV", "IRR %", "ROI %", "Break-even"
    );
    println!("{}", "-".repeat(86));
    for ((project, scenario), result) in projects.iter().zip(&scenarios).zip(&results) {
        println!(
            "{:>4}  {:<24} {:>12.0} {:>12.0} {:>8.2} {:>8.1} {:>10}",
            project.id,
            scenario.parameters.project_name,
            result.real_net_profit,
            result.npv,
            result.irr_annual_pct,
            result.investor.annualized_roi,
            result.break_even.date().unwrap_or("-"),
        );
    }
    Ok(())
}

fn run_ledger(store_config: StoreConfig, command: LedgerCommands) -> Result<()> {
    let mut store = JsonFileStore::new(store_config);
    let mut ledger = store.load_ledger().context("Failed to load ledger")?;

    match command {
        LedgerCommands::Show => {
            print_ledger(&ledger);
            return Ok(());
        }
        LedgerCommands::SetCapital { amount } => {
            ledger.set_initial_capital(amount);
            println!("Initial capital set to {:.0}", ledger.initial_capital);
        }
        LedgerCommands::AddEntry {
            month,
            income,
            expense,
        } => {
            let month = match month {
                Some(raw) => raw.parse::<YearMonth>().map_err(anyhow::Error::msg)?,
                None => YearMonth::current(),
            };
            let entry = ledger.add_entry_text(month, &income, &expense);
            println!("Added entry {} for {} (net {:.0})", entry.id, entry.month, entry.net());
        }
        LedgerCommands::Import { file } => {
            let added = import_entries_csv_path(&mut ledger, &file)
                .with_context(|| format!("Failed to import {}", file.display()))?;
            println!("Imported {added} entries");
        }
        LedgerCommands::RemoveEntry { id } => {
            ledger.remove_entry(id)?;
            println!("Removed entry {id}");
        }
        LedgerCommands::AddBucket { name, percentage } => {
            let bucket = ledger.add_bucket(&name, percentage)?;
            println!("Added bucket {} ({}, {}%)", bucket.id, bucket.name, bucket.percentage);
        }
        LedgerCommands::RemoveBucket { id } => {
            ledger.remove_bucket(id)?;
            println!("Removed bucket {id}");
        }
    }

    store.save_ledger(&ledger).context("Failed to save ledger")?;
    Ok(())
}

fn print_ledger(ledger: &FundLedger) {
    let stats = ledger.stats();

    println!("Initial capital:     {:>14.0}", ledger.initial_capital);
    println!("Total income:        {:>14.0}", stats.total_income);
    println!("Total expense:       {:>14.0}", stats.total_expense);
    println!("Net ledger profit:   {:>14.0}", stats.net_ledger_profit);
    println!("Current total cash:  {:>14.0}", stats.current_total_cash);
    println!();

    println!("{:>4}  {:<20} {:>6} {:>14}", "ID", "Bucket", "%", "Amount");
    for bucket in &stats.buckets {
        println!(
            "{:>4}  {:<20} {:>6.1} {:>14.0}",
            bucket.id, bucket.name, bucket.percentage, bucket.current_amount
        );
    }
    println!("{:>4}  {:<20} {:>6} {:>14.0}", "", "Free cash", "", stats.free_cash);
    println!();

    println!("{:>4}  {:<8} {:>12} {:>12} {:>12}", "ID", "Month", "Income", "Expense", "Net");
    for entry in ledger.entries_newest_first() {
        println!(
            "{:>4}  {:<8} {:>12.0} {:>12.0} {:>12.0}",
            entry.id,
            entry.month.to_string(),
            entry.income,
            entry.expense,
            entry.net()
        );
    }
}
