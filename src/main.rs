mod app;
mod domain;
mod infra;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::app::{AppError, GatherInputs};
use crate::domain::DEFAULT_TOTAL_BUDGET;
use crate::util::settings::{load_settings, MarketQuality, Settings};
use crate::util::version::version_label;

#[derive(Parser)]
#[command(
    name = "workshop-planner",
    version,
    about = "Expand workshop crafting demands into gathering lists and price them on the market board"
)]
struct Cli {
    /// Settings file (defaults to settings.json in the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output, including every step of the recipe walk
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the gathering list and the sorted crafting list
    Gather(GatherArgs),
    /// Price a gathering list and a crafted-product table
    Market(MarketArgs),
    /// Gather, then price the result
    Run(RunArgs),
    /// Merge several demand tables, summing quantities per item
    Consolidate(ConsolidateArgs),
    /// Split a contract budget across crafters and gatherers
    Budget(BudgetArgs),
}

#[derive(Args)]
struct GatherArgs {
    /// Top-level demand table: product, quantity
    #[arg(long)]
    demand: PathBuf,
    /// Recipe table: product, ingredient, qty, ingredient, qty, ...
    #[arg(long)]
    recipes: PathBuf,
    /// Gathering table: ingredient, location, location, ...
    #[arg(long)]
    locations: PathBuf,
    /// Where to write the gathering list
    #[arg(long)]
    out: PathBuf,
    /// Where to write the sorted crafting list
    #[arg(long)]
    crafting_out: Option<PathBuf>,
    /// Recurse without cycle detection
    #[arg(long)]
    no_cycle_check: bool,
}

impl GatherArgs {
    fn inputs(&self) -> GatherInputs {
        GatherInputs {
            demand: self.demand.clone(),
            recipes: self.recipes.clone(),
            locations: self.locations.clone(),
        }
    }

    fn apply(&self, settings: &mut Settings) {
        if self.no_cycle_check {
            settings.detect_cycles = false;
        }
    }
}

#[derive(Args)]
struct MarketOverrides {
    /// World to query prices for
    #[arg(long)]
    world: Option<String>,
    /// Price tier to report
    #[arg(long, value_enum)]
    quality: Option<MarketQuality>,
    /// Pause between market requests in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
}

impl MarketOverrides {
    fn apply(&self, settings: &mut Settings) {
        if let Some(world) = &self.world {
            settings.world = world.clone();
        }
        if let Some(quality) = self.quality {
            settings.quality = quality;
        }
        if let Some(delay_ms) = self.delay_ms {
            settings.request_delay_ms = delay_ms;
        }
    }
}

#[derive(Args)]
struct MarketArgs {
    /// Gathering list written by `gather`
    #[arg(long)]
    gathering: PathBuf,
    /// Header-less table whose first column lists crafted products
    #[arg(long)]
    crafting: PathBuf,
    /// Item catalog JSON: { "<id>": { "en": "<name>" } }
    #[arg(long)]
    catalog: PathBuf,
    /// Where to write the market list
    #[arg(long)]
    out: PathBuf,
    #[command(flatten)]
    overrides: MarketOverrides,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    gather: GatherArgs,
    /// Item catalog JSON: { "<id>": { "en": "<name>" } }
    #[arg(long)]
    catalog: PathBuf,
    /// Where to write the market list
    #[arg(long)]
    market_out: PathBuf,
    #[command(flatten)]
    overrides: MarketOverrides,
}

#[derive(Args)]
struct ConsolidateArgs {
    /// Demand tables to merge
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args)]
struct BudgetArgs {
    /// Crafting list written by `gather`, or a consolidated demand table
    #[arg(long)]
    crafting: PathBuf,
    /// Gathering list whose location column holds the gathering method
    #[arg(long)]
    gathering: PathBuf,
    #[arg(long, default_value_t = DEFAULT_TOTAL_BUDGET)]
    total: f64,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Command::Gather(args) => {
            args.apply(&mut settings);
            let output = app::gather(&settings, &args.inputs())?;
            app::write_gathering(&args.out, &output.gathering)?;
            if let Some(path) = &args.crafting_out {
                app::write_crafting(path, &output.crafting)?;
            }
        }
        Command::Market(args) => {
            args.overrides.apply(&mut settings);
            let gathering = infra::output::open_gathering_list(&args.gathering)?;
            let crafted = app::crafted_names(&settings, &args.crafting)?;
            let catalog = app::load_catalog(&args.catalog)?;
            let report = app::price(
                &settings,
                &catalog,
                gathering.iter().map(|row| row.ingredient.as_str()),
                crafted.iter().map(String::as_str),
            )
            .await?;
            app::write_market(&args.out, &report)?;
        }
        Command::Run(args) => {
            args.gather.apply(&mut settings);
            args.overrides.apply(&mut settings);
            let output = app::gather(&settings, &args.gather.inputs())?;
            app::write_gathering(&args.gather.out, &output.gathering)?;
            if let Some(path) = &args.gather.crafting_out {
                app::write_crafting(path, &output.crafting)?;
            }

            let catalog = app::load_catalog(&args.catalog)?;
            let report = app::price(
                &settings,
                &catalog,
                output.gathering.iter().map(|row| row.ingredient.as_str()),
                output.crafting.iter().map(|row| row.product.as_str()),
            )
            .await?;
            app::write_market(&args.market_out, &report)?;
        }
        Command::Consolidate(args) => {
            app::consolidate_files(&settings, &args.inputs, &args.out)?;
        }
        Command::Budget(args) => {
            let plan = app::budget(&settings, args.total, &args.crafting, &args.gathering)?;
            app::print_budget(&plan);
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!(version = %version_label(), "starting");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn market_overrides_replace_settings() {
        let cli = Cli::parse_from([
            "workshop-planner",
            "market",
            "--gathering",
            "gathering.csv",
            "--crafting",
            "recipes.csv",
            "--catalog",
            "items.json",
            "--out",
            "market.csv",
            "--world",
            "Zodiark",
            "--quality",
            "hq",
        ]);
        let Command::Market(args) = cli.command else {
            panic!("expected market command");
        };
        let mut settings = Settings::default();
        args.overrides.apply(&mut settings);
        assert_eq!(settings.world, "Zodiark");
        assert_eq!(settings.quality, MarketQuality::Hq);
        assert_eq!(settings.request_delay_ms, 500);
    }

    #[test]
    fn consolidate_requires_inputs() {
        let result = Cli::try_parse_from(["workshop-planner", "consolidate", "--out", "all.csv"]);
        assert!(result.is_err());
    }
}
