// Command-line entry point: load both exports, normalize, filter, summarize.
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use demandas_engine::config::Settings;
use demandas_engine::data::source::SourceFormat;
use demandas_engine::services::dashboard::{
    date_bounds, delay_days, find_demand, situation_options, DashboardSummary, DemandFilter,
};
use demandas_engine::services::normalizer::load_and_normalize_files;
use demandas_shared::models::columns;
use demandas_shared::{Cell, Table};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Spreadsheet,
}

impl From<FormatArg> for SourceFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => SourceFormat::Delimited,
            FormatArg::Spreadsheet => SourceFormat::Spreadsheet,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "demandas", version, about = "Cleans and summarizes maintenance work-order exports")]
struct Cli {
    /// Export of open (in-progress) demands
    #[arg(long)]
    open: PathBuf,

    /// Export of closed (finalized) demands
    #[arg(long)]
    closed: PathBuf,

    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override format detection from the file extension
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    #[arg(long)]
    scope: Option<String>,

    #[arg(long)]
    element: Option<String>,

    #[arg(long)]
    team: Option<String>,

    #[arg(long)]
    situation: Option<String>,

    /// Case-insensitive keyword searched in the instruction text
    #[arg(long)]
    keyword: Option<String>,

    /// Case-insensitive keyword searched in the back-office observation
    #[arg(long)]
    back_office_keyword: Option<String>,

    /// First day of the period (dd/mm/yyyy)
    #[arg(long, value_parser = parse_br_date)]
    from: Option<NaiveDate>,

    /// Last day of the period, inclusive (dd/mm/yyyy)
    #[arg(long, value_parser = parse_br_date)]
    to: Option<NaiveDate>,

    /// Look up a single demand number in both tables
    #[arg(long)]
    demand: Option<i64>,

    /// Rows printed per table
    #[arg(long, default_value_t = 20)]
    limit: usize,

    #[arg(long)]
    log_level: Option<String>,
}

fn parse_br_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%d/%m/%Y").map_err(|e| format!("expected dd/mm/yyyy: {}", e))
}

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_or_default(cli.config.as_deref())
        .context("Could not load settings")?;
    setup_logging(cli.log_level.as_deref().unwrap_or(&settings.log_level));

    info!("Demandas v{} starting", env!("CARGO_PKG_VERSION"));

    let normalized = match load_and_normalize_files(
        &cli.open,
        &cli.closed,
        cli.format.map(SourceFormat::from),
        &settings,
        None,
    ) {
        Ok(n) => n,
        Err(e) if e.is_unreadable_source() => {
            return Err(anyhow::Error::new(e).context("Could not read the demand files at all"));
        }
        Err(e) => {
            return Err(anyhow::Error::new(e).context("The demand files were read but cannot be used"));
        }
    };

    let report = &normalized.report;
    if !report.is_clean() {
        println!(
            "Files read, but some values were unusable: {} cells could not be typed, {} closed demands without a valid total cost were dropped.",
            report.unusable_values(),
            report.dropped_rows()
        );
    }

    if let Some(id) = cli.demand {
        print_rows(&format!("Open demand {}", id), &find_demand(&normalized.open, id), cli.limit);
        print_rows(&format!("Closed demand {}", id), &find_demand(&normalized.closed, id), cli.limit);
        return Ok(());
    }

    if let Some(situation) = cli.situation.as_deref() {
        if !situation_options(&normalized.open).iter().any(|s| s == situation) {
            warn!(situation, "Situation not present in the open demands");
        }
    }

    let (default_from, default_to) = date_bounds(&normalized.open).unzip();
    let filter = DemandFilter {
        scope: cli.scope,
        element: cli.element,
        team: cli.team,
        situation: cli.situation,
        instruction_keyword: cli.keyword,
        back_office_keyword: cli.back_office_keyword,
        start_date: cli.from.or(default_from),
        end_date: cli.to.or(default_to),
    };
    let open = filter.apply(&normalized.open);
    let closed = filter.apply(&normalized.closed);
    let summary = DashboardSummary::compute(&open, &closed);

    if let (Some(from), Some(to)) = (filter.start_date, filter.end_date) {
        println!("Period: {} to {}", from.format("%d/%m/%Y"), to.format("%d/%m/%Y"));
    }
    println!("Open demands:   {}", summary.open_count);
    println!("Closed demands: {}", summary.closed_count);
    println!("Total cost:     {}", summary.total_cost_display());
    println!("Average cost:   {}", summary.mean_cost_display());

    let delays: Vec<i64> = delay_days(&open).into_iter().flatten().collect();
    if !delays.is_empty() {
        let mean = delays.iter().sum::<i64>() as f64 / delays.len() as f64;
        println!("Average delay:  {:.1} days", mean);
    }

    print_rows("Open demands", &open, cli.limit);
    print_rows("Closed demands", &closed, cli.limit);
    Ok(())
}

const DISPLAY_COLUMNS: [&str; 8] = [
    columns::DEMANDA,
    columns::DES_ABRANGENCIA,
    columns::DES_ELEMENTO,
    columns::DES_EQUIPE,
    columns::DAT_INICIO,
    columns::VLR_TOTAL,
    columns::DES_INSTRUCAO,
    columns::DES_OBSERVACAO_RETAGUARDA,
];

fn print_rows(title: &str, table: &Table, limit: usize) {
    println!();
    println!("== {} ({} rows)", title, table.len());
    if table.is_empty() {
        println!("No demands match the selected filters");
        return;
    }

    let shown: Vec<&str> = DISPLAY_COLUMNS
        .iter()
        .copied()
        .filter(|c| table.has_column(c))
        .collect();
    println!("{}", shown.join(" | "));
    for row in 0..table.len().min(limit) {
        let line: Vec<String> = shown
            .iter()
            .map(|c| match table.get(row, c) {
                Some(Cell::Number(v)) if *c == columns::VLR_TOTAL => {
                    demandas_shared::utils::brazilian_format::format_currency(*v)
                }
                Some(cell) => cell.to_string(),
                None => String::new(),
            })
            .collect();
        println!("{}", line.join(" | "));
    }
    if table.len() > limit {
        println!("... {} more", table.len() - limit);
    }
}
