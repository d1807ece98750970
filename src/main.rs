use std::io;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use log::{error, info, warn};

use row_tagger::tagger::TaggerError;
use row_tagger::tagger::report;
use row_tagger::tagger::row_tagger::{DataFile, Tagger};
use row_tagger::tagger::rules::RuleSet;
use row_tagger::tagger::splitter::SplitStrategy;

/// Counts the rows of a CSV file that match each rule in a rule file.
#[derive(Debug, Parser)]
#[command(name = "row-tagger", version)]
struct Args {
    /// Rule definition file
    #[arg(default_value = "rules.txt")]
    rules: PathBuf,

    /// CSV data file
    #[arg(default_value = "data.csv")]
    data: PathBuf,

    /// Worker pool size (defaults to available CPU cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Quote-aware row splitting (slower, handles quoted commas)
    #[arg(long)]
    quoted: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run(Args::parse()) {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), TaggerError> {
    let started = Instant::now();
    info!("tagger started");

    let mut rule_set = RuleSet::load(&args.rules)?;
    if rule_set.is_empty() {
        warn!("no usable rules in {}, nothing to do", args.rules.display());
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    report::write_rules(&mut stdout, &rule_set)?;

    let data = DataFile::open(&args.data)?;

    let strategy = if args.quoted {
        SplitStrategy::Quoted
    } else {
        SplitStrategy::Naive
    };
    let mut tagger = Tagger::new(strategy);
    if let Some(threads) = args.threads {
        tagger = tagger.with_threads(threads);
    }

    let summary = tagger.run(&mut rule_set, &data)?;
    report::write_results(&mut stdout, &rule_set, &summary.counts)?;

    info!(
        "processed {} rows in {:.2?}",
        summary.rows_processed,
        started.elapsed()
    );
    Ok(())
}
