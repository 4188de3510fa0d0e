use clap::Parser;
use lib::{
    AnalysisConfig, AnalysisError, CityWeatherData, FetcherConfig, OpenWeatherMap, Season,
    SimpleLogger, analyze_all, analyze_city, check_live, read_dataset, write_csv, write_json,
    write_parquet, write_profile_csv,
};
use log::debug;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

static LOGGER: SimpleLogger = SimpleLogger;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input dataset (CSV, or Parquet with a .parquet extension) with city, timestamp, season, temperature columns
    #[arg(short, long)]
    input_file: PathBuf,

    /// City to analyze. If not specified, analyzes every city in the dataset.
    #[arg(short, long)]
    city: Option<String>,

    /// Season to check the live temperature against
    #[arg(short, long)]
    season: Option<Season>,

    /// OpenWeatherMap API key; enables the live temperature check
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OpenWeatherMap base URL
    #[arg(long, default_value = lib::fetch::DEFAULT_BASE_URL)]
    base_url: String,

    /// Rolling window (readings) for outlier detection
    #[arg(short, long, default_value_t = lib::structs::DEFAULT_WINDOW)]
    window: usize,

    /// Output base name (will create dir containing summary/profile .csv, .json, and outlier .parquet files)
    #[arg(short, long)]
    output: Option<String>,

    /// Log level for output
    #[arg(long, default_value = "false")]
    debug: bool,
}

fn main() -> Result<(), AnalysisError> {
    let total_start = Instant::now();
    if log::set_logger(&LOGGER).is_err() {
        eprintln!("Logger already initialized");
    }

    let args = Args::parse();
    if args.debug {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Info);
    }

    println!("Seasonal! Temperature anomaly analysis");
    debug!(
        "Input file: {} | City: {} | Window: {}",
        args.input_file.display(),
        args.city.as_deref().unwrap_or("ALL"),
        args.window
    );

    let config = AnalysisConfig {
        window: args.window,
    };

    let load_start = Instant::now();
    let dataset = read_dataset(&args.input_file)?;
    println!(
        "Loaded {} readings for {} cities in {:.2?}",
        dataset.len(),
        dataset.cities().len(),
        load_start.elapsed()
    );

    let analysis_start = Instant::now();
    let results = match &args.city {
        Some(city) => vec![analyze_city(&dataset, city, &config)?],
        None => analyze_all(&dataset, &config)?,
    };
    println!(
        "Analysis completed in {:.2?} | {} cities",
        analysis_start.elapsed(),
        results.len()
    );

    for data in &results {
        print_report(data);
    }

    if let Some(reason) = live_check_skip_reason(args.api_key.is_some(), args.season, results.len()) {
        println!("\nLive check skipped: {}", reason);
    }
    if let (Some(api_key), Some(season), [data]) = (&args.api_key, args.season, results.as_slice()) {
        let fetcher = OpenWeatherMap::new(FetcherConfig {
            base_url: args.base_url.clone(),
        })?;
        let live = check_live(&fetcher, &data.city, api_key, season, &data.season_profile)?;
        println!("\nCurrent temperature: {}\u{00b0}C", live.temperature);
        if live.anomalous {
            println!("Temperature is anomalous for {}", season);
        } else {
            println!("Temperature is normal for {}", season);
        }
    }

    if let Some(output) = &args.output {
        let output_dir = PathBuf::from(format!("./output/{}", output));
        fs::create_dir_all(&output_dir)?;
        let output_name = output.split(['/', '\\']).next_back().unwrap_or(output);

        let io_start = Instant::now();
        write_csv(&results, &output_dir.join(format!("{}_summary.csv", output_name)))?;
        write_profile_csv(&results, &output_dir.join(format!("{}_profile.csv", output_name)))?;
        write_json(&results, &output_dir.join(format!("{}.json", output_name)))?;
        write_parquet(&results, &output_dir.join(format!("{}_outliers.parquet", output_name)))?;
        println!(
            "\nWrote files to directory: {} in {:.2?}",
            output_dir.display(),
            io_start.elapsed()
        );
    }

    println!("\nTotal runtime: {:.2?}", total_start.elapsed());
    Ok(())
}

/// Why the live check cannot run for this invocation, if it was asked for.
fn live_check_skip_reason(
    has_api_key: bool,
    season: Option<Season>,
    city_count: usize,
) -> Option<&'static str> {
    match (has_api_key, season, city_count) {
        (true, Some(_), 1) => None,
        (true, _, _) => Some("requires a single --city and a --season"),
        (false, Some(_), _) => Some("--season requires an --api-key (or OPENWEATHER_API_KEY)"),
        (false, None, _) => None,
    }
}

fn print_report(data: &CityWeatherData) {
    let summary = data.summary();
    println!("\n== {}", summary.city);
    println!(
        "Min: {}\u{00b0}C | Max: {}\u{00b0}C | Mean: {}\u{00b0}C",
        summary.min_temp, summary.max_temp, summary.mean_temp
    );

    println!("Season profile:");
    for (season, stats) in &data.season_profile {
        println!("  {:<8} mean={:>8.2} std={:>8.2}", season.as_str(), stats.mean, stats.std);
    }

    let direction = if summary.trend_positive {
        "positive"
    } else {
        "negative"
    };
    println!(
        "Trend: {} | coefficients [{}, {}]",
        direction, summary.slope[0], summary.slope[1]
    );

    println!("Outliers: {}", summary.outlier_count);
    for reading in &data.outliers {
        debug!(
            "  {} {} {:.1}\u{00b0}C",
            reading.timestamp, reading.season, reading.temperature
        );
    }
}
