use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;

use fib_sniper::analysis::{build_price_map, compute_levels};
use fib_sniper::engine::{Analysis, ManualInput};
use fib_sniper::models::FibLevel;
use fib_sniper::{
    ANALYSIS, AnalysisConfig, AssetType, ChartEngine, Cli, Command, JsonFileScanStore,
    LabelObservation, PriceMap, ScanRecord, TrendDirection,
};

fn main() -> Result<()> {
    // A. Init Logging
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {:?}", panic_info);
    }));
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::debug!("Parsed arguments: {:?}", args);

    // C. Config + Engine
    let config = match &args.config {
        Some(path) => AnalysisConfig::load_from_path(path)?,
        None => ANALYSIS,
    };
    let store_path = args.store.clone().unwrap_or_else(JsonFileScanStore::default_path);
    let engine = ChartEngine::new(config).with_store(Arc::new(JsonFileScanStore::new(store_path)));

    // D. Dispatch
    match args.command {
        Command::Levels {
            high,
            low,
            direction,
        } => run_levels(high, low, direction, args.json),
        Command::Manual {
            high,
            low,
            current,
            asset,
            name,
            image_height,
            save,
        } => {
            let input = ManualInput {
                high,
                low,
                current,
                asset_type: asset,
                name,
            };
            run_manual(&engine, &input, image_height, save, args.json)
        }
        Command::Calibrate {
            labels,
            image_height,
        } => run_calibrate(&config, &labels, image_height, args.json),
        Command::Batch { files } => run_batch(&engine, &files, args.json),
        Command::History { delete } => run_history(&engine, delete, args.json),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialise output")?
    );
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).context(format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&text).context(format!("Failed to parse JSON: {}", path.display()))
}

fn print_levels(levels: &[FibLevel], asset_type: AssetType) {
    for level in levels {
        let marker = if level.is_golden_pocket { "  <- golden pocket" } else { "" };
        println!(
            "  {:>6}  {}{}",
            level.label,
            asset_type.format_price(level.price),
            marker
        );
    }
}

fn print_analysis(analysis: &Analysis) {
    let asset_type = analysis.asset.asset_type;
    println!("{} ({})", analysis.asset.name, asset_type);
    println!(
        "Swing {} .. {}, {}",
        asset_type.format_price(analysis.swing_low),
        asset_type.format_price(analysis.swing_high),
        analysis.direction
    );
    print_levels(&analysis.levels, asset_type);

    let insight = &analysis.insight;
    println!("Zone: {}  Sentiment: {}", insight.zone, insight.sentiment);
    if let Some(target) = &insight.next_target {
        println!(
            "Next target: {} ({})",
            target.label,
            asset_type.format_price(target.price)
        );
    }
    println!("{}", insight.narrative);
}

fn print_price_map(map: &PriceMap) {
    println!(
        "Row {} = {}, row {} = {}, {:.6} px/unit",
        map.top_pixel_row, map.top_price, map.bottom_pixel_row, map.bottom_price, map.pixels_per_unit
    );
}

fn run_levels(high: f64, low: f64, direction: TrendDirection, json: bool) -> Result<()> {
    if high <= low {
        log::warn!("High {} is not above low {}: levels collapse onto the high", high, low);
    }
    let levels = compute_levels(high, low, direction);
    if json {
        return print_json(&levels);
    }
    println!("{} retracement {} .. {}", direction, low, high);
    print_levels(&levels, AssetType::Crypto);
    Ok(())
}

fn run_manual(
    engine: &ChartEngine,
    input: &ManualInput,
    image_height: Option<u32>,
    save: bool,
    json: bool,
) -> Result<()> {
    let scan = engine.scan_manual(input, image_height)?;
    let saved = if save {
        Some(engine.save(&scan.analysis)?)
    } else {
        None
    };

    if json {
        return print_json(&scan);
    }
    if let Some(map) = &scan.price_map {
        print_price_map(map);
    }
    print_analysis(&scan.analysis);
    if let Some(record) = saved {
        println!("Saved as scan #{}", record.id);
    }
    Ok(())
}

fn run_calibrate(
    config: &AnalysisConfig,
    labels_path: &Path,
    image_height: u32,
    json: bool,
) -> Result<()> {
    let labels: Vec<LabelObservation> = read_json(labels_path)?;
    let map = build_price_map(&labels, image_height, &config.calibration).context(format!(
        "No consistent price scale among {} label(s); enter the price range manually",
        labels.len()
    ))?;

    if json {
        return print_json(&map);
    }
    print_price_map(&map);
    Ok(())
}

fn run_batch(engine: &ChartEngine, files: &[PathBuf], json: bool) -> Result<()> {
    let inputs = files
        .iter()
        .map(|path| read_json::<ManualInput>(path))
        .collect::<Result<Vec<_>>>()?;
    let results = engine.scan_manual_batch(&inputs);
    let failures = results.iter().filter(|r| r.is_err()).count();

    if json {
        let out: Vec<serde_json::Value> = files
            .iter()
            .zip(&results)
            .map(|(path, result)| match result {
                Ok(analysis) => serde_json::json!({ "file": path, "analysis": analysis }),
                Err(e) => serde_json::json!({ "file": path, "error": e.to_string() }),
            })
            .collect();
        print_json(&out)?;
    } else {
        for (path, result) in files.iter().zip(&results) {
            println!("== {}", path.display());
            match result {
                Ok(analysis) => print_analysis(analysis),
                Err(e) => println!("error: {}", e),
            }
        }
    }

    if failures > 0 {
        log::warn!("{} of {} file(s) could not be analysed", failures, files.len());
    }
    Ok(())
}

fn run_history(engine: &ChartEngine, delete: Option<u64>, json: bool) -> Result<()> {
    if let Some(id) = delete {
        if !engine.delete(id)? {
            bail!("No scan with id {}", id);
        }
        println!("Deleted scan #{}", id);
        return Ok(());
    }

    let records = engine.history()?;
    if json {
        return print_json(&records);
    }
    if records.is_empty() {
        println!("No saved scans");
    }
    for record in &records {
        print_record(record);
    }
    Ok(())
}

fn print_record(r: &ScanRecord) {
    let current = r
        .current_price
        .map(|p| r.asset_type.format_price(p))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "#{:<4} {}  {:<10} {:<6} {} .. {}  now {}  {}",
        r.id,
        r.created_at.format("%Y-%m-%d %H:%M"),
        r.asset_name,
        r.asset_type.to_string(),
        r.asset_type.format_price(r.swing_low),
        r.asset_type.format_price(r.swing_high),
        current,
        r.direction
    );
}
