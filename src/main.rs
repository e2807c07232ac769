use anyhow::{bail, Result};
use std::env;
use std::path::{Path, PathBuf};

use arrest_compare::pipeline::DEFAULT_SAMPLE_ROWS;
use arrest_compare::{
    available_year_range, create_sample, demographic_summary, export_aligned,
    geo_view, load_and_process, order_by_department, process_files, temporal_summary, City,
    ComparisonData, Department, PipelineConfig, VERSION,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("run");
    let rest = args.get(2..).unwrap_or(&[]);

    match command {
        "run" => run_summary(rest)?,
        "export" => run_export(rest)?,
        "geo" => run_geo(rest)?,
        "sample" => run_sample(rest)?,
        "help" | "--help" | "-h" => print_usage(),
        other => {
            print_usage();
            bail!("Unknown command: {}", other);
        }
    }

    Ok(())
}

fn print_usage() {
    println!("arrest-compare {}", VERSION);
    println!();
    println!("USAGE:");
    println!("  arrest-compare run [<nypd_file> <lapd_file>] [--config <file>]");
    println!("  arrest-compare export <out_dir> [--config <file>]");
    println!("  arrest-compare geo <NYC|LA> [fraction] [--config <file>]");
    println!("  arrest-compare sample [rows] [--config <file>]");
}

/// Split `--config <file>` out of the argument list
fn parse_args(args: &[String]) -> Result<(PipelineConfig, Vec<String>)> {
    let mut config_path: Option<PathBuf> = None;
    let mut rest = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            match iter.next() {
                Some(path) => config_path = Some(PathBuf::from(path)),
                None => bail!("--config requires a file path"),
            }
        } else {
            rest.push(arg.clone());
        }
    }

    let config = match config_path {
        Some(path) => PipelineConfig::from_file(&path)?,
        None => PipelineConfig::default(),
    };
    Ok((config, rest))
}

fn load(config: &PipelineConfig) -> Result<ComparisonData> {
    println!("📂 Loading data from {}...", config.data_dir.display());
    match load_and_process(config) {
        Some(data) => Ok(data),
        None => bail!("Failed to load data. Check the files in {}", config.data_dir.display()),
    }
}

fn run_summary(args: &[String]) -> Result<()> {
    let (config, rest) = parse_args(args)?;

    println!("🚔 Arrest Data Comparison - NYPD vs LAPD");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let data = match rest.as_slice() {
        [] => load(&config)?,
        [first, second] => {
            let (nypd_path, lapd_path) = order_by_department(Path::new(first), Path::new(second))?;
            println!("📂 Loading {} and {}...", nypd_path.display(), lapd_path.display());
            match process_files(&nypd_path, &lapd_path) {
                Some(data) => data,
                None => bail!("Failed to load data from the given files"),
            }
        }
        _ => bail!("Usage: arrest-compare run [<nypd_file> <lapd_file>]"),
    };
    for department in [Department::Nypd, Department::Lapd] {
        println!("✓ {}: {} records", department.name(), data.get(department).len());
    }
    if let Some((from, to)) = available_year_range(&data.nypd, &data.lapd) {
        println!("✓ Years: {}-{}", from, to);
    }

    for report in &data.reports {
        println!("   {}", report.summary());
    }

    let temporal = temporal_summary(&data.nypd, &data.lapd);
    println!("\n📅 Arrests by year:");
    for year in &temporal.by_year {
        println!("   {}  NYPD {:>8}  LAPD {:>8}", year.year, year.nypd, year.lapd);
    }

    println!("\n📆 Arrests by weekday:");
    for day in &temporal.by_weekday {
        println!("   {}  NYPD {:>8}  LAPD {:>8}", day.weekday, day.nypd, day.lapd);
    }

    let demographics = demographic_summary(&data.nypd, &data.lapd);
    println!("\n👥 Offense categories (% of arrests):");
    for share in &demographics.offense {
        println!(
            "   {:<20} NYPD {:>6.2}%  LAPD {:>6.2}%  diff {:>+7.2}",
            share.category,
            share.nypd_pct,
            share.lapd_pct,
            share.difference()
        );
    }

    println!("\n✅ Done");
    Ok(())
}

fn run_export(args: &[String]) -> Result<()> {
    let (config, rest) = parse_args(args)?;
    let Some(out_dir) = rest.first() else {
        bail!("Usage: arrest-compare export <out_dir>");
    };

    let data = load(&config)?;

    println!("\n💾 Writing aligned datasets...");
    let (nypd_path, lapd_path) = export_aligned(&data, Path::new(out_dir))?;
    println!("✓ {}", nypd_path.display());
    println!("✓ {}", lapd_path.display());
    Ok(())
}

fn run_geo(args: &[String]) -> Result<()> {
    let (config, rest) = parse_args(args)?;
    let Some(city) = rest.first() else {
        bail!("Usage: arrest-compare geo <NYC|LA> [fraction]");
    };
    let city: City = city.parse()?;
    let fraction = match rest.get(1) {
        Some(f) => Some(f.parse::<f64>()?),
        None => None,
    };

    let data = load(&config)?;
    let view = geo_view(&data, city, &config.sampling(fraction), config.min_density_points)?;

    println!("\n🗺️  {} arrest map", city.title());
    println!("✓ Points plotted: {}", view.plotted);
    match &view.density {
        Some(density) => {
            let dense = density.normalized.iter().filter(|v| **v >= 0.75).count();
            println!("✓ Density computed ({} points with normalized density >= 0.75)", dense);
        }
        None => println!("⚠️  Too few points for density; plain markers only"),
    }
    Ok(())
}

fn run_sample(args: &[String]) -> Result<()> {
    let (config, rest) = parse_args(args)?;
    let rows = match rest.first() {
        Some(n) => n.parse::<usize>()?,
        None => DEFAULT_SAMPLE_ROWS,
    };

    println!("✂️  Creating sample datasets ({} rows)...", rows);
    for (full, sample) in [
        (&config.nypd_file, &config.nypd_sample_file),
        (&config.lapd_file, &config.lapd_sample_file),
    ] {
        let input = config.data_dir.join(full);
        let output = config.data_dir.join(sample);
        match create_sample(&input, &output, rows) {
            Ok(n) => println!("✓ {} ({} rows)", output.display(), n),
            Err(e) => eprintln!("❌ Error creating sample for {}: {:#}", input.display(), e),
        }
    }
    Ok(())
}
