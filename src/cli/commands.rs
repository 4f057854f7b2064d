use crate::cli::args::{Cli, Commands};
use crate::error::{AnalysisError, Result};
use crate::pipeline::{AnalysisPipeline, AnalysisReport};
use crate::upload::{template_csv, Settings, UploadHandler};
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;
use std::fs;
use std::path::Path;
use tracing::info;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Analyze {
            input,
            json,
            series_out,
            max_bytes,
        } => {
            let progress = ProgressReporter::new_spinner("Analyzing data...", json);
            let pipeline = AnalysisPipeline::with_max_input_bytes(max_bytes);
            let result = pipeline.analyze_path(&input);
            progress.finish_and_clear();
            let report = result?;

            if let Some(path) = series_out {
                write_series(&report, &path)?;
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&input, &report);
            }
        }

        Commands::Upload { file, config } => {
            let settings = Settings::load(config.as_deref())?;
            let handler = UploadHandler::new(settings.upload)?;

            let bytes = fs::read(&file).map_err(|e| AnalysisError::NotFound {
                path: file.clone(),
                reason: e.to_string(),
            })?;
            let file_name = file
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or_default();

            let response = handler.handle(file_name, &bytes);
            println!("{}", response.to_json()?);

            if !response.success {
                return Err(AnalysisError::Upload {
                    status: response.status,
                    message: response.error.unwrap_or_default(),
                });
            }
        }

        Commands::Template { output } => match output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, template_csv())?;
                println!("Template written to {}", path.display());
            }
            None => print!("{}", template_csv()),
        },
    }

    Ok(())
}

fn write_series(report: &AnalysisReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(&report.series)?)?;
    info!("Chart series saved to {}", path.display());
    Ok(())
}

fn print_report(input: &Path, report: &AnalysisReport) {
    let rule = "=".repeat(60);
    println!("{}", rule);
    println!("AGRI-TECH DATA ANALYZER");
    println!("{}", rule);
    println!("Input: {}", input.display());

    if report.warnings.is_empty() {
        println!("\n✓ No data-quality issues found");
    } else {
        println!("\nData-quality warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  ⚠ {}", warning);
        }
    }

    println!("\n{}", report.summary.detailed_summary());

    if !report.weekly.is_empty() {
        println!("\nWeekly Summary:");
        println!(
            "  {:<10}  {:<10}  {:>4}  {:>12}  {:>12}  {:>10}",
            "Start", "End", "Days", "Rainfall mm", "Avg Growth", "Avg Temp"
        );
        for week in &report.weekly {
            let temperature = week
                .temperature_mean_c
                .map(|t| format!("{:.1}°C", t))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<10}  {:<10}  {:>4}  {:>12.2}  {:>12.2}  {:>10}",
                week.week_start.to_string(),
                week.week_end.to_string(),
                week.record_count,
                week.rainfall_total_mm,
                week.growth_mean_cm,
                temperature
            );
        }
    }

    println!("\n{}", rule);
    println!("Analysis complete!");
    println!("{}", rule);
}
