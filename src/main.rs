mod config;
mod db;
mod fetch;
mod merge;
mod model;
mod parser;
mod pipeline;
mod sites;
mod university;
mod verify;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::fetch::HttpSource;

#[derive(Parser)]
#[command(name = "uni_scraper", about = "University and course catalogue scraper")]
struct Cli {
    /// SQLite artifact to read and write (overrides configuration)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every institution and merge the result into the artifact
    Run {
        /// Courses kept per institution
        #[arg(short, long)]
        batch_size: Option<usize>,
        /// Only scrape these institutions (hamdard, jmi, harvard, cambridge, oxford)
        #[arg(long)]
        only: Vec<String>,
    },
    /// Check the artifact's structure and referential integrity
    Verify,
    /// Courses table joined with universities
    Overview {
        /// Filter by university name (substring)
        #[arg(short, long)]
        university: Option<String>,
        /// Filter by level (e.g. "Bachelor's")
        #[arg(short, long)]
        level: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
        /// One JSON object per line instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Row counts per table and per university
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(output) = cli.output {
        settings.output = output;
    }

    let result = match cli.command {
        Commands::Run { batch_size, only } => {
            if let Some(n) = batch_size {
                anyhow::ensure!(n > 0, "--batch-size must be at least 1");
                settings.batch_size = n;
            }
            let adapters = pipeline::select(&only)?;
            let source = HttpSource::new(&settings)?;

            println!(
                "Scraping {} institutions, {} courses each...",
                adapters.len(),
                settings.batch_size
            );
            let fresh = pipeline::scrape_all(&source, &adapters, settings.batch_size);
            let merged = merge::merge_and_persist(&settings.output, fresh, settings.keep_backup)?;
            println!(
                "Saved {} universities, {} courses to {}",
                merged.universities.len(),
                merged.courses.len(),
                settings.output.display()
            );
            Ok(())
        }
        Commands::Verify => match verify::verify(&settings.output) {
            Ok(()) => {
                println!("Verification passed: {}", settings.output.display());
                Ok(())
            }
            Err(e) => {
                println!("Verification Failed: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Overview {
            university,
            level,
            limit,
            json,
        } => {
            let conn = db::open(&settings.output)?;
            let rows = db::fetch_overview(&conn, university.as_deref(), level.as_deref(), limit)?;
            if rows.is_empty() {
                println!("No courses found.");
                return Ok(());
            }

            if json {
                for r in &rows {
                    println!("{}", serde_json::to_string(r)?);
                }
                return Ok(());
            }

            println!(
                "{:>3} | {:<24} | {:<36} | {:<12} | {:<16} | {:<14} | {:<12}",
                "#", "University", "Course", "Level", "Discipline", "Duration", "Fees"
            );
            println!("{}", "-".repeat(135));
            for (i, r) in rows.iter().enumerate() {
                println!(
                    "{:>3} | {:<24} | {:<36} | {:<12} | {:<16} | {:<14} | {:<12}",
                    i + 1,
                    truncate(&r.university, 24),
                    truncate(&r.course_name, 36),
                    truncate(&r.level, 12),
                    truncate(&r.discipline, 16),
                    truncate(&r.duration, 14),
                    truncate(&r.fees, 12),
                );
            }
            println!("\n{} courses", rows.len());
            Ok(())
        }
        Commands::Stats => {
            let conn = db::open(&settings.output)?;
            let s = db::get_stats(&conn, &sites::labels())?;
            println!("Universities: {}", s.universities);
            println!("Courses:      {}", s.courses);
            println!("Placeholders: {}", s.placeholders);
            if !s.per_university.is_empty() {
                println!();
                for (name, n) in &s.per_university {
                    println!("  {:<40} {:>4}", truncate(name, 40), n);
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
