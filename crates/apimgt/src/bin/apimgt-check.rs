// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! API compatibility checker CLI
//!
//! Compares a baseline and a candidate Swagger document.
//!
//! Usage:
//!
//! ```text
//! apimgt-check --baseline <path> --candidate <path> [--report] [--json]
//! ```
//!
//! Exit codes: 0 compatible, 1 incompatible, 2 usage or input error.

use apimgt::{
    ApiSpecification, CheckerConfig, CompatibilityPipeline, CompatibilityReport, EvaluationMode,
    normalize,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const EXIT_INCOMPATIBLE: u8 = 1;
const EXIT_ERROR: u8 = 2;

fn print_usage() {
    eprintln!(
        r#"Usage: apimgt-check [OPTIONS]

Check whether a candidate API specification is backward compatible with a baseline.

OPTIONS:
    --baseline <path>    Baseline Swagger JSON document (required)
    --candidate <path>   Candidate Swagger JSON document (required)
    --report             List every change instead of stopping at the first break
    --json               Print the verdict or report as JSON
    --help               Show this help message

ENVIRONMENT:
    APIMGT_MODE                          fail-fast (default) or report
    APIMGT_WARN_ON_OPERATION_ID_CHANGE   Warn on renamed operationIds (default: false)
    RUST_LOG                             Log filter (default: warn)

EXAMPLES:
    # Quick verdict
    apimgt-check --baseline api-v1.json --candidate api-v2.json

    # Full change report as JSON
    apimgt-check --baseline api-v1.json --candidate api-v2.json --report --json
"#
    );
}

struct Args {
    baseline_path: PathBuf,
    candidate_path: PathBuf,
    report: bool,
    json: bool,
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = std::env::args().collect();

    let mut baseline_path: Option<PathBuf> = None;
    let mut candidate_path: Option<PathBuf> = None;
    let mut report = false;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--baseline" => {
                i += 1;
                if i >= args.len() {
                    return Err("--baseline requires a path".to_string());
                }
                baseline_path = Some(PathBuf::from(&args[i]));
            }
            "--candidate" => {
                i += 1;
                if i >= args.len() {
                    return Err("--candidate requires a path".to_string());
                }
                candidate_path = Some(PathBuf::from(&args[i]));
            }
            "--report" => {
                report = true;
            }
            "--json" => {
                json = true;
            }
            arg => {
                return Err(format!("Unknown argument: {}", arg));
            }
        }
        i += 1;
    }

    let baseline_path = baseline_path.ok_or("--baseline is required")?;
    let candidate_path = candidate_path.ok_or("--candidate is required")?;

    Ok(Args {
        baseline_path,
        candidate_path,
        report,
        json,
    })
}

fn load_spec(path: &Path) -> Result<ApiSpecification, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {}", path.display(), e))?;
    let document: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| format!("Error parsing {}: {}", path.display(), e))?;
    normalize(&document).map_err(|e| format!("Malformed specification {}: {}", path.display(), e))
}

fn print_report(report: &CompatibilityReport) {
    if report.breaking_changes.is_empty() {
        println!("No breaking changes.");
    } else {
        println!("Breaking changes:");
        for change in &report.breaking_changes {
            println!("  - [{}] {}", change.kind.code(), change.description);
        }
    }

    if !report.compatible_changes.is_empty() {
        println!("Compatible changes:");
        for change in &report.compatible_changes {
            println!("  - {}", change.description);
        }
    }

    if !report.warnings.is_empty() {
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  - {}", warning);
        }
    }
}

fn main() -> ExitCode {
    // Initialize minimal logging (default to warn if RUST_LOG not set)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut config = match CheckerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    if args.report {
        config = config.with_mode(EvaluationMode::Report);
    }

    let (baseline, candidate) = match (
        load_spec(&args.baseline_path),
        load_spec(&args.candidate_path),
    ) {
        (Ok(baseline), Ok(candidate)) => (baseline, candidate),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("{}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let pipeline = CompatibilityPipeline::new(config);
    let report = pipeline.run(&baseline, &candidate);
    let compatible = report.is_compatible();

    let output = match (pipeline.config().mode, args.json) {
        (EvaluationMode::Report, true) => serde_json::to_string_pretty(&report),
        (EvaluationMode::FailFast, true) => serde_json::to_string_pretty(&report.verdict()),
        (EvaluationMode::Report, false) => {
            print_report(&report);
            Ok(String::new())
        }
        (EvaluationMode::FailFast, false) => Ok(report.verdict().to_string()),
    };

    match output {
        Ok(text) if !text.is_empty() => println!("{}", text),
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    if compatible {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_INCOMPATIBLE)
    }
}
