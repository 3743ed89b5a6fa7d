//! voicematch - compare two voice clips and report speaker similarity.

mod analysis;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use voicematch_verify::{FbankEncoder, Verifier};

/// Compare two voice clips and report speaker similarity.
#[derive(Parser, Debug)]
#[command(name = "voicematch")]
#[command(about = "Compare two voice clips and report speaker similarity")]
struct Args {
    /// Suspect audio file (WAV)
    #[arg(long)]
    suspect: Option<PathBuf>,

    /// Evidence audio file (WAV)
    #[arg(long)]
    evidence: Option<PathBuf>,

    /// Write the plain-text report to a file instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Print the full analysis as JSON (for piping)
    #[arg(long)]
    json: bool,

    /// Start HTTP server (e.g. :8080)
    #[arg(long)]
    serve: Option<String>,

    /// Path to static files directory for the upload UI
    #[arg(long)]
    serve_static: Option<PathBuf>,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    if args.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .with_target(false)
            .init();
    }

    let verifier = Verifier::new(Arc::new(FbankEncoder::new()));

    // Server mode
    if let Some(addr) = &args.serve {
        server::serve(addr, verifier, args.serve_static.clone()).await?;
        return Ok(());
    }

    // Direct mode needs both clips
    let (suspect_path, evidence_path) = match (&args.suspect, &args.evidence) {
        (Some(s), Some(e)) => (s, e),
        _ => {
            print_usage();
            return Ok(());
        }
    };

    let suspect_bytes = read_clip(suspect_path)?;
    let evidence_bytes = read_clip(evidence_path)?;

    let result = analysis::analyze(
        &verifier,
        &file_name(suspect_path),
        &suspect_bytes,
        &file_name(evidence_path),
        &evidence_bytes,
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("=== Voice Analysis ===");
        println!(
            "  Suspect:  {} ({:.3}s, {} Hz, {} ch)",
            result.suspect.file_name,
            result.suspect.duration_seconds,
            result.suspect.sample_rate_hz,
            result.suspect.channel_count
        );
        println!(
            "  Evidence: {} ({:.3}s, {} Hz, {} ch)",
            result.evidence.file_name,
            result.evidence.duration_seconds,
            result.evidence.sample_rate_hz,
            result.evidence.channel_count
        );
        println!();
        println!("  Similarity Score: {:.6}", result.similarity_score);
        println!("  Classification:   {}", result.label);
        println!(
            "  Prediction:       {}",
            if result.same_prediction {
                "Same Speaker"
            } else {
                "Different Speakers"
            }
        );
        println!();
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, &result.report)?;
            println!("Report saved to {}", path.display());
        }
        None if !args.json => {
            println!("{}", result.report);
        }
        None => {}
    }

    Ok(())
}

/// Read an audio file, enforcing the same size cap as the HTTP server.
fn read_clip(path: &PathBuf) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("read {}: {e}", path.display()))?;
    if bytes.len() > server::MAX_UPLOAD_BYTES {
        anyhow::bail!(
            "{} exceeds the {} MB limit",
            path.display(),
            server::MAX_UPLOAD_BYTES / (1024 * 1024)
        );
    }
    Ok(bytes)
}

fn file_name(path: &PathBuf) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_usage() {
    println!("Usage:");
    println!("  voicematch --suspect a.wav --evidence b.wav            Analyze two clips");
    println!("  voicematch --suspect a.wav --evidence b.wav -o out.txt Save report to file");
    println!("  voicematch --suspect a.wav --evidence b.wav --json     JSON output");
    println!("  voicematch --serve :8080                               Start HTTP server");
    println!();
    println!("Options:");
    println!("  --serve :8080                  Start web server for browser uploads");
    println!("  --serve-static <dir>           Static files directory for the upload UI");
    println!("  -o <file.txt>                  Save the plain-text report");
    println!("  --json                         Print analysis JSON instead of text");
    println!("  -v                             Verbose logging");
}
