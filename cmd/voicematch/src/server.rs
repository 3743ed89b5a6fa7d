//! HTTP server for browser-driven analysis.
//!
//! API endpoints:
//! - GET  /            - Static files (upload UI) or fallback page
//! - GET  /api/status  - {status, analyses_performed} JSON
//! - POST /api/analyze - multipart fields `suspect` and `evidence`,
//!                       responds with the full analysis JSON including
//!                       the downloadable report text

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower_http::services::ServeDir;
use tracing::{info, warn};
use voicematch_verify::Verifier;

use crate::analysis::{analyze, Analysis, AnalysisError};

/// Per-file upload cap.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Server state. The analysis counter lives here, owned by the server,
/// so concurrent servers in one process count independently.
#[derive(Clone)]
struct AppState {
    verifier: Verifier,
    analyses: Arc<AtomicU64>,
}

/// Starts the HTTP server and blocks until it exits.
pub async fn serve(addr: &str, verifier: Verifier, static_dir: Option<PathBuf>) -> Result<()> {
    let state = AppState {
        verifier,
        analyses: Arc::new(AtomicU64::new(0)),
    };

    let mut app = Router::new()
        .route("/api/status", get(status))
        .route(
            "/api/analyze",
            post(run_analysis)
                // Two files plus multipart framing.
                .layer(DefaultBodyLimit::max(2 * MAX_UPLOAD_BYTES + 1024 * 1024)),
        )
        .with_state(state);

    if let Some(dir) = static_dir {
        if dir.exists() {
            app = app.fallback_service(ServeDir::new(dir));
        } else {
            warn!("static dir not found: {:?}", dir);
            app = app.route("/", get(fallback_index));
        }
    } else {
        app = app.route("/", get(fallback_index));
    }

    let addr = parse_addr(addr)?;
    info!("server started at http://{addr}");
    println!("Server started at http://{}", addr);
    println!("  - GET  /            Upload UI");
    println!("  - GET  /api/status  Server status");
    println!("  - POST /api/analyze Analyze two clips (multipart: suspect, evidence)");
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Parse address string to SocketAddr. ":8080" binds all interfaces.
fn parse_addr(addr: &str) -> Result<SocketAddr> {
    let addr = if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    };
    Ok(addr.parse()?)
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    analyses_performed: u64,
}

async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse {
        status: "ready",
        analyses_performed: state.analyses.load(Ordering::Relaxed),
    })
}

#[derive(Serialize)]
struct AnalyzeResponse {
    #[serde(flatten)]
    analysis: Analysis,
    analyses_performed: u64,
}

/// Errors surfaced to HTTP clients as JSON.
#[derive(Debug)]
enum ApiError {
    MissingField(&'static str),
    TooLarge(&'static str),
    BadUpload(String),
    Analysis(AnalysisError),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (code, message) = match self {
            Self::MissingField(name) => (
                StatusCode::BAD_REQUEST,
                format!("missing multipart field: {name}"),
            ),
            Self::TooLarge(name) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("{name} file exceeds {} MB", MAX_UPLOAD_BYTES / (1024 * 1024)),
            ),
            Self::BadUpload(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Analysis(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (code, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

async fn run_analysis(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut suspect: Option<Upload> = None;
    let mut evidence: Option<Upload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadUpload(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let slot = match name.as_str() {
            "suspect" => &mut suspect,
            "evidence" => &mut evidence,
            _ => continue,
        };

        let file_name = field.file_name().unwrap_or("upload.wav").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadUpload(e.to_string()))?;
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::TooLarge(match name.as_str() {
                "suspect" => "suspect",
                _ => "evidence",
            }));
        }
        *slot = Some(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    let suspect = suspect.ok_or(ApiError::MissingField("suspect"))?;
    let evidence = evidence.ok_or(ApiError::MissingField("evidence"))?;

    let analysis = analyze_off_thread(state.verifier.clone(), suspect, evidence).await?;

    let analyses_performed = state.analyses.fetch_add(1, Ordering::Relaxed) + 1;
    info!(
        score = analysis.similarity_score,
        tier = %analysis.tier,
        suspect = %analysis.suspect.file_name,
        evidence = %analysis.evidence.file_name,
        "analysis complete"
    );

    Ok(Json(AnalyzeResponse {
        analysis,
        analyses_performed,
    }))
}

/// Runs the pipeline on the blocking thread pool.
///
/// Filterbank extraction over two 50 MB clips is a multi-second CPU burn;
/// keeping it off the async workers leaves them free to serve `/api/status`
/// and accept new connections while an analysis is in flight.
async fn analyze_off_thread(
    verifier: Verifier,
    suspect: Upload,
    evidence: Upload,
) -> Result<Analysis, ApiError> {
    tokio::task::spawn_blocking(move || {
        analyze(
            &verifier,
            &suspect.file_name,
            &suspect.bytes,
            &evidence.file_name,
            &evidence.bytes,
        )
    })
    .await
    .map_err(|e| ApiError::Internal(format!("analysis task failed: {e}")))?
    .map_err(ApiError::Analysis)
}

/// Fallback page when no static dir is provided.
async fn fallback_index() -> impl IntoResponse {
    Html(FALLBACK_HTML)
}

const FALLBACK_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Voice Matcher</title>
    <style>
        :root { --bg: #0d1117; --text: #c9d1d9; --text-muted: #8b949e; --blue: #58a6ff; }
        body { font-family: -apple-system, sans-serif; background: var(--bg); color: var(--text); padding: 2rem; text-align: center; }
        h1 { margin-bottom: 1rem; }
        p { color: var(--text-muted); }
        a { color: var(--blue); }
        code { background: rgba(255,255,255,0.1); padding: 0.2rem 0.5rem; border-radius: 4px; }
    </style>
</head>
<body>
    <h1>Voice Matcher</h1>
    <p>No static files directory specified.</p>
    <p>Use <code>--serve-static</code> to point at the upload UI, or call the API directly:</p>
    <p><code>curl -F suspect=@a.wav -F evidence=@b.wav http://localhost:8080/api/analyze</code></p>
    <p style="margin-top: 2rem;"><a href="/api/status">/api/status</a></p>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use voicematch_verify::FbankEncoder;

    fn make_wav(freq_hz: f64, seconds: f64, sample_rate: u32) -> Vec<u8> {
        let n = (seconds * sample_rate as f64) as usize;
        let data_len = n * 2;

        let mut out = Vec::with_capacity(44 + data_len);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&((36 + data_len) as u32).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&(data_len as u32).to_le_bytes());
        for i in 0..n {
            let t = i as f64 / sample_rate as f64;
            let s = ((freq_hz * 2.0 * PI * t).sin() * 16000.0) as i16;
            out.extend_from_slice(&s.to_le_bytes());
        }
        out
    }

    #[tokio::test]
    async fn off_thread_analysis_matches_direct() {
        let verifier = Verifier::new(Arc::new(FbankEncoder::new()));
        let wav = make_wav(440.0, 1.0, 16_000);

        let direct = analyze(&verifier, "suspect.wav", &wav, "evidence.wav", &wav).unwrap();
        let off_thread = analyze_off_thread(
            verifier.clone(),
            Upload {
                file_name: "suspect.wav".to_string(),
                bytes: wav.clone(),
            },
            Upload {
                file_name: "evidence.wav".to_string(),
                bytes: wav.clone(),
            },
        )
        .await
        .expect("off-thread analysis should succeed");

        assert_eq!(off_thread.similarity_score, direct.similarity_score);
        assert_eq!(off_thread.tier, direct.tier);
        assert_eq!(off_thread.same_prediction, direct.same_prediction);
        assert_eq!(off_thread.suspect, direct.suspect);
        assert_eq!(off_thread.evidence, direct.evidence);
        assert!(off_thread.report.contains("suspect.wav"));
        assert!(off_thread.report.contains("evidence.wav"));
    }

    #[tokio::test]
    async fn off_thread_analysis_propagates_decode_error() {
        let verifier = Verifier::new(Arc::new(FbankEncoder::new()));
        let good = make_wav(440.0, 1.0, 16_000);

        let err = analyze_off_thread(
            verifier,
            Upload {
                file_name: "bad.bin".to_string(),
                bytes: b"not audio".to_vec(),
            },
            Upload {
                file_name: "evidence.wav".to_string(),
                bytes: good,
            },
        )
        .await
        .err()
        .expect("corrupt upload should fail");

        assert!(matches!(err, ApiError::Analysis(_)));
    }

    #[test]
    fn parse_addr_forms() {
        assert_eq!(
            parse_addr(":8080").unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            parse_addr("127.0.0.1:9000").unwrap(),
            "127.0.0.1:9000".parse::<SocketAddr>().unwrap()
        );
        assert!(parse_addr("not an address").is_err());
    }
}
