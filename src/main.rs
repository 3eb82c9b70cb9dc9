use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Duration, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use placement_match::config::AppConfig;
use placement_match::error::AppError;
use placement_match::telemetry;
use placement_match::workflows::placement::{
    placement_router, EvaluationRecord, JobId, JobRecord, JobStatus, MemoryStore,
    PlacementService, PlacementStatus, ProfileApprovalStatus, RankOptions, SkillEntry,
    SkillRequirement, StudentId, StudentRecord, TestEntry, TrainerId, TrainerRemark,
};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Placement Match",
    about = "Run the placement matching service or demo rankings from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rank seeded demo candidates against the demo job posting
    Rank(RankArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct RankArgs {
    /// Maximum number of candidates to print
    #[arg(long, default_value_t = 10)]
    limit: usize,
    /// Include the per-factor explanation payload
    #[arg(long)]
    explain: bool,
}

type DemoService = PlacementService<MemoryStore, MemoryStore, MemoryStore, MemoryStore>;

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Rank(args) => run_rank_demo(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let service = Arc::new(demo_service(config.matching.weights));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(placement_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "placement matching service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_rank_demo(args: RankArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = demo_service(config.matching.weights);

    let options = RankOptions {
        weights: None,
        limit: args.limit,
        include_explanation: args.explain,
    };

    let ranked = service
        .rank_candidates(&JobId("job-frontend-01".to_string()), options)
        .map_err(AppError::Workflow)?;

    println!("Candidate ranking demo");
    println!("  job: job-frontend-01 (Frontend Engineer, Orbital Labs)");
    for (position, candidate) in ranked.iter().enumerate() {
        println!(
            "  {}. {} -> {}",
            position + 1,
            candidate.student.0,
            candidate.score
        );
    }
    if args.explain {
        println!(
            "{}",
            serde_json::to_string_pretty(&ranked).unwrap_or_default()
        );
    }

    Ok(())
}

fn demo_service(weights: placement_match::workflows::placement::MatchWeights) -> DemoService {
    let store = Arc::new(seeded_store());
    PlacementService::new(store.clone(), store.clone(), store.clone(), store, weights)
}

/// Sample cohort used by the demo subcommand and local serving. Persistence is
/// provided by the deployment environment in production; the in-memory store
/// keeps the binary self-contained.
fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    let today = Utc::now().date_naive();
    let trainer = TrainerId("trainer-demo".to_string());

    let students = [
        ("stu-anaya", "Anaya Prasad", 85, 80, 5),
        ("stu-marco", "Marco Diaz", 78, 62, 4),
        ("stu-lena", "Lena Osei", 92, 88, 5),
    ];

    for (id, name, js_level, react_level, rating) in students {
        let mut student = StudentRecord {
            id: StudentId(id.to_string()),
            name: name.to_string(),
            trainer: trainer.clone(),
            batch: "2026A".to_string(),
            program: "fullstack".to_string(),
            profile_approval: ProfileApprovalStatus::Approved,
            skills: vec![
                SkillEntry {
                    name: "JavaScript".to_string(),
                    level: js_level,
                    tags: vec!["web".to_string()],
                },
                SkillEntry {
                    name: "React".to_string(),
                    level: react_level,
                    tags: vec!["web".to_string()],
                },
            ],
            tests: Vec::new(),
            trainer_remarks: Vec::new(),
            aggregate_score: 0,
            placement_status: PlacementStatus::Approved,
            placement_eligible: false,
            placement_admin_remarks: None,
            placement_reviewed_at: None,
        };
        student.record_test(TestEntry {
            title: "Weekly assessment".to_string(),
            taken_on: today - Duration::days(7),
            score: f64::from(js_level),
            max_score: 100.0,
            subject_breakdown: Default::default(),
        });
        student.record_trainer_remark(TrainerRemark {
            trainer: trainer.clone(),
            noted_on: today - Duration::days(3),
            remark: "consistent progress".to_string(),
            rating,
        });
        store.seed_student(student).expect("demo seed");

        store
            .seed_evaluation(EvaluationRecord {
                student: StudentId(id.to_string()),
                trainer: trainer.clone(),
                kind: "monthly".to_string(),
                period_start: NaiveDate::from_ymd_opt(2026, 7, 1),
                period_end: NaiveDate::from_ymd_opt(2026, 7, 31),
                score: f64::from(js_level),
                max_score: 100.0,
                recorded_at: None,
                created_at: Some(Utc::now()),
            })
            .expect("demo seed");
    }

    store
        .seed_job(JobRecord {
            id: JobId("job-frontend-01".to_string()),
            title: "Frontend Engineer".to_string(),
            company: "Orbital Labs".to_string(),
            required_skills: vec![
                SkillRequirement {
                    name: "JavaScript".to_string(),
                    min_level: 70,
                },
                SkillRequirement {
                    name: "React".to_string(),
                    min_level: 60,
                },
            ],
            min_aggregate_score: 40,
            eligible_batches: Vec::new(),
            eligible_programs: Vec::new(),
            applicants: Vec::new(),
            status: JobStatus::Open,
            deadline: Some(today + Duration::days(30)),
        })
        .expect("demo seed");

    store
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
