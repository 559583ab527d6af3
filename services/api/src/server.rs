use crate::cli::ServeArgs;
use crate::demo::replay_job_hunt;
use crate::infra::{in_memory_service, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Duration, Utc};
use jobtrackr::config::AppConfig;
use jobtrackr::error::AppError;
use jobtrackr::gamification::UserId;
use jobtrackr::search::{CachedCatalog, CsvCatalogSource};
use jobtrackr::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let (gamification, activity) = in_memory_service();
    if let Some(user) = args.seed_user.take() {
        let start = Utc::now().date_naive() - Duration::days(6);
        let summary = replay_job_hunt(
            &gamification,
            &activity,
            &UserId(user),
            start,
            7,
            |day, action, outcome| {
                debug!(%day, action, points = outcome.points_awarded, "seeded activity");
            },
        )?;
        info!(
            user_id = %summary.user_id,
            total_points = summary.total_points,
            badges = summary.badges.len(),
            "seeded a week of demo activity"
        );
    }

    let catalog = Arc::new(CachedCatalog::new(
        CsvCatalogSource::new(config.search.catalog_path.clone()),
        config.search.cache_ttl,
    ));

    let app = with_service_routes(gamification, catalog)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        catalog = %config.search.catalog_path.display(),
        "jobtrackr api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
