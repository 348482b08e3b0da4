use pnl_report::{
    init_logging, log_app_bind, log_app_start, logging_config_from_env, report_config_from_env,
    report_router, server_config_from_env, ReportCache,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_cfg = logging_config_from_env();
    init_logging(&logging_cfg)?;

    let report_cfg = report_config_from_env()?;
    let server_cfg = server_config_from_env()?;
    log_app_start(&logging_cfg, &report_cfg, &server_cfg);

    let cache = ReportCache::with_capacity(report_cfg, server_cfg.cache_capacity);
    let app = report_router(cache, &server_cfg);
    let listener = tokio::net::TcpListener::bind(server_cfg.bind_addr).await?;
    let bound_addr = listener.local_addr()?;

    log_app_bind(bound_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
