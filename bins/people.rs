use std::process::ExitCode;

use configs::AppConfig;
use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

const SERVICE: &str = "people";

fn main() -> ExitCode {
    // 提前加载 .env，使得 RUST_LOG / DATABASE_URL 等环境变量生效
    dotenv().ok();

    let cfg = match AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = SERVICE, event = "config_invalid", error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    common::utils::logging::init_logging_with_format(&cfg.logging.format);

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    // Panic 钩子：捕获异常并输出错误日志
    std::panic::set_hook(Box::new(move |info| {
        error!(service = SERVICE, event = "panic", %service_id, pid, message = %info, "unhandled panic occurred");
    }));

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = SERVICE, event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = SERVICE,
        event = "start",
        %service_id,
        pid,
        version,
        threads = cfg.server.worker_threads.unwrap_or_default(),
        "people service starting"
    );

    // run_people returns after Ctrl+C once in-flight requests have finished
    match rt.block_on(server::run_people(cfg)) {
        Ok(()) => {
            info!(service = SERVICE, event = "stop", %service_id, pid, "people service stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = SERVICE, event = "run_failed", error = %e, "people service failed");
            ExitCode::FAILURE
        }
    }
}
