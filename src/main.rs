use pallet_planner::config::AppConfig;
use pallet_planner::{api, logging};

#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv() {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("⚠️ Could not load .env: {}", err);
        }
    }

    let app_config = AppConfig::from_env();
    if let Err(err) = logging::init(app_config.log_level) {
        eprintln!("⚠️ Could not install logger: {}", err);
    }

    println!("🚀 Pallet planner starting...");
    api::start_api_server(app_config.api, app_config.planner.planner_config()).await;
}
