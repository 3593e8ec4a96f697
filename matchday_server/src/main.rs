use dotenvy::dotenv;
use log::{error, info};
use matchday_server::{cli::handle_command_line_args, config::ServerConfig, server::run_server};

#[actix_web::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    if handle_command_line_args() {
        return;
    }
    let config = ServerConfig::from_env_or_default();
    info!("🚀️ Matchday server starting on {}:{}", config.host, config.port);
    if let Err(e) = run_server(config).await {
        error!("🚀️ Server stopped with an error. {e}");
        std::process::exit(1);
    }
    info!("🚀️ Server has shut down. Bye!");
}
