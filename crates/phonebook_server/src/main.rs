use log::error;
use phonebook_core::init_logging;
use phonebook_server::config::ServerConfig;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.log_level, config.log_target.clone()) {
        eprintln!("logging init failed: {err}");
        return ExitCode::FAILURE;
    }

    match phonebook_server::serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=server status=error error={err}");
            log::logger().flush();
            ExitCode::FAILURE
        }
    }
}
