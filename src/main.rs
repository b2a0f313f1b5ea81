// Usage: ecg-monitor [config.json]

use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);

    if let Err(e) = ecg_monitor_lib::run(config_path).await {
        eprintln!("ecg-monitor: {}", e);
        std::process::exit(1);
    }
}
