//! JudgeInk command line entry point.

use clap::Parser;
use judgeink_app::Cli;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(judgeink_app::run(cli)) {
        eprintln!("judgeink: {}", e);
        std::process::exit(1);
    }
}
