use clap::Parser;
use env_logger::Env;
use oapp_deploy::command_line::CommandLine;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cmd = CommandLine::parse();
    if let Err(err) = cmd.execute().await {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}
