use clap::{arg, command};
use tracing::Level;

use abi::config::Config;

#[tokio::main]
async fn main() {
    // init tracing
    tracing_subscriber::FmtSubscriber::builder()
        .with_line_number(true)
        .with_max_level(Level::DEBUG)
        .init();

    let matches = command!()
        .arg(arg!(-c --config <FILE> "config file path").default_value("./config.yml"))
        .get_matches();
    let path = matches
        .get_one::<String>("config")
        .expect("config path has a default");

    let config = Config::load(path).unwrap();

    if let Err(e) = api::start(config).await {
        panic!("server exited with error: {}", e);
    }
}
