use anyhow::Result;
use clap::Parser;

use jsx_editor_server::config::{Args, Config};
use jsx_editor_server::rpc::server::serve;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .parse_filters(&args.log_level)
        .init();

    let config = Config::from_args(args)?;
    serve(config).await
}
