use clap::Parser;
use jha_browser::app;
use jha_browser::config::Config;

/// Browse, filter and export a JHA workbook in the browser
#[derive(Parser, Debug)]
#[command(name = "jha-browser", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Address the web server listens on
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:3000")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    cli.config.init_logging();

    // Start the web application
    app::run(&cli.config, &cli.bind).await
}
