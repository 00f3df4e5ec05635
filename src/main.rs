use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use sketchgrid::{DrawRequests, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "sketchgrid", version, about = "Render rectangle batches into text drawings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Interface to bind (env: APP_HOST)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (env: APP_PORT)
        #[arg(long, short)]
        port: Option<u16>,
        /// Store drawings as JSON files in this directory (env: SKETCH_DATA_DIR)
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Worker threads (env: SKETCH_WORKERS)
        #[arg(long)]
        workers: Option<usize>,
        /// Accept any single printable character as a symbol, not only ASCII
        #[arg(long)]
        allow_unicode: bool,
    },
    /// Draw a JSON request array from FILE (or stdin) and print the result
    Draw {
        file: Option<PathBuf>,
        /// Accept any single printable character as a symbol, not only ASCII
        #[arg(long)]
        allow_unicode: bool,
    },
}

fn read_input(file: Option<&PathBuf>) -> anyhow::Result<String> {
    let mut input = String::new();
    match file {
        Some(path) => {
            input = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
        }
        None => {
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
        }
    }
    Ok(input)
}

#[cfg(feature = "server")]
fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let service = config.build_service().context("failed to open storage")?;
    let server = sketchgrid::server::Server::bind(&config, service)?;
    log::info!("sketchgrid listening on {}", config.bind_addr());
    server.run()?;
    Ok(())
}

#[cfg(not(feature = "server"))]
fn serve(_config: ServerConfig) -> anyhow::Result<()> {
    anyhow::bail!("sketchgrid was built without the `server` feature")
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            host,
            port,
            data_dir,
            workers,
            allow_unicode,
        } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if data_dir.is_some() {
                config.data_dir = data_dir;
            }
            if let Some(workers) = workers {
                config.workers = workers;
            }
            config.ascii_only = !allow_unicode;
            config.validate()?;
            serve(config)
        }
        Command::Draw {
            file,
            allow_unicode,
        } => {
            let input = read_input(file.as_ref())?;
            let requests = DrawRequests::from_json(&input).context("invalid request array")?;
            let config = ServerConfig {
                ascii_only: !allow_unicode,
                ..ServerConfig::default()
            };
            let service = config.build_service()?;
            println!("{}", service.render(&requests)?);
            Ok(())
        }
    }
}
