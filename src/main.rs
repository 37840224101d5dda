use anyhow::Context;
use clap::{Parser, Subcommand};
use gridpage::{CompileOptions, LayoutRequest, MergePolicy};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gridpage", version, about = "Compile grid layouts into fixed-resolution HTML pages")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct CompileArgs {
    /// How repeated cell keys are merged: `hull` or `contiguous`
    #[arg(long, default_value = "hull")]
    merge_policy: MergePolicy,
    /// Document title
    #[arg(long)]
    title: Option<String>,
}

impl CompileArgs {
    fn options(&self) -> CompileOptions {
        let mut options = CompileOptions { merge_policy: self.merge_policy, ..Default::default() };
        if let Some(t) = &self.title {
            options.title = t.clone();
        }
        options
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    #[cfg(feature = "server")]
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: String,
        /// Directory for stored pages
        #[arg(long, default_value = "pages", conflicts_with = "memory")]
        data_dir: PathBuf,
        /// Keep pages in memory only
        #[arg(long)]
        memory: bool,
        /// Worker threads (defaults to the CPU count)
        #[arg(long)]
        workers: Option<usize>,
        #[arg(long, default_value_t = 1024 * 1024)]
        max_body_bytes: usize,
        #[command(flatten)]
        compile: CompileArgs,
    },
    /// Compile a JSON payload file and print or write the HTML
    Compile {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        compile: CompileArgs,
    },
}

fn run_compile(input: PathBuf, output: Option<PathBuf>, args: &CompileArgs) -> anyhow::Result<()> {
    let body = std::fs::read_to_string(&input).with_context(|| format!("reading {}", input.display()))?;
    let request = LayoutRequest::from_json(&body)?;
    let doc = gridpage::compile(&request, &args.options())?;
    log::info!("compiled {} elements from {}", doc.placements.len(), input.display());
    match output {
        Some(path) => std::fs::write(&path, &doc.html).with_context(|| format!("writing {}", path.display()))?,
        None => print!("{}", doc.html),
    }
    Ok(())
}

#[cfg(feature = "server")]
fn run_server(config: gridpage::ServerConfig) -> anyhow::Result<()> {
    use gridpage::server::{App, HttpServer};
    use std::sync::Arc;

    config.validate()?;
    let store = config.storage.open().context("opening page store")?;
    let app = App::new(&config, store, Arc::new(gridpage::ids::UuidGenerator));
    let server = HttpServer::bind(&config, app)?;
    server.run()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        #[cfg(feature = "server")]
        Command::Serve { addr, data_dir, memory, workers, max_body_bytes, compile } => {
            let storage = if memory {
                gridpage::StorageBackend::Memory
            } else {
                gridpage::StorageBackend::Filesystem(data_dir)
            };
            run_server(gridpage::ServerConfig {
                addr,
                workers,
                max_body_bytes,
                storage,
                compile: compile.options(),
            })
        }
        Command::Compile { input, output, compile } => run_compile(input, output, &compile),
    }
}
