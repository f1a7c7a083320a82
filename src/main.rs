use anyhow::{Context, Result};
use chartseries::parser::{parse_filter, parse_sort};
use chartseries::{ChartConfig, ChartKind, DataFormat, Dataset};
use clap::Parser;
use log::{debug, info, warn};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chartseries")]
#[command(about = "Turn tabular rows into chart series JSON", long_about = None)]
struct Args {
    /// Chart config JSON: {"type": ..., "binding": {...}, "options": {...}}
    #[arg(short, long)]
    config: PathBuf,

    /// Override the chart type from the config
    #[arg(short = 't', long = "type", value_enum)]
    kind: Option<ChartKind>,

    /// Dataset file (reads stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Dataset format (guessed from the input extension, else json)
    #[arg(short, long, value_enum)]
    format: Option<DataFormat>,

    /// Extra filter, e.g. 'units >= 10' (repeatable)
    #[arg(long = "filter")]
    filters: Vec<String>,

    /// Extra sort key, e.g. 'units:desc' (repeatable)
    #[arg(long = "sort")]
    sorts: Vec<String>,

    /// Palette override, e.g. '#000,#fff'
    #[arg(long, value_delimiter = ',')]
    palette: Vec<String>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = ChartConfig::from_path(&args.config)?;
    if let Some(kind) = args.kind {
        config.kind = kind;
    }
    for expr in &args.filters {
        config.options.filters.push(parse_filter(expr)?);
    }
    for expr in &args.sorts {
        config.options.sort.push(parse_sort(expr)?);
    }
    if !args.palette.is_empty() {
        config.options.palette = Some(args.palette.clone());
    }
    debug!("Chart config: {:?}", config);

    for role in config.unused_roles() {
        warn!("Role '{}' is not used by {:?} charts", role, config.kind);
    }

    let dataset = read_dataset(&args).context("Failed to read dataset")?;
    info!("Loaded {} rows", dataset.len());

    let output = config.build(&dataset.rows);
    if output.is_empty() {
        warn!("Chart is empty; check the binding against the dataset fields");
    }
    info!("Built {} series", output.datasets().len());

    let json = if args.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .context("Failed to serialize chart")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", json).context("Failed to write chart to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}

fn read_dataset(args: &Args) -> Result<Dataset> {
    let guessed = args.input.as_deref().and_then(DataFormat::from_path);
    let format = args.format.or(guessed).unwrap_or_default();
    debug!("Dataset format: {:?}", format);

    match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Dataset::from_reader(BufReader::new(file), format)
        }
        None => Dataset::from_reader(io::stdin().lock(), format),
    }
}
