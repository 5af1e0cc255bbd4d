//! hotspot-csv: normalise and convert hotspot files from the command line.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::fs;
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use clap::{Args, Parser, Subcommand};
    use hotspot_map::config::AppConfig;
    use hotspot_map::format::{
        CsvFormat, ExportOptions, FormatRegistry, FormatWarning, HotspotFormat, ImportResult,
        JsonFormat, QuoteStyle, WarningSeverity,
    };
    use hotspot_map::store::HotspotStore;

    #[derive(Parser)]
    #[command(name = "hotspot-csv", about = "Normalise and convert image map hotspot files")]
    #[command(version)]
    struct Cli {
        /// Enable verbose output
        #[arg(short, long, global = true)]
        verbose: bool,

        /// Configuration file (defaults to the user config directory)
        #[arg(long, global = true)]
        config: Option<PathBuf>,

        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Re-encode a CSV file in the canonical layout
        Normalize(CsvOutArgs),
        /// Convert a CSV file to hotspot JSON
        ToJson(ConvertArgs),
        /// Convert hotspot JSON to CSV
        FromJson(CsvOutArgs),
        /// Convert between formats picked from the file extensions
        Convert(CsvOutArgs),
    }

    #[derive(Args)]
    struct ConvertArgs {
        /// Input file
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep coordinates above 100 as they are instead of rescaling
        #[arg(long)]
        no_rescale: bool,
    }

    #[derive(Args)]
    struct CsvOutArgs {
        #[command(flatten)]
        convert: ConvertArgs,

        /// Decimal places for coordinates (overrides the config)
        #[arg(long)]
        decimals: Option<usize>,

        /// Quote every text field
        #[arg(long)]
        quote_all: bool,
    }

    impl CsvOutArgs {
        fn export_options(&self, config: &AppConfig) -> ExportOptions {
            let mut options = config.csv.export_options();
            if let Some(places) = self.decimals {
                options = options.decimal_places(places);
            }
            if self.quote_all {
                options = options.quote_style(QuoteStyle::NonNumeric);
            }
            options
        }
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();

        // Logging is not up yet, so config problems surface as errors here
        let config = AppConfig::load(cli.config.as_deref()).context("Failed to load config")?;

        let level = if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::from(config.log_level)
        };
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .init();

        match &cli.command {
            Commands::Normalize(args) => {
                let store = import(&CsvFormat, &args.convert, &config)?;
                export(&CsvFormat, &store, args.export_options(&config), &args.convert)
            }
            Commands::ToJson(args) => {
                let store = import(&CsvFormat, args, &config)?;
                export(&JsonFormat, &store, ExportOptions::new().pretty(true), args)
            }
            Commands::FromJson(args) => {
                let store = import(&JsonFormat, &args.convert, &config)?;
                export(&CsvFormat, &store, args.export_options(&config), &args.convert)
            }
            Commands::Convert(args) => {
                let registry = FormatRegistry::new();
                let output = args
                    .convert
                    .output
                    .as_deref()
                    .context("convert needs --output to pick the target format")?;
                let source = format_for(&registry, &args.convert.input)?;
                let target = format_for(&registry, output)?;

                let store = import(source, &args.convert, &config)?;
                let options = args.export_options(&config).pretty(true);
                export(target, &store, options, &args.convert)
            }
        }
    }

    fn format_for<'a>(registry: &'a FormatRegistry, path: &Path) -> Result<&'a dyn HotspotFormat> {
        registry
            .for_path(path)
            .with_context(|| format!("No hotspot format for {}", path.display()))
    }

    fn import(
        format: &dyn HotspotFormat,
        args: &ConvertArgs,
        config: &AppConfig,
    ) -> Result<HotspotStore> {
        let content = fs::read_to_string(&args.input)
            .with_context(|| format!("Failed to read {}", args.input.display()))?;

        let options = config.import_options().rescale(!args.no_rescale);
        let result = format
            .decode(&content, &options)
            .with_context(|| format!("Failed to import {}", args.input.display()))?;
        report_import(&args.input, &result);

        let mut store = HotspotStore::with_default_color(&config.hotspots.default_color);
        store.extend(result.hotspots);
        Ok(store)
    }

    fn report_import(path: &Path, result: &ImportResult) {
        for warning in &result.warnings {
            log_warning(warning);
        }
        if let Some(delimiter) = result.delimiter {
            log::debug!("Delimiter: {:?}", char::from(delimiter));
        }
        if result.rescaled {
            log::info!("Coordinates rescaled to percentages");
        }
        log::info!(
            "Imported {} hotspots from {} ({} rows skipped)",
            result.hotspots.len(),
            path.display(),
            result.skipped_rows
        );
    }

    fn export(
        format: &dyn HotspotFormat,
        store: &HotspotStore,
        options: ExportOptions,
        args: &ConvertArgs,
    ) -> Result<()> {
        let result = format.encode(store.as_slice(), &options)?;
        for warning in &result.warnings {
            log_warning(warning);
        }

        match &args.output {
            Some(path) => {
                fs::write(path, &result.content)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                log::info!(
                    "Wrote {} hotspots to {} as {}",
                    result.hotspots_exported,
                    path.display(),
                    format.display_name()
                );
            }
            None => print!("{}", result.content),
        }
        Ok(())
    }

    fn log_warning(warning: &FormatWarning) {
        let message = match warning.row {
            Some(row) => format!("row {}: {}", row, warning.message),
            None => warning.message.clone(),
        };
        match warning.severity {
            WarningSeverity::Info => log::info!("{}", message),
            WarningSeverity::Warning => log::warn!("{}", message),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    cli::run()
}

// The library is usable from wasm hosts; the CLI is native only
#[cfg(target_arch = "wasm32")]
fn main() {}
