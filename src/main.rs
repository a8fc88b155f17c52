use clap::{Parser, Subcommand};
use inscribe::{
    BatchBuilder, BatchError, BatchResult, LayoutSet, NameList, StatusEvent, Template,
    write_bundle_file,
};
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

// Rendering allocates many short-lived page buffers across worker threads.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Personalizes a PDF template with a list of guest names.
#[derive(Parser, Debug)]
#[command(name = "inscribe", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Renders one copy of the template per name.
    Generate {
        /// Template PDF.
        #[arg(long)]
        template: PathBuf,
        /// Layouts JSON, one entry per template page.
        #[arg(long)]
        layouts: PathBuf,
        /// Name list: plain text (one per line) or a `.json` array.
        #[arg(long)]
        names: PathBuf,
        /// A `.zip` bundle, or a directory that receives one PDF per name.
        #[arg(long)]
        output: PathBuf,
        /// Render jobs in flight at most.
        #[arg(long)]
        concurrency: Option<usize>,
        /// Extra directory to load fonts from. Repeatable.
        #[arg(long = "font-dir")]
        font_dirs: Vec<PathBuf>,
        /// Do not search installed system fonts.
        #[arg(long)]
        no_system_fonts: bool,
        /// Print status events to stdout as JSON lines.
        #[arg(long)]
        events: bool,
    },
    /// Writes default layouts for every page of a template.
    InitLayouts {
        #[arg(long)]
        template: PathBuf,
        /// Destination file. Printed to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn read_names(path: &Path) -> Result<NameList, BatchError> {
    let source = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let names = if is_json {
        NameList::from_json(&source)?
    } else {
        NameList::parse(&source)?
    };
    Ok(names)
}

fn write_output(result: &BatchResult, output: &Path) -> Result<(), BatchError> {
    let is_zip = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if is_zip {
        write_bundle_file(&result.documents, output)?;
    } else {
        fs::create_dir_all(output)?;
        for document in &result.documents {
            let path = output.join(format!("{}.pdf", document.output_id));
            fs::write(&path, document.to_pdf()?)?;
        }
    }
    info!(
        "Wrote {} documents to {}",
        result.documents.len(),
        output.display()
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn generate(
    template: &Path,
    layouts: &Path,
    names: &Path,
    output: &Path,
    concurrency: Option<usize>,
    font_dirs: Vec<PathBuf>,
    no_system_fonts: bool,
    events: bool,
) -> Result<BatchResult, BatchError> {
    let template_bytes = fs::read(template)?;
    let layouts = LayoutSet::from_json(&fs::read_to_string(layouts)?)?;
    let names = read_names(names)?;

    let mut builder = BatchBuilder::new().with_system_fonts(!no_system_fonts);
    if let Some(concurrency) = concurrency {
        builder = builder.with_concurrency(concurrency);
    }
    for dir in font_dirs {
        builder = builder.with_font_dir(dir);
    }
    let orchestrator = builder.build()?;

    let printer = events.then(|| {
        let subscription = orchestrator.subscribe();
        thread::spawn(move || {
            while let Some(event) = subscription.recv_blocking() {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => error!("Could not serialize status event: {e}"),
                }
                if matches!(event, StatusEvent::BatchComplete { .. }) {
                    break;
                }
            }
        })
    });

    let result = orchestrator.run_blocking(&template_bytes, layouts.as_slice(), names.entries());
    // Closes the event queue so the printer ends even if the batch never started.
    drop(orchestrator);
    if let Some(printer) = printer {
        let _ = printer.join();
    }

    let result = result?;
    write_output(&result, output)?;
    Ok(result)
}

fn init_layouts(template: &Path, output: Option<&Path>) -> Result<(), BatchError> {
    let template = Template::from_file(template)?;
    let json = template.default_layouts().to_json()?;
    match output {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            template,
            layouts,
            names,
            output,
            concurrency,
            font_dirs,
            no_system_fonts,
            events,
        } => match generate(
            &template,
            &layouts,
            &names,
            &output,
            concurrency,
            font_dirs,
            no_system_fonts,
            events,
        ) {
            Ok(result) => {
                for failure in &result.failures {
                    eprintln!(
                        "{} page {}: {}",
                        failure.output_id, failure.page_number, failure.error
                    );
                }
                if result.documents.is_empty() {
                    eprintln!("No document could be generated");
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                }
            }
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        },
        Command::InitLayouts { template, output } => {
            match init_layouts(&template, output.as_deref()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Error: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
