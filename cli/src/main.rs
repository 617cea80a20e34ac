//! pdfshape CLI - render PDF span layouts to text, HTML, Markdown, DOCX and JSON

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfshape::analysis::{Analysis, AnalysisOptions, Analyzer};
use pdfshape::render::{self, DocxRenderer, HtmlRenderer, JsonFormat, RenderOptions, Renderer};
use pdfshape::{layouts_from_file, ConvertOptions, Converter, LayoutMode, OutputFormat, PageLayout};

#[derive(Parser)]
#[command(name = "pdfshape")]
#[command(version)]
#[command(about = "Rebuild document structure from PDF span layouts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that analyzes a layout file.
#[derive(clap::Args)]
struct AnalysisArgs {
    /// JSON file with analysis option overrides
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Analyze pages on one thread
    #[arg(long)]
    sequential: bool,

    /// Layout mode
    #[arg(long, value_enum, default_value = "preserve")]
    mode: Mode,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a layout file to several formats at once
    Convert {
        /// Input layout JSON file
        #[arg(value_name = "LAYOUT")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Comma-separated formats (txt, html, md, docx, json)
        #[arg(short, long, value_delimiter = ',', default_value = "txt,html,md,docx")]
        formats: Vec<String>,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Convert to Markdown
    #[command(alias = "md")]
    Markdown {
        /// Input layout JSON file
        #[arg(value_name = "LAYOUT")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Do not escape Markdown characters
        #[arg(long)]
        no_escape: bool,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Convert to plain text
    #[command(alias = "txt")]
    Text {
        /// Input layout JSON file
        #[arg(value_name = "LAYOUT")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Table cell delimiter
        #[arg(long, default_value = "\t")]
        delimiter: String,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Convert to a standalone HTML page
    Html {
        /// Input layout JSON file
        #[arg(value_name = "LAYOUT")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Page title
        #[arg(long)]
        title: Option<String>,

        /// Leave out the embedded stylesheet
        #[arg(long)]
        no_style: bool,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Convert to a Word document
    Docx {
        /// Input layout JSON file
        #[arg(value_name = "LAYOUT")]
        input: PathBuf,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Dump the reconstructed document as JSON
    Json {
        /// Input layout JSON file
        #[arg(value_name = "LAYOUT")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Show document information
    Info {
        /// Input layout JSON file
        #[arg(value_name = "LAYOUT")]
        input: PathBuf,

        /// JSON file with analysis option overrides
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Keep headings, lists, tables and alignment
    Preserve,
    /// Flatten all text into one paragraph
    Clean,
}

impl From<Mode> for LayoutMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Preserve => LayoutMode::Preserve,
            Mode::Clean => LayoutMode::Clean,
        }
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            formats,
            analysis,
        } => cmd_convert(&input, output.as_deref(), &formats, &analysis),
        Commands::Markdown {
            input,
            output,
            no_escape,
            analysis,
        } => {
            let options = RenderOptions::new().with_escape(!no_escape);
            cmd_single(&input, output.as_deref(), &analysis, |doc| {
                Ok(render::to_markdown(doc, &options)?.into_bytes())
            })
        }
        Commands::Text {
            input,
            output,
            delimiter,
            analysis,
        } => {
            let options = RenderOptions::new().with_table_delimiter(delimiter);
            cmd_single(&input, output.as_deref(), &analysis, |doc| {
                Ok(render::to_text(doc, &options)?.into_bytes())
            })
        }
        Commands::Html {
            input,
            output,
            title,
            no_style,
            analysis,
        } => {
            let mut options = RenderOptions::new().with_stylesheet(!no_style);
            if let Some(title) = title {
                options = options.with_html_title(title);
            }
            cmd_single(&input, output.as_deref(), &analysis, |doc| {
                Ok(HtmlRenderer::new(options.clone()).render(doc)?)
            })
        }
        Commands::Docx {
            input,
            output,
            analysis,
        } => cmd_single(&input, Some(output.as_path()), &analysis, |doc| {
            Ok(DocxRenderer::new().render(doc)?)
        }),
        Commands::Json {
            input,
            output,
            compact,
            analysis,
        } => {
            let format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            cmd_single(&input, output.as_deref(), &analysis, |doc| {
                Ok(render::to_json(doc, format)?.into_bytes())
            })
        }
        Commands::Info {
            input,
            config,
            json,
        } => cmd_info(&input, config.as_deref(), json),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_analysis_options(
    config: Option<&Path>,
    sequential: bool,
) -> Result<AnalysisOptions, Box<dyn std::error::Error>> {
    let options = match config {
        Some(path) => AnalysisOptions::from_json(&fs::read_to_string(path)?)?,
        None => AnalysisOptions::default(),
    };
    Ok(if sequential { options.sequential() } else { options })
}

fn report_page_errors(errors: &[pdfshape::Error]) {
    for error in errors {
        eprintln!("{}: {}", "Warning".yellow().bold(), error);
    }
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    formats: &[String],
    args: &AnalysisArgs,
) -> CliResult {
    let formats = formats
        .iter()
        .map(|f| f.parse::<OutputFormat>())
        .collect::<Result<Vec<_>, _>>()?;

    let stem = input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(format!("{}_output", stem)));
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(formats.len() as u64 + 2);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Reading layout...");
    let pages = layouts_from_file(input)?;
    log::debug!("loaded {} pages from {}", pages.len(), input.display());
    pb.inc(1);

    pb.set_message("Analyzing pages...");
    let options = ConvertOptions::new()
        .with_analysis_options(load_analysis_options(args.config.as_deref(), args.sequential)?)
        .with_formats(formats)
        .with_layout_mode(args.mode.into())
        .with_name(stem);
    let result = Converter::new(options).convert(&pages)?;
    pb.inc(1);

    let mut written = Vec::new();
    for (format, rendered) in &result.outputs {
        pb.set_message(format!("Writing {}...", format));
        match rendered {
            Ok(doc) => {
                fs::write(output_dir.join(&doc.file_name), &doc.bytes)?;
                written.push(doc.file_name.clone());
            }
            Err(e) => pb.println(format!("{} {}: {}", "Failed".red().bold(), format, e)),
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    report_page_errors(&result.page_errors);

    println!("\n{} {}", "Output files in".green().bold(), output_dir.display());
    for (i, name) in written.iter().enumerate() {
        let branch = if i + 1 == written.len() { "└─" } else { "├─" };
        println!("  {} {}", branch.dimmed(), name);
    }

    Ok(())
}

fn cmd_single<F>(input: &Path, output: Option<&Path>, args: &AnalysisArgs, render_fn: F) -> CliResult
where
    F: FnOnce(&pdfshape::Document) -> Result<Vec<u8>, Box<dyn std::error::Error>>,
{
    let pages = layouts_from_file(input)?;
    let analysis = analyze(&pages, args.config.as_deref(), args.sequential)?;
    report_page_errors(&analysis.page_errors);

    let document = match LayoutMode::from(args.mode) {
        LayoutMode::Preserve => analysis.document,
        LayoutMode::Clean => analysis.document.flattened(),
    };
    let bytes = render_fn(&document)?;

    if let Some(path) = output {
        fs::write(path, &bytes)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", String::from_utf8_lossy(&bytes));
    }

    Ok(())
}

fn analyze(
    pages: &[PageLayout],
    config: Option<&Path>,
    sequential: bool,
) -> Result<Analysis, Box<dyn std::error::Error>> {
    let options = load_analysis_options(config, sequential)?;
    Ok(Analyzer::new(options).analyze(pages)?)
}

fn cmd_info(input: &Path, config: Option<&Path>, json: bool) -> CliResult {
    let pages = layouts_from_file(input)?;
    let analysis = analyze(&pages, config, false)?;
    let doc = &analysis.document;
    let (headings, paragraphs, lists, tables) = doc.block_counts();
    let words = doc.plain_text().split_whitespace().count();

    if json {
        let summary = serde_json::json!({
            "file": input.display().to_string(),
            "pages": doc.metadata.page_count,
            "title": doc.title(),
            "lines": analysis.line_count,
            "body_size": analysis.profile.body_size,
            "heading_styles": analysis.profile.heading_styles.len(),
            "font_sizes": analysis
                .profile
                .font_sizes()
                .iter()
                .map(|(size, lines)| serde_json::json!({ "size": size, "lines": lines }))
                .collect::<Vec<_>>(),
            "headings": headings,
            "paragraphs": paragraphs,
            "lists": lists,
            "tables": tables,
            "words": words,
            "page_errors": analysis
                .page_errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), doc.metadata.page_count);
    if let Some(title) = doc.title() {
        println!("{}: {}", "Title".bold(), title);
    }
    println!("{}: {}", "Lines".bold(), analysis.line_count);
    println!("{}: {:.1}pt", "Body size".bold(), analysis.profile.body_size);
    println!(
        "{}: {}",
        "Heading styles".bold(),
        analysis.profile.heading_styles.len()
    );

    let sizes = analysis
        .profile
        .font_sizes()
        .iter()
        .rev()
        .map(|(size, lines)| format!("{size:.1}pt ×{lines}"))
        .collect::<Vec<_>>();
    println!("{}: {}", "Font sizes".bold(), sizes.join(", "));

    println!();
    println!("{}", "Structure".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Headings".bold(), headings);
    println!("{}: {}", "Paragraphs".bold(), paragraphs);
    println!("{}: {}", "Lists".bold(), lists);
    println!("{}: {}", "Tables".bold(), tables);

    println!("{}: {}", "Words".bold(), words);

    if !analysis.page_errors.is_empty() {
        println!();
        println!("{}", "Page Errors".yellow().bold());
        println!("{}", "─".repeat(40).dimmed());
        for error in &analysis.page_errors {
            println!("  {}", error);
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfshape".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF layout reconstruction tool");
    println!();
    println!("License: MIT");
}
