//! unstream CLI - PDF stream extraction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::error::ErrorKind;
use clap::Parser;
use colored::Colorize;

use unstream::{extract_file, ExtractOptions, ExtractionStatus, ScanLimits, StreamReport};

#[derive(Parser)]
#[command(name = "unstream")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract every stream of a PDF, decoded where possible", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory (default: <FILE>.<SUFFIX>)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Suffix appended to the input path to name the output directory
    #[arg(long, env = "UNSTREAM_SUFFIX", default_value = "unstream_out")]
    suffix: String,

    /// Artifact file name prefix
    #[arg(long, default_value = "pdf")]
    prefix: String,

    /// Artifact file extension
    #[arg(long, default_value = "dat")]
    ext: String,

    /// Maximum nesting depth walked in a stream dictionary
    #[arg(long, default_value_t = 64)]
    max_depth: usize,

    /// Maximum number of values walked in a stream dictionary
    #[arg(long, default_value_t = 10_000)]
    max_nodes: usize,

    /// Write a JSON run report to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Only print errors and the summary
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn extract_options(&self) -> ExtractOptions {
        let mut options = ExtractOptions::new()
            .with_output_suffix(self.suffix.clone())
            .with_artifact_prefix(self.prefix.clone())
            .with_artifact_extension(self.ext.clone())
            .with_scan_limits(
                ScanLimits::new()
                    .with_max_depth(self.max_depth)
                    .with_max_nodes(self.max_nodes),
            );
        if let Some(dir) = &self.output {
            options = options.with_output_dir(dir);
        }
        options
    }
}

fn main() {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(parse_exit_code(&e));
        }
    };

    let Some(input) = cli.input.as_deref() else {
        println!("{}", "input file path required".yellow());
        println!("Usage: unstream <FILE>");
        std::process::exit(1);
    };

    let start = Instant::now();
    println!("Parsing file '{}':", input.display());

    if let Err(e) = cmd_extract(&cli, input) {
        println!();
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }

    println!();
    println!(
        "Execution time: {:.3} sec.",
        start.elapsed().as_secs_f64()
    );
}

/// Help and version requests succeed; every other parse failure exits 1.
fn parse_exit_code(e: &clap::Error) -> i32 {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

fn cmd_extract(cli: &Cli, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let options = cli.extract_options();
    let quiet = cli.quiet;
    let mut print = |report: &StreamReport| {
        if !quiet {
            println!("{}", stream_line(report));
        }
    };

    let summary = extract_file(input, &options, &mut print)?;

    println!(
        "{} {} streams written to {} ({} raw)",
        "Done!".green().bold(),
        summary.stream_count(),
        summary.output_dir.display(),
        summary.fallback_count()
    );

    if let Some(path) = &cli.report {
        fs::write(path, serde_json::to_string_pretty(&summary)?)?;
        println!("{} {}", "Report saved to".green(), path.display());
    }

    Ok(())
}

/// `    Object 7 has stream << ... >> (filter omitted)`
fn stream_line(report: &StreamReport) -> String {
    let mut line = format!(
        "    Object {} has stream {}",
        report.object, report.dictionary
    );
    if let Some(note) = report.status.annotation() {
        let note = match report.status {
            ExtractionStatus::FilterOmitted => note.dimmed(),
            _ => note.yellow(),
        };
        line.push_str(&format!(" {}", note));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use unstream::DecodeLevel;

    fn report(status: ExtractionStatus) -> StreamReport {
        StreamReport {
            object: 3,
            generation: 0,
            level: DecodeLevel::None,
            status,
            used_fallback: status != ExtractionStatus::Decoded,
            bytes: 4,
            artifact: PathBuf::from("out/pdf_0003_0.dat"),
            dictionary: "<< /Filter /DCTDecode >>".to_string(),
        }
    }

    #[test]
    fn test_defaults_map_to_options() {
        let cli = Cli::try_parse_from(["unstream", "doc.pdf"]).unwrap();
        let options = cli.extract_options();

        assert_eq!(cli.input, Some(PathBuf::from("doc.pdf")));
        assert_eq!(options.artifact_name(7), "pdf_0007_0.dat");
        assert_eq!(options.scan_limits, ScanLimits::default());
        assert_eq!(
            options.output_dir_for(Path::new("doc.pdf")),
            PathBuf::from("doc.pdf.unstream_out")
        );
    }

    #[test]
    fn test_flags_map_to_options() {
        let cli = Cli::try_parse_from([
            "unstream",
            "doc.pdf",
            "-o",
            "streams",
            "--prefix",
            "obj",
            "--ext",
            "bin",
            "--max-depth",
            "8",
        ])
        .unwrap();
        let options = cli.extract_options();

        assert_eq!(options.artifact_name(12), "obj_0012_0.bin");
        assert_eq!(options.scan_limits.max_depth, 8);
        assert_eq!(
            options.output_dir_for(Path::new("doc.pdf")),
            PathBuf::from("streams")
        );
    }

    #[test]
    fn test_parse_exit_codes() {
        let exit_code = |args: &[&str]| match Cli::try_parse_from(args) {
            Ok(_) => None,
            Err(e) => Some(parse_exit_code(&e)),
        };

        assert_eq!(exit_code(&["unstream", "a.pdf", "b.pdf"]), Some(1));
        assert_eq!(exit_code(&["unstream", "--bogus", "a.pdf"]), Some(1));
        assert_eq!(exit_code(&["unstream", "a.pdf", "--max-depth", "x"]), Some(1));
        assert_eq!(exit_code(&["unstream", "--help"]), Some(0));
        assert_eq!(exit_code(&["unstream", "--version"]), Some(0));
        assert_eq!(exit_code(&["unstream", "a.pdf"]), None);
    }

    #[test]
    fn test_input_is_optional_for_parsing() {
        let cli = Cli::try_parse_from(["unstream"]).unwrap();
        assert!(cli.input.is_none());
    }

    #[test]
    fn test_stream_line() {
        colored::control::set_override(false);

        assert_eq!(
            stream_line(&report(ExtractionStatus::FilterOmitted)),
            "    Object 3 has stream << /Filter /DCTDecode >> (filter omitted)"
        );
        assert_eq!(
            stream_line(&report(ExtractionStatus::Decoded)),
            "    Object 3 has stream << /Filter /DCTDecode >>"
        );
    }
}
