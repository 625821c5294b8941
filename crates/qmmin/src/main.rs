use std::path::PathBuf;

use clap::Parser;
use log::{error, info};
use qmmin::{
    Config, ParseError, Parsed, SdfWriter, Transcript, convert, default_output,
    die, max_threads,
};
use rayon::prelude::*;

/// convert the final geometry of a geometry optimization log to an SD file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// optimization transcripts to convert
    #[arg(value_parser, required = true)]
    infiles: Vec<String>,

    /// Write every record to this file, in the order of the inputs. By
    /// default each transcript is written next to itself with an .sdf
    /// extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML file describing the transcript layout. Defaults to Psi4.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the parsed molecules as JSON instead of writing SD files.
    /// Defaults to false.
    #[arg(short, long, default_value_t = false)]
    json: bool,

    /// Set the maximum number of threads to use. Defaults to 0, which means to
    /// use as many threads as there are CPUS.
    #[arg(short, long, default_value_t = 0)]
    threads: usize,
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    )
    .init();
    let args = Args::parse();
    let config = match &args.config {
        Some(file) => Config::load(file).unwrap_or_else(|e| die!("{e}")),
        None => Config::default(),
    };
    max_threads(args.threads);

    let transcript = Transcript::new(&config);
    let results: Vec<Result<Parsed, ParseError>> = args
        .infiles
        .par_iter()
        .map(|infile| convert(&transcript, infile))
        .collect();

    let mut parsed = Vec::with_capacity(results.len());
    let mut failed = false;
    for (infile, res) in args.infiles.iter().zip(results) {
        match res {
            Ok(p) => parsed.push(p),
            Err(e) => {
                error!("failed to parse {infile} with {e}");
                failed = true;
            }
        }
    }
    if failed {
        die!("not writing any records");
    }

    if args.json {
        match serde_json::to_string_pretty(&parsed) {
            Ok(s) => println!("{s}"),
            Err(e) => die!("failed to serialize molecules with {e}"),
        }
        return;
    }

    let writer = SdfWriter::new(config.program_name.as_str());
    let molecules: Vec<_> = parsed.into_iter().map(|p| p.molecule).collect();
    let res = match &args.output {
        Some(out) => writer.write_all(out, &molecules),
        None => args.infiles.iter().zip(&molecules).try_for_each(
            |(infile, mol)| writer.write_file(default_output(infile), mol),
        ),
    };
    if let Err(e) = res {
        die!("failed to write records with {e}");
    }
    info!("done");
}
