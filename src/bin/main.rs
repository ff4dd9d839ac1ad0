use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Write};
use std::process;

use clap::{ArgGroup, Parser};
use regex::Regex;
use tracing::error;

use multipart_formdata::{Boundary, Part, PartIterator};

#[derive(Parser)]
#[command(
    name = "multipart-formdata",
    about = "Inspect fully buffered multipart/form-data bodies",
    group(ArgGroup::new("source").required(true))
)]
struct Cli {
    /// Body files to parse (- for stdin, default: stdin)
    files: Vec<String>,

    /// Full Content-Type header value to extract the boundary from
    #[arg(short, long = "content-type", value_name = "VALUE", group = "source")]
    content_type: Option<String>,

    /// Boundary token as it appears in the Content-Type header
    #[arg(short, long, value_name = "TOKEN", group = "source")]
    boundary: Option<String>,

    /// Match field name by regex
    #[arg(short, long, value_name = "REGEX")]
    name: Option<String>,

    /// Match filename by regex (implies file parts only)
    #[arg(short, long, value_name = "REGEX")]
    filename: Option<String>,

    /// Show part metadata only, no payload
    #[arg(long, group = "output_mode")]
    headers: bool,

    /// Show raw payload bytes only
    #[arg(long, group = "output_mode")]
    data: bool,

    /// Show statistics summary
    #[arg(long, group = "output_mode")]
    stats: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

struct CompiledFilters {
    name: Option<Regex>,
    filename: Option<Regex>,
}

impl CompiledFilters {
    fn matches(&self, part: &Part<'_>) -> bool {
        if let Some(ref re) = self.name {
            if !re.is_match(&part.name) {
                return false;
            }
        }

        if let Some(ref re) = self.filename {
            if !re.is_match(&part.filename) {
                return false;
            }
        }

        true
    }
}

fn compile_regex(pattern: &str, label: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => {
            eprintln!("invalid {label} regex '{pattern}': {e}");
            process::exit(2);
        }
    }
}

fn compile_filters(cli: &Cli) -> CompiledFilters {
    CompiledFilters {
        name: cli.name.as_ref().map(|p| compile_regex(p, "name")),
        filename: cli.filename.as_ref().map(|p| compile_regex(p, "filename")),
    }
}

fn make_boundary(cli: &Cli) -> Boundary {
    let result = if let Some(ref header) = cli.content_type {
        Boundary::from_content_type(header)
    } else {
        // The source arg group guarantees one of the two is present.
        Boundary::from_token(cli.boundary.as_deref().unwrap_or_default())
    };
    match result {
        Ok(b) => b,
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    }
}

fn read_body(path: &str) -> Vec<u8> {
    let mut body = Vec::new();
    let result = if path == "-" {
        io::stdin().lock().read_to_end(&mut body)
    } else {
        File::open(path).and_then(|mut f| f.read_to_end(&mut body))
    };
    if let Err(e) = result {
        eprintln!("{path}: {e}");
        process::exit(1);
    }
    body
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn output_summary(part: &Part<'_>) {
    println!("{part}");
}

fn output_headers(part: &Part<'_>) {
    println!("name: {}", part.name);
    if !part.filename.is_empty() {
        println!("filename: {}", part.filename);
    }
    if !part.content_type.is_empty() {
        println!("content-type: {}", part.content_type);
    }
    println!("length: {}", part.data.len());
    println!();
}

fn output_data(part: &Part<'_>) {
    let mut out = io::stdout().lock();
    if out.write_all(part.data).is_ok() && !part.data.ends_with(b"\n") {
        let _ = out.write_all(b"\n");
    }
}

fn run_stats(boundary: &Boundary, body: &[u8], filters: &CompiledFilters) -> bool {
    let mut total: usize = 0;
    let mut matched: usize = 0;
    let mut files: usize = 0;
    let mut fields: usize = 0;
    let mut bytes: usize = 0;
    let mut type_counts: HashMap<String, usize> = HashMap::new();
    let mut failed = false;

    for result in PartIterator::new(boundary, body) {
        match result {
            Ok(part) => {
                total += 1;
                if !filters.matches(&part) {
                    continue;
                }
                matched += 1;
                if part.is_file() {
                    files += 1;
                } else {
                    fields += 1;
                }
                bytes += part.data.len();
                if !part.content_type.is_empty() {
                    *type_counts.entry(part.content_type.clone()).or_default() += 1;
                }
            }
            Err(e) => {
                error!("parse error: {e}");
                failed = true;
            }
        }
    }

    println!("parts: {total}");
    println!("matched: {matched}");
    println!("files: {files}");
    println!("fields: {fields}");
    println!("payload bytes: {bytes}");

    let mut types: Vec<_> = type_counts.into_iter().collect();
    types.sort_by(|a, b| b.1.cmp(&a.1));
    if !types.is_empty() {
        println!("\ncontent types:");
        for (ct, count) in &types {
            println!("  {ct}: {count}");
        }
    }

    failed
}

fn run(cli: &Cli, boundary: &Boundary, body: &[u8], filters: &CompiledFilters) -> bool {
    if cli.stats {
        return run_stats(boundary, body, filters);
    }

    let mut failed = false;
    for result in PartIterator::new(boundary, body) {
        match result {
            Ok(part) => {
                if !filters.matches(&part) {
                    continue;
                }
                if cli.headers {
                    output_headers(&part);
                } else if cli.data {
                    output_data(&part);
                } else {
                    output_summary(&part);
                }
            }
            Err(e) => {
                error!("parse error: {e}");
                failed = true;
            }
        }
    }
    failed
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let boundary = make_boundary(&cli);
    let filters = compile_filters(&cli);

    let files: Vec<String> = if cli.files.is_empty() {
        vec!["-".to_string()]
    } else {
        cli.files.clone()
    };
    let many = files.len() > 1;

    let mut failed = false;
    for path in &files {
        if many {
            println!("== {path} ==");
        }
        let body = read_body(path);
        failed |= run(&cli, &boundary, &body, &filters);
    }

    if failed {
        process::exit(1);
    }
}
