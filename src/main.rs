use clap::Parser;
use dxf_tools::{parse_string, to_svg};
use std::fs;
use std::path::PathBuf;
use std::process;

/// Convert a DXF drawing to an SVG document.
#[derive(Parser)]
#[command(name = "dxf-tools")]
struct Args {
    /// Input DXF file
    input: PathBuf,
    /// Output SVG file
    output: PathBuf,
}

fn main() {
    let args = Args::parse();

    let dxf_content = match fs::read_to_string(&args.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading input file '{}': {}", args.input.display(), e);
            process::exit(2);
        }
    };

    let drawing = parse_string(&dxf_content);

    let mut warnings = Vec::new();
    let svg = match to_svg(&drawing, &mut warnings) {
        Ok(svg) => svg,
        Err(e) => {
            eprintln!("Error rendering SVG: {}", e);
            process::exit(3);
        }
    };
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }

    match fs::write(&args.output, &svg) {
        Ok(_) => {
            println!(
                "Successfully converted '{}' to '{}'",
                args.input.display(),
                args.output.display()
            );
        }
        Err(e) => {
            eprintln!(
                "Error writing output file '{}': {}",
                args.output.display(),
                e
            );
            process::exit(4);
        }
    }
}
