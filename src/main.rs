use std::fs;
use std::io;
use std::process::ExitCode;

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, Command};

use rst2gfm::gfm_writer::GfmWriter;
use rst2gfm::maps::{ReaderMap, WriterMap};
use rst2gfm::native_reader::NativeReader;
use rst2gfm::native_writer::NativeWriter;
use rst2gfm::rst_reader::RstReader;

fn main() -> ExitCode { run() }

fn run() -> ExitCode {
    let mut input_formats = ReaderMap::new();
    input_formats.add("rst", || RstReader);
    input_formats.add("native", || NativeReader);
    let mut output_formats = WriterMap::new();
    output_formats.add("gfm", GfmWriter::new);
    output_formats.add("native", || NativeWriter);
    let matches = Command::new("rst2gfm")
        .about("Convert reStructuredText to GitHub Flavored Markdown")
        .arg(
            Arg::new("from")
                .long("from")
                .short('f')
                .action(ArgAction::Set)
                .default_value("rst")
                .value_parser(PossibleValuesParser::new(input_formats.keys().copied()))
                .value_name("INPUT_FORMAT")
                .ignore_case(true),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .short('t')
                .action(ArgAction::Set)
                .default_value("gfm")
                .value_parser(PossibleValuesParser::new(output_formats.keys().copied()))
                .value_name("OUTPUT_FORMAT")
                .ignore_case(true),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .action(ArgAction::Set)
                .value_name("OUTPUT_FILE"),
        )
        .arg(Arg::new("input").index(1).action(ArgAction::Set).value_name("FILE"))
        .get_matches();
    let content = match matches.get_one::<String>("input") {
        Some(file) => fs::read_to_string(file),
        None => io::read_to_string(io::stdin()),
    };
    let content = match content {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read input:\n{e}");
            return ExitCode::FAILURE;
        },
    };
    let parsed = match input_formats.read(matches.get_one::<String>("from").unwrap(), &content) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Failed to parse input:\n{e}");
            return ExitCode::FAILURE;
        },
    };
    let result = match output_formats.write(matches.get_one::<String>("to").unwrap(), parsed) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to write output:\n{e}");
            return ExitCode::FAILURE;
        },
    };
    match matches.get_one::<String>("output") {
        Some(file) => {
            if let Err(e) = fs::write(file, result) {
                eprintln!("Failed to save file:\n{e}");
                return ExitCode::FAILURE;
            }
        },
        None => print!("{result}"),
    }
    ExitCode::SUCCESS
}
