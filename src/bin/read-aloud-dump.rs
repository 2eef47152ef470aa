use std::process::ExitCode;

use clap::Parser;
use readaloud::{ContentTree, ReadAloudModel, SegmentationContext};
use serde::Serialize;

/// Dump the speakable units of an HTML file
#[derive(Parser, Debug)]
#[command(name = "read-aloud-dump")]
#[command(about = "Prints the units the read-aloud model produces for an HTML file")]
struct Args {
    /// HTML file to read
    file: String,

    /// Emit one JSON array instead of text lines
    #[arg(short, long)]
    json: bool,

    /// Also list the word ranges of every unit
    #[arg(short, long)]
    words: bool,
}

#[derive(Serialize)]
struct UnitInfo {
    index: usize,
    start: usize,
    text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    words: Vec<String>,
}

fn collect_units(model: &mut ReadAloudModel, with_words: bool) -> Vec<UnitInfo> {
    let mut units = Vec::new();
    while let Some(range) = model.current_unit_range() {
        let text = model.current_text_content();
        let words = if with_words { unit_words(model, &text) } else { Vec::new() };
        units.push(UnitInfo {
            index: units.len(),
            start: range.start,
            text,
            words,
        });
        model.move_speech_forward();
    }
    units
}

fn unit_words(model: &ReadAloudModel, text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut index = 0;
    while let Some(range) = model.highlight_range_for_index(index, false) {
        words.push(text.chars().skip(range.start).take(range.len()).collect());
        index = range.end;
    }
    words
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut ctx = SegmentationContext::new();
    let tree = match ContentTree::read_html_file(&args.file, &mut ctx.node_store) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("Error reading {}: {}", args.file, e);
            return ExitCode::FAILURE;
        }
    };

    let mut model = ReadAloudModel::new();
    model.init(tree.document(), &ctx.node_store, tree.root());
    let units = collect_units(&mut model, args.words);

    if args.json {
        match serde_json::to_string_pretty(&units) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    for unit in &units {
        println!("[{:>3}] @{:<6} {:?}", unit.index, unit.start, unit.text);
        for word in &unit.words {
            println!("        {word:?}");
        }
    }
    println!("{} units", units.len());
    ExitCode::SUCCESS
}
