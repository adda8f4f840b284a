use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use log::warn;
use rand::SeedableRng;
use rand::rngs::StdRng;

use rs_para_core::model::engine::ParaphraseVariation;
use rs_para_core::model::paraphraser::Paraphraser;

mod args;

use args::{Args, Command};

fn main() -> ExitCode {
	let args = Args::parse();
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter())).init();

	match run(&args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			eprintln!("Error: {e}");
			ExitCode::FAILURE
		}
	}
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
	let config = args.to_config()?;
	let (mut paraphraser, warnings) = Paraphraser::new(&config);
	for warning in warnings {
		warn!("{warning}");
		eprintln!("Warning: {warning}");
	}

	match &args.command {
		Command::Paraphrase { text, variations, seed } => {
			if text.trim().is_empty() {
				return Err("Please enter some text to paraphrase".into());
			}
			let count = usize::from(*variations);
			let results = match seed {
				Some(seed) => paraphraser.paraphrase_with(text, count, &mut StdRng::seed_from_u64(*seed))?,
				None => paraphraser.paraphrase(text, count)?,
			};
			for (i, variation) in results.iter().enumerate() {
				print_variation(i + 1, variation);
			}
		}
		Command::Learn { path } => {
			let report = if path.is_dir() {
				paraphraser.learn_from_folder(path)?
			} else {
				paraphraser.learn_from_file(path)?
			};
			println!(
				"Successfully learned {} new synonyms out of {} total words",
				report.new_pairs_added, report.total_pairs_seen
			);
			if !paraphraser.newly_added().is_empty() {
				println!("{}", serde_json::to_string_pretty(paraphraser.newly_added())?);
			}
		}
		Command::Show => {
			println!("{}", serde_json::to_string_pretty(paraphraser.knowledge())?);
		}
		Command::Export { path } => {
			paraphraser.export_knowledge(path)?;
			println!("Knowledge exported to {}", file_name(path));
		}
	}

	Ok(())
}

/// Prints a variation with changed tokens in brackets, then its changes.
fn print_variation(index: usize, variation: &ParaphraseVariation) {
	let highlighted: Vec<String> = variation
		.tokens()
		.iter()
		.enumerate()
		.map(|(position, token)| match variation.change_at(position) {
			Some(_) => format!("[{token}]"),
			None => token.clone(),
		})
		.collect();

	println!("Variation {index}: {}", highlighted.join(" "));
	if variation.changes().is_empty() {
		println!("  No words were changed in this variation.");
	}
	for change in variation.changes() {
		println!(
			"  {} -> {} (position {}, {:?})",
			change.original, change.replacement, change.position, change.provenance
		);
	}
}

fn file_name(path: &Path) -> String {
	path.file_name()
		.map(|name| name.to_string_lossy().to_string())
		.unwrap_or_else(|| path.display().to_string())
}
