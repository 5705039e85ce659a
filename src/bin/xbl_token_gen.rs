//! Interactive token generator: signs in `n` times and appends each session token to the store.

// crates.io
use color_eyre::Result;
// self
use xbl_follow::{
	cli::{self, PromptCodeSource},
	flows::{Broker, GenerationOptions, parse_count},
	provider::ProviderDescriptor,
	store::FileStore,
};

#[tokio::main]
async fn main() -> Result<()> {
	cli::init()?;

	println!("Xbox Live token generator\n");

	let count = parse_count(&cli::prompt("How many tokens do you want to generate?")?)?;
	let broker = Broker::new(ProviderDescriptor::xbox_live()?)?;
	let store = FileStore::from_env();
	let report = broker
		.generate(&PromptCodeSource, &store, count, &GenerationOptions::default())
		.await?;

	println!();

	for record in &report.records {
		match &record.failure {
			None => println!("token {}: saved to {}", record.attempt + 1, store.path().display()),
			Some(failure) => println!("token {}: {failure}", record.attempt + 1),
		}
	}

	println!("\n{report}");

	if report.succeeded() > 0 {
		println!("Run `xbl-follow` to use the generated tokens.");
	}

	Ok(())
}
