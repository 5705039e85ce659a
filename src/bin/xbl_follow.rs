//! Follows one gamertag with every stored session token, one token at a time.

// crates.io
use color_eyre::Result;
// self
use xbl_follow::{
	cli,
	flows::{self, BatchNotice, BatchOptions, BatchReport, Broker},
	provider::ProviderDescriptor,
	store::FileStore,
};

#[tokio::main]
async fn main() -> Result<()> {
	cli::init()?;

	println!("Xbox Live follow driver\n");

	let store = FileStore::from_env();
	let tokens = match flows::load_tokens(&store).await {
		Ok(tokens) => tokens,
		Err(notice) => {
			if notice == BatchNotice::NoTokens {
				println!("No valid tokens found in {}.", store.path().display());
				println!("Run `xbl-token-gen` first to create tokens.");
			}

			println!("\n{}", BatchReport::aborted("", notice));

			return Ok(());
		},
	};

	let handle = cli::prompt("Enter the gamertag to follow")?;
	let broker = Broker::new(ProviderDescriptor::xbox_live()?)?;

	println!("\nFound {} token(s). Starting follow pass...\n", tokens.len());

	let report = broker.run_batch(&handle, &tokens, &BatchOptions::default()).await;

	for record in &report.records {
		println!("{record}");
	}

	println!("\n{report}");

	Ok(())
}
