//! Terminal plumbing shared by the `xbl-token-gen` and `xbl-follow` binaries.

// std
use std::io::{self, BufRead, Write};
// crates.io
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
// self
use crate::{
	flows::{AuthorizationCodeSource, AuthorizationRequest, CodeFuture},
	obs::{self, FlowKind},
};

/// Installs the error report hook and a `fmt` subscriber filtered by `LOG_LEVEL`/`RUST_LOG`.
pub fn init() -> color_eyre::Result<()> {
	color_eyre::install()?;

	tracing_subscriber::registry()
		.with(
			EnvFilter::try_from_env("LOG_LEVEL")
				.or_else(|_| EnvFilter::try_from_default_env())
				.unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.with(tracing_subscriber::fmt::layer())
		.try_init()?;

	Ok(())
}

/// Prints `message` and reads one trimmed line from stdin.
pub fn prompt(message: &str) -> io::Result<String> {
	print!("{message}: ");

	io::stdout().flush()?;

	let mut input = String::new();

	io::stdin().lock().read_line(&mut input)?;

	Ok(input.trim().to_owned())
}

/// Code source that asks the operator to sign in and paste the redirect URL.
#[derive(Clone, Copy, Debug, Default)]
pub struct PromptCodeSource;
impl AuthorizationCodeSource for PromptCodeSource {
	fn produce_authorization_code<'a>(
		&'a self,
		request: &'a AuthorizationRequest,
	) -> CodeFuture<'a> {
		Box::pin(async move {
			println!("\nOpen this URL and sign in:\n{}\n", request.authorize_url);

			let pasted = tokio::task::spawn_blocking(|| {
				prompt("Paste the full URL you were redirected to (blank to skip)")
			})
			.await;
			let pasted = match pasted {
				Ok(Ok(line)) if !line.is_empty() => line,
				Ok(Ok(_)) => return None,
				Ok(Err(e)) => {
					obs::notice(FlowKind::Generate, &format_args!("Failed to read input: {e}"));

					return None;
				},
				Err(e) => {
					obs::notice(FlowKind::Generate, &format_args!("Prompt task failed: {e}"));

					return None;
				},
			};

			match request.parse_redirect(&pasted) {
				Ok(code) => Some(code),
				Err(e) => {
					obs::notice(FlowKind::Generate, &e);

					None
				},
			}
		})
	}
}
