//! One-shot generation from the command line.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use brainstorm_buddy::flows::{FlowKind, StrategyActions};
use brainstorm_buddy::primitives::{RawStrategyForm, StrategyRequest};
use brainstorm_buddy::session::{ClipboardWriter, render_full};
use clap::Args;
use tracing::info;

use crate::clipboard::ArboardClipboard;

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Startup idea, 10 to 500 characters.
    #[arg(long, short = 'i')]
    pub idea: String,

    /// Target market, e.g. "FinTech".
    #[arg(long, short = 'm')]
    pub market: Option<String>,

    /// Ask for an alternative, less conventional strategy.
    #[arg(long)]
    pub regenerate: bool,

    /// Write the markdown document to this file.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Copy the markdown document to the system clipboard.
    #[arg(long)]
    pub copy: bool,

    /// Print the raw JSON result instead of markdown.
    #[arg(long)]
    pub json: bool,
}

impl GenerateArgs {
    fn flow(&self) -> FlowKind {
        if self.regenerate {
            FlowKind::Regenerate
        } else {
            FlowKind::Generate
        }
    }

    fn form(&self) -> RawStrategyForm {
        RawStrategyForm::new(self.idea.clone(), self.market.clone())
    }
}

pub async fn run(actions: &StrategyActions, args: GenerateArgs) -> Result<()> {
    let form = args.form();
    // Validate up front so usage errors list every problem.
    let request = StrategyRequest::validate(&form)?;

    let envelope = actions.perform(args.flow(), &form).await;
    let result = match envelope.into_result() {
        Ok(result) => result,
        Err(message) => bail!(message),
    };

    let document = render_full(&request, &result);

    if let Some(path) = &args.output {
        tokio::fs::write(path, &document)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "strategy exported");
    }

    if args.copy {
        let mut clipboard = ArboardClipboard::new()?;
        clipboard.write_text(&document)?;
        eprintln!("Full strategy has been copied.");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{document}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: GenerateArgs,
    }

    #[test]
    fn short_flags_parse() {
        let harness = Harness::parse_from([
            "test",
            "-i",
            "An app for splitting rent",
            "-m",
            "FinTech",
            "--regenerate",
        ]);
        assert_eq!(harness.args.flow(), FlowKind::Regenerate);
        let form = harness.args.form();
        assert_eq!(form.startup_idea.as_deref(), Some("An app for splitting rent"));
        assert_eq!(form.market.as_deref(), Some("FinTech"));
    }

    #[test]
    fn defaults_to_generate() {
        let harness = Harness::parse_from(["test", "--idea", "An app for splitting rent"]);
        assert_eq!(harness.args.flow(), FlowKind::Generate);
        assert!(harness.args.market.is_none());
        assert!(!harness.args.json);
    }
}
