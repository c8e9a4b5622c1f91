//! Terminal front end driving a [`StrategySession`].

use std::io;

use anyhow::{Context, Result};
use brainstorm_buddy::flows::StrategyActions;
use brainstorm_buddy::primitives::{RawStrategyForm, SectionKind, StrategyRequest};
use brainstorm_buddy::session::{
    ClipboardWriter, EXPORT_FILE_NAME, Intent, MARKET_SUGGESTIONS, MemoryClipboard, SessionError,
    SessionState, StrategySession,
};
use dialoguer::{Input, Select};
use tracing::warn;

use crate::clipboard::ArboardClipboard;

const NO_MARKET: &str = "(none)";
const OTHER_MARKET: &str = "Other…";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Generate,
    Regenerate,
    CopyAll,
    CopySection,
    Export,
    Quit,
}

impl MenuAction {
    const ALL: [Self; 6] = [
        Self::Generate,
        Self::Regenerate,
        Self::CopyAll,
        Self::CopySection,
        Self::Export,
        Self::Quit,
    ];

    const fn label(self) -> &'static str {
        match self {
            Self::Generate => "Generate strategy",
            Self::Regenerate => "Regenerate",
            Self::CopyAll => "Copy full strategy",
            Self::CopySection => "Copy a section",
            Self::Export => "Export strategy.md",
            Self::Quit => "Quit",
        }
    }

    const fn available(self, state: SessionState) -> bool {
        match self {
            Self::Generate | Self::Quit => true,
            Self::Regenerate | Self::CopyAll | Self::CopySection | Self::Export => {
                matches!(state, SessionState::Success)
            }
        }
    }
}

fn menu(state: SessionState) -> Vec<MenuAction> {
    MenuAction::ALL
        .into_iter()
        .filter(|action| action.available(state))
        .collect()
}

/// Maps a Ctrl-C inside a prompt to `None`.
fn cancellable<T>(result: dialoguer::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(dialoguer::Error::IO(err)) if err.kind() == io::ErrorKind::Interrupted => Ok(None),
        Err(err) => Err(err).context("terminal prompt failed"),
    }
}

fn system_clipboard() -> Box<dyn ClipboardWriter> {
    match ArboardClipboard::new() {
        Ok(clipboard) => Box::new(clipboard),
        Err(err) => {
            warn!(%err, "falling back to an in-memory clipboard");
            Box::new(MemoryClipboard::new())
        }
    }
}

fn prompt_form() -> Result<Option<RawStrategyForm>> {
    let idea = cancellable(
        Input::<String>::new()
            .with_prompt("Startup idea")
            .validate_with(|input: &String| -> Result<(), String> {
                StrategyRequest::validate(&RawStrategyForm::new(input.clone(), None))
                    .map(|_| ())
                    .map_err(|err| err.to_string())
            })
            .interact_text(),
    )?;
    let Some(idea) = idea else {
        return Ok(None);
    };

    let mut items = vec![NO_MARKET];
    items.extend(MARKET_SUGGESTIONS);
    items.push(OTHER_MARKET);

    let Some(choice) = cancellable(
        Select::new()
            .with_prompt("Target market")
            .items(&items)
            .default(0)
            .interact_opt(),
    )?
    .flatten() else {
        return Ok(None);
    };

    let market = match items[choice] {
        NO_MARKET => None,
        OTHER_MARKET => cancellable(
            Input::<String>::new()
                .with_prompt("Market")
                .allow_empty(true)
                .interact_text(),
        )?,
        suggestion => Some(suggestion.to_owned()),
    };

    Ok(Some(RawStrategyForm::new(idea, market)))
}

fn prompt_section() -> Result<Option<SectionKind>> {
    let titles: Vec<&str> = SectionKind::ALL.iter().map(|kind| kind.title()).collect();
    let choice = cancellable(
        Select::new()
            .with_prompt("Section")
            .items(&titles)
            .default(0)
            .interact_opt(),
    )?
    .flatten();
    Ok(choice.map(|index| SectionKind::ALL[index]))
}

async fn generate(
    session: &mut StrategySession,
    actions: &StrategyActions,
    intent: Intent,
    form: &RawStrategyForm,
) -> Result<()> {
    eprintln!("Generating...");
    match session.run(actions, intent, form).await {
        Ok(SessionState::Success) => {
            println!("\n{}\n", session.export_text()?);
        }
        Ok(_) => {
            if let Some(message) = session.error() {
                eprintln!("{message}");
            }
        }
        Err(SessionError::InvalidForm(err)) => eprintln!("{err}"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

pub async fn run(actions: &StrategyActions) -> Result<()> {
    let mut session = StrategySession::new();
    let mut clipboard = system_clipboard();

    loop {
        let actions_menu = menu(session.state());
        let labels: Vec<&str> = actions_menu.iter().map(|action| action.label()).collect();
        let Some(choice) = cancellable(
            Select::new()
                .with_prompt("What next?")
                .items(&labels)
                .default(0)
                .interact_opt(),
        )?
        .flatten() else {
            break;
        };

        match actions_menu[choice] {
            MenuAction::Generate => {
                if let Some(form) = prompt_form()? {
                    generate(&mut session, actions, Intent::Submit, &form).await?;
                }
            }
            MenuAction::Regenerate => {
                if let Some(request) = session.request() {
                    let form = RawStrategyForm::from(request);
                    generate(&mut session, actions, Intent::Regenerate, &form).await?;
                }
            }
            MenuAction::CopyAll => match session.copy_all(clipboard.as_mut()) {
                Ok(notice) => eprintln!("{notice}"),
                Err(err) => eprintln!("{err}"),
            },
            MenuAction::CopySection => {
                if let Some(kind) = prompt_section()? {
                    match session.copy_section(kind, clipboard.as_mut()) {
                        Ok(notice) => eprintln!("{notice}"),
                        Err(err) => eprintln!("{err}"),
                    }
                }
            }
            MenuAction::Export => {
                let document = session.export_text()?;
                tokio::fs::write(EXPORT_FILE_NAME, document)
                    .await
                    .with_context(|| format!("failed to write {EXPORT_FILE_NAME}"))?;
                eprintln!("Saved {EXPORT_FILE_NAME}.");
            }
            MenuAction::Quit => break,
        }
    }

    Ok(())
}
