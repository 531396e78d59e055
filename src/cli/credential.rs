//! Credential entry
//!
//! Nothing else starts until an API key has been entered. Keys typed at the
//! prompt are echoed as `*`.

use crate::config::{Credential, API_KEY_ENV};
use crate::error::{Result, SqlChatError};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{self, BufRead, IsTerminal, Write};

/// Shown whenever the prompt is submitted blank
pub const CREDENTIAL_REQUIRED: &str = "Please enter your OpenAI API key to proceed.";

const PROMPT: &str = "OpenAI API key: ";

/// Return the pre-seeded credential, or prompt until one is entered
///
/// Fails with [`SqlChatError::CredentialMissing`] if input ends first.
pub fn obtain_credential(preset: Option<Credential>) -> Result<Credential> {
    if let Some(credential) = preset {
        println!("Using OpenAI API key from {} ({})", API_KEY_ENV, credential.masked());
        return Ok(credential);
    }

    println!("{}", CREDENTIAL_REQUIRED);
    loop {
        let Some(input) = read_secret(PROMPT)? else {
            return Err(SqlChatError::CredentialMissing);
        };
        match Credential::new(input) {
            Ok(credential) => return Ok(credential),
            Err(SqlChatError::CredentialMissing) => println!("{}", CREDENTIAL_REQUIRED),
            Err(e) => return Err(e),
        }
    }
}

/// Read one line without echoing it; `None` on end of input
fn read_secret(label: &str) -> io::Result<Option<String>> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", label)?;
    stdout.flush()?;

    if !io::stdin().is_terminal() {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        println!();
        return Ok((read > 0).then_some(line));
    }

    terminal::enable_raw_mode()?;
    let result = read_masked(&mut stdout);
    terminal::disable_raw_mode()?;
    write!(stdout, "\r\n")?;
    stdout.flush()?;
    result
}

fn read_masked(out: &mut impl Write) -> io::Result<Option<String>> {
    let mut secret = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match edit_for(key) {
            MaskedEdit::Push(c) => {
                secret.push(c);
                write!(out, "*")?;
            }
            MaskedEdit::Pop => {
                if secret.pop().is_some() {
                    write!(out, "\u{8} \u{8}")?;
                }
            }
            MaskedEdit::Submit => return Ok(Some(secret)),
            MaskedEdit::Abort => return Ok(None),
            MaskedEdit::Ignore => {}
        }
        out.flush()?;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MaskedEdit {
    Push(char),
    Pop,
    Submit,
    Abort,
    Ignore,
}

fn edit_for(key: KeyEvent) -> MaskedEdit {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('d') if ctrl => MaskedEdit::Abort,
        KeyCode::Char(_) if ctrl => MaskedEdit::Ignore,
        KeyCode::Char(c) => MaskedEdit::Push(c),
        KeyCode::Backspace => MaskedEdit::Pop,
        KeyCode::Enter => MaskedEdit::Submit,
        KeyCode::Esc => MaskedEdit::Abort,
        _ => MaskedEdit::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_masked_edits() {
        assert_eq!(edit_for(key(KeyCode::Char('s'))), MaskedEdit::Push('s'));
        assert_eq!(edit_for(key(KeyCode::Backspace)), MaskedEdit::Pop);
        assert_eq!(edit_for(key(KeyCode::Enter)), MaskedEdit::Submit);
        assert_eq!(edit_for(key(KeyCode::Esc)), MaskedEdit::Abort);
        assert_eq!(edit_for(key(KeyCode::Left)), MaskedEdit::Ignore);
        assert_eq!(
            edit_for(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            MaskedEdit::Abort
        );
        assert_eq!(
            edit_for(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)),
            MaskedEdit::Ignore
        );
    }

    #[test]
    fn test_preset_credential_skips_prompt() {
        let preset = Credential::new("sk-test-1234567890").unwrap();
        let credential = obtain_credential(Some(preset.clone())).unwrap();
        assert_eq!(credential, preset);
    }
}
