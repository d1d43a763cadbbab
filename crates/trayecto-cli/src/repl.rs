//! Interactive REPL (Read-Eval-Print Loop) mode.
//!
//! One planner session stays open for the whole loop, so the optimistic view
//! and the resolved period and enrollment ids carry over between commands.

use crate::cli::{Cli, Command};
use crate::commands::{self, open_planner, Planner, SessionOptions};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// Run the interactive REPL.
pub async fn run_repl(
    config: &mut Config,
    options: &SessionOptions,
    formatter: &Formatter,
) -> Result<()> {
    println!(
        "{}",
        formatter.info("Trayecto REPL - Type 'help' for commands, 'exit' to quit")
    );
    println!();

    let mut editor = DefaultEditor::new().map_err(|e| {
        CliError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to initialize editor: {}", e),
        ))
    })?;

    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    let mut planner: Option<Planner> = None;

    loop {
        let prompt = match &planner {
            Some(p) => format!("trayecto [{}]> ", p.student()),
            None => "trayecto (offline)> ".to_string(),
        };

        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_repl_command(line) {
                    Ok(ReplCommand::Exit) => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    Ok(ReplCommand::Help) => {
                        print_help(formatter);
                    }
                    Ok(ReplCommand::Reload) => {
                        if let Err(e) = reload(&mut planner, config, options, formatter).await {
                            eprintln!("{}", formatter.error(&e.to_string()));
                        }
                    }
                    Ok(ReplCommand::Command(cli)) => {
                        if let Err(e) =
                            execute_repl_command(*cli, &mut planner, config, options, formatter)
                                .await
                        {
                            eprintln!("{}", formatter.error(&e.to_string()));
                        }
                    }
                    Err(e) => {
                        eprintln!("{}", e);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();

    Ok(())
}

/// REPL command type.
#[derive(Debug)]
enum ReplCommand {
    Exit,
    Help,
    Reload,
    Command(Box<Cli>),
}

/// Parse a REPL command line.
fn parse_repl_command(line: &str) -> std::result::Result<ReplCommand, String> {
    let words = split_words(line)?;
    let Some(first) = words.first() else {
        return Err("Empty command".to_string());
    };

    match first.as_str() {
        "exit" | "quit" | "q" => Ok(ReplCommand::Exit),
        "help" | "?" => Ok(ReplCommand::Help),
        "reload" | "resync" => Ok(ReplCommand::Reload),
        _ => Cli::try_parse_from(std::iter::once("trayecto".to_string()).chain(words))
            .map(|cli| ReplCommand::Command(Box::new(cli)))
            .map_err(|e| e.to_string()),
    }
}

/// Split a line into words, keeping quoted text together.
fn split_words(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err("Unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Execute a REPL command.
async fn execute_repl_command(
    cli: Cli,
    planner: &mut Option<Planner>,
    config: &mut Config,
    options: &SessionOptions,
    formatter: &Formatter,
) -> Result<()> {
    let line_formatter = cli
        .format
        .map(|format| Formatter::new(format.into(), formatter.color_enabled()));
    let formatter = line_formatter.as_ref().unwrap_or(formatter);

    match cli.command {
        None => Ok(()),
        Some(Command::Repl) => {
            println!("{}", formatter.info("Already in the REPL"));
            Ok(())
        }
        Some(Command::Profile(args)) => {
            commands::execute_profile(args, config, formatter)?;
            // The next curriculum command reconnects with the new profile
            *planner = None;
            Ok(())
        }
        Some(command) => {
            if planner.is_none() {
                *planner = Some(open_planner(config, options).await?);
            }
            match planner.as_ref() {
                Some(p) => commands::execute_planner_command(command, p, formatter).await,
                None => Ok(()),
            }
        }
    }
}

async fn reload(
    planner: &mut Option<Planner>,
    config: &Config,
    options: &SessionOptions,
    formatter: &Formatter,
) -> Result<()> {
    match planner.as_ref() {
        Some(p) => p.resync().await?,
        None => *planner = Some(open_planner(config, options).await?),
    }
    println!("{}", formatter.success("Curriculum reloaded"));
    Ok(())
}

fn get_history_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    let trayecto_dir = home.join(".trayecto");
    std::fs::create_dir_all(&trayecto_dir)?;
    Ok(trayecto_dir.join("history.txt"))
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Available commands:"));
    println!();
    println!("  show [-y YEAR -t TERM]                  - Show semesters and progress");
    println!("  move <id> -y YEAR -t TERM [-i INDEX]    - Move a course");
    println!("  add -y YEAR -t TERM --code C --name N --credits K");
    println!("      [--state S] [--grade G] [--attempt A]  - Add a course");
    println!("  grade <id> [--state S] [--grade G | --clear-grade] [--attempt A]");
    println!("                                          - Edit a course");
    println!("  semester -y YEAR -t TERM                - Create a semester");
    println!("  profile [list|show|switch|set|delete]   - Manage profiles");
    println!("  reload                                  - Reload from the server");
    println!("  help, ?                                 - Show this help");
    println!("  exit, quit, q                           - Exit REPL");
    println!();
    println!("  Quote names with spaces: add ... --name \"Cálculo II\"");
    println!();
}
