use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{bail, Context, Result};
use clap::builder::RangedU64ValueParser;
use clap::Parser;
use log::{error, info};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config as EditorConfig, Editor};
use simplelog::{Config as LogConfig, LevelFilter, SimpleLogger};

use bhasha::input::{fixup_input, strip_comments};
use bhasha::lang::eval::{stack_size, MAX_DEPTH_LIMIT};
use bhasha::lang::runtime::Runtime;

mod repl;

use repl::ReplHelper;

const HISTORY_FILE: &str = ".bhasha_history";
const PROMPT: &str = "(ভাষা) ";
const DEFAULT_MAX_DEPTH: usize = 1000;

#[derive(Parser)]
#[command(version, about)]
struct Opt {
    /// Script to run. Starts an interactive session when omitted
    file: Option<PathBuf>,
    /// Show debug output
    #[arg(short, long)]
    debug: bool,
    /// Maximum depth of nested function calls
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_DEPTH,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_DEPTH_LIMIT as u64)
    )]
    max_depth: usize,
}

fn init_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Error
    };

    match SimpleLogger::init(filter, LogConfig::default()) {
        Ok(_) => Ok(()),
        Err(e) => bail!("Failed to init logger: {}", e),
    }
}

fn init_editor() -> Result<Editor<ReplHelper, DefaultHistory>> {
    let config = EditorConfig::builder().auto_add_history(true).build();
    let mut editor = Editor::with_config(config)?;
    editor.set_helper(Some(ReplHelper::new()));

    Ok(editor)
}

fn init_history(editor: &mut Editor<ReplHelper, DefaultHistory>) {
    let _ = editor.load_history(HISTORY_FILE);
}

fn save_history(editor: &mut Editor<ReplHelper, DefaultHistory>) -> Result<()> {
    match editor.save_history(HISTORY_FILE) {
        Ok(_) => Ok(()),
        Err(e) => bail!("Failed to save history: {}", e),
    }
}

fn welcome() {
    println!(r#"bhasha (ভাষা) v{}"#, env!("CARGO_PKG_VERSION"));
    println!("Press Ctrl-D to quit");
    println!();
}

fn run_file(path: &Path, max_depth: usize) -> Result<()> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    info!("running {}", path.display());

    let mut stdout = io::stdout();
    let mut runtime = Runtime::new(&mut stdout, false).with_max_depth(max_depth);
    match runtime.eval(&strip_comments(&source)) {
        Ok(Some(val)) => {
            info!("program returned {}", val);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => bail!("{}: {}", path.display(), e),
    }
}

fn run_repl(max_depth: usize) -> Result<()> {
    let mut editor = init_editor()?;
    init_history(&mut editor);
    welcome();

    let mut stdout = io::stdout();
    let mut runtime = Runtime::new(&mut stdout, true).with_max_depth(max_depth);

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                info!("read: {}", &line);

                let line = fixup_input(&strip_comments(&line));
                if line.trim().is_empty() {
                    continue;
                }

                match runtime.eval(&line) {
                    Ok(Some(val)) => println!("{}", val),
                    Ok(None) => (),
                    Err(e) => {
                        eprintln!("{}", e);
                        continue;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("Press Ctrl-D to quit");
            }
            Err(ReadlineError::Eof) => {
                println!("quit");
                break;
            }
            Err(e) => {
                error!("Unexpected error: {}", e);
                println!("quit");
                break;
            }
        }
    }

    save_history(&mut editor)?;

    Ok(())
}

fn main() -> Result<()> {
    let opts = Opt::parse();
    init_logging(opts.debug)?;

    // Calls recurse on the host stack, so the interpreter gets a stack sized to `--max-depth`
    let max_depth = opts.max_depth;
    let interpreter = thread::Builder::new()
        .name("interpreter".to_string())
        .stack_size(stack_size(max_depth))
        .spawn(move || match opts.file {
            Some(path) => run_file(&path, max_depth),
            None => run_repl(max_depth),
        })
        .context("Failed to start interpreter thread")?;

    match interpreter.join() {
        Ok(res) => res,
        Err(_) => bail!("Interpreter thread panicked"),
    }
}
