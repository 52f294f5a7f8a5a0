use clap::{Parser, Subcommand};
use shinsa::config::Config;
use shinsa::logging;
use shinsa::prelude::*;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Review automation workflows with an AI analyzer and apply its fixes
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to a TOML config file (defaults to ./shinsa.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Run in interactive mode to review fixes one by one
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a workflow and optionally write a corrected copy
    Analyze {
        /// Path to the workflow JSON file, or '-' for stdin
        workflow_path: String,
        #[command(flatten)]
        fixes: FixArgs,
        /// Also save the analysis as JSON for a later `apply`
        #[arg(long)]
        save_analysis: Option<PathBuf>,
    },
    /// Apply fixes from a saved analysis without calling the analyzer
    Apply {
        /// Path to the workflow JSON file
        workflow_path: String,
        /// Path to an analysis saved with `analyze --save-analysis`
        analysis_path: String,
        #[command(flatten)]
        fixes: FixArgs,
    },
}

#[derive(clap::Args, Debug)]
struct FixArgs {
    /// Approve every fix that needs no user input
    #[arg(short = 'a', long)]
    approve_all: bool,
    /// Approve a single fix by issue id (repeatable)
    #[arg(long = "fix", value_name = "ISSUE_ID")]
    fix_ids: Vec<String>,
    /// Directory to write the corrected workflow into
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// File name of the corrected workflow
    #[arg(long)]
    file_name: Option<String>,
}

impl FixArgs {
    fn wants_export(&self) -> bool {
        self.approve_all || !self.fix_ids.is_empty() || self.out.is_some()
    }
}

/// A credential typed in at the terminal.
struct PromptedCredential {
    key: Option<String>,
}

impl CredentialSource for PromptedCredential {
    fn api_key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    fn prompt(&mut self) -> bool {
        let key = prompt_for_input("Enter your Gemini API key", None);
        self.key = Some(key).filter(|k| !k.trim().is_empty());
        self.has_credential()
    }

    fn revoke(&mut self) {
        self.key = None;
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load(cli.config.as_deref())
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e)));

    if cli.human {
        run_interactive(config).await;
        return;
    }

    match cli.command {
        Some(Command::Analyze {
            workflow_path,
            fixes,
            save_analysis,
        }) => run_analyze(config, workflow_path, fixes, save_analysis).await,
        Some(Command::Apply {
            workflow_path,
            analysis_path,
            fixes,
        }) => run_apply(config, workflow_path, analysis_path, fixes),
        None => exit_with_error("A subcommand is required in non-interactive mode (try --help)."),
    }
}

/// Analyzes one workflow non-interactively.
async fn run_analyze(
    config: Config,
    workflow_path: String,
    fixes: FixArgs,
    save_analysis: Option<PathBuf>,
) {
    let total_start = Instant::now();

    // --- 1. Input ---
    let workflow_text = read_workflow(&workflow_path);
    let credential = StaticCredential::new(config.analyzer.api_key.clone());
    let Some(api_key) = credential.api_key() else {
        exit_with_error("No API key configured. Set GEMINI_API_KEY or add it to shinsa.toml.");
    };
    let analyzer = GeminiAnalyzer::new(config.gemini(api_key))
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to create analyzer: {}", e)));

    // --- 2. Analysis ---
    println!("Analyzing '{}' with {}...", workflow_path, analyzer.model());
    let analysis_start = Instant::now();
    let mut session = Session::with_credentials(&credential);
    session
        .analyze(&workflow_text, &analyzer)
        .await
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    let analysis_duration = analysis_start.elapsed();

    if session.stage() != Stage::Results {
        exit_with_error(session.error().unwrap_or("Analysis failed."));
    }

    // --- 3. Selection ---
    if fixes.approve_all {
        session.approve_all_fixes();
    }
    if let Some(result) = session.result().cloned() {
        for id in &fixes.fix_ids {
            let Some(issue) = result.issue(id) else {
                exit_with_error(&format!("Unknown issue id '{}'", id));
            };
            if !issue.is_auto_fixable() {
                println!("Warning: fix '{}' writes a placeholder that needs your input.", id);
            }
            if !session.approved().is_approved(id) {
                session.toggle_fix(id);
            }
        }
    }

    if let Some(report) = ReportFormatter::format_session(&session) {
        println!("\n{}", report);
    }

    // --- 4. Output ---
    if let (Some(path), Some(result)) = (save_analysis, session.result()) {
        let text = serde_json::to_string_pretty(result)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize analysis: {}", e)));
        fs::write(&path, text).unwrap_or_else(|e| {
            exit_with_error(&format!(
                "Failed to write analysis to '{}': {}",
                path.display(),
                e
            ))
        });
        println!("  -> Saved analysis to '{}'", path.display());
    }

    if fixes.wants_export() {
        let dir = export_dir(&config, &fixes);
        let file_name = fixes.file_name.as_deref().unwrap_or(&config.export.file_name);
        if let Some(report) = session.patch_report() {
            print_skipped(&report);
        }
        match session.export(&dir, Some(file_name)) {
            Ok(Some(path)) => println!(
                "  -> Wrote corrected workflow with {} fix(es) to '{}'",
                session.approved().len(),
                path.display()
            ),
            Ok(None) => println!("  -> Nothing to export"),
            Err(e) => exit_with_error(&e.to_string()),
        }
    }

    println!("\n--- Performance Summary ---");
    println!("Analysis:        {:?}", analysis_duration);
    println!("Total Execution: {:?}", total_start.elapsed());
}

/// Applies fixes from a saved analysis.
fn run_apply(config: Config, workflow_path: String, analysis_path: String, fixes: FixArgs) {
    let workflow_text = read_workflow(&workflow_path);
    let document: serde_json::Value = serde_json::from_str(&workflow_text)
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid workflow JSON: {}", e)));
    let analysis = AnalysisResult::from_file(&analysis_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to load analysis from '{}': {}",
            analysis_path, e
        ))
    });

    let mut approved = FixSelection::new();
    if fixes.approve_all {
        approved.approve_all(&analysis.errors);
    }
    for id in &fixes.fix_ids {
        if analysis.issue(id).is_none() {
            println!("Warning: ignoring unknown issue id '{}'", id);
        }
        if !approved.is_approved(id) {
            approved.toggle(id);
        }
    }
    // Only ids present in the analysis are applied.
    approved.retain_known(&analysis.errors);

    let report = DocumentPatcher::apply_with_report(&document, &analysis.errors, &approved);
    println!("Applied {} fix(es).", report.applied.len());
    print_skipped(&report);

    let dir = export_dir(&config, &fixes);
    let file_name = fixes.file_name.as_deref().unwrap_or(&config.export.file_name);
    let path = shinsa::export::write_document(&report.document, &dir.join(file_name))
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    println!("  -> Wrote corrected workflow to '{}'", path.display());
}

/// Runs the CLI in an interactive, human-friendly mode with prompts.
async fn run_interactive(config: Config) {
    println!("--- Shinsa Interactive Mode ---");

    let mut credential = PromptedCredential {
        key: config.analyzer.api_key.clone(),
    };
    let mut session = Session::with_credentials(&credential);

    loop {
        match session.stage() {
            Stage::Input => {
                if let Some(error) = session.error() {
                    println!("\nError: {}", error);
                    session.dismiss_error();
                }
                if !session.credential_present() {
                    credential.revoke();
                    if !credential.prompt() {
                        println!("An API key is required to analyze workflows.");
                        continue;
                    }
                    session.set_credential_present(true);
                }

                let path = prompt_for_input(
                    "Enter workflow path ('q' to quit)",
                    Some("workflow.json"),
                );
                if path == "q" {
                    break;
                }
                let text = match fs::read_to_string(&path) {
                    Ok(text) => text,
                    Err(e) => {
                        println!("Failed to read '{}': {}", path, e);
                        continue;
                    }
                };

                let Some(api_key) = credential.api_key() else {
                    continue;
                };
                let analyzer = match GeminiAnalyzer::new(config.gemini(api_key)) {
                    Ok(analyzer) => analyzer,
                    Err(e) => {
                        println!("Failed to create analyzer: {}", e);
                        continue;
                    }
                };

                println!("Analyzing...");
                if let Err(e) = session.analyze(&text, &analyzer).await {
                    println!("{}", e);
                }
            }
            Stage::Analyzing => {
                // Analysis is awaited inline, so this stage is never observed here.
                session.new_analysis();
            }
            Stage::Results => {
                if let Some(report) = ReportFormatter::format_session(&session) {
                    println!("\n{}", report);
                }
                println!("Commands: <n> toggle fix, a approve all, e <n> expand step,");
                println!("          w write corrected workflow, n new analysis, q quit");
                let command = prompt_for_input("Command", None);
                if !handle_review_command(&command, &mut session, &config) {
                    break;
                }
            }
        }
    }
}

/// Executes one review command. Returns `false` when the user wants to quit.
fn handle_review_command(command: &str, session: &mut Session, config: &Config) -> bool {
    let Some(result) = session.result().cloned() else {
        return true;
    };
    let mut words = command.split_whitespace();
    match (words.next(), words.next()) {
        (Some("q"), _) => return false,
        (Some("a"), _) => session.approve_all_fixes(),
        (Some("n"), _) => session.new_analysis(),
        (Some("w"), _) => {
            let dir = PathBuf::from(&config.export.directory);
            match session.export(&dir, Some(&config.export.file_name)) {
                Ok(Some(path)) => println!("  -> Wrote '{}'", path.display()),
                Ok(None) => println!("  -> Nothing to export"),
                Err(e) => println!("Export failed: {}", e),
            }
        }
        (Some("e"), Some(n)) => match parse_position(n, result.node_breakdowns.len()) {
            Some(index) => session.toggle_section(&result.node_breakdowns[index].id),
            None => println!("No step numbered '{}'", n),
        },
        (Some(n), None) => match parse_position(n, result.errors.len()) {
            Some(index) => {
                let issue = &result.errors[index];
                if !issue.is_auto_fixable() && !session.approved().is_approved(&issue.id) {
                    println!("Note: this fix writes a placeholder that needs your input.");
                }
                session.toggle_fix(&issue.id);
            }
            None => println!("Unknown command '{}'", command.trim()),
        },
        _ => println!("Unknown command '{}'", command.trim()),
    }
    true
}

/// Converts a 1-based position typed by the user into an index.
fn parse_position(text: &str, len: usize) -> Option<usize> {
    text.parse::<usize>()
        .ok()
        .filter(|n| (1..=len).contains(n))
        .map(|n| n - 1)
}

fn export_dir(config: &Config, fixes: &FixArgs) -> PathBuf {
    fixes
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.export.directory))
}

fn print_skipped(report: &PatchReport) {
    for skipped in &report.skipped {
        println!(
            "  -> Skipped fix '{}': {}",
            skipped.issue_id, skipped.error
        );
    }
}

fn read_workflow(path: &str) -> String {
    let result = if path == "-" {
        io::read_to_string(io::stdin())
    } else {
        fs::read_to_string(Path::new(path))
    };
    result.unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read workflow file '{}': {}", path, e))
    })
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    let _ = io::stdout().flush();

    match io::stdin().read_line(&mut line) {
        Ok(0) => std::process::exit(0),
        Ok(_) => {}
        Err(e) => exit_with_error(&format!("Failed to read input: {}", e)),
    }
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
