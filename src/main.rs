//! Customer Intake - individual customer registration
//!
//! Collects an individual's personal details, checks them locally
//! (names, EGN, postcode, contact details) and sends them to the
//! customer backend.

mod api;
mod config;
mod form;
mod submission;
mod tui;

use std::fs::OpenOptions;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use colored::*;
use serde_json::json;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api::ApiClient;
use crate::config::Config;
use crate::form::egn::{self, EgnError};
use crate::form::rules::CONTACT_MESSAGE;
use crate::form::{Field, FieldErrors, FormRecord, FormState};
use crate::submission::{SubmissionController, SubmissionPayload, SubmitOutcome};

const LOG_FILE_NAME: &str = "customer-intake.log";

/// Customer Intake - register individual customers
#[derive(Parser)]
#[command(name = "customer-intake")]
#[command(version)]
#[command(about = "Register individual customers with the customer backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in the customer form interactively (recommended)
    Start,

    /// Start the fullscreen terminal UI
    Tui,

    /// Validate and submit one customer
    Submit {
        #[command(flatten)]
        customer: CustomerArgs,
    },

    /// Validate only and print the payload that would be sent
    Validate {
        #[command(flatten)]
        customer: CustomerArgs,

        /// Print the payload or the errors as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Inspect a national ID (EGN)
    Egn {
        /// The 10-digit EGN
        value: String,
    },

    /// Show configuration path and effective settings
    Config {
        /// Write the default config file if it does not exist yet
        #[arg(long, default_value_t = false)]
        init: bool,
    },
}

/// Customer fields as command-line flags. Missing flags are empty values;
/// the validator decides what is required.
#[derive(Args, Debug, Default)]
struct CustomerArgs {
    #[arg(long)]
    first_name: Option<String>,

    #[arg(long)]
    middle_name: Option<String>,

    #[arg(long)]
    last_name: Option<String>,

    /// National ID (10 digits)
    #[arg(long)]
    egn: Option<String>,

    #[arg(long)]
    address: Option<String>,

    /// 4-digit postal code
    #[arg(long)]
    postcode: Option<String>,

    /// Phone number, e.g. +00359888123456
    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    email: Option<String>,
}

impl CustomerArgs {
    fn into_record(self) -> FormRecord {
        FormRecord {
            first_name: self.first_name.unwrap_or_default(),
            middle_name: self.middle_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            national_id: self.egn.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            postcode: self.postcode.unwrap_or_default(),
            phone_number: self.phone.unwrap_or_default(),
            email_address: self.email.unwrap_or_default(),
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Start) | None => {
            let config = load_config()?;
            let rt = tokio::runtime::Runtime::new()?;

            // Fullscreen TUI when interactive; the line-by-line flow covers
            // redirected stdin/stdout.
            if io::stdin().is_terminal() && io::stdout().is_terminal() {
                init_logging(LogTarget::File);
                if let Err(err) = tui::run_tui(&rt, &config) {
                    println!(
                        "{} {}",
                        "Could not start Terminal UI:".bright_red(),
                        err.to_string().bright_red()
                    );
                    println!(
                        "{}",
                        "Falling back to the line-by-line form...".bright_yellow()
                    );
                    return run_guided_flow(&rt, &config);
                }
                Ok(ExitCode::SUCCESS)
            } else {
                init_logging(LogTarget::Stderr);
                run_guided_flow(&rt, &config)
            }
        }
        Some(Commands::Tui) => {
            if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
                println!(
                    "{}",
                    "The terminal UI requires an interactive TTY. Try `customer-intake start` or `customer-intake submit`."
                        .bright_yellow()
                );
                return Ok(ExitCode::FAILURE);
            }

            let config = load_config()?;
            init_logging(LogTarget::File);
            let rt = tokio::runtime::Runtime::new()?;
            tui::run_tui(&rt, &config)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Submit { customer }) => {
            init_logging(LogTarget::Stderr);
            let config = load_config()?;
            run_submit(&config, customer.into_record())
        }
        Some(Commands::Validate { customer, json }) => {
            init_logging(LogTarget::Stderr);
            let config = load_config()?;
            run_validate(&config, customer.into_record(), json)
        }
        Some(Commands::Egn { value }) => Ok(show_egn_report(&value)),
        Some(Commands::Config { init }) => {
            init_logging(LogTarget::Stderr);
            show_config_info(init)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config() -> Result<Config> {
    Ok(Config::load()
        .context("Failed to load configuration")?
        .with_env_overrides())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogTarget {
    Stderr,
    /// Next to the config file, so the alternate screen stays clean.
    File,
}

fn init_logging(target: LogTarget) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    match target {
        LogTarget::Stderr => registry.with(fmt::layer().with_writer(io::stderr)).init(),
        LogTarget::File => {
            let file = log_file_path().and_then(|path| {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .ok()
            });
            match file {
                Some(file) => registry
                    .with(
                        fmt::layer()
                            .with_ansi(false)
                            .with_writer(Mutex::new(file)),
                    )
                    .init(),
                None => registry.init(),
            }
        }
    }
}

fn log_file_path() -> Option<PathBuf> {
    let config_path = Config::config_path().ok()?;
    let dir = config_path.parent()?;
    std::fs::create_dir_all(dir).ok()?;
    Some(dir.join(LOG_FILE_NAME))
}

fn new_controller(config: &Config) -> SubmissionController<ApiClient> {
    SubmissionController::new(
        ApiClient::from_config(&config.api),
        config.submission.success_display(),
    )
    .on_success(|payload| {
        tracing::info!(
            first_name = %payload.first_name,
            last_name = %payload.last_name,
            "customer created"
        );
    })
}

/// Line-by-line form for non-interactive terminals and as a TUI fallback.
fn run_guided_flow(rt: &tokio::runtime::Runtime, config: &Config) -> Result<ExitCode> {
    print_welcome(config);

    let controller = new_controller(config);
    let mut form = FormState::new(config.form.clone());
    let mut to_ask: Vec<Field> = Field::ALL.to_vec();

    loop {
        for field in to_ask.drain(..) {
            prompt_field(&mut form, field)?;
        }

        let Some(record) = form.attempt_submit() else {
            println!("\n{}", "Please fix the following:".bright_red());
            print_field_errors(&form.errors);
            to_ask = form.errors.fields().collect();
            continue;
        };

        let payload = SubmissionPayload::from_record(&record);
        println!("\n{}", "Customer to submit:".bright_white().bold());
        print!("{}", payload.display());
        print!("\n{} ", "Submit this customer? [Y/n]:".bright_yellow());
        if !prompt_yes_no(true, true)? {
            println!("{}", "Nothing was sent.".bright_black());
            return Ok(ExitCode::SUCCESS);
        }

        println!("{}", "Submitting...".bright_cyan());
        let outcome = rt.block_on(controller.submit(&record));
        form.apply_outcome(&outcome);

        match outcome {
            SubmitOutcome::Succeeded => {
                println!("{}", "✓ Form submitted successfully!".bright_green().bold());
                return Ok(ExitCode::SUCCESS);
            }
            SubmitOutcome::Failed {
                message,
                field_errors,
            } => {
                println!("{} {}", "✗ Error:".bright_red(), message.bright_red());
                print_field_errors(&field_errors);
                print!("{} ", "Try again? [y/N]:".bright_yellow());
                if !prompt_yes_no(false, false)? {
                    return Ok(ExitCode::FAILURE);
                }
                to_ask = field_errors.fields().collect();
            }
            SubmitOutcome::Ignored => {}
        }
    }
}

fn prompt_field(form: &mut FormState, field: Field) -> Result<()> {
    let required = form.policy().is_required(field);
    loop {
        let current = form.value(field);
        let hint = match (current.is_empty(), field.placeholder()) {
            (false, _) => format!(" [{current}]"),
            (true, "") => String::new(),
            (true, example) => format!(" (e.g. {example})"),
        };
        let marker = if required { "*" } else { " " };
        print!(
            "{}{}{}: ",
            field.label().bright_cyan(),
            marker.bright_yellow(),
            hint.bright_black()
        );

        let input = read_line()?.context("Input closed before the form was complete")?;
        // Enter keeps a previous answer when re-asking.
        if !(input.is_empty() && !current.is_empty()) {
            form.set_value(field, input);
        } else {
            form.touch(field);
        }

        // The contact rule is settled once both contact fields were asked.
        let problems: Vec<&String> = form
            .visible_errors(field)
            .iter()
            .filter(|m| m.as_str() != CONTACT_MESSAGE)
            .collect();
        if problems.is_empty() {
            return Ok(());
        }
        for message in problems {
            println!("  {} {}", "✗".bright_red(), message.bright_red());
        }
    }
}

fn print_field_errors(errors: &FieldErrors) {
    for line in errors.to_lines() {
        println!("  - {}", line);
    }
}

fn print_welcome(config: &Config) {
    println!("{}", "Customer Intake".bright_cyan().bold());
    println!(
        "{}",
        "Register a new individual customer. Fields marked * are required.".bright_white()
    );
    if config.form.require_contact {
        println!(
            "{}",
            "At least one of phone number or email address must be filled in.".bright_white()
        );
    }
    println!();
}

fn read_line() -> Result<Option<String>> {
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin().read_line(&mut input)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn prompt_yes_no(default_yes: bool, non_interactive_default: bool) -> Result<bool> {
    if !io::stdin().is_terminal() {
        println!();
        return Ok(non_interactive_default);
    }

    let answer = read_line()?.unwrap_or_default().to_ascii_lowercase();
    Ok(match answer.as_str() {
        "" => default_yes,
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default_yes,
    })
}

fn run_submit(config: &Config, record: FormRecord) -> Result<ExitCode> {
    if record.is_empty() {
        println!(
            "{}",
            "No customer fields given. Pass them as flags (see `customer-intake submit --help`) or run `customer-intake start`."
                .bright_yellow()
        );
        return Ok(ExitCode::FAILURE);
    }

    let valid = match form::validate_with(&record, &config.form) {
        Ok(valid) => valid,
        Err(errors) => {
            println!("{}", "Validation errors:".bright_red());
            print_field_errors(&errors);
            return Ok(ExitCode::FAILURE);
        }
    };

    let rt = tokio::runtime::Runtime::new()?;
    let controller = new_controller(config);

    println!(
        "{} {}",
        "Submitting customer to".bright_cyan(),
        controller.transport().endpoint().bright_white()
    );
    match rt.block_on(controller.submit(&valid)) {
        SubmitOutcome::Succeeded => {
            println!("{}", "✓ Form submitted successfully!".bright_green().bold());
            print!("{}", SubmissionPayload::from_record(&valid).display());
            Ok(ExitCode::SUCCESS)
        }
        SubmitOutcome::Failed {
            message,
            field_errors,
        } => {
            println!("{} {}", "✗ Error:".bright_red(), message.bright_red());
            print_field_errors(&field_errors);
            Ok(ExitCode::FAILURE)
        }
        SubmitOutcome::Ignored => Ok(ExitCode::FAILURE),
    }
}

fn run_validate(config: &Config, record: FormRecord, as_json: bool) -> Result<ExitCode> {
    match form::validate_with(&record, &config.form) {
        Ok(valid) => {
            let payload = SubmissionPayload::from_record(&valid);
            if as_json {
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{}", "✓ Customer is valid".bright_green());
                print!("{}", payload.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            if as_json {
                println!("{}", serde_json::to_string_pretty(&errors_json(&errors))?);
            } else {
                println!("{}", "Validation errors:".bright_red());
                print_field_errors(&errors);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// `{"errors": {"<wireName>": ["message", ...]}}`, the same shape the
/// transport accepts from the server.
fn errors_json(errors: &FieldErrors) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for field in errors.fields() {
        map.insert(field.wire_name().to_string(), json!(errors.get(field)));
    }
    json!({ "errors": map })
}

/// Facts decoded from a national ID, whether or not it is valid.
#[derive(Debug, PartialEq, Eq)]
struct EgnReport {
    century: Option<i32>,
    birth_date: Option<NaiveDate>,
    expected_check_digit: Option<u32>,
    valid: bool,
    verdict: Result<NaiveDate, EgnError>,
}

fn egn_report(value: &str, today: NaiveDate) -> EgnReport {
    let value = value.trim();
    let century = value
        .get(2..4)
        .and_then(|m| m.parse::<u32>().ok())
        .map(egn::century_base);
    let expected_check_digit = value
        .get(..egn::EGN_LEN - 1)
        .and_then(egn::checksum_digit);

    EgnReport {
        century,
        birth_date: egn::birth_date(value).ok(),
        expected_check_digit,
        valid: egn::is_valid_egn_on(value, today),
        verdict: egn::validate_egn_on(value, today),
    }
}

fn show_egn_report(value: &str) -> ExitCode {
    let report = egn_report(value, Local::now().date_naive());

    println!("{} {}", "EGN:".bright_cyan(), value.trim().bright_white());
    if let Some(century) = report.century {
        println!("  {} {}s", "Century:".bright_cyan(), century);
    }
    if let Some(date) = report.birth_date {
        println!("  {} {}", "Birth date:".bright_cyan(), date.format("%Y-%m-%d"));
    }
    if let Some(digit) = report.expected_check_digit {
        println!("  {} {}", "Expected check digit:".bright_cyan(), digit);
    }

    if report.valid {
        println!("  {} {}", "Verdict:".bright_cyan(), "valid".bright_green());
        return ExitCode::SUCCESS;
    }
    if let Err(err) = report.verdict {
        println!(
            "  {} {}",
            "Verdict:".bright_cyan(),
            err.to_string().bright_red()
        );
    }
    ExitCode::FAILURE
}

fn show_config_info(init: bool) -> Result<()> {
    println!("{}", "Customer Intake Configuration\n".bright_cyan().bold());

    let path = config::get_config_path()?;
    println!("{} {}", "Config file:".bright_yellow(), path.bright_white());

    if init {
        Config::init().context("Could not create config file")?;
    }
    if std::path::Path::new(&path).exists() {
        println!("  {} {}", "Status:".bright_cyan(), "Exists".bright_green());
    } else {
        println!(
            "  {} {}",
            "Status:".bright_cyan(),
            "Not created yet (using defaults, run with --init to write it)".bright_yellow()
        );
    }

    let cfg = load_config()?;
    let endpoint = ApiClient::from_config(&cfg.api);

    println!("\n{}", "API settings:".bright_white().bold());
    println!(
        "  {} {}",
        "Endpoint:".bright_cyan(),
        endpoint.endpoint().bright_white()
    );
    println!(
        "  {} {}",
        "Timeout:".bright_cyan(),
        format!("{}s", cfg.api.timeout_seconds).bright_white()
    );
    println!(
        "  {} {}",
        "Verify SSL:".bright_cyan(),
        if cfg.api.verify_ssl {
            "true".bright_green()
        } else {
            "false".bright_yellow()
        }
    );

    println!("\n{}", "Required fields:".bright_white().bold());
    let required: Vec<&str> = Field::ALL
        .iter()
        .filter(|f| cfg.form.is_required(**f))
        .map(|f| f.label())
        .collect();
    println!("  {}", required.join(", ").bright_white());
    if cfg.form.require_contact {
        println!("  {}", "Phone number or email address".bright_white());
    }

    println!("\n{}", "Submission:".bright_white().bold());
    println!(
        "  {} {}",
        "Success message shown for:".bright_cyan(),
        format!("{}ms", cfg.submission.success_display_ms).bright_white()
    );

    if let Some(log) = log_file_path() {
        println!(
            "\n{} {}",
            "TUI log file:".bright_yellow(),
            log.display().to_string().bright_white()
        );
    }

    Ok(())
}
