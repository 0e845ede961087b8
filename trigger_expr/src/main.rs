use std::env;
use std::path::PathBuf;
use trigger_expr::batch::{self, BatchConfig, BatchItem, BatchResults};
use trigger_expr::config::runtime::RuntimeConfig;
use trigger_expr::{logging, pipeline};

/// Parsed command line
#[derive(Debug, Default)]
struct CliOptions {
    expressions: Vec<String>,
    file: Option<PathBuf>,
    json: bool,
    threads: Option<usize>,
    fail_fast: bool,
    info: bool,
    help: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = RuntimeConfig::default();

    // Logging stays silent unless the user asked for an output
    if runtime.logging.enable_console_logging || runtime.logging.use_structured_logging {
        let initialized = logging::config::init_runtime_preferences(runtime.logging.clone())
            .and_then(|_| logging::init_global_logging());
        if let Err(error) = initialized {
            // Validation still runs, only without log output
            logging::safe_log_error(
                logging::codes::system::INITIALIZATION_FAILURE,
                &format!("Logging initialization failed: {}", error),
            );
        }
    }

    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map(String::as_str).unwrap_or("trigger_expr");

    let options = match parse_options(&args[1.min(args.len())..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Usage: {} <expression>... [options]", program_name);
            eprintln!("       {} --help", program_name);
            std::process::exit(1);
        }
    };

    if options.help {
        print_help(program_name);
        return Ok(());
    }

    if options.info {
        println!("{}", pipeline::get_pipeline_info().report());
        println!();
        println!("{}", logging::get_system_diagnostics());
        return Ok(());
    }

    if options.expressions.is_empty() && options.file.is_none() {
        eprintln!("Usage: {} <expression>... [options]", program_name);
        eprintln!("       {} --help", program_name);
        std::process::exit(1);
    }

    let mut config = BatchConfig {
        runtime,
        ..BatchConfig::default()
    }
    .with_fail_fast(options.fail_fast);
    if let Some(threads) = options.threads {
        config = config.with_threads(threads);
    }

    let mut failed = false;

    if !options.expressions.is_empty() {
        let entries = batch::entries_from_expressions(options.expressions.iter());
        failed |= !report(batch::validate_batch(entries, &config), &options);
    }

    if let Some(path) = &options.file {
        if !options.json {
            println!("Validating expressions from {}", path.display());
        }
        failed |= !report(batch::validate_file(path, &config), &options);
    }

    if failed {
        std::process::exit(1);
    }

    Ok(())
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => options.help = true,
            "--info" => options.info = true,
            "--json" => options.json = true,
            "--fail-fast" => options.fail_fast = true,
            "--file" => {
                let path = args.get(i + 1).ok_or("--file requires a path")?;
                options.file = Some(PathBuf::from(path));
                i += 1;
            }
            "--threads" => {
                let value = args.get(i + 1).ok_or("--threads requires a number")?;
                let threads = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid thread count '{}'", value))?;
                options.threads = Some(threads);
                i += 1;
            }
            "--" => {
                options.expressions.extend(args[i + 1..].iter().cloned());
                break;
            }
            other if other.starts_with("--") => {
                return Err(format!("Unknown option '{}'", other));
            }
            expression => options.expressions.push(expression.to_string()),
        }
        i += 1;
    }

    Ok(options)
}

/// Print batch results, returning whether every expression passed
fn report(
    results: Result<BatchResults, pipeline::PipelineError>,
    options: &CliOptions,
) -> bool {
    let results = match results {
        Ok(results) => results,
        Err(error) => {
            eprintln!("FAILED: {}", error);
            return false;
        }
    };

    for item in &results.items {
        if options.json {
            print_json(item);
        } else {
            print_item(item);
        }
    }

    if !options.json && results.items.len() > 1 {
        println!();
        println!("{}", results.summary());
    }
    if results.stopped_early {
        eprintln!(
            "Stopped after first failure ({} of {} expressions validated)",
            results.items.len(),
            results.expressions_submitted
        );
    }

    results.all_succeeded()
}

fn print_item(item: &BatchItem) {
    match &item.outcome {
        Ok(output) => {
            println!("[{}] OK: {}", item.line, item.expression);
            println!(
                "    {} reference(s), {} host:key function call(s)",
                output.references.len(),
                output.host_item_functions().count()
            );
        }
        Err(failure) => {
            eprintln!("[{}] INVALID: {}", item.line, item.expression);
            for message in failure.to_messages() {
                eprintln!("    {}", message);
            }
        }
    }
}

fn print_json(item: &BatchItem) {
    match &item.outcome {
        Ok(output) => match output.to_json() {
            Ok(json) => println!("{}", json),
            Err(error) => eprintln!("[{}] Failed to serialize output: {}", item.line, error),
        },
        Err(failure) => match serde_json::to_string_pretty(failure) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", failure),
        },
    }
}

fn print_help(program_name: &str) {
    println!("Trigger Expression Validator v{}", env!("CARGO_PKG_VERSION"));
    println!("Scans, reduces and semantically checks trigger expressions");
    println!();
    println!("USAGE:");
    println!(
        "    {} <expression>... [options]        # Validate expressions",
        program_name
    );
    println!(
        "    {} --file <path> [options]          # Validate one expression per line",
        program_name
    );
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --info              Show validator limits and known functions");
    println!("    --file <path>       Read expressions from a file (# starts a comment)");
    println!("    --json              Print parse results and diagnostics as JSON");
    println!("    --threads N         Set maximum number of worker threads");
    println!("    --fail-fast         Stop on first invalid expression");
    println!();
    println!("EXIT STATUS:");
    println!("    0 when every expression is valid, 1 otherwise");
    println!();
    println!("EXAMPLES:");
    println!(
        "    {} '{{srv1:agent.ping.last(0)}}=1'",
        program_name
    );
    println!(
        "    {} --file triggers.txt --threads 4 --fail-fast",
        program_name
    );
    println!();

    let pipeline_info = pipeline::get_pipeline_info();
    println!("VALIDATOR:");
    println!("    {}", pipeline_info.summary());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_options() {
        let options = parse_options(&args(&[
            "{h:a.last(0)}=1",
            "--threads",
            "4",
            "--fail-fast",
            "--json",
            "--file",
            "triggers.txt",
        ]))
        .unwrap();

        assert_eq!(options.expressions, vec!["{h:a.last(0)}=1"]);
        assert_eq!(options.threads, Some(4));
        assert!(options.fail_fast);
        assert!(options.json);
        assert_eq!(options.file, Some(PathBuf::from("triggers.txt")));
    }

    #[test]
    fn test_parse_options_invalid() {
        assert!(parse_options(&args(&["--threads", "many"])).is_err());
        assert!(parse_options(&args(&["--threads"])).is_err());
        assert!(parse_options(&args(&["--unknown-option"])).is_err());
    }

    #[test]
    fn test_expressions_after_separator() {
        let options = parse_options(&args(&["--json", "--", "--{h:a.last(0)}=1"])).unwrap();
        assert!(options.json);
        assert_eq!(options.expressions, vec!["--{h:a.last(0)}=1"]);
    }
}
