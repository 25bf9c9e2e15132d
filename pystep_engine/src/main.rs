use pystep_engine::config::constants::compile_time;
use pystep_engine::logging::{self, codes};
use pystep_engine::{log_error, log_info, log_success};
use pystep_engine::{StepController, Status};
use std::env;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize global logging system
    logging::init_global_logging()?;

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <input.py> [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(&args[0]);
        return Ok(());
    }

    let options = parse_options(&args[2..]);
    let source = read_source(&args[1])?;

    let mut controller = StepController::new(&source);

    if options.show_tokens {
        println!("Tokens:");
        for (index, token) in controller.session().tokens().iter().enumerate() {
            println!("  {:4}  {}", index, token);
        }
        println!();
    }

    let outcome = if options.trace {
        run_with_trace(&mut controller)
    } else {
        controller.run_to_completion()
    };

    match outcome {
        Ok(Status::Completed) => {
            log_success!(
                codes::success::OPERATION_COMPLETED_SUCCESSFULLY,
                "parse finished",
                "tokens" => controller.session().cursor()
            );
            if options.json {
                println!("{}", controller.to_json()?);
            } else {
                let snapshot = controller.snapshot();
                println!("SUCCESS: {} tokens consumed", snapshot.cursor);
                if let Some(tree) = snapshot.tree {
                    println!("Tree: {} nodes under {}", tree.size(), tree.name);
                }
                println!(
                    "Symbol table: {} entries",
                    controller.session().symbol_table().len()
                );
            }
            Ok(())
        }
        Ok(status) => {
            // run_to_completion only stops early when paused, which the
            // CLI never requests
            eprintln!("Parse stopped in state {}", status);
            std::process::exit(1);
        }
        Err(error) => {
            eprintln!("FAILED: {}", error);
            let code = error.error_code();
            eprintln!("  Code: {}", code);
            eprintln!("  Description: {}", codes::get_description(code.as_str()));
            eprintln!("  Recommended action: {}", codes::get_action(code.as_str()));
            if options.json {
                println!("{}", controller.to_json()?);
            }
            std::process::exit(1);
        }
    }
}

struct Options {
    show_tokens: bool,
    json: bool,
    trace: bool,
}

fn parse_options(args: &[String]) -> Options {
    let mut options = Options {
        show_tokens: false,
        json: false,
        trace: false,
    };

    for arg in args {
        match arg.as_str() {
            "--tokens" => options.show_tokens = true,
            "--json" => options.json = true,
            "--trace" => options.trace = true,
            _ => {
                eprintln!("Warning: Unknown option '{}'", arg);
            }
        }
    }

    options
}

fn print_help(program_name: &str) {
    println!("pystep v{}", env!("CARGO_PKG_VERSION"));
    println!("Steppable tokenizer and resumable parser for a Python-like toy language");
    println!();
    println!("USAGE:");
    println!("    {} <input.py> [options]", program_name);
    println!();
    println!("ARGUMENTS:");
    println!("    <input.py>     Path to the source file to parse");
    println!();
    println!("OPTIONS:");
    println!("    --help         Show this help message");
    println!("    --tokens       Print the token stream before parsing");
    println!("    --trace        Print the parse stack after every grammar action");
    println!("    --json         Emit the final session snapshot as JSON");
    println!();
    println!("OUTPUT:");
    println!("    Success: consumed token count, tree size, symbol table size");
    println!("    Failure: error code with description and recommended action");
    println!();
    println!("ENVIRONMENT:");
    println!("    PYSTEP_LOG         Minimum log level (error|warn|info|debug)");
    println!("    PYSTEP_LOG_JSON    Emit log events as JSON when set to 1");
}

fn read_source(path_str: &str) -> Result<String, Box<dyn std::error::Error>> {
    let path = Path::new(path_str);

    if !path.is_file() {
        log_error!(
            codes::file_processing::FILE_NOT_FOUND,
            "input file not found",
            "path" => path.display()
        );
        eprintln!("Error: file not found: {}", path.display());
        std::process::exit(1);
    }

    let metadata = std::fs::metadata(path).map_err(|e| {
        log_error!(codes::file_processing::IO_ERROR, "failed to stat input",
            "path" => path.display(),
            "error" => e
        );
        e
    })?;

    if metadata.len() > compile_time::file_processing::MAX_SOURCE_LENGTH {
        log_error!(
            codes::file_processing::SOURCE_TOO_LARGE,
            "input exceeds size limit",
            "path" => path.display(),
            "size" => metadata.len(),
            "limit" => compile_time::file_processing::MAX_SOURCE_LENGTH
        );
        eprintln!(
            "Error: {} is {} bytes, limit is {}",
            path.display(),
            metadata.len(),
            compile_time::file_processing::MAX_SOURCE_LENGTH
        );
        std::process::exit(1);
    }

    if metadata.len() > compile_time::file_processing::LARGE_SOURCE_THRESHOLD {
        log_info!(
            "processing large input",
            "path" => path.display(),
            "size" => metadata.len()
        );
    }

    let bytes = std::fs::read(path).map_err(|e| {
        log_error!(codes::file_processing::IO_ERROR, "failed to read input",
            "path" => path.display(),
            "error" => e
        );
        e
    })?;

    String::from_utf8(bytes).map_err(|e| {
        log_error!(
            codes::file_processing::INVALID_ENCODING,
            "input is not valid UTF-8",
            "path" => path.display()
        );
        e.into()
    })
}

fn run_with_trace(
    controller: &mut StepController,
) -> Result<Status, pystep_engine::SyntaxError> {
    let mut step = 0usize;
    loop {
        let status = controller.step()?;
        step += 1;
        let snapshot = controller.snapshot();
        println!(
            "step {:4}  cursor {:4}  [{}]",
            step,
            snapshot.cursor,
            snapshot.stack.join(" ")
        );
        if status.is_terminal() {
            return Ok(status);
        }
    }
}
