//! Cowl CLI
//!
//! Runs the bundled demo programs through the evaluation core.

use cowlc::{demos, init_tracing, render_error, Session, SessionConfig};

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "list" => {
            for demo in demos::all() {
                println!("  {:<14} {}", demo.name, demo.summary);
            }
        }
        "show" => {
            if args.len() < 3 {
                eprintln!("Usage: cowl show <demo>");
                std::process::exit(1);
            }
            let demo = find_or_exit(&args[2]);
            print!("{}", demo.source);
        }
        "run" => {
            if args.len() < 3 {
                eprintln!("Usage: cowl run <demo> | --all");
                std::process::exit(1);
            }
            if args[2] == "--all" {
                let mut failed = false;
                for demo in demos::all() {
                    println!("== {} ==", demo.name);
                    failed |= !run_demo(demo);
                }
                if failed {
                    std::process::exit(1);
                }
            } else if !run_demo(find_or_exit(&args[2])) {
                std::process::exit(1);
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("Cowl {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn find_or_exit(name: &str) -> &'static demos::Demo {
    let Some(demo) = demos::find(name) else {
        eprintln!("error: unknown demo '{name}'");
        eprintln!("Run `cowl list` to see available demos.");
        std::process::exit(1);
    };
    demo
}

/// Run one demo in a fresh session, reporting any error. Returns success.
fn run_demo(demo: &demos::Demo) -> bool {
    let mut session = Session::new(SessionConfig::from_env());
    let program = demo.program(&session.ast_builder());
    match session.run(&program) {
        Ok(_) => true,
        Err(err) => {
            eprintln!("{}", render_error(&err, Some(demo.source)));
            false
        }
    }
}

fn print_usage() {
    println!("Cowl (copy-on-write expression language)");
    println!();
    println!("Usage: cowl <command> [options]");
    println!();
    println!("Commands:");
    println!("  list                 List bundled demo programs");
    println!("  show <demo>          Print a demo's source text");
    println!("  run <demo>           Evaluate a demo");
    println!("  run --all            Evaluate every demo");
    println!("  help                 Show this message");
    println!("  version              Show version information");
    println!();
    println!("Environment:");
    println!("  COWL_LOG=<filter>    Enable tracing (e.g. cowl_eval=debug)");
    println!("  COWL_LOG_TREE=1      Hierarchical trace output");
    println!("  COWL_MAX_DEPTH=<n>   Maximum call depth (default 1000)");
}
