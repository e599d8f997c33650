// ABOUTME: Command-line entry point: REPL, script execution, and one-shot evaluation

mod builtins;
mod config;
mod env;
mod error;
mod eval;
mod num;
mod parser;
mod repl;
mod sandbox;
mod value;

use builtins::{register_builtins, set_sandbox_storage};
use clap::Parser;
use config::{FsConfig, AUTOLOAD_SEARCH_PATH};
use env::Environment;
use error::Interpreter;
use sandbox::Sandbox;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

/// Nada Lisp: an exact-rational, tree-walking Lisp interpreter.
#[derive(Parser, Debug)]
#[command(name = "nada")]
#[command(version = config::VERSION)]
#[command(about = "An exact-rational, tree-walking Lisp interpreter")]
struct CliArgs {
    /// Script file to execute (if omitted and no -e/-c, starts the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Evaluate EXPR and print its result, then exit
    #[arg(short = 'e', value_name = "EXPR", conflicts_with_all = ["compile_expr", "script"])]
    eval_expr: Option<String>,

    /// Evaluate EXPR without printing its result, then exit
    #[arg(short = 'c', value_name = "EXPR", conflicts_with_all = ["eval_expr", "script"])]
    compile_expr: Option<String>,

    /// Skip the nadalib autoloader
    #[arg(short = 'n', long = "no-autoload")]
    no_autoload: bool,

    /// Add an allowed filesystem root (repeatable)
    #[arg(long = "fs-sandbox", value_name = "PATH", action = clap::ArgAction::Append)]
    fs_paths: Vec<PathBuf>,

    /// Maximum file size in bytes for sandboxed I/O
    #[arg(long = "max-file-size", value_name = "BYTES", default_value = "10485760")]
    max_file_size: usize,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let fs_config = build_fs_config(&args);
    let sandbox = match Sandbox::new(fs_config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("cannot initialize sandbox: {e}");
            return ExitCode::from(2);
        }
    };

    let env = Environment::new();
    register_builtins(&env);

    if !args.no_autoload {
        autoload(&sandbox, &env);
    }

    set_sandbox_storage(sandbox);

    let interp = Interpreter::with_sink(|kind, msg| {
        eprintln!("{kind}: {msg}");
    });

    if let Some(expr) = args.eval_expr {
        return run_one_shot(&interp, &env, &expr, true);
    }
    if let Some(expr) = args.compile_expr {
        let wrapped = wrap_calc_expr(&expr);
        return run_one_shot(&interp, &env, &wrapped, false);
    }
    if let Some(path) = args.script {
        return run_script(&interp, &env, &path);
    }

    match repl::run(&interp, &env) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("repl error: {e}");
            ExitCode::from(2)
        }
    }
}

/// `-c EXPR` is algebraic-calculator sugar for `(calc "EXPR")`, unlike `-e`
/// which evaluates `EXPR` as Lisp source directly.
fn wrap_calc_expr(expr: &str) -> String {
    format!("(calc \"{}\")", expr.replace('\\', "\\\\").replace('"', "\\\""))
}

fn run_one_shot(interp: &Interpreter, env: &Rc<Environment>, source: &str, print_result: bool) -> ExitCode {
    match parser::parse(source) {
        Ok(expr) => {
            let result = eval::eval(interp, &expr, env);
            if interp.has_error() {
                return ExitCode::from(1);
            }
            if print_result {
                println!("{result}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("parse error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run_script(interp: &Interpreter, env: &Rc<Environment>, path: &PathBuf) -> ExitCode {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("cannot read script file {}: {e}", path.display());
            return ExitCode::from(2);
        }
    };
    let forms = match parser::parse_all(&contents) {
        Ok(forms) => forms,
        Err(e) => {
            eprintln!("parse error: {e}");
            return ExitCode::from(1);
        }
    };
    for form in &forms {
        interp.clear();
        eval::eval(interp, form, env);
        if interp.has_error() {
            return ExitCode::from(1);
        }
    }
    ExitCode::SUCCESS
}

/// Loads every `.scm` file in the first `nadalib` directory found on
/// `AUTOLOAD_SEARCH_PATH`, in sorted order, directly into `env` (bypassing
/// the sandbox's installed-singleton step, since the autoloader runs
/// before `set_sandbox_storage` and its search roots aren't necessarily
/// inside the sandboxed tree the user configured).
fn autoload(sandbox: &Sandbox, env: &Rc<Environment>) {
    let interp = Interpreter::with_sink(|kind, msg| {
        eprintln!("autoload: {kind}: {msg}");
    });
    for dir in AUTOLOAD_SEARCH_PATH {
        let files = match sandbox.list_scm_files(dir) {
            Ok(files) if !files.is_empty() => files,
            _ => continue,
        };
        for file in files {
            let path = format!("{dir}/{file}");
            let contents = match sandbox.read_file(&path) {
                Ok(c) => c,
                Err(_) => continue,
            };
            match parser::parse_all(&contents) {
                Ok(forms) => {
                    for form in &forms {
                        eval::eval(&interp, form, env);
                    }
                }
                Err(e) => eprintln!("autoload: parse error in {path}: {e}"),
            }
        }
        return;
    }
}

fn build_fs_config(args: &CliArgs) -> FsConfig {
    let allowed_paths = if args.fs_paths.is_empty() {
        FsConfig::default().allowed_paths
    } else {
        args.fs_paths.clone()
    };
    FsConfig { allowed_paths, max_file_size: args.max_file_size }
}
