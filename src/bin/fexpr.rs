use clap::Parser;
use fieldexpr::{evaluate, vars_from_json, Value};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::Level;

/// Evaluate a fieldexpr expression from the command line.
#[derive(Parser, Debug)]
#[command(name = "fexpr", version, about)]
struct Args {
    /// Expression to evaluate, e.g. 'left_pad(code, "0", 6)'
    expression: String,

    /// Variables as name=value (quoted text is a string; true/false, nil/null, integers and floats are typed)
    #[arg(value_name = "NAME=VALUE")]
    vars: Vec<String>,

    /// Variables as a JSON object, e.g. '{"code": 42}'
    #[arg(long, value_name = "OBJECT", conflicts_with = "vars")]
    json: Option<String>,

    /// Output result in JSON format with type and timing
    #[arg(long)]
    output_json: bool,

    /// Log at debug level (overrides FEXPR_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    result: &'a Value,
    #[serde(rename = "type")]
    type_name: &'a str,
    execution_time: String,
}

fn log_level(verbose: bool) -> Level {
    if verbose {
        return Level::DEBUG;
    }
    std::env::var("FEXPR_LOG")
        .ok()
        .and_then(|v| v.parse::<Level>().ok())
        .unwrap_or(Level::WARN)
}

fn parse_value(s: &str) -> Value {
    // Check for string (quoted)
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        return Value::String(s[1..s.len() - 1].to_string());
    }

    match s {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "nil" | "null" => return Value::Nil,
        _ => {}
    }

    if let Ok(n) = s.parse::<i64>() {
        return Value::Int(n);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }

    // Default to string if nothing else matches
    Value::String(s.to_string())
}

fn parse_assignments(assignments: &[String]) -> Result<HashMap<String, Value>, String> {
    let mut vars = HashMap::new();
    for arg in assignments {
        let (name, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("Invalid variable assignment: '{}'. Use format: name=value", arg))?;
        vars.insert(name.to_string(), parse_value(value));
    }
    Ok(vars)
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(log_level(args.verbose))
        .init();

    let vars = match &args.json {
        Some(json) => vars_from_json(json).map_err(|e| e.to_string()),
        None => parse_assignments(&args.vars),
    };
    let vars = match vars {
        Ok(vars) => vars,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let start_time = Instant::now();
    let result = evaluate(&args.expression, &vars);
    let execution_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    match result {
        Ok(val) => {
            if args.output_json {
                let output = JsonOutput {
                    result: &val,
                    type_name: val.type_name(),
                    execution_time: format!("{:.2} ms", execution_time_ms),
                };
                match serde_json::to_string_pretty(&output) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(2);
                    }
                }
            } else {
                println!("{}", val);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}
