use calc::Lexer;
use clap::ArgAction;
use clap::Parser;
use log::LevelFilter;
use log::info;

/// Evaluates an arithmetic expression given on the command line.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Print the token stream instead of evaluating.
    #[arg(short, long)]
    tokens: bool,

    /// Print the parsed expression tree before the result.
    #[arg(short = 'p', long)]
    tree: bool,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// The expression; all arguments are joined with single spaces.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    expression: Vec<String>,
}

// clap swallows a `--` separator, but it belongs to the expression.
fn expression_args(raw: &[String]) -> &[String] {
    let start = raw
        .iter()
        .position(|arg| !is_flag(arg))
        .unwrap_or(raw.len());
    &raw[start..]
}

fn is_flag(arg: &str) -> bool {
    match arg {
        "--tokens" | "--tree" | "--verbose" => true,
        _ => match arg.strip_prefix('-') {
            Some(shorts) if !shorts.is_empty() => {
                shorts.chars().all(|c| matches!(c, 't' | 'p' | 'v'))
            }
            _ => false,
        },
    }
}

fn main() -> miette::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let expression = expression_args(&raw).join(" ");
    debug_assert!(expression.ends_with(&args.expression.join(" ")));
    info!("evaluating `{expression}`");

    if args.tokens {
        for token in Lexer::new(&expression) {
            println!("{token}");
        }
        return Ok(());
    }

    let value = if args.tree {
        let expr = calc::Parser::new(&expression).parse()?;
        println!("{expr}");
        expr.compute().map_err(|err| err.with_source(&expression))?
    } else {
        calc::calculate(&expression)?
    };
    println!("{value}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expression(args: &[&str]) -> String {
        let raw: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        expression_args(&raw).join(" ")
    }

    #[test]
    fn leading_flags_are_skipped() {
        assert_eq!(expression(&["-t", "--tree", "-vv", "3", "+", "4"]), "3 + 4");
        assert_eq!(expression(&["-tpv", "1"]), "1");
    }

    #[test]
    fn double_dash_is_kept() {
        assert_eq!(expression(&["--", "3"]), "-- 3");
        assert_eq!(expression(&["-v", "--", "3"]), "-- 3");
    }

    #[test]
    fn flags_after_the_expression_are_kept() {
        assert_eq!(expression(&["3", "-v"]), "3 -v");
        assert_eq!(expression(&["10", "-", "3"]), "10 - 3");
    }
}
