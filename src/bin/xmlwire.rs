use std::env;
use std::error::Error;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use xmlwire::{
    ErrorPolicy, FileExistsPolicy, FileInput, FileOutput, InputProvider, OutputTarget, StdinInput,
    StdoutOutput, TranscodeEngine, TranscodeJob, WireFormat, build_engine_from_path,
};

fn print_usage_and_exit() -> ! {
    eprintln!("Usage:");
    eprintln!("  xmlwire [--text | --binary] [--force] <input> <output>");
    eprintln!("  xmlwire --config <pipeline.yaml>");
    eprintln!();
    eprintln!("Use '-' for stdin/stdout. The input format is detected automatically;");
    eprintln!("without --text/--binary the output format follows XMLWIRE_BINARY.");
    std::process::exit(1);
}

fn run_config(path: String) -> Result<(), Box<dyn Error>> {
    let engine = build_engine_from_path(path)?;
    engine.run()?;
    Ok(())
}

fn run_one_to_one(
    input: String,
    output: String,
    format: WireFormat,
    force: bool,
) -> Result<(), Box<dyn Error>> {
    let provider: Arc<dyn InputProvider> = if input == "-" {
        Arc::new(StdinInput::new())
    } else {
        Arc::new(FileInput::new(input.clone().into()))
    };
    let target: Arc<dyn OutputTarget> = if output == "-" {
        Arc::new(StdoutOutput::new())
    } else {
        Arc::new(FileOutput::new(output.into()))
    };
    let policy = if force {
        FileExistsPolicy::Overwrite
    } else {
        FileExistsPolicy::Error
    };

    let job = TranscodeJob::new(input, provider, target)
        .with_format(format)
        .with_file_exists_policy(policy);
    TranscodeEngine::new(ErrorPolicy::FastFail, vec![job]).run()?;
    Ok(())
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut format = None;
    let mut force = false;
    let mut positional = Vec::new();
    let mut args = env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config requires a path")?;
                return run_config(path);
            }
            "--text" => format = Some(WireFormat::Text),
            "--binary" => format = Some(WireFormat::Binary),
            "--force" | "-f" => force = true,
            "-h" | "--help" => print_usage_and_exit(),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let (Some(input), Some(output), None) =
        (positional.next(), positional.next(), positional.next())
    else {
        return Err("expected exactly one input and one output".into());
    };

    run_one_to_one(input, output, format.unwrap_or_default(), force)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("xmlwire error: {e}");
        print_usage_and_exit();
    }
}
