//! Application run: logger init, read input, render, write output.

use std::io::{self, Write};

use chatdoc::app;
use chatdoc::config::Config;
use chatdoc::{CopyState, Overrides, Renderer, SystemClipboard, normalize_str};

use crate::cli::{Args, Format};

/// Initialize env_logger at the level chosen by -v/-q; RUST_LOG still wins.
pub fn init_logger(args: &Args) {
    let log_level = args.log_level();
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));
    logger.target(env_logger::Target::Stderr);
    let _ = logger.try_init();
}

fn read_input(args: &Args) -> io::Result<String> {
    match &args.input {
        Some(path) if !args.reads_stdin() => std::fs::read_to_string(path),
        _ => io::read_to_string(io::stdin()),
    }
}

/// Render the input once and write it in the requested format.
pub async fn run(args: &Args, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    log::debug!("{} {}", app::NAME, app::VERSION);

    let content = read_input(args)?;
    if content.trim().is_empty() {
        eprintln!("Error: empty input");
        std::process::exit(1);
    }

    let mut options = config.render_options();
    options.animated |= args.animated;
    options.check_link_credibility |= args.check_links;
    options.enable_copy |= args.copy;
    log::debug!("render options: {:?}", options);

    let renderer = Renderer::with_clipboard(Overrides::default(), config.clipboard())
        .ack_window(config.copy_ack);
    let mut rendered = renderer.render(Some(&content), &options);

    if args.copy
        && let Some(copy) = rendered.copy.as_mut()
    {
        report_copy(copy).await;
    }

    let output = match args.format {
        Format::Html => rendered.to_html(),
        Format::Json => serde_json::to_string_pretty(&rendered.document)?,
        Format::Text => rendered.document.to_plain_text(),
        Format::Normalized => normalize_str(&content),
    };
    write_output(args, &output)?;
    Ok(())
}

async fn report_copy(copy: &mut chatdoc::CopyController<SystemClipboard>) {
    match copy.copy().await {
        CopyState::Copied => eprintln!("{}", CopyState::Copied.label()),
        CopyState::Idle => eprintln!("Copy failed (run with -v for details)"),
    }
}

fn write_output(args: &Args, output: &str) -> io::Result<()> {
    match &args.output {
        Some(path) => std::fs::write(path, output),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(output.as_bytes())?;
            if !output.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            stdout.flush()
        }
    }
}
