use htmldoc::cleanup::TempRegistry;
use htmldoc::cli::{self, Invocation, RunError};
use htmldoc::env::Env;
use htmldoc::manifest::ManifestExporter;
use htmldoc::options::UsageError;
use htmldoc::{cgi, logging, options};
use std::error::Error;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let env = Env::from_process();
    let in_cgi = cgi::detect(&env);
    if !in_cgi && options::version_requested(&args) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let mut invocation = Invocation::new(&args, &env).stdin(std::io::stdin().lock());
    match logging::initialize_logging() {
        Ok(log) => invocation = invocation.log(log),
        Err(e) => eprintln!("Unable to initialize logging: {}", e),
    }
    let registry = TempRegistry::default();
    if let Err(e) = registry.install_signal_handler() {
        tracing::warn!("Unable to install signal handler: {}", e);
    }
    invocation = invocation.registry(registry);

    let mut exporter = ManifestExporter::default();
    match cli::run_with(invocation, &mut exporter) {
        Ok(errors) => std::process::exit(errors.min(255) as i32),
        Err(e) => {
            if !matches!(e, RunError::Usage(UsageError::Help)) {
                eprintln!("ERROR: {}", e);
            }
            if cli::verbose_requested(&args) {
                let mut source = e.source();
                while let Some(s) = source {
                    eprintln!("  cause: {}", s);
                    source = s.source();
                }
            }
            if let RunError::Usage(_) = e {
                if in_cgi {
                    print!("{}", cli::usage_text(true));
                } else {
                    eprint!("{}", cli::usage_text(false));
                }
            }
            std::process::exit(e.exit_code());
        }
    }
}
