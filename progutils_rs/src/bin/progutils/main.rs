use std::any::Any;
use std::io;
use std::panic;
use std::process::ExitCode;

use progutils::cli::{EntryOptions, run};
use tracing_subscriber::EnvFilter;

mod programs;

fn install_broken_pipe_handler() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let payload = info.payload();
        let is_broken = <dyn Any>::downcast_ref::<&str>(payload)
            .is_some_and(|s| s.contains("Broken pipe"))
            || <dyn Any>::downcast_ref::<String>(payload)
                .is_some_and(|s| s.contains("Broken pipe"));

        if is_broken {
            // Downstream closed the pipe, e.g. `progutils | head`.
            std::process::exit(0);
        }

        default_hook(info);
    }));
}

/// Logs go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

fn exit_code_to_u8(code: i32) -> u8 {
    code.clamp(0, i32::from(u8::MAX)) as u8
}

fn main() -> ExitCode {
    install_broken_pipe_handler();
    init_tracing();

    let tree = match programs::build_tree() {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("progutils: {e}");
            return ExitCode::FAILURE;
        }
    };

    let opts = EntryOptions::new("progutils", env!("CARGO_PKG_VERSION"));
    let code = run(&tree, std::env::args().collect(), &opts);
    ExitCode::from(exit_code_to_u8(code))
}
