//! mibwalk: walk an SNMPv1 subtree and print it through a MIB tree.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use mibwalk::cli::args::WalkArgs;
use mibwalk::cli::load_tree;
use mibwalk::walk::{WalkListener, WalkResult, dispatch, spawn_walk};

struct Printer {
    verbose: bool,
}

impl WalkListener for Printer {
    fn on_address_resolved(&mut self, input: &str, canonical: &str) {
        if self.verbose {
            eprintln!("Walking {} ({})", input, canonical);
        }
    }

    fn on_result(&mut self, result: &WalkResult) {
        println!("{}", result);
    }

    fn on_terminated(&mut self, message: &str) {
        if !message.is_empty() {
            eprintln!("{}", message);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = WalkArgs::parse();
    args.init_tracing();

    let tree = match load_tree(args.mib.as_deref()) {
        Ok(tree) => Arc::new(tree),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let handle = spawn_walk(args.walk_request(), tree);
    let cancel = handle.cancellation_token();
    let walk = dispatch(handle, vec![Box::new(Printer { verbose: args.verbose })]);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let outcome = match walk.await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if mibwalk::walk::status_message(&outcome, &args.host).is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
