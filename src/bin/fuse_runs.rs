//! Fuse two or more TREC run files into one.
//!
//! ```text
//! trecfuse-fuse-runs -runs run1.txt run2.txt -output fused.txt -method rrf
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` to change the level (default `info`).

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let code = trecfuse::run(std::env::args().skip(1), &mut std::io::stderr());
    std::process::exit(code);
}
