use fff_browser::{Error, FileSource, GatherArgs, Host, Source, SourceOptions, TreePath};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

struct TerminalHost;

impl Host for TerminalHost {
    fn current_path(&self) -> Result<String, Error> {
        std::env::current_dir()
            .map(|dir| dir.to_string_lossy().into_owned())
            .map_err(|e| Error::Host(e.to_string()))
    }

    fn print_error(&self, message: &str) {
        eprintln!("error: {message}");
    }
}

fn gather_once(source: &mut FileSource, path: &TreePath, input: &str) {
    let start = Instant::now();
    let mut batches = 0;
    let mut entries = 0;

    for batch in source.gather(&TerminalHost, GatherArgs::new(path.clone(), input)) {
        batches += 1;
        entries += batch.len();
        for entry in batch.iter().take(5) {
            println!("  {}", entry.label());
        }
        if batch.len() > 5 {
            println!("  ... {} more", batch.len() - 5);
        }
    }

    println!(
        "{} entries in {} batches ({:?})",
        entries,
        batches,
        start.elapsed()
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let path = TreePath::from(args.next().unwrap_or_default());
    let input = args.next().unwrap_or_default();

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        if let Err(e) = ctrlc::set_handler(move || shutdown.store(true, Ordering::Relaxed)) {
            eprintln!("failed to install Ctrl-C handler: {e}");
            return;
        }
    }

    let mut source = FileSource::new();
    gather_once(&mut source, &path, &input);

    let options = SourceOptions { path: path.clone() };
    info!("Watching for changes, press Ctrl-C to stop");
    while !shutdown.load(Ordering::Relaxed) {
        thread::sleep(Duration::from_secs(1));
        if source.check_updated(&TerminalHost, &options) {
            println!("directory changed, re-gathering");
            gather_once(&mut source, &path, &input);
        }
    }
}
