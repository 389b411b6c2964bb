// Thread demo: a synthetic discussion rendered with the pager and driven by the event loop.
use std::env;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Local};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;

use tui_threadview::{
    Comment, Document, EventLoop, ScrollPolicy, ThreadViewError, ThreadViewOptions,
    ThreadViewState,
};

struct DemoArgs {
    hide_collapsed: bool,
    snap: bool,
    log: PathBuf,
}

impl DemoArgs {
    fn usage() {
        eprintln!("Usage: thread_demo [OPTIONS]");
        eprintln!("Options:");
        eprintln!("  --hide-collapsed  Hide replies of folded comments");
        eprintln!("  --snap            Scroll to the selection on every move");
        eprintln!("  --log <FILE>      Log file (default: thread_demo.log in the temp dir)");
        eprintln!("  -h, --help        Show this help");
    }

    fn parse() -> Self {
        let mut parsed = Self {
            hide_collapsed: false,
            snap: false,
            log: env::temp_dir().join("thread_demo.log"),
        };
        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => {
                    Self::usage();
                    std::process::exit(0);
                }
                "--hide-collapsed" => parsed.hide_collapsed = true,
                "--snap" => parsed.snap = true,
                "--log" => {
                    if let Some(path) = args.next() {
                        parsed.log = PathBuf::from(path);
                    }
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    Self::usage();
                    std::process::exit(2);
                }
            }
        }
        parsed
    }
}

fn age_label(created: DateTime<Local>) -> String {
    let elapsed = Local::now().signed_duration_since(created);
    let (value, unit) = if elapsed.num_days() > 0 {
        (elapsed.num_days(), "day")
    } else if elapsed.num_hours() > 0 {
        (elapsed.num_hours(), "hour")
    } else {
        (elapsed.num_minutes().max(1), "minute")
    };
    let plural = if value == 1 { "" } else { "s" };
    format!("{value} {unit}{plural} ago")
}

const AUTHORS: [&str; 6] = ["ada", "brian", "grace", "ken", "linus", "margaret"];

const BODIES: [&str; 6] = [
    "<p>Folding long threads is the feature I missed most. With <i>hide collapsed</i> on, the whole sub-thread disappears.",
    "<p>> the whole sub-thread disappears<p>Only when the option is set; otherwise the replies stay visible under the marker.",
    "<p>Links render in their own style: <a href=\"https://example.com\">https://example.com</a>",
    "<p>Code keeps its indentation:<pre><code>  fn main() {\n      println!(\"hi\");\n  }</code></pre>",
    "<p>Unknown tags such as <b>bold</b> degrade to plain text instead of failing.",
    "<p>Short one.",
];

// Builds a discussion where comment `n` gets `n % 3` replies, down to `depth` levels.
fn build_comment(next_id: &mut u32, depth: usize, now: DateTime<Local>) -> Comment<u32> {
    let id = *next_id;
    *next_id += 1;
    let pick = id as usize % AUTHORS.len();
    let created = now - Duration::minutes(i64::from(id) * 37);
    let mut comment = Comment::new(id, AUTHORS[pick], BODIES[pick]).age(age_label(created));
    if depth > 0 {
        for _ in 0..(id % 3) + 1 {
            comment.push_reply(build_comment(next_id, depth - 1, now));
        }
    }
    comment
}

fn build_document() -> Document<u32> {
    let now = Local::now();
    let mut document = Document::new(0, "Ask: how do you read long threads?");
    let mut next_id = 1;
    for _ in 0..5 {
        document.push(build_comment(&mut next_id, 3, now));
    }
    document
}

fn main() -> io::Result<()> {
    let args = DemoArgs::parse();

    let log = File::create(&args.log)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let options = ThreadViewOptions::new()
        .head_selectable(false)
        .hide_collapsed(args.hide_collapsed)
        .scroll_policy(if args.snap {
            ScrollPolicy::SnapToSelection
        } else {
            ScrollPolicy::Manual
        });
    let mut state = ThreadViewState::builder()
        .head(build_document())
        .options(options)
        .build()
        .map_err(io::Error::other)?;

    // Copies land in a file so the demo has no system clipboard dependency.
    let clip_path = env::temp_dir().join("thread_demo_clipboard.txt");
    let clipboard = move |text: &str| -> tui_threadview::Result<()> {
        fs::write(&clip_path, text).map_err(|err| ThreadViewError::ClipboardFailure(err.to_string()))
    };
    let mut event_loop = EventLoop::new(clipboard);

    let mut terminal = ratatui::init();
    execute!(io::stdout(), EnableMouseCapture)?;
    let result = event_loop.run(&mut terminal, &mut state);
    execute!(io::stdout(), DisableMouseCapture)?;
    ratatui::restore();

    result.map_err(io::Error::other)
}
