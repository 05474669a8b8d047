//! pagescope - interactive PostgreSQL page inspector
//!
//! Usage:
//!   pagescope <relation-file>
//!
//! Opens a raw heap or index relation file and starts a command loop:
//!   page <n>    - select page number (0-based)
//!   cat         - hex dump of current page
//!   format      - ASCII art page layout
//!   info        - page header and special region details
//!   data        - line pointers and tuple data
//!   pages       - list all pages with summary
//!   help        - show this help
//!   quit/exit   - exit

use pagescope::common::logging;
use pagescope::display::{hexdump, layout, report};
use pagescope::storage::page::Page;
use pagescope::storage::page_io::RelationFile;
use pagescope::Result;
use std::io::{self, BufRead, Write};
use std::process::exit;

const HELP: &str = "Commands:
  page <n>    - select page number (0-based)
  cat         - hex dump of current page
  format      - ASCII art page layout
  info        - page header and special region details
  data        - line pointers and tuple data
  pages       - list all pages with summary
  help        - show this help
  quit/exit   - exit";

fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: pagescope <relation-file>");
        eprintln!("  Inspect PostgreSQL heap/index data files page by page.");
        exit(1);
    }

    let mut rel = match RelationFile::open(&args[1]) {
        Ok(rel) => rel,
        Err(e) => {
            eprintln!("Error: {e}");
            exit(1);
        }
    };

    if let Err(e) = run(&mut rel) {
        eprintln!("Error: {e}");
        exit(1);
    }
}

fn run(rel: &mut RelationFile) -> Result<()> {
    let mut current = load_initial_page(rel);

    let file_type = current
        .as_ref()
        .map_or_else(|| "unknown".to_string(), |p| p.page_type().to_string());

    println!("pagescope - PostgreSQL Page Inspector");
    println!(
        "File: {} ({} bytes, {} pages, detected: {})",
        rel.path().display(),
        rel.size(),
        rel.page_count(),
        file_type
    );
    println!();
    println!("{HELP}");
    println!();
    if let Some(page) = &current {
        println!("[page 0 loaded, type: {}]", page.page_type());
    }

    let stdin = io::stdin();
    loop {
        let current_num = current.as_ref().map_or(0, Page::page_num);
        print!("pagescope(page {current_num})> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let cmd = parts.next().unwrap_or("").to_lowercase();
        let arg = parts.next();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Bye.");
                break;
            }
            "help" | "h" | "?" => println!("{HELP}"),
            "page" | "p" => cmd_page(rel, &mut current, arg),
            "cat" | "c" => with_page(&current, |page| {
                print!("{}", hexdump::hex_dump(page.raw())?);
                Ok(())
            }),
            "format" | "f" => with_page(&current, |page| {
                print!("{}", layout::page_layout(page)?);
                Ok(())
            }),
            "info" | "i" => with_page(&current, |page| {
                print!("{}", report::page_info(page)?);
                Ok(())
            }),
            "data" | "d" => with_page(&current, |page| {
                print!("{}", report::page_data(page)?);
                Ok(())
            }),
            "pages" => cmd_pages(rel),
            _ => println!("Unknown command: {cmd} (type 'help' for commands)"),
        }
    }
    Ok(())
}

fn load_initial_page(rel: &mut RelationFile) -> Option<Page> {
    if rel.page_count() == 0 {
        return None;
    }
    match rel.read_page(0) {
        Ok(page) => Some(page),
        Err(e) => {
            eprintln!("Error reading page 0: {e}");
            None
        }
    }
}

/// Run a command against the current page; errors abort the command,
/// never the session.
fn with_page(current: &Option<Page>, f: impl FnOnce(&Page) -> Result<()>) {
    match current {
        Some(page) => {
            if let Err(e) = f(page) {
                println!("Error: {e}");
            }
        }
        None => println!("No page loaded."),
    }
}

fn cmd_page(rel: &mut RelationFile, current: &mut Option<Page>, arg: Option<&str>) {
    let Some(arg) = arg else {
        match current {
            Some(page) => println!(
                "Current page: {} (of {}, type: {})",
                page.page_num(),
                rel.page_count(),
                page.page_type()
            ),
            None => println!("No page loaded."),
        }
        return;
    };

    let parsed = arg.parse::<usize>();
    let Ok(n) = parsed else {
        println!(
            "Invalid page number. Valid range: 0-{}",
            rel.page_count().saturating_sub(1)
        );
        return;
    };

    match rel.read_page(n) {
        Ok(page) => {
            println!("[page {n} loaded, type: {}]", page.page_type());
            *current = Some(page);
        }
        Err(e) => println!("Error reading page {n}: {e}"),
    }
}

fn cmd_pages(rel: &mut RelationFile) {
    match rel.scan() {
        Ok(scan) => {
            for page in scan {
                println!("{}", report::page_summary(&page));
            }
        }
        Err(e) => println!("Error scanning pages: {e}"),
    }
}
