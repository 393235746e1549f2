//! # CLI - binary cookie shell
//!
//! A REPL over a single binary cookie file. Reads commands from stdin and
//! prints results to stdout, so it works both interactively and piped.
//!
//! ## Commands
//!
//! ```text
//! LIST               Print every cookie with its index
//! PAGES              Show the page layout of the file on disk
//! CHECKSUM           Print the file's trailing checksum
//! DEL idx [idx...]   Remove cookies by index (as printed by LIST)
//! SAVE               Write the current cookie list back to disk
//! RELOAD             Discard changes and re-read the file
//! EXIT / QUIT        Leave the shell (unsaved changes are dropped)
//! ```
//!
//! ## Configuration
//!
//! ```text
//! BINCOOKIE_PATH        cookie file path             (default: "Cookies.binarycookies")
//! BINCOOKIE_PAGE_BYTES  page budget when saving      (default: 4096)
//! BINCOOKIE_BACKUP      keep <path>.bak on save      (default: "true")
//! BINCOOKIE_UNTRUSTED_CHECKSUM
//!                       allow SAVE after DEL, keeping (default: "false")
//!                       the checksum read from disk
//! RUST_LOG              log filter, logs go to stderr (default: "warn")
//! ```

use anyhow::Result;
use bincookie::{decode_pages, CookieFile};
use config::Config;
use std::io::{self, BufRead, Write};
use store::{BinaryCookieFile, CookieStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_list(file: &CookieFile) {
    if file.is_empty() {
        println!("(empty)");
        return;
    }
    for (i, c) in file.records.iter().enumerate() {
        println!(
            "{:>4}  {}  {}={}  path={}  created={}  expires={}",
            i, c.domain, c.name, c.value, c.path, c.created, c.expires
        );
    }
    println!("({} cookies)", file.len());
}

fn print_pages(store: &BinaryCookieFile) -> Result<()> {
    let bytes = store.read_bytes()?;
    let paged = decode_pages(&bytes)?;
    for (i, page) in paged.pages.iter().enumerate() {
        println!("page {}: {} cookies", i, page.len());
    }
    println!("({} pages)", paged.pages.len());
    Ok(())
}

fn parse_indices<'a, I>(args: I) -> Option<Vec<usize>>
where
    I: Iterator<Item = &'a str>,
{
    let indices: Option<Vec<usize>> = args.map(|a| a.parse().ok()).collect();
    indices.filter(|v| !v.is_empty())
}

fn main() -> Result<()> {
    init_logging();

    let cfg = Config::from_env();
    let store = BinaryCookieFile::new(&cfg.path)
        .with_encode_options(cfg.encode_options())
        .with_backup(cfg.backup)
        .with_untrusted_checksum(cfg.untrusted_checksum);

    let mut file = store.load()?;
    info!(path = %cfg.path.display(), records = file.len(), "opened cookie file");

    println!(
        "bincookie shell (path={}, cookies={}, page_bytes={}, backup={})",
        cfg.path.display(),
        file.len(),
        cfg.page_bytes,
        cfg.backup
    );
    println!("Commands: LIST | PAGES | CHECKSUM | DEL idx... | SAVE | RELOAD | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            match cmd.to_uppercase().as_str() {
                "LIST" => print_list(&file),
                "PAGES" => {
                    if let Err(e) = print_pages(&store) {
                        println!("ERR pages failed: {}", e);
                    }
                }
                "CHECKSUM" => println!("{}", file.checksum),
                "DEL" => match parse_indices(parts) {
                    Some(indices) => {
                        if let Some(bad) = indices.iter().find(|&&i| i >= file.len()) {
                            println!("ERR no cookie at index {}", bad);
                        } else {
                            let before = file.len();
                            file = file.without(&indices);
                            println!("OK ({} removed)", before - file.len());
                        }
                    }
                    None => println!("ERR usage: DEL idx [idx...]"),
                },
                "SAVE" => match store.save(&file) {
                    Ok(()) => println!("OK ({} cookies saved)", file.len()),
                    Err(e) => println!("ERR save failed: {:#}", e),
                },
                "RELOAD" => match store.load() {
                    Ok(f) => {
                        file = f;
                        println!("OK ({} cookies)", file.len());
                    }
                    Err(e) => println!("ERR reload failed: {:#}", e),
                },
                "EXIT" | "QUIT" => {
                    println!("bye");
                    break;
                }
                other => {
                    println!("unknown command: {}", other);
                }
            }
        }
        print!("> ");
        io::stdout().flush().ok();
    }

    Ok(())
}
