//!
//! marquee CLI binary
//! ------------------
//! Command-line tool and interactive interpreter for a remote movie
//! catalog service. Signs in against the service, lists and inspects
//! movies, and manages favorites and the user profile. Supports one-shot
//! commands and a REPL, with an optional session file so a sign-in
//! survives across invocations.

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use marquee::api::CatalogClient;
use marquee::cli::{print_movie_table, print_profile};
use marquee::error::ApiError;
use marquee::model::{NewUser, UserUpdate};
use marquee::session::SessionStore;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} --api <url> [--user <u> --password <p>] [--session-file <path>] <command...>\n  {program} --api <url> [--session-file <path>] --repl    # start interactive interpreter\n\nFlags:\n  --api <url>              Base address of the catalog service (or MARQUEE_API env var)\n  --user <u>               Username for auto-login before running commands\n  --password <p>           Password for auto-login\n  --session-file <path>    Persist the signed-in session to this JSON file and reload it next run\n  --repl                   Start interactive mode\n  -h, --help               Show this help\n\nCommands (one-shot or interactive):\n  login <user> <password>                 sign in and store the session\n  register <user> <password> <email> [birthday YYYY-MM-DD]\n  logout                                  drop the local session\n  movies                                  list the catalog as a table\n  movie <title>                           show one movie as JSON\n  genre <name>                            show a genre description\n  director <name>                         show a director biography\n  profile                                 show the signed-in user\n  favorites                               list favorite movie ids\n  favorite <movie-id>                     add a favorite\n  unfavorite <movie-id>                   remove a favorite\n  update email|username|password <value>  edit the profile\n  delete-account confirm                  delete the account server-side\n  status                                  show connection and sign-in state\n  help                                    show this help\n  quit | exit                             leave the interpreter\n\nExamples:\n  {program} --api https://catalog.example.com --user ana --password s3cret movies\n  {program} --api https://catalog.example.com --session-file ~/.marquee.json --repl\n    > login ana s3cret\n    > favorite 6822fabc12\n"
    );
}

fn main() -> Result<()> {
    // Initialize tracing so request diagnostics are visible on the command line
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);

    let mut api: Option<String> = None;
    let mut user: Option<String> = None;
    let mut password: Option<String> = None;
    let mut session_file: Option<String> = None;
    let mut repl = false;
    let mut command: Vec<String> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--api" => {
                if i + 1 >= args.len() { eprintln!("--api requires a URL"); print_usage(&program); std::process::exit(2); }
                api = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--user" => {
                if i + 1 >= args.len() { eprintln!("--user requires a value"); print_usage(&program); std::process::exit(2); }
                user = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--password" => {
                if i + 1 >= args.len() { eprintln!("--password requires a value"); print_usage(&program); std::process::exit(2); }
                password = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--session-file" => {
                if i + 1 >= args.len() { eprintln!("--session-file requires a path"); print_usage(&program); std::process::exit(2); }
                session_file = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--repl" => { repl = true; i += 1; continue; }
            "-h" | "--help" => {
                print_usage(&program);
                return Ok(());
            }
            word => {
                // everything after the flags is the one-shot command
                command.push(word.to_string());
                i += 1; continue;
            }
        }
    }

    let api_url = match api.or_else(|| env::var("MARQUEE_API").ok()) {
        Some(u) => u,
        None => {
            eprintln!("--api <url> or the MARQUEE_API environment variable is required");
            print_usage(&program);
            std::process::exit(2);
        }
    };

    let store = SessionStore::new();
    let session_path = session_file.map(PathBuf::from);
    if let Some(path) = &session_path {
        if let Err(e) = store.load(path) {
            eprintln!("Failed to read session file '{}': {}", path.display(), e);
        }
    }

    let client = CatalogClient::new(&api_url, store.clone())
        .with_context(|| format!("invalid API base address '{}'", api_url))?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    // Auto-login when credentials were passed as flags
    if let (Some(u), Some(p)) = (user.as_deref(), password.as_deref()) {
        match rt.block_on(client.login(u, p)) {
            Ok(session) => println!("signed in as {}", session.user.username),
            Err(e) => {
                eprintln!("login failed: {}", e.user_message());
                std::process::exit(1);
            }
        }
        persist(&store, session_path.as_deref());
    }

    if repl && command.is_empty() {
        return run_repl(rt, client, store, session_path);
    }

    if command.is_empty() {
        print_usage(&program);
        std::process::exit(2);
    }

    let words: Vec<&str> = command.iter().map(|s| s.as_str()).collect();
    let ok = run_command(&rt, &client, &words);
    persist(&store, session_path.as_deref());
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn run_repl(
    rt: tokio::runtime::Runtime,
    client: CatalogClient,
    store: SessionStore,
    session_path: Option<PathBuf>,
) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut input = String::new();
    println!("marquee interpreter. Type 'help' for commands.");
    loop {
        input.clear();
        print!("> ");
        let _ = stdout.flush();
        if stdin.read_line(&mut input).is_err() {
            break;
        }
        if input.is_empty() {
            break; // EOF
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        let lower = words[0].to_ascii_lowercase();
        if lower == "quit" || lower == "exit" {
            break;
        }
        if lower == "help" {
            print_usage("marquee_cli");
            continue;
        }
        run_command(&rt, &client, &words);
        persist(&store, session_path.as_deref());
    }
    persist(&store, session_path.as_deref());
    Ok(())
}

/// Dispatch one command line. Returns false when the command failed (or
/// was malformed) so one-shot mode can exit nonzero.
fn run_command(rt: &tokio::runtime::Runtime, client: &CatalogClient, words: &[&str]) -> bool {
    match words[0].to_ascii_lowercase().as_str() {
        "login" => {
            if words.len() < 3 {
                eprintln!("usage: login <user> <password>");
                return false;
            }
            match rt.block_on(client.login(words[1], words[2])) {
                Ok(session) => {
                    println!("signed in as {}", session.user.username);
                    true
                }
                Err(e) => report(e),
            }
        }
        "register" => {
            if words.len() < 4 {
                eprintln!("usage: register <user> <password> <email> [birthday YYYY-MM-DD]");
                return false;
            }
            let birthday = match words.get(4) {
                Some(raw) => match raw.parse() {
                    Ok(d) => Some(d),
                    Err(_) => {
                        eprintln!("birthday must be YYYY-MM-DD");
                        return false;
                    }
                },
                None => None,
            };
            let form = NewUser {
                username: words[1].to_string(),
                password: words[2].to_string(),
                email: words[3].to_string(),
                birthday,
            };
            match rt.block_on(client.register(&form)) {
                Ok(created) => {
                    println!("registered {}; now 'login {} <password>'", created.username, created.username);
                    true
                }
                Err(e) => report(e),
            }
        }
        "logout" => {
            client.logout();
            println!("signed out");
            true
        }
        "movies" => match rt.block_on(client.movies()) {
            Ok(movies) => {
                let favorites = client.session().user().map(|u| u.favorite_movies).unwrap_or_default();
                if !print_movie_table(&movies, &favorites) {
                    println!("the catalog is empty");
                }
                true
            }
            Err(e) => report(e),
        },
        "movie" => {
            if words.len() < 2 {
                eprintln!("usage: movie <title>");
                return false;
            }
            let title = words[1..].join(" ");
            match rt.block_on(client.movie(&title)) {
                Ok(movie) => {
                    print_json(&movie);
                    true
                }
                Err(e) => report(e),
            }
        }
        "genre" => {
            if words.len() < 2 {
                eprintln!("usage: genre <name>");
                return false;
            }
            let name = words[1..].join(" ");
            match rt.block_on(client.genre(&name)) {
                Ok(genre) => {
                    println!("{}", genre.name);
                    if let Some(description) = genre.description {
                        println!("{}", description);
                    }
                    true
                }
                Err(e) => report(e),
            }
        }
        "director" => {
            if words.len() < 2 {
                eprintln!("usage: director <name>");
                return false;
            }
            let name = words[1..].join(" ");
            match rt.block_on(client.director(&name)) {
                Ok(director) => {
                    println!("{}", director.name);
                    if let Some(bio) = director.bio {
                        println!("{}", bio);
                    }
                    true
                }
                Err(e) => report(e),
            }
        }
        "profile" => match rt.block_on(client.user()) {
            Ok(user) => {
                print_profile(&user);
                true
            }
            Err(e) => report(e),
        },
        "favorites" => match rt.block_on(client.favorites()) {
            Ok(favorites) => {
                if favorites.is_empty() {
                    println!("no favorites yet");
                } else {
                    for id in favorites {
                        println!("{}", id);
                    }
                }
                true
            }
            Err(e) => report(e),
        },
        "favorite" => {
            if words.len() < 2 {
                eprintln!("usage: favorite <movie-id>");
                return false;
            }
            match rt.block_on(client.add_favorite(words[1])) {
                Ok(user) => {
                    println!("favorites: {}", user.favorite_movies.join(", "));
                    true
                }
                Err(e) => report(e),
            }
        }
        "unfavorite" => {
            if words.len() < 2 {
                eprintln!("usage: unfavorite <movie-id>");
                return false;
            }
            match rt.block_on(client.remove_favorite(words[1])) {
                Ok(user) => {
                    if user.favorite_movies.is_empty() {
                        println!("no favorites left");
                    } else {
                        println!("favorites: {}", user.favorite_movies.join(", "));
                    }
                    true
                }
                Err(e) => report(e),
            }
        }
        "update" => {
            if words.len() < 3 {
                eprintln!("usage: update email|username|password <value>");
                return false;
            }
            let Some(cached) = client.session().user() else {
                eprintln!("error: {}", ApiError::identity("no_session", "no signed-in user; log in first").user_message());
                return false;
            };
            let mut form = UserUpdate::from_user(&cached);
            let value = words[2..].join(" ");
            match words[1].to_ascii_lowercase().as_str() {
                "email" => form.email = value,
                "username" => form.username = value,
                "password" => form.password = Some(value),
                other => {
                    eprintln!("unknown profile field '{}'", other);
                    return false;
                }
            }
            match rt.block_on(client.update_user(&form)) {
                Ok(user) => {
                    println!("profile updated");
                    print_profile(&user);
                    true
                }
                Err(e) => report(e),
            }
        }
        "delete-account" => {
            if words.get(1) != Some(&"confirm") {
                eprintln!("this permanently deletes the account; run 'delete-account confirm'");
                return false;
            }
            match rt.block_on(client.delete_account()) {
                Ok(()) => {
                    println!("account deleted");
                    true
                }
                Err(e) => report(e),
            }
        }
        "status" => {
            println!("api: {}", client.base());
            match client.session().user() {
                Some(user) => println!("signed in as {}", user.username),
                None => println!("not signed in"),
            }
            true
        }
        "help" => {
            print_usage("marquee_cli");
            true
        }
        unknown => {
            eprintln!("unknown command '{}'; type 'help'", unknown);
            false
        }
    }
}

fn report(err: ApiError) -> bool {
    // Full status/body detail already went to the tracing channel
    eprintln!("error: {}", err.user_message());
    false
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("error: {}", e),
    }
}

fn persist(store: &SessionStore, path: Option<&std::path::Path>) {
    if let Some(path) = path {
        if let Err(e) = store.save(path) {
            eprintln!("Failed to write session file '{}': {}", path.display(), e);
        }
    }
}
