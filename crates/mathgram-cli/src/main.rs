use std::{
    fs,
    io::{IsTerminal, Read},
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use mathgram_core::{CalendarDate, ExportFile, Renderer, check, escape};
use mathgram_store::{
    AuthError, MemoryStore, PostId, Registration, Session, Store, StoreError, authenticate,
    register,
};

mod config_file;
mod page;

use config_file::{Config, load_config_file};
use page::{Banner, render_feed};

/// Share math posts: render, export and discuss LaTeX
#[derive(Parser, Debug)]
#[command(version, about = "Share math posts: render, export and discuss LaTeX", long_about = None)]
struct Args {
    /// The configuration file
    #[arg(long, global = true, default_value = "mathgram.toml", value_name = "FILE")]
    config: PathBuf,

    /// The store snapshot, overriding the configuration
    #[arg(long, global = true, value_name = "FILE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Identity of the user a command acts for.
#[derive(clap::Args, Debug)]
struct Credentials {
    #[arg(long, value_name = "EMAIL")]
    email: String,

    #[arg(long, env = "MATHGRAM_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Escapes text for safe display in HTML
    Escape {
        /// The text file, or "-" for stdin
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Renders text with math into a standalone HTML document
    Render {
        /// The text file, or "-" for stdin
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// The element id of the rendered content
        #[arg(long, default_value = "math")]
        id: String,

        /// Emit the embeddable frame instead of the bare document
        #[arg(long)]
        iframe: bool,
    },

    /// Reports unclosed math delimiters
    Check {
        /// The text file, or "-" for stdin
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Exports a post or a text file as a LaTeX document
    Export {
        /// The id of a stored post to export
        #[arg(long, conflicts_with_all = ["file", "title", "author"])]
        post: Option<u64>,

        /// The document title
        #[arg(long, default_value = "")]
        title: String,

        /// The document author
        #[arg(long, default_value = "")]
        author: String,

        /// The text file, or "-" for stdin
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Directory to write the .tex file to; stdout if omitted
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Creates an account
    Register {
        #[arg(long, value_name = "EMAIL")]
        email: String,

        /// The name shown next to your posts
        #[arg(long)]
        name: Option<String>,

        #[arg(long, env = "MATHGRAM_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long, env = "MATHGRAM_CONFIRM_PASSWORD", hide_env_values = true)]
        confirm_password: String,
    },

    /// Checks credentials
    Login {
        #[command(flatten)]
        credentials: Credentials,
    },

    /// Publishes a post
    Post {
        #[command(flatten)]
        credentials: Credentials,

        #[arg(long)]
        title: String,

        /// The content file, or "-" for stdin
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Also write the feed page, showing the outcome as a banner
        #[arg(long, value_name = "FILE")]
        feed: Option<PathBuf>,
    },

    /// Writes the feed as an HTML page
    Feed {
        /// Show the likes of this user
        #[arg(long, value_name = "EMAIL", requires = "password")]
        email: Option<String>,

        #[arg(long, hide_env_values = true)]
        password: Option<String>,

        /// The HTML file to write; stdout if omitted
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Likes a post, or removes your like
    Like {
        #[command(flatten)]
        credentials: Credentials,

        #[arg(value_name = "POST")]
        post: u64,

        /// Also write the feed page, showing the outcome as a banner
        #[arg(long, value_name = "FILE")]
        feed: Option<PathBuf>,
    },

    /// Comments on a post
    Comment {
        #[command(flatten)]
        credentials: Credentials,

        #[arg(value_name = "POST")]
        post: u64,

        #[arg(long)]
        text: String,

        /// Also write the feed page, showing the outcome as a banner
        #[arg(long, value_name = "FILE")]
        feed: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = load_config_file(&args.config).unwrap_or_else(|e| {
        eprintln!("Config Error in '{}': {}", args.config.display(), e);
        std::process::exit(1);
    });
    if let Some(path) = args.store {
        config.store.path = path;
    }
    debug!("Using store at {}", config.store.path.display());

    match args.command {
        Command::Escape { file } => {
            print!("{}", escape(&read_input(file.as_deref())));
        }
        Command::Render { file, id, iframe } => {
            let renderer = Renderer::new(config.render);
            let fragment = renderer.render(&read_input(file.as_deref()), &id);
            for diagnostic in fragment.diagnostics() {
                tracing::warn!("{}", diagnostic);
            }
            if iframe {
                println!("{}", fragment.to_iframe_html());
            } else {
                println!("{}", fragment.document());
            }
        }
        Command::Check { file, no_color } => {
            let source_name = match file.as_deref() {
                Some(path) if path != Path::new("-") => path.display().to_string(),
                _ => "<stdin>".to_string(),
            };
            let content = read_input(file.as_deref());
            check_and_exit(&source_name, &content, !no_color);
        }
        Command::Export {
            post,
            title,
            author,
            file,
            output,
        } => {
            let export = match post {
                Some(id) => {
                    let store = open_store(&config);
                    let Some(post) = store.list_posts().into_iter().find(|p| p.id == PostId(id))
                    else {
                        exit_store_error(StoreError::NoSuchPost(PostId(id)));
                    };
                    ExportFile::new(
                        &post.title,
                        &post.content,
                        &post.author_name,
                        CalendarDate::today(),
                    )
                }
                None => ExportFile::new(
                    &title,
                    &read_input(file.as_deref()),
                    &author,
                    CalendarDate::today(),
                ),
            };
            write_export(&export, output.as_deref());
        }
        Command::Register {
            email,
            name,
            password,
            confirm_password,
        } => {
            let mut store = open_store(&config);
            let form = Registration {
                email: &email,
                name: name.as_deref(),
                password: &password,
                confirm_password: &confirm_password,
            };
            let id = register(&mut store, &form, config.auth.bcrypt_cost)
                .unwrap_or_else(|e| exit_auth_error(e));
            save_store(&store, &config);
            info!("Registered user {id}");
            println!("Usuário criado com sucesso! Agora você pode fazer login.");
        }
        Command::Login { credentials } => {
            let store = open_store(&config);
            let session = login(&store, &credentials);
            println!("👋 Olá, {}!", session.name);
        }
        Command::Post {
            credentials,
            title,
            file,
            feed,
        } => {
            let mut store = open_store(&config);
            let session = login(&store, &credentials);
            let content = read_input(file.as_deref());
            let outcome = session
                .create_post(&mut store, &title, &content)
                .map(|id| {
                    save_store(&store, &config);
                    info!("User {} published post {id}", session.user_id);
                    "Post publicado!".to_string()
                });
            finish_action(outcome, feed.as_deref(), &store, &session, &config);
        }
        Command::Feed {
            email,
            password,
            output,
        } => {
            let store = open_store(&config);
            let session = email.map(|email| {
                login(
                    &store,
                    &Credentials {
                        email,
                        password: password.unwrap_or_default(),
                    },
                )
            });
            let renderer = Renderer::new(config.render);
            let html = render_feed(&store, &renderer, session.as_ref(), None);
            match output {
                Some(path) => write_feed(&path, &html),
                None => print!("{html}"),
            }
        }
        Command::Like {
            credentials,
            post,
            feed,
        } => {
            let mut store = open_store(&config);
            let session = login(&store, &credentials);
            let outcome = session
                .toggle_like(&mut store, PostId(post))
                .map(|liked| {
                    save_store(&store, &config);
                    let message = if liked { "❤️ Curtido!" } else { "🤍 Curtida removida." };
                    message.to_string()
                });
            finish_action(outcome, feed.as_deref(), &store, &session, &config);
        }
        Command::Comment {
            credentials,
            post,
            text,
            feed,
        } => {
            let mut store = open_store(&config);
            let session = login(&store, &credentials);
            let outcome = session
                .create_comment(&mut store, PostId(post), &text)
                .map(|_| {
                    save_store(&store, &config);
                    "Comentário adicionado!".to_string()
                });
            finish_action(outcome, feed.as_deref(), &store, &session, &config);
        }
    }
}

/// Reads the given file, or stdin if there is none or it is "-".
fn read_input(file: Option<&Path>) -> String {
    match file {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).unwrap_or_else(|e| exit_io_error(e))
        }
        _ => read_stdin(),
    }
}

fn read_stdin() -> String {
    let mut buffer = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut buffer) {
        exit_io_error(e);
    }
    buffer
}

fn check_and_exit(source_name: &str, content: &str, color: bool) {
    let diagnostics = check(content);
    if diagnostics.is_empty() {
        return;
    }
    let color = color && std::io::stderr().is_terminal();
    for diagnostic in &diagnostics {
        let report = diagnostic.to_report(source_name, color);
        if let Err(e) = report.eprint((source_name, ariadne::Source::from(content))) {
            exit_io_error(e);
        }
    }
    std::process::exit(2);
}

/// Writes the export into `dir` under its generated filename, or to stdout.
fn write_export(export: &ExportFile, dir: Option<&Path>) {
    match dir {
        Some(dir) => {
            let path = dir.join(&export.filename);
            fs::write(&path, &export.contents).unwrap_or_else(|e| exit_io_error(e));
            info!("Exported {} ({})", path.display(), export.mime);
            println!("{}", path.display());
        }
        None => print!("{}", export.contents),
    }
}

fn open_store(config: &Config) -> MemoryStore {
    MemoryStore::load(&config.store.path)
        .unwrap_or_else(|e| exit_store_error(e))
        .with_avatar_size(config.avatar.size)
}

fn save_store(store: &MemoryStore, config: &Config) {
    if let Err(e) = store.save(&config.store.path) {
        exit_store_error(e);
    }
}

fn login(store: &MemoryStore, credentials: &Credentials) -> Session {
    authenticate(store, &credentials.email, &credentials.password)
        .unwrap_or_else(|e| exit_auth_error(e))
}

/// Reports the outcome of an action on the terminal and, with `feed`, as a banner on the feed
/// page.
fn finish_action(
    outcome: Result<String, StoreError>,
    feed: Option<&Path>,
    store: &MemoryStore,
    session: &Session,
    config: &Config,
) {
    if let Some(path) = feed {
        let banner = match &outcome {
            Ok(message) => Banner::Success(message.clone()),
            Err(e) => Banner::Error(e.user_message()),
        };
        let renderer = Renderer::new(config.render.clone());
        write_feed(path, &render_feed(store, &renderer, Some(session), Some(&banner)));
    }
    match outcome {
        Ok(message) => println!("{message}"),
        Err(e) => exit_store_error(e),
    }
}

fn write_feed(path: &Path, html: &str) {
    fs::write(path, html).unwrap_or_else(|e| exit_io_error(e));
    info!("Wrote feed to {}", path.display());
}

fn exit_banner(banner: &Banner, code: i32) -> ! {
    eprintln!("{}", banner.message());
    std::process::exit(code);
}

fn exit_store_error(e: StoreError) -> ! {
    let code = if e.is_validation() { 2 } else { 1 };
    exit_banner(&Banner::Error(e.user_message()), code);
}

fn exit_auth_error(e: AuthError) -> ! {
    match e {
        AuthError::Store(e) => exit_store_error(e),
        AuthError::Hash(_) => exit_banner(&Banner::Error(e.user_message()), 1),
        e => exit_banner(&Banner::Error(e.user_message()), 2),
    }
}

fn exit_io_error(e: std::io::Error) -> ! {
    eprintln!("IO Error: {}", e);
    std::process::exit(1);
}
