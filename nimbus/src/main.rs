mod config;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use nimbus_proto::client::DavClient;
use nimbus_proto::credentials::{BasicAuth, BearerToken};
use nimbus_proto::file::RemoteFile;
use nimbus_proto::files::{CountChildren, CreateFolder, ReadFile, ReadFolder, Search, ToggleFavorite};
use nimbus_proto::operation::{OperationResult, RemoteOperation};
use nimbus_proto::transport::HttpTransport;

use config::*;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Command,

    #[clap(short, long, env = "NIMBUS_CONFIG", default_value = "nimbus.toml")]
    /// Path to the nimbus configuration file
    config_file: PathBuf,

    #[clap(long, env = "NIMBUS_PASSWORD", hide_env_values = true)]
    /// Overrides the password of the configuration file
    password: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List a folder
    Ls {
        #[clap(default_value = "/")]
        path: String,
    },
    /// Show everything the server knows about a file or folder
    Stat { path: String },
    /// Count the entries of a folder
    Count { path: String },
    /// Search files by name, or list the favorites
    Find {
        text: Option<String>,
        /// Only the favorites
        #[clap(long)]
        favorites: bool,
        /// Folder searched recursively
        #[clap(long, default_value = "/")]
        path: String,
        #[clap(long)]
        limit: Option<u32>,
    },
    /// Create a folder
    Mkdir {
        path: String,
        /// Create the missing parents too
        #[clap(short, long)]
        parents: bool,
    },
    /// Add a file to the favorites
    Favorite {
        path: String,
        /// Remove it from the favorites instead
        #[clap(long)]
        remove: bool,
    },
}

fn tracer() {
    tracing_subscriber::fmt::init();
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "main=info,nimbus=info,nimbus_proto=warn,nimbus_dav=warn")
    }

    tracer();

    let args = Args::parse();
    let config = read_config(args.config_file.clone())
        .with_context(|| format!("unable to read {}", args.config_file.display()))?;
    let client = build_client(&config, args.password.clone())?;

    match &args.command {
        Command::Ls { path } => {
            let listing = check(ReadFolder::new(path).run(&client).await, "ls")?;
            for file in listing.members.iter() {
                println!("{}", summary(file));
            }
        }
        Command::Stat { path } => {
            let file = check(ReadFile::new(path).run(&client).await, "stat")?;
            details(&file);
        }
        Command::Count { path } => {
            let count = check(CountChildren::new(path).run(&client).await, "count")?;
            println!("{}", count);
        }
        Command::Find {
            text,
            favorites,
            path,
            limit,
        } => {
            let search = match (text, *favorites) {
                (_, true) => Search::favorites(),
                (Some(text), false) => Search::by_name(text),
                (None, false) => bail!("Nothing to search, give a text or --favorites"),
            };
            let search = match limit {
                Some(n) => search.within(path).limit(*n),
                None => search.within(path),
            };
            for file in check(search.run(&client).await, "find")?.iter() {
                println!("{} {}", summary(file), file.remote_path);
            }
        }
        Command::Mkdir { path, parents } => {
            let file_id = check(CreateFolder::new(path, *parents).run(&client).await, "mkdir")?;
            match file_id {
                Some(id) => tracing::info!(path=%path, file_id=%id, "folder created"),
                None => tracing::info!(path=%path, "folder created"),
            }
        }
        Command::Favorite { path, remove } => {
            check(ToggleFavorite::new(path, !remove).run(&client).await, "favorite")?;
        }
    }

    Ok(())
}

fn build_client(config: &Config, password: Option<String>) -> Result<DavClient> {
    let transport = HttpTransport::new(config.timeout_secs.map(Duration::from_secs))?;
    let builder = DavClient::builder(&config.server_url)
        .user(&config.user)
        .transport(transport);

    let builder = match (&config.token, password.or_else(|| config.password.clone())) {
        (Some(token), _) => builder.credentials(BearerToken(token.clone())),
        (None, Some(password)) => builder.credentials(BasicAuth::new(&config.user, password)),
        (None, None) => bail!("Neither a password nor a token is configured for {}", config.user),
    };

    Ok(builder.build()?)
}

fn check<T>(res: OperationResult<T>, what: &str) -> Result<T> {
    let status = res.status;
    res.into_result().with_context(|| match status {
        Some(s) => format!("{} failed, server answered {}", what, s),
        None => format!("{} failed, no answer from the server", what),
    })
}

fn summary(file: &RemoteFile) -> String {
    let kind = match (file.is_folder(), file.favorite) {
        (true, true) => "d*",
        (true, false) => "d-",
        (false, true) => "-*",
        (false, false) => "--",
    };
    let modified = file
        .modified
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into());
    let size = match file.is_folder() {
        true => file.size,
        false => file.length,
    };
    format!("{} {:>12} {} {}", kind, size, modified, file.name)
}

fn details(file: &RemoteFile) {
    println!("path:        {}", file.remote_path);
    println!("name:        {}", file.name);
    println!("type:        {}", file.mime_type);
    println!("size:        {}", if file.is_folder() { file.size } else { file.length });
    println!("etag:        {}", file.etag);
    println!("file id:     {}", file.local_id);
    println!("permissions: {}", file.permissions);
    println!("owner:       {} ({})", file.owner_display_name, file.owner_id);
    println!("favorite:    {}", file.favorite);
    println!("encrypted:   {}", file.encrypted);
    println!("mount type:  {:?}", file.mount_type);
    if let Some(t) = file.modified {
        println!("modified:    {}", t.to_rfc3339());
    }
    if let Some(t) = file.uploaded {
        println!("uploaded:    {}", t.to_rfc3339());
    }
    if !file.tags.is_empty() {
        println!("tags:        {}", file.tags.join(", "));
    }
    for sharee in file.sharees.iter() {
        println!(
            "shared with: {} ({:?})",
            sharee
                .display_name
                .as_deref()
                .or(sharee.user_id.as_deref())
                .unwrap_or("?"),
            sharee.share_type
        );
    }
    if file.lock.locked {
        println!(
            "locked by:   {}",
            file.lock.owner_display_name.as_deref().or(file.lock.owner.as_deref()).unwrap_or("?")
        );
    }
    if !file.note.is_empty() {
        println!("note:        {}", file.note);
    }
}
