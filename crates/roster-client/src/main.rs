//! `roster` — command-line client for the Roster contacts API.
//!
//! # Usage
//!
//! ```text
//! roster --url http://localhost:3000 --token s3cret list --search ada
//! roster --config ~/.config/roster/config.toml browse
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use roster_client::{
  ApiClient, ApiConfig, ContactsView, Synchronizer,
  debounce::{SEARCH_DEBOUNCE, SearchDebouncer},
  view::Tab,
};
use roster_core::{
  contact::{Contact, ImageUpload},
  pagination::DEFAULT_LIMIT,
  query::SortField,
  validate::{CreateContactBody, UpdateContactBody, encode_data_uri},
};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "roster", about = "Command-line client for the Roster contacts API")]
struct Args {
  /// Path to a TOML config file (url, token).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the roster server (default: http://localhost:3000).
  #[arg(long, env = "ROSTER_URL")]
  url: Option<String>,

  /// API bearer token.
  #[arg(long, env = "ROSTER_TOKEN", hide_env_values = true)]
  token: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print one page of contacts.
  List(ListArgs),
  /// Page through contacts interactively.
  Browse(ListArgs),
  /// Show a single contact.
  Show { id: Uuid },
  /// Create a contact.
  Add {
    #[arg(long)]
    name:         String,
    /// PNG or JPEG file, at most 200 KiB.
    #[arg(long)]
    picture:      PathBuf,
    /// RFC 3339 timestamp; defaults to now.
    #[arg(long)]
    last_contact: Option<String>,
  },
  /// Change fields of a contact.
  Edit {
    id:           Uuid,
    #[arg(long)]
    name:         Option<String>,
    #[arg(long)]
    picture:      Option<PathBuf>,
    #[arg(long)]
    last_contact: Option<String>,
  },
  Archive { id: Uuid },
  Restore { id: Uuid },
  Delete { id: Uuid },
}

#[derive(clap::Args, Debug)]
struct ListArgs {
  /// Show the archived tab instead of active contacts.
  #[arg(long)]
  archived: bool,
  #[arg(short, long)]
  search:   Option<String>,
  #[arg(long, default_value_t = 1)]
  page:     u64,
  #[arg(long, default_value_t = DEFAULT_LIMIT)]
  limit:    u64,
  /// name, lastContactAt, createdAt or updatedAt.
  #[arg(long)]
  sort_by:  Option<String>,
  /// Sort ascending (default is descending).
  #[arg(long)]
  asc:      bool,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:   String,
  #[serde(default)]
  token: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:3000".to_string()),
    token:    args
      .token
      .or_else(|| (!file_cfg.token.is_empty()).then(|| file_cfg.token.clone()))
      .unwrap_or_default(),
  };

  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::List(list) => {
      let sync = open_view(client, &list).await?;
      print_page(sync.view());
    }
    Command::Browse(list) => {
      let sync = open_view(client, &list).await?;
      browse(sync).await?;
    }
    Command::Show { id } => {
      let mut sync = Synchronizer::new(client, ContactsView::default());
      let contact = sync.get(id).await;
      print_contact(&require(&sync, contact)?);
    }
    Command::Add { name, picture, last_contact } => {
      let body = CreateContactBody {
        name:            Some(name),
        profile_picture: Some(read_picture(&picture)?),
        last_contact_at: Some(last_contact.unwrap_or_else(|| Utc::now().to_rfc3339())),
      };
      let mut sync = Synchronizer::new(client, ContactsView::default());
      let contact = sync.create(&body).await;
      print_contact(&require(&sync, contact)?);
    }
    Command::Edit { id, name, picture, last_contact } => {
      let body = UpdateContactBody {
        name,
        profile_picture: picture.as_deref().map(read_picture).transpose()?,
        last_contact_at: last_contact,
        archived: None,
      };
      let mut sync = Synchronizer::new(client, ContactsView::default());
      let contact = sync.update(id, &body).await;
      print_contact(&require(&sync, contact)?);
    }
    Command::Archive { id } => {
      let mut sync = Synchronizer::new(client, ContactsView::default());
      let done = sync.archive(id).await;
      require(&sync, done.then_some(()))?;
      println!("archived {id}");
    }
    Command::Restore { id } => {
      let mut sync = Synchronizer::new(client, ContactsView::default());
      let done = sync.restore(id).await;
      require(&sync, done.then_some(()))?;
      println!("restored {id}");
    }
    Command::Delete { id } => {
      let mut sync = Synchronizer::new(client, ContactsView::default());
      let done = sync.delete(id).await;
      require(&sync, done.then_some(()))?;
      println!("deleted {id}");
    }
  }

  Ok(())
}

/// Turn a synchronizer sentinel into an error carrying the view's message.
fn require<T>(sync: &Synchronizer<ApiClient>, value: Option<T>) -> Result<T> {
  value.ok_or_else(|| anyhow!(sync.view().error().unwrap_or("request failed").to_owned()))
}

/// Build and load a view from list flags.
async fn open_view(client: ApiClient, list: &ListArgs) -> Result<Synchronizer<ApiClient>> {
  let mut view = ContactsView::new(list.limit);
  if list.archived {
    view.set_tab(Tab::Archived);
  }
  if let Some(search) = &list.search {
    view.set_search_input(search.clone());
    view.commit_search(search);
  }
  if let Some(field) = &list.sort_by {
    view.set_sort_field(SortField::parse_lossy(field));
  }
  if list.asc {
    view.toggle_sort_direction();
  }

  let mut sync = Synchronizer::new(client, view);
  if !sync.initialize().await {
    bail!("{}", sync.view().error().unwrap_or("failed to load contacts"));
  }
  if list.page > 1 && !sync.goto_page(list.page).await {
    bail!("page {} is out of range (1..={})", list.page, sync.view().total_pages());
  }
  Ok(sync)
}

fn read_picture(path: &Path) -> Result<String> {
  let content_type = match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase) {
    Some(ext) if ext == "png" => "image/png",
    Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
    _ => bail!("{} is not a .png or .jpg file", path.display()),
  };
  let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
  Ok(encode_data_uri(&ImageUpload { bytes: bytes.into(), content_type: content_type.into() }))
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn print_contact(c: &Contact) {
  println!("id:            {}", c.id);
  println!("name:          {}", c.name);
  println!("picture:       {}", c.profile_picture);
  println!("last contact:  {}", c.last_contact_at.format("%Y-%m-%d %H:%M"));
  if let Some(at) = c.archived_at {
    println!("archived:      {}", at.format("%Y-%m-%d %H:%M"));
  }
  println!("created:       {}", c.created_at.format("%Y-%m-%d %H:%M"));
}

fn print_page(view: &ContactsView) {
  let tab = match view.tab() {
    Tab::Active => "active",
    Tab::Archived => "archived",
  };
  if view.contacts().is_empty() {
    println!("(no {tab} contacts)");
  }
  for c in view.contacts() {
    println!("{}  {:<32}  {}", c.id, c.name, c.last_contact_at.format("%Y-%m-%d"));
  }
  let mut footer = format!(
    "{tab} · page {}/{} · {} total",
    view.page(),
    view.total_pages().max(1),
    view.total()
  );
  if !view.search().is_empty() {
    footer.push_str(&format!(" · search \"{}\"", view.search()));
  }
  if let Some(existing) = view.total_existing() {
    footer.push_str(&format!(" · {existing} contacts overall"));
  }
  println!("{footer}");
  if let Some(err) = view.error() {
    println!("error: {err}");
  }
}

// ─── Interactive browser ──────────────────────────────────────────────────────

const BROWSE_HELP: &str =
  "n next · p previous · g N goto · t switch tab · s FIELD sort · o order · /TEXT search · r refresh · q quit";

async fn browse(mut sync: Synchronizer<ApiClient>) -> Result<()> {
  let (mut debouncer, mut committed) = SearchDebouncer::new(SEARCH_DEBOUNCE);
  let mut lines = BufReader::new(tokio::io::stdin()).lines();

  print_page(sync.view());
  println!("{BROWSE_HELP}");

  loop {
    tokio::select! {
      line = lines.next_line() => {
        let Some(line) = line.context("reading stdin")? else { break };
        let line = line.trim_end();
        let changed = match line.split_once(' ').unwrap_or((line, "")) {
          ("q", _) => break,
          ("n", _) => sync.next_page().await,
          ("p", _) => sync.previous_page().await,
          ("g", n) => match n.trim().parse() {
            Ok(page) => sync.goto_page(page).await,
            Err(_) => false,
          },
          ("t", _) => {
            let other = sync.view().tab().other();
            sync.set_tab(other).await
          }
          ("s", field) => sync.set_sort_field(SortField::parse_lossy(field.trim())).await,
          ("o", _) => sync.toggle_sort_direction().await,
          ("r", _) => sync.refresh().await,
          _ if line.starts_with('/') => {
            let raw = &line[1..];
            sync.view_mut().set_search_input(raw);
            debouncer.input(raw);
            false
          }
          _ => {
            println!("{BROWSE_HELP}");
            false
          }
        };
        if changed || sync.view().error().is_some() {
          print_page(sync.view());
          sync.view_mut().clear_error();
        }
      }
      Some(raw) = committed.recv() => {
        if sync.commit_search(&raw).await || sync.view().error().is_some() {
          print_page(sync.view());
          sync.view_mut().clear_error();
        }
      }
    }
  }

  Ok(())
}
