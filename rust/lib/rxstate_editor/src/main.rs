//! `rxstate-editor`: scripted editor session.
//!
//! Loads a document, walks through hover, select, edit and resize, then
//! prints the settled state tree as JSON.
//!
//! Usage: cargo run -p rxstate-editor -- [--document root.json] [--reload] [-- --max-depth=16]
//! Set `RUST_LOG=rxstate=debug` to see every dispatch and write.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::info;

use rxstate::{Rx, StoreConfig};
use rxstate_editor::actions::*;
use rxstate_editor::{Document, EditorState, HtmlNode, NodeRect, Rect};

/// Run a scripted editing session and print the resulting state.
#[derive(Parser, Debug)]
#[command(name = "rxstate-editor", about = "Scripted rxstate editor session")]
struct Cli {
    /// JSON file holding the document's root node (default: built-in sample).
    #[arg(long)]
    document: Option<PathBuf>,

    /// Tear down and re-bind all reducers halfway through the session.
    #[arg(long)]
    reload: bool,

    /// Print the final state on one line.
    #[arg(long)]
    compact: bool,

    /// Store settings after `--`, e.g. `-- --strict-reads=false --max-depth=16`.
    #[arg(last = true)]
    store_args: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let rx = Rx::with_config(StoreConfig::from_args(&cli.store_args));
    rx.tap_actions(|event| info!(seq = event.seq, action = event.tag, "action"));

    let mut editor = EditorState::register(&rx)?;

    let document = match &cli.document {
        Some(path) => load_document(path)?,
        None => sample_document(),
    };
    let target = document
        .root
        .children
        .first()
        .map(|node| node.id.clone())
        .unwrap_or_else(|| document.root.id.clone());

    rx.dispatch(LOAD_DOCUMENT.create(document))?;
    info!(nodes = editor.node_count.get(), "document loaded");

    rx.dispatch(HOVER_ENTER.create(target.clone()))?;
    rx.dispatch(SELECT.create(NodeRect::new(&target, Rect::new(0.0, 0.0, 320.0, 48.0))))?;
    info!(status = %editor.status.get(), "selected");

    if cli.reload {
        let cancelled = rx.reload();
        editor = EditorState::register(&rx)?;
        info!(cancelled, status = %editor.status.get(), "reducers re-bound");
    }

    rx.dispatch(ENTER_EDIT.create(()))?;
    info!(status = %editor.status.get(), "editing");

    rx.dispatch(CONTENT_CHANGED.create(NodeRect::new(&target, Rect::new(0.0, 0.0, 320.0, 96.0))))?;
    rx.dispatch(TOGGLE_EDIT.create(false))?;
    rx.dispatch(HOVER_LEAVE.create(()))?;
    info!(status = %editor.status.get(), mode = %editor.mode.get(), "session finished");
    rx.tick();

    let snapshot = rx.snapshot();
    let out = if cli.compact {
        serde_json::to_string(&snapshot)?
    } else {
        serde_json::to_string_pretty(&snapshot)?
    };
    println!("{out}");
    Ok(())
}

fn load_document(path: &Path) -> anyhow::Result<Document> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let root: HtmlNode = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid document node", path.display()))?;
    Ok(Document::from_root(root))
}

fn sample_document() -> Document {
    Document::from_root(
        HtmlNode::element("node-0", "main")
            .with_child(
                HtmlNode::element("node-1", "h1")
                    .with_attr("data-editable", "text")
                    .with_child(HtmlNode::text("node-2", "Welcome")),
            )
            .with_child(
                HtmlNode::element("node-3", "img")
                    .with_attr("src", "hero.png")
                    .with_attr("data-editable", "image"),
            )
            .with_child(
                HtmlNode::element("node-4", "a")
                    .with_attr("href", "/start")
                    .with_child(HtmlNode::text("node-5", "Get started")),
            ),
    )
}
