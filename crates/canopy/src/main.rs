mod dump;

use annotate_snippets::Renderer;
use anyhow::Context;
use camino::Utf8PathBuf;
use canopy_syntax::SyntaxTree;
use canopy_view::{NavigateOptions, SyntaxCategory, SyntaxTreeView};
use clap::Parser;
use text_size::{TextRange, TextSize};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
enum Options {
    /// Print the fully expanded display tree for a tree dump.
    Show { path: Utf8PathBuf },
    /// Navigate to a position (or, with `--length`, a span) and print the
    /// resulting view with the match selected.
    At {
        path: Utf8PathBuf,
        offset: u32,
        #[arg(long)]
        length: Option<u32>,
        /// Only match elements of this kind.
        #[arg(long)]
        kind: Option<String>,
        /// Only match elements of this category: node, token, or trivia.
        #[arg(long, value_parser = parse_category)]
        category: Option<SyntaxCategory>,
    },
}

fn parse_category(value: &str) -> Result<SyntaxCategory, String> {
    match value {
        "node" => Ok(SyntaxCategory::Node),
        "token" => Ok(SyntaxCategory::Token),
        "trivia" => Ok(SyntaxCategory::Trivia),
        _ => Err(format!("unknown category `{value}`, expected node, token, or trivia")),
    }
}

fn load_tree(path: &Utf8PathBuf) -> anyhow::Result<SyntaxTree> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read `{path}`"))?;

    match dump::parse(&text) {
        Ok(tree) => Ok(tree),
        Err(error) => {
            let renderer = Renderer::styled();
            eprintln!("{}", error.render(&renderer, path.as_str(), &text));
            anyhow::bail!("failed to parse `{path}`")
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Options::parse() {
        Options::Show { path } => {
            let tree = load_tree(&path)?;
            let (mut view, _events) = SyntaxTreeView::new();
            view.display_tree(&tree, false);
            print!("{}", view.render());
        }
        Options::At { path, offset, length, kind, category } => {
            let tree = load_tree(&path)?;
            let (mut view, _events) = SyntaxTreeView::new();
            view.display_tree(&tree, true);

            let options = NavigateOptions {
                kind: kind.as_deref(),
                category,
                ..NavigateOptions::default()
            };
            let found = match length {
                Some(length) => {
                    let span = TextRange::at(TextSize::new(offset), TextSize::new(length));
                    view.navigate_to_span(span, &options)
                }
                None => view.navigate_to_position(TextSize::new(offset), &options),
            };
            if !found {
                anyhow::bail!("no element matches");
            }

            print!("{}", view.render());
            if let Some(active) = view.active_item() {
                let summary = view.diagnostic_summary(active);
                if !summary.is_empty() {
                    eprintln!("{summary}");
                }
            }
        }
    }

    Ok(())
}
