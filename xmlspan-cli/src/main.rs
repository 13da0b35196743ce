//! xmlspan CLI
//!
//! Parses an XML document and prints its element tree, its token list, or a
//! JSON dump of both.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use serde_json::{Value, json};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xmlspan_ast::{NodeId, NodeKind, XmlTree};
use xmlspan_parser::{
    ParseError, ParsedDocument, ParserOptions, PositionIndex, TabWidth, parse_with_options,
    render_tree,
};

/// xmlspan: XML parser with a gapless token list and source-located tree
#[derive(Parser, Debug)]
#[command(name = "xmlspan")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the element tree of a file
    xmlspan record.xml

    # Print every token with its range and location
    xmlspan --tokens record.xml

    # Dump tokens and tree as JSON, counting tabs as four columns
    xmlspan --json --tab-width 4 record.xml

    # Parse an inline string
    xmlspan --xml '<a b="1"><c/></a>'
"#)]
struct Cli {
    /// Path to the XML file
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse an XML string directly instead of a file
    #[arg(long, value_name = "XML", conflicts_with = "path")]
    xml: Option<String>,

    /// Print the token table instead of the tree
    #[arg(long, conflicts_with = "json")]
    tokens: bool,

    /// Print tokens and tree as JSON
    #[arg(long)]
    json: bool,

    /// Load parser options from a JSON file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Tab width: 2, 4, or tab
    #[arg(long, value_name = "WIDTH")]
    tab_width: Option<TabWidth>,

    /// Treat `/>` as the end of the start tag only
    #[arg(long)]
    no_self_closing: bool,

    /// Compare tag and attribute names case-insensitively
    #[arg(long)]
    case_insensitive: bool,

    /// Also list comments among element children
    #[arg(long)]
    comments_as_children: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xmlspan=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let options = load_options(cli)?;
    let (label, source) = load_source(cli)?;
    debug!(%label, ?options, "loaded input");

    let doc = parse_with_options(&source, &options)
        .map_err(|err| locate_error(err, &label, &source, options.tab_width))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&document_json(&doc)?)?);
    } else if cli.tokens {
        print_tokens(&doc);
    } else {
        print_document(&doc);
    }
    Ok(())
}

/// Options from `--config`, then overridden by individual flags.
fn load_options(cli: &Cli) -> Result<ParserOptions> {
    let mut options = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => ParserOptions::default(),
    };
    if let Some(tab_width) = cli.tab_width {
        options.tab_width = tab_width;
    }
    if cli.no_self_closing {
        options.recognize_self_closing = false;
    }
    if cli.case_insensitive {
        options.case_sensitive_names = false;
    }
    if cli.comments_as_children {
        options.expose_comments_as_children = true;
    }
    Ok(options)
}

fn load_source(cli: &Cli) -> Result<(String, String)> {
    if let Some(ref xml) = cli.xml {
        Ok(("<inline>".to_string(), xml.clone()))
    } else if let Some(ref path) = cli.path {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok((path.display().to_string(), source))
    } else {
        anyhow::bail!("expected a file path or --xml")
    }
}

/// Attach `label:line:column` to a parse error.
fn locate_error(err: ParseError, label: &str, source: &str, tab_width: TabWidth) -> anyhow::Error {
    let at = err.offset().map_or_else(String::new, |offset| {
        let position = PositionIndex::build(source, tab_width).lookup(offset);
        format!(":{}:{}", position.line, position.column)
    });
    anyhow::Error::new(err).context(format!("failed to parse {label}{at}"))
}

fn print_document(doc: &ParsedDocument) {
    println!("=== Element Tree ===");
    print!("{}", render_tree(&doc.tree, doc.root));

    println!("\n=== Summary ===");
    println!(
        "{} tokens, {} nodes, {} comments",
        doc.tokens.len(),
        doc.tree.len(),
        doc.comments.len()
    );
}

fn print_tokens(doc: &ParsedDocument) {
    for token in &doc.tokens {
        let start = token.loc.start;
        println!(
            "{:>6}..{:<6} {:>5}:{:<4} {:<16} {:?}",
            token.range.start,
            token.range.end,
            start.line,
            start.column,
            token.kind.to_string(),
            token.value
        );
    }
}

fn document_json(doc: &ParsedDocument) -> Result<Value> {
    let comments = doc
        .comments
        .iter()
        .map(|&id| node_json(&doc.tree, id))
        .collect::<Result<Vec<_>>>()?;
    Ok(json!({
        "tokens": serde_json::to_value(&doc.tokens)?,
        "root": node_json(&doc.tree, doc.root)?,
        "comments": comments,
    }))
}

/// One node with its attributes and children nested inline.
fn node_json(tree: &XmlTree, id: NodeId) -> Result<Value> {
    let node = tree
        .get(id)
        .with_context(|| format!("node {} missing from the tree", id.0))?;
    let range = [node.range.start, node.range.end];
    let loc = serde_json::to_value(node.loc)?;
    let nested = |ids: &[NodeId]| {
        ids.iter()
            .map(|&child| node_json(tree, child))
            .collect::<Result<Vec<_>>>()
    };

    Ok(match &node.kind {
        NodeKind::Element(data) => json!({
            "type": "Element",
            "tagName": data.tag_name,
            "attributes": nested(&data.attributes)?,
            "attrs": data.attrs,
            "comments": nested(&data.comments)?,
            "leadingComments": nested(&data.leading_comments)?,
            "trailingComments": nested(&data.trailing_comments)?,
            "children": nested(&node.children)?,
            "isClosed": data.is_closed,
            "innerContent": data.inner_content,
            "range": range,
            "loc": loc,
        }),
        NodeKind::Attribute(data) => json!({
            "type": "Attribute",
            "name": data.name,
            "value": data.value,
            "quote": data.quote.to_string(),
            "range": range,
            "loc": loc,
        }),
        NodeKind::Text(value) => json!({
            "type": "Text",
            "value": value,
            "range": range,
            "loc": loc,
        }),
        NodeKind::Comment(data) => json!({
            "type": "Comment",
            "kind": data.kind.to_string(),
            "value": data.value,
            "range": range,
            "loc": loc,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("xmlspan").chain(args.iter().copied()))
    }

    #[test]
    fn test_flags_override_defaults() {
        let options = load_options(&cli(&[
            "--tab-width",
            "tab",
            "--no-self-closing",
            "--case-insensitive",
            "--xml",
            "<a/>",
        ]))
        .unwrap();
        assert_eq!(options.tab_width, TabWidth::Tab);
        assert!(!options.recognize_self_closing);
        assert!(!options.case_sensitive_names);
        assert!(!options.expose_comments_as_children);
    }

    #[test]
    fn test_parse_error_carries_line_and_column() {
        let source = "<a>\n  </b>";
        let options = ParserOptions::default();
        let err = parse_with_options(source, &options).unwrap_err();
        let located = locate_error(err, "doc.xml", source, options.tab_width);
        assert!(located.to_string().starts_with("failed to parse doc.xml:2:"));
    }

    #[test]
    fn test_json_nests_attributes_and_children() {
        let source = r#"<!--lead--><a b="1"><c/>t</a><!--trail-->"#;
        let doc = parse_with_options(source, &ParserOptions::default()).unwrap();
        let value = document_json(&doc).unwrap();
        let root = &value["root"];
        assert_eq!(root["tagName"], "a");
        assert_eq!(root["attributes"][0]["name"], "b");
        assert_eq!(root["attributes"][0]["value"], "1");
        assert_eq!(root["children"][0]["tagName"], "c");
        assert_eq!(root["children"][1]["value"], "t");
        assert_eq!(root["attrs"], json!({"b": "1"}));
        assert_eq!(root["leadingComments"][0]["value"], "lead");
        assert_eq!(root["trailingComments"][0]["value"], "trail");
        assert_eq!(root["range"], json!([11, 30]));
        assert_eq!(value["comments"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["tokens"][0]["type"], "XmlComment");
    }
}
