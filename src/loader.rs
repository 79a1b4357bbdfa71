use std::fs::File;
use std::io::{BufRead, BufReader};
use std::num::IntErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use crate::config::READ_BUFFER_SIZE;
use crate::error::{GnError, GnResult};
use crate::types::VInt;

fn parse_node_id(token: &str) -> GnResult<Option<VInt>> {
    match token.parse::<VInt>() {
        Ok(id) => Ok(Some(id)),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Err(GnError::InvalidInput(
                format!("node id {} is out of range", token),
            )),
            _ => Ok(None),
        },
    }
}

/// Parse one `u v` line, `None` for anything that is not two integer tokens.
fn parse_edge_line(line: &str) -> GnResult<Option<(VInt, VInt)>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 2 {
        return Ok(None);
    }
    match (parse_node_id(tokens[0])?, parse_node_id(tokens[1])?) {
        (Some(u), Some(v)) => Ok(Some((u, v))),
        _ => Ok(None),
    }
}

/// Read whitespace separated integer pairs, one edge per line.
///
/// Lines with a token count other than two, with a token that is not an
/// integer, or that are not valid UTF-8 are skipped. An integer too large for
/// a node id fails the load. Self-loops are passed on untouched, the graph
/// decides what to do with them.
pub fn read_edge_list<R: BufRead>(reader: R) -> Result<Vec<(VInt, VInt)>> {
    let mut edges = Vec::new();
    let mut skipped = 0usize;
    for (line_no, line) in reader.split(b'\n').enumerate() {
        let line = line.context("failed to read edge list line")?;
        let Ok(line) = std::str::from_utf8(&line) else {
            skipped += 1;
            continue;
        };
        let parsed = parse_edge_line(line).with_context(|| format!("line {}", line_no + 1))?;
        match parsed {
            Some(edge) => edges.push(edge),
            None => skipped += 1,
        }
    }
    debug!("Read {} edges, skipped {} malformed lines", edges.len(), skipped);
    Ok(edges)
}

/// Load an edge list file.
pub fn load_edge_list(file_path: impl AsRef<Path>) -> Result<Vec<(VInt, VInt)>> {
    let file_path = file_path.as_ref();
    let graph_file = File::open(file_path)
        .with_context(|| format!("failed to open edge list {}", file_path.display()))?;
    let graph_reader = BufReader::with_capacity(READ_BUFFER_SIZE, graph_file);
    read_edge_list(graph_reader)
        .with_context(|| format!("failed to load edge list {}", file_path.display()))
}
