//! Document assembly: resolve each input, build its content tree and append it to the
//! document sequence.

mod error;
pub mod resolver;

pub use error::AssemblyError;
pub use resolver::{file_basename, file_directory, is_url, FileResolver};

use crate::document::{ContentTree, DocumentNode, Markup, NodeId};
use crate::session::Session;
use std::io::Read;

/// Decode input bytes, replacing invalid UTF-8 sequences.
fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

impl Session {
    /// Resolve `name` against `search_path`, parse it and link it at the tail of the
    /// document. The sequence is left untouched on failure.
    pub fn append(&mut self, name: &str, search_path: &str) -> Result<NodeId, AssemblyError> {
        let real = self.resolver.find(&self.config, search_path, name)?;
        tracing::debug!("Reading {}...", name);
        let bytes = std::fs::read(&real).map_err(|source| AssemblyError::Open {
            name: name.to_string(),
            source,
        })?;
        let content = ContentTree::parse(Markup::for_name(name), &decode(bytes));
        let base = file_directory(name).unwrap_or_else(|| ".".to_string());
        let node = DocumentNode::new(Some(name.to_string()), file_basename(name), base, content);
        Ok(self.document.push_back(node))
    }

    /// Parse HTML from `reader` (standard input) and append it.
    pub fn append_reader(&mut self, reader: &mut dyn Read) -> Result<NodeId, AssemblyError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|source| AssemblyError::Open {
                name: "(stdin)".to_string(),
                source,
            })?;
        let content = ContentTree::from_html(&decode(bytes));
        let node = DocumentNode::new(None, String::new(), ".".to_string(), content);
        Ok(self.document.push_back(node))
    }

    /// [`Session::append`], reporting and counting a failure instead of returning it.
    pub fn read_file(&mut self, name: &str, search_path: &str) -> bool {
        match self.append(name, search_path) {
            Ok(_) => true,
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }
}
