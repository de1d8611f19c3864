// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Routing table: which printer and tray each document type goes to.
//
// The table is read from a JSON document that operators edit by hand while
// the agent is running.  `RoutingTableCache` keeps the last snapshot for
// `ROUTING_TTL` and reloads it on the first lookup after that.  Snapshots are
// immutable; a reload swaps in a fresh `Arc<RoutingTable>` and never touches
// the previous one, so anything still holding the old snapshot keeps a
// consistent view.
//
// Document format.  Property names match case-insensitively; the document
// type keys inside `documentMappings` match exactly:
//
// ```json
// {
//   "documentMappings": {
//     "Invoice": { "printerName": "ipp://127.0.0.1:631/printers/HP1", "tray": "Upper" },
//     "Label":   { "printerName": "socket://10.0.0.7:9100" }
//   }
// }
// ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use printgate_core::error::{PrintgateError, Result};
use printgate_core::types::PrinterMapping;

/// How long a loaded snapshot is served before the source is re-read.
pub const ROUTING_TTL: Duration = Duration::from_secs(3);

const DOCUMENT_MAPPINGS: &str = "documentMappings";

/// Immutable snapshot of the document-type → printer mapping.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    mappings: HashMap<String, PrinterMapping>,
    loaded_at: DateTime<Utc>,
}

impl RoutingTable {
    pub fn new(mappings: HashMap<String, PrinterMapping>) -> Self {
        Self {
            mappings,
            loaded_at: Utc::now(),
        }
    }

    /// Parse a routing document.  A document without `documentMappings` is
    /// a valid, empty table.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: Map<String, Value> = serde_json::from_str(json).map_err(format_error)?;

        let entries = match property(&doc, DOCUMENT_MAPPINGS) {
            None | Some(Value::Null) => return Ok(Self::new(HashMap::new())),
            Some(Value::Object(entries)) => entries,
            Some(_) => {
                return Err(PrintgateError::RoutingFormat(format!(
                    "{DOCUMENT_MAPPINGS} must be an object"
                )));
            }
        };

        let mut mappings = HashMap::with_capacity(entries.len());
        for (document_type, entry) in entries {
            let mapping = match entry {
                Value::Object(fields) => {
                    let folded: Map<String, Value> = fields
                        .iter()
                        .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
                        .collect();
                    serde_json::from_value::<PrinterMapping>(Value::Object(folded))
                        .map_err(format_error)?
                }
                _ => {
                    return Err(PrintgateError::RoutingFormat(format!(
                        "mapping for '{document_type}' must be an object"
                    )));
                }
            };
            mappings.insert(document_type.clone(), mapping);
        }
        Ok(Self::new(mappings))
    }

    /// Mapping for `document_type`.  Keys match exactly.
    pub fn get(&self, document_type: &str) -> Option<&PrinterMapping> {
        self.mappings.get(document_type)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// When this snapshot was read from its source.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// Top-level property lookup ignoring ASCII case.
fn property<'a>(doc: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    doc.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

fn format_error(e: serde_json::Error) -> PrintgateError {
    PrintgateError::RoutingFormat(e.to_string())
}

/// Where routing snapshots come from.  Loading may block on I/O.
pub trait RoutingSource: Send + Sync {
    fn load(&self) -> Result<RoutingTable>;

    /// Short description for log lines.
    fn describe(&self) -> String;
}

impl<T: RoutingSource + ?Sized> RoutingSource for Arc<T> {
    fn load(&self) -> Result<RoutingTable> {
        (**self).load()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Routing document on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileRoutingSource {
    path: PathBuf,
}

impl FileRoutingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RoutingSource for FileRoutingSource {
    fn load(&self) -> Result<RoutingTable> {
        let json = std::fs::read_to_string(&self.path).map_err(|source| {
            PrintgateError::RoutingSource {
                path: self.path.clone(),
                source,
            }
        })?;
        RoutingTable::from_json(&json)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory routing source whose contents can be swapped at runtime.
///
/// Handy for embedding Printgate where routing lives elsewhere, and for
/// exercising the cache without touching the filesystem.
#[derive(Debug, Default)]
pub struct StaticRoutingSource {
    mappings: Mutex<HashMap<String, PrinterMapping>>,
}

impl StaticRoutingSource {
    pub fn new(mappings: HashMap<String, PrinterMapping>) -> Self {
        Self {
            mappings: Mutex::new(mappings),
        }
    }

    /// Build from `(document_type, mapping)` pairs.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, PrinterMapping)>,
        K: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Replace the whole mapping; takes effect on the cache's next reload.
    pub fn replace(&self, mappings: HashMap<String, PrinterMapping>) {
        *self.mappings.lock().unwrap_or_else(PoisonError::into_inner) = mappings;
    }
}

impl RoutingSource for StaticRoutingSource {
    fn load(&self) -> Result<RoutingTable> {
        let mappings = self
            .mappings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Ok(RoutingTable::new(mappings))
    }

    fn describe(&self) -> String {
        "static".into()
    }
}

struct CachedSnapshot {
    table: Arc<RoutingTable>,
    loaded: Instant,
}

/// Read-through, TTL-refreshed cache in front of a `RoutingSource`.
///
/// One mutex guards the check-and-maybe-reload step, so concurrent lookups
/// during a reload wait for it instead of loading twice or observing a half
/// built table.  A failed reload leaves the previous snapshot in place and
/// reports the error to the caller; the next lookup tries again.
pub struct RoutingTableCache {
    source: Box<dyn RoutingSource>,
    ttl: Duration,
    current: Mutex<Option<CachedSnapshot>>,
}

impl RoutingTableCache {
    pub fn new(source: impl RoutingSource + 'static) -> Self {
        Self::with_ttl(source, ROUTING_TTL)
    }

    pub fn with_ttl(source: impl RoutingSource + 'static, ttl: Duration) -> Self {
        Self {
            source: Box::new(source),
            ttl,
            current: Mutex::new(None),
        }
    }

    /// Resolve `document_type`.  `Ok(None)` means "no entry", which is a
    /// normal condition; `Err` means the source could not be loaded.
    pub fn lookup(&self, document_type: &str) -> Result<Option<PrinterMapping>> {
        Ok(self.snapshot()?.get(document_type).cloned())
    }

    /// Current snapshot, reloading first if it is missing or stale.
    #[instrument(skip(self), fields(source = %self.source.describe()))]
    pub fn snapshot(&self) -> Result<Arc<RoutingTable>> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = current.as_ref().filter(|c| c.loaded.elapsed() <= self.ttl) {
            return Ok(Arc::clone(&cached.table));
        }

        let table = Arc::new(self.source.load()?);
        info!(
            entries = table.len(),
            loaded_at = %table.loaded_at().to_rfc3339(),
            "routing table loaded"
        );
        *current = Some(CachedSnapshot {
            table: Arc::clone(&table),
            loaded: Instant::now(),
        });
        Ok(table)
    }

    /// Drop the cached snapshot so the next lookup reloads.
    pub fn invalidate(&self) {
        debug!("routing cache invalidated");
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
