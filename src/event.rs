//! Event-level loading of hits, cells, particles and truth files
//!
//! An event is a group of CSV files sharing a prefix such as
//! `event000001000`: `event000001000-hits.csv`, `event000001000-truth.csv`
//! and so on. A dataset is a directory holding many events.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::ReaderConfig;
use crate::error::{ReadError, ReadResult};
use crate::model::{Schema, Table};
use crate::reader::TabularReader;

/// One kind of per-event file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Part {
    Hits,
    Cells,
    Particles,
    Truth,
}

impl Part {
    pub const ALL: [Part; 4] = [Part::Hits, Part::Cells, Part::Particles, Part::Truth];

    pub fn as_str(self) -> &'static str {
        match self {
            Part::Hits => "hits",
            Part::Cells => "cells",
            Part::Particles => "particles",
            Part::Truth => "truth",
        }
    }

    /// Column the part's table is keyed by
    pub fn key_column(self) -> &'static str {
        match self {
            Part::Particles => "particle_id",
            _ => "hit_id",
        }
    }

    /// Whether each key appears at most once.
    ///
    /// Cells list several readout cells per hit.
    pub fn unique_key(self) -> bool {
        !matches!(self, Part::Cells)
    }

    /// File path of this part for an event prefix
    pub fn path_for(self, prefix: &Path) -> PathBuf {
        let mut name = prefix.as_os_str().to_os_string();
        name.push(format!("-{}.csv", self.as_str()));
        PathBuf::from(name)
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Part {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Part::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown event part: {}", s))
    }
}

/// Explicit per-part schemas; parts without one are inferred
#[derive(Debug, Clone, Default)]
pub struct EventSchemas {
    schemas: BTreeMap<Part, Schema>,
}

impl EventSchemas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, part: Part, schema: Schema) -> Self {
        self.schemas.insert(part, schema);
        self
    }

    pub fn get(&self, part: Part) -> Option<&Schema> {
        self.schemas.get(&part)
    }
}

/// Tables of one event
#[derive(Debug, Clone, Default)]
pub struct Event {
    pub event_id: Option<u64>,
    pub prefix: PathBuf,
    pub hits: Option<Table>,
    pub cells: Option<Table>,
    pub particles: Option<Table>,
    pub truth: Option<Table>,
}

impl Event {
    pub fn part(&self, part: Part) -> Option<&Table> {
        match part {
            Part::Hits => self.hits.as_ref(),
            Part::Cells => self.cells.as_ref(),
            Part::Particles => self.particles.as_ref(),
            Part::Truth => self.truth.as_ref(),
        }
    }

    fn set_part(&mut self, part: Part, table: Table) {
        let slot = match part {
            Part::Hits => &mut self.hits,
            Part::Cells => &mut self.cells,
            Part::Particles => &mut self.particles,
            Part::Truth => &mut self.truth,
        };
        *slot = Some(table);
    }
}

/// Numeric id of an event prefix, e.g. `1000` for `.../event000001000`
pub fn event_id(prefix: &Path) -> Option<u64> {
    prefix
        .file_name()?
        .to_str()?
        .strip_prefix("event")?
        .parse()
        .ok()
}

/// Loads events part by part, each with its own reader settings
#[derive(Debug, Clone)]
pub struct EventReader {
    base: ReaderConfig,
    schemas: EventSchemas,
}

impl EventReader {
    /// `base` supplies delimiter and header settings; key settings are per part
    pub fn new(base: ReaderConfig, schemas: EventSchemas) -> Self {
        Self { base, schemas }
    }

    fn reader_for(&self, part: Part) -> TabularReader {
        TabularReader::new(
            self.base
                .clone()
                .with_key_column(part.key_column())
                .with_unique_key(part.unique_key()),
        )
    }

    /// Load the requested parts of one event.
    ///
    /// Fails on the first part that fails to load.
    pub fn load_event(&self, prefix: &Path, parts: &[Part]) -> ReadResult<Event> {
        let mut event = Event {
            event_id: event_id(prefix),
            prefix: prefix.to_path_buf(),
            ..Default::default()
        };

        for &part in parts {
            let path = part.path_for(prefix);
            let table = self.reader_for(part).load(&path, self.schemas.get(part))?;
            event.set_part(part, table);
        }

        debug!("Loaded event {} ({} parts)", prefix.display(), parts.len());
        Ok(event)
    }

    /// Prefixes of the events in `dir` that have every requested part,
    /// sorted by event id
    pub fn list_events(&self, dir: &Path, parts: &[Part]) -> ReadResult<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir).map_err(|source| ReadError::NotFound {
            path: dir.to_path_buf(),
            source,
        })?;

        let suffix = match parts.first() {
            Some(part) => format!("-{}.csv", part),
            None => return Ok(Vec::new()),
        };

        let mut events: Vec<(u64, PathBuf)> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ReadError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let file_name = entry.file_name();
            let Some(stem) = file_name.to_str().and_then(|n| n.strip_suffix(&suffix)) else {
                continue;
            };

            let prefix = dir.join(stem);
            let Some(id) = event_id(&prefix) else {
                continue;
            };
            if parts.iter().all(|p| p.path_for(&prefix).is_file()) {
                events.push((id, prefix));
            }
        }

        events.sort();
        Ok(events.into_iter().map(|(_, prefix)| prefix).collect())
    }

    /// Iterate over the events of a dataset directory in id order.
    ///
    /// Events are loaded lazily; `skip` events are passed over and at most
    /// `nevents` are yielded.
    pub fn load_dataset<'a>(
        &'a self,
        dir: &Path,
        parts: &'a [Part],
        skip: usize,
        nevents: Option<usize>,
    ) -> ReadResult<impl Iterator<Item = ReadResult<Event>> + 'a> {
        let prefixes = self.list_events(dir, parts)?;
        info!(
            "Found {} events in {}",
            prefixes.len(),
            dir.display()
        );

        Ok(prefixes
            .into_iter()
            .skip(skip)
            .take(nevents.unwrap_or(usize::MAX))
            .map(move |prefix| self.load_event(&prefix, parts)))
    }
}

impl Default for EventReader {
    fn default() -> Self {
        Self::new(ReaderConfig::default(), EventSchemas::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id() {
        assert_eq!(event_id(Path::new("data/event000001000")), Some(1000));
        assert_eq!(event_id(Path::new("event7")), Some(7));
        assert_eq!(event_id(Path::new("data/run1")), None);
    }

    #[test]
    fn test_part_path() {
        assert_eq!(
            Part::Truth.path_for(Path::new("data/event000000001")),
            PathBuf::from("data/event000000001-truth.csv")
        );
    }

    #[test]
    fn test_part_from_str() {
        assert_eq!("Hits".parse::<Part>(), Ok(Part::Hits));
        assert!("tracks".parse::<Part>().is_err());
    }

    #[test]
    fn test_cells_allow_duplicate_keys() {
        assert!(!Part::Cells.unique_key());
        assert!(Part::Hits.unique_key());
        assert_eq!(Part::Particles.key_column(), "particle_id");
    }
}
