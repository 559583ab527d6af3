use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Catalog entry as loaded from the job-title referential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTitle {
    pub code: u32,
    pub label: String,
    pub short_label: String,
    pub code_rome: String,
    pub rarely_used: bool,
}

/// Search payload entry; scores never leave the ranker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedJobTitle {
    pub label: String,
    pub short_label: String,
    pub code: u32,
    pub code_rome: String,
}

impl From<&JobTitle> for RankedJobTitle {
    fn from(title: &JobTitle) -> Self {
        Self {
            label: title.label.clone(),
            short_label: title.short_label.clone(),
            code: title.code,
            code_rome: title.code_rome.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read job-title catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid job-title catalog data: {0}")]
    Csv(#[from] csv::Error),
    #[error("job-title catalog is empty")]
    Empty,
}

/// Where catalog data comes from; the cache asks for the modification time on every lookup.
pub trait CatalogSource: Send + Sync {
    fn modified_at(&self) -> Result<Option<DateTime<Utc>>, CatalogError>;
    /// Entries with `rarely_used` set are dropped before they reach the ranker.
    fn load(&self) -> Result<Vec<JobTitle>, CatalogError>;
}

/// CSV referential with headers `code,label,short_label,code_rome,rarely_used`.
#[derive(Debug, Clone)]
pub struct CsvCatalogSource {
    path: PathBuf,
}

impl CsvCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    code: u32,
    label: String,
    #[serde(default)]
    short_label: String,
    code_rome: String,
    #[serde(default)]
    rarely_used: String,
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y"
    )
}

impl CatalogSource for CsvCatalogSource {
    fn modified_at(&self) -> Result<Option<DateTime<Utc>>, CatalogError> {
        let metadata = std::fs::metadata(&self.path)?;
        Ok(metadata.modified().ok().map(DateTime::<Utc>::from))
    }

    fn load(&self) -> Result<Vec<JobTitle>, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let mut titles = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row?;
            if parse_flag(&row.rarely_used) {
                continue;
            }
            let short_label = if row.short_label.is_empty() {
                row.label.clone()
            } else {
                row.short_label
            };
            titles.push(JobTitle {
                code: row.code,
                label: row.label,
                short_label,
                code_rome: row.code_rome,
                rarely_used: false,
            });
        }

        if titles.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(titles)
    }
}

/// Fixed in-memory catalog, handy for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    titles: Vec<JobTitle>,
}

impl StaticCatalogSource {
    pub fn new(titles: Vec<JobTitle>) -> Self {
        Self { titles }
    }
}

impl CatalogSource for StaticCatalogSource {
    fn modified_at(&self) -> Result<Option<DateTime<Utc>>, CatalogError> {
        Ok(None)
    }

    fn load(&self) -> Result<Vec<JobTitle>, CatalogError> {
        Ok(self
            .titles
            .iter()
            .filter(|title| !title.rarely_used)
            .cloned()
            .collect())
    }
}

/// Last successful load and the source timestamp it was taken from.
#[derive(Debug, Clone, Default)]
pub struct JobTitleCache {
    pub data: Option<Arc<Vec<JobTitle>>>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub source_modified_at: Option<DateTime<Utc>>,
}

impl JobTitleCache {
    /// Reload when nothing is cached, when the TTL has elapsed, or when the source changed.
    pub fn should_reload(
        &self,
        now: DateTime<Utc>,
        ttl: Duration,
        current_source_modified_at: Option<DateTime<Utc>>,
    ) -> bool {
        let (Some(_), Some(loaded_at)) = (&self.data, self.loaded_at) else {
            return true;
        };

        let expired = (now - loaded_at)
            .to_std()
            .map(|elapsed| elapsed >= ttl)
            .unwrap_or(false);
        if expired {
            return true;
        }

        current_source_modified_at.is_some()
            && current_source_modified_at != self.source_modified_at
    }
}

/// Catalog source fronted by a [`JobTitleCache`].
pub struct CachedCatalog<S> {
    source: S,
    ttl: Duration,
    cache: Mutex<JobTitleCache>,
}

impl<S: CatalogSource> CachedCatalog<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cache: Mutex::new(JobTitleCache::default()),
        }
    }

    /// Current titles, reloading when stale. A failed reload falls back to the previous copy.
    pub fn titles(&self, now: DateTime<Utc>) -> Result<Arc<Vec<JobTitle>>, CatalogError> {
        let current_modified = match self.source.modified_at() {
            Ok(modified) => modified,
            Err(err) => {
                warn!(error = %err, "could not read job-title catalog timestamp");
                None
            }
        };

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let (false, Some(data)) = (
            cache.should_reload(now, self.ttl, current_modified),
            cache.data.as_ref(),
        ) {
            return Ok(Arc::clone(data));
        }

        match self.source.load() {
            Ok(titles) => {
                info!(count = titles.len(), "job-title catalog loaded");
                let data = Arc::new(titles);
                cache.data = Some(Arc::clone(&data));
                cache.loaded_at = Some(now);
                cache.source_modified_at = current_modified;
                Ok(data)
            }
            Err(err) => match cache.data.as_ref() {
                Some(stale) => {
                    warn!(error = %err, "job-title catalog reload failed, serving cached copy");
                    Ok(Arc::clone(stale))
                }
                None => Err(err),
            },
        }
    }

    /// Snapshot of the cache bookkeeping.
    pub fn cache_state(&self) -> JobTitleCache {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, minute, 0)
            .single()
            .expect("valid timestamp")
    }

    fn sample() -> Vec<JobTitle> {
        vec![JobTitle {
            code: 10,
            label: "Boulanger".to_string(),
            short_label: "Boulanger".to_string(),
            code_rome: "D1102".to_string(),
            rarely_used: false,
        }]
    }

    struct FlakySource {
        loads: AtomicUsize,
        failing: AtomicBool,
        modified: Mutex<Option<DateTime<Utc>>>,
    }

    impl FlakySource {
        fn new() -> Self {
            Self {
                loads: AtomicUsize::new(0),
                failing: AtomicBool::new(false),
                modified: Mutex::new(None),
            }
        }
    }

    impl CatalogSource for FlakySource {
        fn modified_at(&self) -> Result<Option<DateTime<Utc>>, CatalogError> {
            Ok(*self.modified.lock().expect("modified mutex poisoned"))
        }

        fn load(&self) -> Result<Vec<JobTitle>, CatalogError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(CatalogError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "referential missing",
                )));
            }
            Ok(sample())
        }
    }

    #[test]
    fn empty_cache_needs_reload() {
        let cache = JobTitleCache::default();
        assert!(cache.should_reload(at(9, 0), Duration::from_secs(60), None));
    }

    #[test]
    fn reload_after_ttl_or_source_change() {
        let cache = JobTitleCache {
            data: Some(Arc::new(sample())),
            loaded_at: Some(at(9, 0)),
            source_modified_at: Some(at(8, 0)),
        };
        let ttl = Duration::from_secs(600);

        assert!(!cache.should_reload(at(9, 5), ttl, Some(at(8, 0))));
        assert!(!cache.should_reload(at(9, 5), ttl, None));
        assert!(cache.should_reload(at(9, 10), ttl, Some(at(8, 0))));
        assert!(cache.should_reload(at(9, 5), ttl, Some(at(9, 4))));
    }

    #[test]
    fn serves_cached_copy_within_ttl() {
        let catalog = CachedCatalog::new(FlakySource::new(), Duration::from_secs(600));

        catalog.titles(at(9, 0)).expect("initial load");
        catalog.titles(at(9, 5)).expect("cached");

        assert_eq!(catalog.source.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn source_change_triggers_reload() {
        let catalog = CachedCatalog::new(FlakySource::new(), Duration::from_secs(600));
        catalog.titles(at(9, 0)).expect("initial load");

        *catalog.source.modified.lock().expect("modified mutex poisoned") = Some(at(9, 2));
        catalog.titles(at(9, 3)).expect("reloaded");

        assert_eq!(catalog.source.loads.load(Ordering::SeqCst), 2);
        assert_eq!(catalog.cache_state().source_modified_at, Some(at(9, 2)));
    }

    #[test]
    fn failed_reload_serves_stale_data() {
        let catalog = CachedCatalog::new(FlakySource::new(), Duration::from_secs(60));
        catalog.titles(at(9, 0)).expect("initial load");
        catalog.source.failing.store(true, Ordering::SeqCst);

        let titles = catalog.titles(at(10, 0)).expect("stale copy served");

        assert_eq!(titles.len(), 1);
        assert_eq!(catalog.cache_state().loaded_at, Some(at(9, 0)));
    }

    #[test]
    fn failed_first_load_propagates() {
        let source = FlakySource::new();
        source.failing.store(true, Ordering::SeqCst);
        let catalog = CachedCatalog::new(source, Duration::from_secs(60));

        assert!(matches!(catalog.titles(at(9, 0)), Err(CatalogError::Io(_))));
    }

    #[test]
    fn csv_source_skips_rarely_used_titles() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "code,label,short_label,code_rome,rarely_used").expect("write");
        writeln!(file, "11987,Développeur Full Stack,Dév full stack,M1805,false").expect("write");
        writeln!(file, "38753,Analyste COBOL,,M1805,true").expect("write");
        writeln!(file, "12002,Boulanger,,D1102,").expect("write");
        file.flush().expect("flush");

        let source = CsvCatalogSource::new(file.path());
        let titles = source.load().expect("catalog loads");

        assert_eq!(titles.len(), 2);
        assert_eq!(titles[0].short_label, "Dév full stack");
        assert_eq!(titles[1].short_label, "Boulanger");
        assert!(source.modified_at().expect("metadata").is_some());
    }

    #[test]
    fn csv_source_reports_missing_file() {
        let source = CsvCatalogSource::new("/nonexistent/job_titles.csv");
        assert!(matches!(source.load(), Err(CatalogError::Csv(_))));
    }
}
