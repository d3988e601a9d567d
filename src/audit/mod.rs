//! Audit trail module
//!
//! Appends one CSV row per dispatched alert. Writes happen on a background
//! task fed through a channel so a slow disk never stalls a sweep; the task
//! drains and exits when the logger is dropped.

use crate::enrich::Enrichment;
use crate::signal::{Alert, AlertKind};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

const CSV_HEADER: [&str; 11] = [
    "date",
    "time",
    "symbol",
    "price",
    "change_pct",
    "volume",
    "alert",
    "fair_value",
    "rsi",
    "support",
    "resistance",
];

/// One audit row, captured at dispatch time
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub kind: AlertKind,
    pub price: Decimal,
    pub percent_change: Decimal,
    pub volume: Decimal,
    pub enrichment: Enrichment,
}

impl AuditRecord {
    /// Build a record from a dispatched alert and its enrichment
    pub fn from_alert(alert: &Alert, enrichment: &Enrichment) -> Self {
        Self {
            timestamp: alert.timestamp,
            symbol: alert.symbol.clone(),
            kind: alert.kind,
            price: alert.price,
            percent_change: alert.percent_change,
            volume: alert.volume,
            enrichment: enrichment.clone(),
        }
    }
}

/// Audit logging statistics
#[derive(Debug, Default, Clone)]
pub struct AuditStats {
    pub records_received: u64,
    pub records_written: u64,
    pub write_errors: u64,
}

/// Append-only CSV audit logger
pub struct AuditLogger {
    tx: mpsc::Sender<AuditRecord>,
    path: PathBuf,
    stats: Arc<RwLock<AuditStats>>,
}

impl AuditLogger {
    /// Create a logger writing to the given CSV path
    pub fn new(path: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel(1024);
        let stats = Arc::new(RwLock::new(AuditStats::default()));

        let writer_path = path.clone();
        let writer_stats = stats.clone();
        tokio::spawn(async move {
            Self::run_writer(rx, writer_path, writer_stats).await;
        });

        Self { tx, path, stats }
    }

    /// Queue a record for appending
    pub async fn record(&self, record: AuditRecord) -> anyhow::Result<()> {
        self.tx
            .send(record)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to queue audit record: {}", e))?;
        Ok(())
    }

    /// Path of the CSV file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current statistics
    pub async fn stats(&self) -> AuditStats {
        self.stats.read().await.clone()
    }

    async fn run_writer(
        mut rx: mpsc::Receiver<AuditRecord>,
        path: PathBuf,
        stats: Arc<RwLock<AuditStats>>,
    ) {
        while let Some(record) = rx.recv().await {
            {
                let mut s = stats.write().await;
                s.records_received += 1;
            }

            match append_row(&path, &record) {
                Ok(()) => {
                    let mut s = stats.write().await;
                    s.records_written += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, path = ?path, "Failed to write audit row");
                    let mut s = stats.write().await;
                    s.write_errors += 1;
                }
            }
        }
        tracing::info!("Audit writer shutting down");
    }
}

/// Append a single row, writing the header when the file is new
fn append_row(path: &Path, record: &AuditRecord) -> anyhow::Result<()> {
    let is_new = !path.exists();

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if is_new {
        writer.write_record(CSV_HEADER)?;
    }

    writer.write_record([
        record.timestamp.format("%Y-%m-%d").to_string(),
        record.timestamp.format("%H:%M:%S").to_string(),
        record.symbol.clone(),
        record.price.to_string(),
        record.percent_change.to_string(),
        record.volume.to_string(),
        record.kind.as_str().to_string(),
        opt_field(record.enrichment.fair_value),
        opt_field(record.enrichment.rsi),
        opt_field(record.enrichment.support),
        opt_field(record.enrichment.resistance),
    ])?;
    writer.flush()?;

    Ok(())
}

/// Missing enrichment fields become empty cells
fn opt_field(value: Option<Decimal>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn record(symbol: &str, kind: AlertKind, enrichment: Enrichment) -> AuditRecord {
        AuditRecord {
            timestamp: Utc::now(),
            symbol: symbol.to_string(),
            kind,
            price: dec!(2.05),
            percent_change: dec!(4.12),
            volume: dec!(183000),
            enrichment,
        }
    }

    #[test]
    fn test_opt_field() {
        assert_eq!(opt_field(Some(dec!(1.5))), "1.5");
        assert_eq!(opt_field(None), "");
    }

    #[test]
    fn test_append_row_writes_header_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alerts.csv");

        append_row(&path, &record("SNDL", AlertKind::Entry, Enrichment::default())).unwrap();
        append_row(&path, &record("GSAT", AlertKind::ExitFinal, Enrichment::default())).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,time,symbol"));
        assert!(lines[1].contains("SNDL"));
        assert!(lines[1].contains("entry"));
        assert!(lines[2].contains("GSAT"));
        assert!(lines[2].contains("exit_final"));
    }

    #[test]
    fn test_append_row_enrichment_cells() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alerts.csv");

        let enrichment = Enrichment {
            fair_value: Some(dec!(2.50)),
            rsi: Some(dec!(28.5)),
            support: None,
            resistance: None,
        };
        append_row(&path, &record("SNDL", AlertKind::Enhancement, enrichment)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let row = content.lines().nth(1).unwrap();
        assert!(row.contains("2.50"));
        assert!(row.contains("28.5"));
        // empty trailing cells for missing support/resistance
        assert!(row.ends_with(",,"));
    }

    #[tokio::test]
    async fn test_logger_records_through_channel() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alerts.csv");
        let logger = AuditLogger::new(path.clone());

        logger
            .record(record("SNDL", AlertKind::Entry, Enrichment::default()))
            .await
            .unwrap();

        // give the writer task a moment
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let stats = logger.stats().await;
        assert_eq!(stats.records_received, 1);
        assert_eq!(stats.records_written, 1);
        assert_eq!(stats.write_errors, 0);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_from_alert_snapshot() {
        let alert = Alert {
            id: Uuid::new_v4(),
            kind: AlertKind::ExitWarning,
            symbol: "SNDL".to_string(),
            price: dec!(1.80),
            volume: dec!(90000),
            percent_change: dec!(-3.5),
            peak_volume: dec!(120000),
            entry_price: Some(dec!(2.00)),
            timestamp: Utc::now(),
        };
        let record = AuditRecord::from_alert(&alert, &Enrichment::default());
        assert_eq!(record.symbol, "SNDL");
        assert_eq!(record.kind, AlertKind::ExitWarning);
        assert_eq!(record.volume, dec!(90000));
    }
}
