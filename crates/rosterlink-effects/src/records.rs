//! CSV-backed record source
//!
//! Reads an export of the result sheet. The file is re-read on every call, so
//! replacing it on disk takes effect without a restart. Column headers are
//! matched after trimming, record ids are normalized with
//! [`RecordId::from_sheet_cell`].

use async_trait::async_trait;
use rosterlink_core::effects::{RecordSourceEffects, RecordSourceError};
use rosterlink_core::{ColumnMapping, Record, RecordId, RecordSummary, SubjectGrade};
use std::path::PathBuf;

/// Record source over a CSV file
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    path: PathBuf,
    columns: ColumnMapping,
}

/// Column positions resolved from the header row
struct SheetLayout {
    id: usize,
    name: usize,
    subjects: Vec<(String, usize)>,
    total: usize,
    percentage: usize,
}

impl SheetLayout {
    fn resolve(headers: &csv::StringRecord, columns: &ColumnMapping) -> Result<Self, RecordSourceError> {
        let position = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == wanted.trim())
                .ok_or_else(|| RecordSourceError::Malformed(format!("missing column `{wanted}`")))
        };

        let mut subjects = Vec::with_capacity(columns.subjects.len());
        for subject in &columns.subjects {
            subjects.push((subject.clone(), position(subject)?));
        }

        Ok(Self {
            id: position(&columns.id)?,
            name: position(&columns.name)?,
            subjects,
            total: position(&columns.total)?,
            percentage: position(&columns.percentage)?,
        })
    }

    fn record_id(&self, row: &csv::StringRecord) -> Option<RecordId> {
        row.get(self.id)
            .and_then(|cell| RecordId::from_sheet_cell(cell).ok())
    }

    fn name(&self, row: &csv::StringRecord) -> String {
        row.get(self.name).unwrap_or_default().trim().to_string()
    }

    fn to_record(&self, id: RecordId, row: &csv::StringRecord) -> Result<Record, RecordSourceError> {
        let number = |index: usize, column: &str| -> Result<f64, RecordSourceError> {
            let cell = row.get(index).unwrap_or_default().trim();
            cell.parse::<f64>().map_err(|_| {
                RecordSourceError::Malformed(format!(
                    "record {id}: column `{column}` is not numeric: {cell:?}"
                ))
            })
        };

        let mut subjects = Vec::with_capacity(self.subjects.len());
        for (subject, index) in &self.subjects {
            subjects.push(SubjectGrade {
                subject: subject.clone(),
                score: number(*index, subject)?,
            });
        }

        let total = number(self.total, "total")?;
        let percentage = number(self.percentage, "percentage")?;
        Ok(Record {
            name: self.name(row),
            id,
            subjects,
            total,
            percentage,
        })
    }
}

impl CsvRecordSource {
    /// Create a source reading `path` with the given column headers
    pub fn new(path: PathBuf, columns: ColumnMapping) -> Self {
        Self { path, columns }
    }

    async fn read_sheet(&self) -> Result<Vec<u8>, RecordSourceError> {
        tokio::fs::read(&self.path).await.map_err(|e| {
            RecordSourceError::Unavailable(format!("{}: {e}", self.path.display()))
        })
    }

    fn reader(bytes: &[u8]) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes)
    }

    fn find_row(
        bytes: &[u8],
        columns: &ColumnMapping,
        wanted: &RecordId,
    ) -> Result<Option<Record>, RecordSourceError> {
        let mut reader = Self::reader(bytes);
        let headers = reader.headers().map_err(malformed)?.clone();
        let layout = SheetLayout::resolve(&headers, columns)?;

        for row in reader.records() {
            let row = row.map_err(malformed)?;
            match layout.record_id(&row) {
                Some(id) if &id == wanted => return layout.to_record(id, &row).map(Some),
                _ => continue,
            }
        }
        Ok(None)
    }

    fn search_rows(
        bytes: &[u8],
        columns: &ColumnMapping,
        terms: &[String],
    ) -> Result<Vec<RecordSummary>, RecordSourceError> {
        let mut reader = Self::reader(bytes);
        let headers = reader.headers().map_err(malformed)?.clone();
        let layout = SheetLayout::resolve(&headers, columns)?;
        let terms: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();

        let mut matches = Vec::new();
        for row in reader.records() {
            let row = row.map_err(malformed)?;
            let name = layout.name(&row);
            let lowered = name.to_lowercase();
            if !terms.iter().all(|term| lowered.contains(term.as_str())) {
                continue;
            }
            if let Some(id) = layout.record_id(&row) {
                matches.push(RecordSummary { id, name });
            }
        }
        Ok(matches)
    }
}

fn malformed(err: csv::Error) -> RecordSourceError {
    RecordSourceError::Malformed(err.to_string())
}

#[async_trait]
impl RecordSourceEffects for CsvRecordSource {
    async fn fetch(&self, id: &RecordId) -> Result<Option<Record>, RecordSourceError> {
        let bytes = self.read_sheet().await?;
        let found = Self::find_row(&bytes, &self.columns, id);
        if let Err(err) = &found {
            tracing::warn!(record = %id, error = %err, "record sheet unreadable");
        }
        found
    }

    async fn search(&self, terms: &[String]) -> Result<Vec<RecordSummary>, RecordSourceError> {
        let bytes = self.read_sheet().await?;
        Self::search_rows(&bytes, &self.columns, terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\
ID,Name,Math,Physics,Total,percentage
1001.0,Mona Adel,90,80,170,85
1002,Omar Hassan,70,60,130,65.5
1003,Mona Samir,50,bad,50,25
";

    fn columns() -> ColumnMapping {
        ColumnMapping {
            id: "ID".to_string(),
            name: "Name".to_string(),
            subjects: vec!["Math".to_string(), "Physics".to_string()],
            total: "Total".to_string(),
            percentage: "percentage".to_string(),
        }
    }

    async fn source_with(contents: &str) -> (tempfile::TempDir, CsvRecordSource) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.csv");
        tokio::fs::write(&path, contents).await.unwrap();
        (dir, CsvRecordSource::new(path, columns()))
    }

    #[tokio::test]
    async fn fetch_normalizes_float_ids() {
        let (_dir, source) = source_with(SHEET).await;
        let record = source
            .fetch(&RecordId::parse("1001").unwrap())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(record.name, "Mona Adel");
        assert_eq!(record.subjects.len(), 2);
        assert_eq!(record.subjects[1].subject, "Physics");
        assert_eq!(record.total, 170.0);
        assert_eq!(record.percentage, 85.0);
    }

    #[tokio::test]
    async fn missing_row_is_none_and_bad_cell_is_malformed() {
        let (_dir, source) = source_with(SHEET).await;
        assert_eq!(
            source.fetch(&RecordId::parse("9999").unwrap()).await.unwrap(),
            None
        );
        assert!(matches!(
            source.fetch(&RecordId::parse("1003").unwrap()).await,
            Err(RecordSourceError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let source = CsvRecordSource::new(PathBuf::from("/nonexistent/result.csv"), columns());
        assert!(matches!(
            source.fetch(&RecordId::parse("1").unwrap()).await,
            Err(RecordSourceError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn missing_column_is_malformed() {
        let (_dir, source) = source_with("ID,Name\n1,A\n").await;
        assert!(matches!(
            source.fetch(&RecordId::parse("1").unwrap()).await,
            Err(RecordSourceError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn search_requires_every_term() {
        let (_dir, source) = source_with(SHEET).await;
        let hits = source.search(&["mona".to_string()]).await.unwrap();
        assert_eq!(hits.len(), 2);

        let hits = source
            .search(&["MONA".to_string(), "adel".to_string()])
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "1001");
    }
}
