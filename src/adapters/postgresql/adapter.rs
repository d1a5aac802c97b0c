//! PostgreSQL adapter implementing [`SportsStore`]

use crate::adapters::database::traits::{
    ArchiveInsert, DataSource, SeasonRow, SportsStore, TableStats, UpsertOutcome, ViewRow,
};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::PostgreSQLSyncLog;
use crate::adapters::postgresql::sql;
use crate::core::sync::SyncRecord;
use crate::domain::{NaturalKey, Result, SeasonWindow, SyncError, Table};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;

/// PostgreSQL implementation of [`SportsStore`]
///
/// Upserts use `INSERT ... ON CONFLICT DO UPDATE`, so each row write is atomic
/// and concurrent writers to the same key cannot race.
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn new_with_arc(client: Arc<PostgreSQLClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

fn view_row_from_json(mut data: Value) -> Result<ViewRow> {
    let data_source = data
        .get("data_source")
        .and_then(Value::as_str)
        .and_then(DataSource::parse)
        .ok_or_else(|| SyncError::Database("view row without data_source".to_string()))?;
    let season_year = data
        .get("season_year")
        .and_then(Value::as_i64)
        .map(|year| year as i32);

    if let Value::Object(map) = &mut data {
        map.remove("data_source");
    }

    Ok(ViewRow {
        data_source,
        season_year,
        data,
    })
}

#[async_trait]
impl SportsStore for PostgreSQLAdapter {
    fn backend_name(&self) -> &'static str {
        "postgresql"
    }

    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }

    async fn upsert_row(
        &self,
        table: Table,
        key: &NaturalKey,
        row: &Value,
    ) -> Result<UpsertOutcome> {
        let statement = sql::upsert_statement(table);
        let result = self.client.query_one(&statement, &[row]).await?;
        let inserted: bool = result.get("inserted");

        tracing::trace!(table = %table, key = %key, inserted, "Row upserted");

        Ok(if inserted {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        })
    }

    async fn insert_row_if_absent(
        &self,
        table: Table,
        key: &NaturalKey,
        row: &Value,
    ) -> Result<UpsertOutcome> {
        let statement = sql::insert_if_absent_statement(table);
        let affected = self.client.execute(&statement, &[row]).await?;

        tracing::trace!(table = %table, key = %key, inserted = affected > 0, "Row inserted if absent");

        Ok(if affected > 0 {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Unchanged
        })
    }

    async fn row_exists(&self, table: Table, key: &NaturalKey) -> Result<bool> {
        let statement = sql::exists_statement(table);
        let key_object = key.to_json_object(table.key_columns());
        let row = self.client.query_one(&statement, &[&key_object]).await?;
        Ok(row.get(0))
    }

    async fn find_team_id_by_abbreviation(&self, abbreviation: &str) -> Result<Option<i64>> {
        let rows = self
            .client
            .query(
                "SELECT id FROM teams WHERE upper(abbreviation) = upper($1) ORDER BY id LIMIT 1",
                &[&abbreviation],
            )
            .await?;
        Ok(rows.first().map(|row| row.get("id")))
    }

    async fn append_sync_record(&self, record: &SyncRecord) -> Result<()> {
        let log = PostgreSQLSyncLog::from_domain(record);

        self.client
            .execute(
                r#"
                INSERT INTO data_sync_logs (
                    run_id, table_name, sync_timestamp, records_processed, records_created,
                    records_updated, records_errors, duration_ms, status, error_message
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
                &[
                    &log.run_id,
                    &log.table_name,
                    &log.sync_timestamp,
                    &log.records_processed,
                    &log.records_created,
                    &log.records_updated,
                    &log.records_errors,
                    &log.duration_ms,
                    &log.status,
                    &log.error_message,
                ],
            )
            .await?;

        Ok(())
    }

    async fn recent_sync_records(&self, limit: usize) -> Result<Vec<SyncRecord>> {
        let limit = limit as i64;
        let rows = self
            .client
            .query(
                r#"
                SELECT run_id, table_name, sync_timestamp, records_processed, records_created,
                       records_updated, records_errors, duration_ms, status, error_message
                FROM data_sync_logs
                ORDER BY sync_timestamp DESC, id DESC
                LIMIT $1
                "#,
                &[&limit],
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| PostgreSQLSyncLog::from_row(row).to_domain())
            .collect())
    }

    async fn season_rows(&self, table: Table, window: &SeasonWindow) -> Result<Vec<SeasonRow>> {
        let statement = sql::season_rows_statement(table);
        let rows = self
            .client
            .query(&statement, &[&window.start, &window.end])
            .await?;

        rows.into_iter()
            .map(|row| {
                let data: Value = row.get("data");
                let key = NaturalKey::from_row(&data, table.key_columns()).ok_or_else(|| {
                    SyncError::Database(format!("{table} row without a natural key"))
                })?;
                Ok(SeasonRow { key, data })
            })
            .collect()
    }

    async fn insert_archive_row(
        &self,
        table: Table,
        season_year: i32,
        archived_at: DateTime<Utc>,
        row: &SeasonRow,
    ) -> Result<ArchiveInsert> {
        let Value::Object(fields) = &row.data else {
            return Err(SyncError::Row(format!("{table} row is not an object")));
        };
        let mut archived = fields.clone();
        archived.insert("season_year".to_string(), Value::from(season_year));
        archived.insert(
            "archived_at".to_string(),
            Value::from(archived_at.to_rfc3339()),
        );
        let archived = Value::Object(archived);

        let statement = sql::archive_insert_statement(table);
        let affected = self.client.execute(&statement, &[&archived]).await?;

        Ok(if affected == 0 {
            ArchiveInsert::AlreadyArchived
        } else {
            ArchiveInsert::Inserted
        })
    }

    async fn table_stats(&self, table_name: &str) -> Result<TableStats> {
        if !sql::is_known_table(table_name) {
            return Err(SyncError::Database(format!(
                "relation \"{table_name}\" is not managed by courtsync"
            )));
        }

        let row = self
            .client
            .query_one(&sql::stats_statement(table_name), &[])
            .await?;

        Ok(TableStats {
            table: table_name.to_string(),
            total_records: row.get("total"),
            oldest_record: row.get("oldest"),
            newest_record: row.get("newest"),
        })
    }

    async fn view_rows(&self, table: Table, season_year: Option<i32>) -> Result<Vec<ViewRow>> {
        let statement = sql::view_rows_statement(table);
        let rows = self.client.query(&statement, &[&season_year]).await?;

        rows.into_iter()
            .map(|row| view_row_from_json(row.get("data")))
            .collect()
    }

    async fn close(&self) {
        self.client.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_view_row_from_json() {
        let row = view_row_from_json(json!({
            "id": 3,
            "season_year": 2023,
            "archived_at": "2024-10-02T00:00:00+00:00",
            "data_source": "archived"
        }))
        .unwrap();

        assert_eq!(row.data_source, DataSource::Archived);
        assert_eq!(row.season_year, Some(2023));
        assert!(row.data.get("data_source").is_none());
    }

    #[test]
    fn test_live_view_row_has_no_season() {
        let row = view_row_from_json(json!({
            "id": 3,
            "season_year": null,
            "data_source": "current"
        }))
        .unwrap();

        assert_eq!(row.data_source, DataSource::Current);
        assert!(row.season_year.is_none());
    }

    #[test]
    fn test_view_row_requires_source() {
        assert!(view_row_from_json(json!({"id": 1})).is_err());
    }
}
