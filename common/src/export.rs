use anyhow::Context;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::schema::{Category, TransactionRecord, TransactionStatus, TransactionType};

// Kept in step with the field order of `HistoryRow`.
const HISTORY_HEADER: &str = "id,transactionId,referenceNumber,fromAddress,toAddress,amount,currency,\
     description,status,type,category,createdTimestamp,completedTimestamp,failureReason\n";

/// One CSV line of the transaction report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryRow<'a> {
    id: &'a str,
    transaction_id: &'a str,
    reference_number: &'a str,
    from_address: &'a str,
    to_address: &'a str,
    amount: f64,
    currency: &'a str,
    description: &'a str,
    status: TransactionStatus,
    #[serde(rename = "type")]
    kind: TransactionType,
    category: Category,
    created_timestamp: String,
    completed_timestamp: String,
    failure_reason: &'a str,
}

impl<'a> From<&'a TransactionRecord> for HistoryRow<'a> {
    fn from(record: &'a TransactionRecord) -> Self {
        HistoryRow {
            id: &record.id,
            transaction_id: &record.transaction_id,
            reference_number: &record.reference_number,
            from_address: &record.from_address,
            to_address: &record.to_address,
            amount: record.amount,
            currency: &record.currency,
            description: &record.description,
            status: record.status,
            kind: record.kind,
            category: record.category,
            created_timestamp: record.created_timestamp.to_rfc3339(),
            completed_timestamp: record
                .completed_timestamp
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            failure_reason: record.failure_reason.as_deref().unwrap_or(""),
        }
    }
}

/// Writes `records` as CSV. The header row is written even when there are
/// no records.
pub async fn write_history_csv<W>(mut writer: W, records: &[TransactionRecord]) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(HISTORY_HEADER.as_bytes()).await?;
    let mut wtr = csv_async::AsyncWriterBuilder::new()
        .has_headers(false)
        .create_serializer(writer);
    for record in records {
        wtr.serialize(HistoryRow::from(record)).await?;
    }
    wtr.flush().await?;
    Ok(())
}

pub async fn history_csv_bytes(records: &[TransactionRecord]) -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_history_csv(&mut buffer, records).await?;
    Ok(buffer)
}

pub async fn write_history_csv_file(path: &str, records: &[TransactionRecord]) -> anyhow::Result<()> {
    let file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create `{}`", path))?;
    write_history_csv(file, records).await?;
    log::info!("Exported {} transactions to {}", records.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixtures;

    #[tokio::test]
    async fn history_exports_with_header() {
        let fixtures = Fixtures::embedded().unwrap();
        let bytes = history_csv_bytes(&fixtures.upi_transactions).await.unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some(
                "id,transactionId,referenceNumber,fromAddress,toAddress,amount,currency,\
                 description,status,type,category,createdTimestamp,completedTimestamp,failureReason"
            )
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("txn_001,UPI2024011501,402912345678,teacher@paytm,sarah.johnson@gpay,"));
        assert!(first.contains(",success,send,salary,"));
        assert_eq!(text.lines().count(), fixtures.upi_transactions.len() + 1);
        assert!(text.contains("Transaction declined by bank"));
    }

    #[tokio::test]
    async fn empty_history_still_has_a_header() {
        let bytes = history_csv_bytes(&[]).await.unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), HISTORY_HEADER);
    }
}
