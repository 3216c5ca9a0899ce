use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use crate::schema::{
    Comment, CoursePayment, HistoryEntry, Lesson, PaymentStats, SalaryPayment, Student, Teacher,
    TimeSlot, TransactionRecord, TransactionStatus, TransactionType, UpiStats, User,
};
use crate::validation::is_valid_vpa;

const EMBEDDED: &str = include_str!("../fixtures/portal.yaml");

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Read-only sample data the portal serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixtures {
    pub session_user: User,
    #[serde(default)]
    pub upi_transactions: Vec<TransactionRecord>,
    pub upi_stats: UpiStats,
    #[serde(default)]
    pub salary_payments: Vec<SalaryPayment>,
    #[serde(default)]
    pub course_payments: Vec<CoursePayment>,
    pub payment_stats: PaymentStats,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub slots: Vec<TimeSlot>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Filters and paging for the transaction history.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub status: Option<TransactionStatus>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
}

impl Fixtures {
    /// The data set compiled into the crate.
    pub fn embedded() -> anyhow::Result<Self> {
        Self::from_yaml_str(EMBEDDED).context("Embedded fixtures are invalid")
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let fixtures: Fixtures = serde_yaml::from_str(content)?;
        fixtures.check()?;
        Ok(fixtures)
    }

    pub async fn from_yaml_file(path: &str) -> anyhow::Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read fixtures from `{}`", path))?;
        let fixtures = Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse fixtures from `{}`", path))?;
        log::info!(
            "Loaded {} transactions and {} teachers from {}",
            fixtures.upi_transactions.len(),
            fixtures.teachers.len(),
            path
        );
        Ok(fixtures)
    }

    fn check(&self) -> anyhow::Result<()> {
        if !is_valid_vpa(&self.session_user.vpa) {
            bail!("Session user has an invalid UPI ID `{}`", self.session_user.vpa);
        }
        if let Some(record) = self.upi_transactions.iter().find(|r| !r.is_consistent()) {
            bail!(
                "Transaction {} is {:?} but its completion and failure fields disagree",
                record.id,
                record.status
            );
        }
        Ok(())
    }

    /// Filters first, then skips `offset` and takes `limit` (50 by default).
    pub fn transaction_history(&self, query: &HistoryQuery) -> Vec<TransactionRecord> {
        self.upi_transactions
            .iter()
            .filter(|r| query.status.is_none_or(|s| r.status == s))
            .filter(|r| query.kind.is_none_or(|k| r.kind == k))
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
            .cloned()
            .collect()
    }

    pub fn transaction(&self, id: &str) -> Option<&TransactionRecord> {
        self.upi_transactions.iter().find(|r| r.id == id)
    }

    pub fn teacher(&self, id: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.id == id)
    }

    pub fn students_of(&self, teacher_id: &str) -> Vec<Student> {
        self.students
            .iter()
            .filter(|s| s.teacher_id == teacher_id)
            .cloned()
            .collect()
    }

    pub fn lessons_of(&self, teacher_id: &str) -> Vec<Lesson> {
        self.lessons
            .iter()
            .filter(|l| l.teacher_id == teacher_id)
            .cloned()
            .collect()
    }

    pub fn slots_of(&self, teacher_id: &str) -> Vec<TimeSlot> {
        self.slots
            .iter()
            .filter(|s| s.teacher_id == teacher_id)
            .cloned()
            .collect()
    }

    pub fn comments_of(&self, teacher_id: &str) -> Vec<Comment> {
        self.comments
            .iter()
            .filter(|c| c.teacher_id == teacher_id)
            .cloned()
            .collect()
    }

    pub fn history_of(&self, teacher_id: &str) -> Vec<HistoryEntry> {
        self.history
            .iter()
            .filter(|h| h.teacher_id == teacher_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_fixtures_load() {
        let fixtures = Fixtures::embedded().unwrap();
        assert_eq!(fixtures.session_user.vpa, "teacher@paytm");
        assert_eq!(fixtures.upi_transactions[0].id, "txn_001");
        assert_eq!(fixtures.upi_stats.total_transactions, 247);
        assert!(fixtures.teacher("1").is_some());
        assert!(fixtures.teacher("2").is_none());
        assert_eq!(fixtures.slots_of("1").len(), 5);
        assert!(fixtures.students_of("2").is_empty());
    }

    #[test]
    fn history_filters_before_paging() {
        let fixtures = Fixtures::embedded().unwrap();

        let sent = fixtures.transaction_history(&HistoryQuery {
            kind: Some(TransactionType::Send),
            ..HistoryQuery::default()
        });
        assert!(sent.iter().all(|r| r.kind == TransactionType::Send));

        let paged = fixtures.transaction_history(&HistoryQuery {
            kind: Some(TransactionType::Send),
            offset: Some(1),
            limit: Some(1),
            ..HistoryQuery::default()
        });
        assert_eq!(paged.len(), 1);
        assert_eq!(paged[0].id, sent[1].id);

        let failed = fixtures.transaction_history(&HistoryQuery {
            status: Some(TransactionStatus::Failed),
            ..HistoryQuery::default()
        });
        assert!(failed.iter().all(|r| r.failure_reason.is_some()));

        let past_end = fixtures.transaction_history(&HistoryQuery {
            offset: Some(1000),
            ..HistoryQuery::default()
        });
        assert!(past_end.is_empty());
    }

    #[test]
    fn inconsistent_records_are_refused() {
        let broken = EMBEDDED.replacen(
            "    failureReason: Transaction declined by bank\n",
            "",
            1,
        );
        let err = Fixtures::from_yaml_str(&broken).unwrap_err();
        assert!(err.to_string().contains("txn_003"));
    }

    #[tokio::test]
    async fn missing_file_names_the_path() {
        let err = Fixtures::from_yaml_file("does/not/exist.yaml")
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.yaml"));
    }
}
