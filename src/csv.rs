use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::iter::{Enumerate, Peekable};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::{AccountId, PurchaseId, PurchaseRequest, TicketTypeRequest};
use crate::service::PurchaseOutcome;

/// Errors that can occur when reading purchases or writing outcomes
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: purchase {purchase} skipped, failed to parse row: {source}")]
    InvalidRow {
        line: usize,
        purchase: PurchaseId,
        source: csv::Error,
    },

    #[error("line {line}: purchase {purchase} belongs to account {expected}, not {found}")]
    AccountMismatch {
        line: usize,
        purchase: PurchaseId,
        expected: AccountId,
        found: AccountId,
    },

    #[error("failed to write outcome: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to flush outcomes: {0}")]
    Flush(#[from] io::Error),
}

#[derive(Debug, Deserialize)]
struct InputRow {
    purchase: PurchaseId,
    account: AccountId,
    r#type: String,
    tickets: u32,
}

impl InputRow {
    fn ticket_request(&self) -> TicketTypeRequest {
        TicketTypeRequest::from_label(&self.r#type, self.tickets)
    }
}

#[derive(Debug, Serialize)]
struct OutputRow {
    purchase: PurchaseId,
    account: AccountId,
    status: &'static str,
    amount: Option<u64>,
    seats: Option<u64>,
    reason: Option<String>,
}

type Records<R> = Peekable<Enumerate<csv::StringRecordsIntoIter<R>>>;

/// A raw record and its 1-indexed line in the input.
type Line = (usize, csv::StringRecord);

/// Purchase id of a raw record, read from the first column alone so that a
/// row with other malformed fields is still attributed to its purchase.
fn purchase_id(record: &csv::StringRecord) -> Option<PurchaseId> {
    record.get(0)?.parse().ok()
}

/// Iterator over purchases read from csv rows `purchase,account,type,tickets`.
///
/// Consecutive rows sharing a purchase id make up one purchase. A purchase
/// with any malformed row is reported as a single error and never yielded
/// in part.
pub struct PurchaseReader<R: io::Read> {
    headers: Option<csv::StringRecord>,
    records: Records<R>,
}

impl<R: io::Read> PurchaseReader<R> {
    pub fn new(reader: R) -> Self {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers = reader.headers().ok().cloned();
        let records = reader.into_records().enumerate().peekable();
        Self { headers, records }
    }

    fn parse_row(&self, record: &csv::StringRecord) -> Result<InputRow, csv::Error> {
        record.deserialize(self.headers.as_ref())
    }

    fn parse_purchase_row(
        &self,
        purchase: PurchaseId,
        (line, record): &Line,
    ) -> Result<InputRow, CsvError> {
        self.parse_row(record).map_err(|source| CsvError::InvalidRow {
            line: *line,
            purchase,
            source,
        })
    }

    /// Build one purchase from all of its rows, or fail it as a whole.
    fn assemble(
        &self,
        id: PurchaseId,
        first: Line,
        rest: Vec<Line>,
    ) -> Result<PurchaseRequest, CsvError> {
        let head = self.parse_purchase_row(id, &first)?;
        let mut request = PurchaseRequest {
            id,
            account_id: head.account,
            tickets: vec![head.ticket_request()],
        };

        for line in &rest {
            let row = self.parse_purchase_row(id, line)?;
            if row.account != request.account_id {
                return Err(CsvError::AccountMismatch {
                    line: line.0,
                    purchase: id,
                    expected: request.account_id,
                    found: row.account,
                });
            }
            request.tickets.push(row.ticket_request());
        }

        Ok(request)
    }
}

impl<R: io::Read> Iterator for PurchaseReader<R> {
    type Item = Result<PurchaseRequest, CsvError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (idx, record) = self.records.next()?;
        // 1-indexed, skip header
        let line = idx + 2;
        let record = match record {
            Ok(record) => record,
            Err(source) => return Some(Err(CsvError::Parse { line, source })),
        };

        let id = match purchase_id(&record) {
            Some(id) => id,
            None => match self.parse_row(&record) {
                Ok(row) => row.purchase,
                Err(source) => return Some(Err(CsvError::Parse { line, source })),
            },
        };

        let mut rest = Vec::new();
        while let Some((idx, Ok(record))) = self
            .records
            .next_if(|(_, next)| matches!(next, Ok(record) if purchase_id(record) == Some(id)))
        {
            rest.push((idx + 2, record));
        }

        Some(self.assemble(id, (line, record), rest))
    }
}

/// Read purchases from a csv file
pub fn read_purchases(path: impl AsRef<Path>) -> Result<PurchaseReader<File>, CsvError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| CsvError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(PurchaseReader::new(file))
}

/// Write purchase outcomes in csv format
pub fn write_outcomes<'a>(
    writer: impl io::Write,
    outcomes: impl IntoIterator<Item = &'a PurchaseOutcome>,
) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(writer);

    for outcome in outcomes {
        let row = match &outcome.result {
            Ok(purchase) => OutputRow {
                purchase: outcome.purchase,
                account: outcome.account_id,
                status: "accepted",
                amount: Some(purchase.amount.units()),
                seats: Some(purchase.seats),
                reason: None,
            },
            Err(e) => OutputRow {
                purchase: outcome.purchase,
                account: outcome.account_id,
                status: "rejected",
                amount: None,
                seats: None,
                reason: Some(e.to_string()),
            },
        };
        writer.serialize(&row)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Amount;
    use crate::model::{Purchase, TicketType};
    use crate::service::InvalidPurchase;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn read(content: &str) -> Vec<Result<PurchaseRequest, CsvError>> {
        let file = write_csv(content);
        read_purchases(file.path()).unwrap().collect()
    }

    #[test]
    fn read_single_purchase() {
        let results = read("purchase,account,type,tickets\n1,7,ADULT,2\n1,7,child,1\n");
        assert_eq!(results.len(), 1);

        let request = results.into_iter().next().unwrap().unwrap();
        assert_eq!(request.id, 1);
        assert_eq!(request.account_id, 7);
        assert_eq!(
            request.tickets,
            vec![
                TicketTypeRequest::new(TicketType::Adult, 2),
                TicketTypeRequest::new(TicketType::Child, 1),
            ]
        );
    }

    #[test]
    fn read_groups_consecutive_rows() {
        let results = read(
            "purchase,account,type,tickets\n1,7,ADULT,2\n2,8,ADULT,1\n2,8,INFANT,1\n3,7,ADULT,1\n",
        );
        let ids: Vec<_> = results.iter().map(|r| r.as_ref().unwrap().id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(results[1].as_ref().unwrap().tickets.len(), 2);
    }

    #[test]
    fn read_with_whitespace() {
        let results = read("purchase, account, type, tickets\n1, 1, ADULT, 1\n");
        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
    }

    #[test]
    fn read_keeps_unknown_types_for_validation() {
        let results = read("purchase,account,type,tickets\n1,1,SENIOR,1\n");
        let request = results.into_iter().next().unwrap().unwrap();
        assert_eq!(
            request.tickets,
            vec![TicketTypeRequest::from_label("SENIOR", 1)]
        );
    }

    #[test]
    fn read_accepts_non_positive_accounts() {
        let results = read("purchase,account,type,tickets\n1,-3,ADULT,1\n");
        assert_eq!(results[0].as_ref().unwrap().account_id, -3);
    }

    #[test]
    fn read_returns_error_for_negative_count() {
        let results = read("purchase,account,type,tickets\n1,1,ADULT,-1\n2,1,ADULT,1\n");
        assert_eq!(results.len(), 2);
        let err = results[0].as_ref().unwrap_err();
        assert!(matches!(
            err,
            CsvError::InvalidRow {
                line: 2,
                purchase: 1,
                ..
            }
        ));
        assert!(results[1].is_ok());
    }

    #[test]
    fn malformed_row_fails_its_whole_purchase() {
        let results = read(
            "purchase,account,type,tickets\n\
             1,1,CHILD,-1\n1,1,ADULT,1\n\
             2,1,ADULT,2\n2,1,CHILD,x\n2,1,INFANT,1\n\
             3,1,ADULT,1\n",
        );
        assert_eq!(results.len(), 3);
        assert!(matches!(
            results[0],
            Err(CsvError::InvalidRow {
                line: 2,
                purchase: 1,
                ..
            })
        ));
        assert!(matches!(
            results[1],
            Err(CsvError::InvalidRow {
                line: 5,
                purchase: 2,
                ..
            })
        ));
        let request = results[2].as_ref().unwrap();
        assert_eq!(request.id, 3);
        assert_eq!(
            request.tickets,
            vec![TicketTypeRequest::new(TicketType::Adult, 1)]
        );
    }

    #[test]
    fn short_row_fails_its_whole_purchase() {
        let results =
            read("purchase,account,type,tickets\n1,1,ADULT,1\n1,1,CHILD\n2,1,ADULT,1\n");
        assert_eq!(results.len(), 2);
        assert!(matches!(
            results[0],
            Err(CsvError::InvalidRow {
                line: 3,
                purchase: 1,
                ..
            })
        ));
        assert_eq!(results[1].as_ref().unwrap().id, 2);
    }

    #[test]
    fn unreadable_purchase_id_is_reported_alone() {
        let results = read("purchase,account,type,tickets\nx,1,ADULT,1\n1,1,ADULT,1\n");
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(CsvError::Parse { line: 2, .. })));
        assert_eq!(results[1].as_ref().unwrap().id, 1);
    }

    #[test]
    fn read_returns_error_for_account_mismatch() {
        let results = read(
            "purchase,account,type,tickets\n1,1,ADULT,1\n1,2,CHILD,1\n1,1,INFANT,1\n2,1,ADULT,1\n",
        );
        assert_eq!(results.len(), 2);
        let err = results[0].as_ref().unwrap_err();
        assert!(matches!(
            err,
            CsvError::AccountMismatch {
                line: 3,
                purchase: 1,
                expected: 1,
                found: 2
            }
        ));
        assert_eq!(results[1].as_ref().unwrap().id, 2);
    }

    #[test]
    fn read_missing_file_fails() {
        let err = read_purchases("does/not/exist.csv").err().unwrap();
        assert!(matches!(err, CsvError::Open { .. }));
    }

    #[test]
    fn write_accepted_and_rejected() {
        let outcomes = [
            PurchaseOutcome {
                purchase: 1,
                account_id: 1,
                result: Ok(Purchase {
                    account_id: 1,
                    amount: Amount::from_units(50),
                    seats: 3,
                }),
            },
            PurchaseOutcome {
                purchase: 2,
                account_id: 4,
                result: Err(InvalidPurchase::AdultRequired),
            },
        ];

        let mut buf = Vec::new();
        write_outcomes(&mut buf, &outcomes).unwrap();

        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "purchase,account,status,amount,seats,reason");
        assert_eq!(lines[1], "1,1,accepted,50,3,");
        assert_eq!(
            lines[2],
            "2,4,rejected,,,at least one adult ticket is required"
        );
    }
}
