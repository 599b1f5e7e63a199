//! Record codec - one record per pipe-delimited line
//!
//! Book line (10 fields):
//! `copyId|title|author|isbn|borrowed|borrowedBy|borrowDate|dueDate|reserved|reservedBy`
//!
//! User line (4 fields):
//! `userId|name|phone|email`
//!
//! Flags are `0`/`1`, dates are `YYYY-MM-DD`, absent values are empty strings.
//! Pure functions only; reading and writing files lives in the adapters.

use chrono::NaiveDate;

use crate::domain::result::DecodeError;
use crate::domain::{BookCopy, CopyState, Loan, User, FIELD_DELIMITER};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A record that can be stored as a single delimited line
pub trait Record: Sized + Clone {
    /// Human-readable record kind, used in diagnostics
    const KIND: &'static str;

    /// Number of fields in the encoded line
    const ARITY: usize;

    fn id(&self) -> &str;

    fn encode(&self) -> String;

    fn decode(line: &str) -> Result<Self, DecodeError>;
}

fn split_fields<const N: usize>(line: &str) -> Result<[&str; N], DecodeError> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    let found = fields.len();
    fields
        .try_into()
        .map_err(|_| DecodeError::FieldCount { expected: N, found })
}

fn join_fields(fields: &[&str]) -> String {
    let mut line = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(FIELD_DELIMITER);
        }
        line.push_str(field);
    }
    line
}

fn encode_flag(flag: bool) -> &'static str {
    if flag {
        "1"
    } else {
        "0"
    }
}

fn decode_flag(raw: &str) -> Result<bool, DecodeError> {
    match raw {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(DecodeError::Flag(other.to_string())),
    }
}

fn encode_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn decode_date(raw: &str) -> Result<Option<NaiveDate>, DecodeError> {
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|_| DecodeError::Date(raw.to_string()))
}

fn inconsistent(msg: &str) -> DecodeError {
    DecodeError::InconsistentState(msg.to_string())
}

impl Record for BookCopy {
    const KIND: &'static str = "book";
    const ARITY: usize = 10;

    fn id(&self) -> &str {
        &self.id
    }

    fn encode(&self) -> String {
        let (borrowed, borrowed_by, borrow_date, due_date) = match &self.state {
            CopyState::Borrowed(loan) => (
                true,
                loan.borrower.as_str(),
                encode_date(Some(loan.borrowed_on)),
                encode_date(Some(loan.due_on)),
            ),
            _ => (false, "", String::new(), String::new()),
        };
        let (reserved, reserved_by) = match &self.state {
            CopyState::Reserved { by } => (true, by.as_str()),
            _ => (false, ""),
        };

        join_fields(&[
            self.id.as_str(),
            self.title.as_str(),
            self.author.as_str(),
            self.isbn.as_str(),
            encode_flag(borrowed),
            borrowed_by,
            borrow_date.as_str(),
            due_date.as_str(),
            encode_flag(reserved),
            reserved_by,
        ])
    }

    fn decode(line: &str) -> Result<Self, DecodeError> {
        let [id, title, author, isbn, borrowed, borrowed_by, borrow_date, due_date, reserved, reserved_by] =
            split_fields::<10>(line)?;

        if id.is_empty() {
            return Err(DecodeError::EmptyField("copy id"));
        }

        let borrowed = decode_flag(borrowed)?;
        let reserved = decode_flag(reserved)?;
        let borrow_date = decode_date(borrow_date)?;
        let due_date = decode_date(due_date)?;

        let state = match (borrowed, reserved) {
            (true, true) => return Err(inconsistent("both borrowed and reserved")),
            (true, false) => {
                if !reserved_by.is_empty() {
                    return Err(inconsistent("borrowed copy names a reserver"));
                }
                if borrowed_by.is_empty() {
                    return Err(inconsistent("borrowed copy has no borrower"));
                }
                let (Some(borrowed_on), Some(due_on)) = (borrow_date, due_date) else {
                    return Err(inconsistent("borrowed copy is missing its dates"));
                };
                CopyState::Borrowed(Loan {
                    borrower: borrowed_by.to_string(),
                    borrowed_on,
                    due_on,
                })
            }
            (false, true) => {
                if !borrowed_by.is_empty() || borrow_date.is_some() || due_date.is_some() {
                    return Err(inconsistent("reserved copy carries loan fields"));
                }
                if reserved_by.is_empty() {
                    return Err(inconsistent("reserved copy has no reserver"));
                }
                CopyState::Reserved {
                    by: reserved_by.to_string(),
                }
            }
            (false, false) => {
                if !borrowed_by.is_empty() || borrow_date.is_some() || due_date.is_some() {
                    return Err(inconsistent("available copy carries loan fields"));
                }
                if !reserved_by.is_empty() {
                    return Err(inconsistent("available copy names a reserver"));
                }
                CopyState::Available
            }
        };

        Ok(BookCopy {
            id: id.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.to_string(),
            state,
        })
    }
}

impl Record for User {
    const KIND: &'static str = "user";
    const ARITY: usize = 4;

    fn id(&self) -> &str {
        &self.id
    }

    fn encode(&self) -> String {
        join_fields(&[
            self.id.as_str(),
            self.name.as_str(),
            self.phone.as_str(),
            self.email.as_str(),
        ])
    }

    fn decode(line: &str) -> Result<Self, DecodeError> {
        let [id, name, phone, email] = split_fields::<4>(line)?;
        if id.is_empty() {
            return Err(DecodeError::EmptyField("user id"));
        }
        Ok(User {
            id: id.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookTemplate, Identity};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn copy_with(state: CopyState) -> BookCopy {
        let mut copy = BookCopy::from_template(&BookTemplate::new("Dune", "Frank Herbert", "111"));
        copy.state = state;
        copy
    }

    #[test]
    fn test_book_round_trip_each_state() {
        let states = [
            CopyState::Available,
            CopyState::Borrowed(Loan::start("u1", date(2024, 1, 1)).unwrap()),
            CopyState::Reserved { by: "u2".to_string() },
        ];
        for state in states {
            let copy = copy_with(state);
            assert_eq!(BookCopy::decode(&copy.encode()).unwrap(), copy);
        }
    }

    #[test]
    fn test_book_encoding_layout() {
        let mut copy = copy_with(CopyState::Borrowed(Loan::start("u1", date(2024, 1, 1)).unwrap()));
        copy.id = "c1".to_string();
        assert_eq!(copy.encode(), "c1|Dune|Frank Herbert|111|1|u1|2024-01-01|2024-01-15|0|");

        copy.state = CopyState::Available;
        assert_eq!(copy.encode(), "c1|Dune|Frank Herbert|111|0||||0|");
    }

    #[test]
    fn test_available_line() {
        // one pipe too many
        assert_eq!(
            BookCopy::decode("c1|Dune|Frank Herbert|111|0|||||0|"),
            Err(DecodeError::FieldCount { expected: 10, found: 11 })
        );

        let copy = BookCopy::decode("c1|Dune|Frank Herbert|111|0||||0|").unwrap();
        assert!(copy.is_available());
        assert_eq!(copy.encode(), "c1|Dune|Frank Herbert|111|0||||0|");
    }

    #[test]
    fn test_reserved_line() {
        let copy = BookCopy::decode("c2|Dune|Frank Herbert|111|0||||1|u2").unwrap();
        assert_eq!(copy.reserved_by(), Some("u2"));
    }

    #[test]
    fn test_book_decode_rejects_bad_lines() {
        assert_eq!(
            BookCopy::decode("c1|Dune|Frank Herbert"),
            Err(DecodeError::FieldCount { expected: 10, found: 3 })
        );
        assert_eq!(
            BookCopy::decode("c1|Dune|F|111|yes||||0|"),
            Err(DecodeError::Flag("yes".to_string()))
        );
        assert_eq!(
            BookCopy::decode("c1|Dune|F|111|1|u1|2024-13-01|2024-01-15|0|"),
            Err(DecodeError::Date("2024-13-01".to_string()))
        );
        assert!(matches!(
            BookCopy::decode("c1|Dune|F|111|1|u1|2024-01-01|2024-01-15|1|u2"),
            Err(DecodeError::InconsistentState(_))
        ));
        assert!(matches!(
            BookCopy::decode("c1|Dune|F|111|1||2024-01-01|2024-01-15|0|"),
            Err(DecodeError::InconsistentState(_))
        ));
        assert!(matches!(
            BookCopy::decode("c1|Dune|F|111|1|u1|||0|"),
            Err(DecodeError::InconsistentState(_))
        ));
        assert_eq!(
            BookCopy::decode("|Dune|F|111|0||||0|"),
            Err(DecodeError::EmptyField("copy id"))
        );
    }

    #[test]
    fn test_user_round_trip() {
        let user = User::register(Identity::new("Ada", "555-0100", "ada@example.com"));
        assert_eq!(User::decode(&user.encode()).unwrap(), user);

        let no_email = User::register(Identity::new("Bob", "", ""));
        assert_eq!(User::decode(&no_email.encode()).unwrap(), no_email);
    }

    #[test]
    fn test_user_decode_rejects_wrong_arity() {
        assert_eq!(
            User::decode("u1|Ada|555"),
            Err(DecodeError::FieldCount { expected: 4, found: 3 })
        );
        assert_eq!(
            User::decode("u1|Ada|555|a@b.c|extra"),
            Err(DecodeError::FieldCount { expected: 4, found: 5 })
        );
    }
}
