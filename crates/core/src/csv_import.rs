//! CSV lead import: parsing, header detection, row validation, and
//! customer-type classification.
//!
//! This module has zero database dependencies. The API layer reads the
//! uploaded file, passes the raw bytes plus the tenant's existing lead emails
//! to [`plan_import`], and persists the resulting [`ImportPlan`].
//!
//! Failures are per row: a malformed row becomes a [`RowError`] in the plan
//! and never aborts the rest of the file. Only structural problems (bad
//! encoding, unterminated quotes, no usable header) fail the whole import.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::customer_type::{classify_email, is_known_domain, CustomerType};
use crate::error::CoreError;
use crate::lead::{MAX_NAME_LENGTH, MAX_REFERENCE_LENGTH};
use crate::validation::{is_valid_email, normalize_email, normalize_phone};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of data rows accepted in a single import.
pub const MAX_IMPORT_ROWS: usize = 5_000;

/// UTF-8 byte-order mark some spreadsheet exports prepend.
const UTF8_BOM: &str = "\u{feff}";

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// A single parsed CSV record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    /// 1-based physical line the record starts on.
    pub line: usize,
    pub values: Vec<String>,
}

/// A parsed CSV document: header row plus data records.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub records: Vec<CsvRecord>,
}

/// Parse raw CSV bytes into a header and data records.
///
/// Handles double-quoted fields, `""` escapes, commas and line breaks inside
/// quotes, and both LF and CRLF line endings. Blank lines are skipped.
pub fn parse_csv(data: &[u8]) -> Result<CsvTable, CoreError> {
    let text = std::str::from_utf8(data)
        .map_err(|e| CoreError::Validation(format!("CSV is not valid UTF-8: {e}")))?;
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

    let mut records = split_records(text)?.into_iter();

    let header = records
        .next()
        .ok_or_else(|| CoreError::Validation("CSV is empty".into()))?;
    let headers: Vec<String> = header.values.iter().map(|h| h.trim().to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CoreError::Validation("CSV header row is empty".into()));
    }

    Ok(CsvTable {
        headers,
        records: records.collect(),
    })
}

/// Split text into records, honouring quotes.
fn split_records(text: &str) -> Result<Vec<CsvRecord>, CoreError> {
    let mut records = Vec::new();
    let mut values: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_started = false;
    let mut line = 1usize;
    let mut record_line = 1usize;
    let mut quote_line = 0usize;
    let mut chars = text.chars().peekable();

    let mut finish_record = |values: &mut Vec<String>, field: &mut String, start: usize| {
        values.push(std::mem::take(field));
        let record = std::mem::take(values);
        if record.iter().any(|v| !v.trim().is_empty()) {
            records.push(CsvRecord {
                line: start,
                values: record,
            });
        }
    };

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                '\n' => {
                    field.push('\n');
                    line += 1;
                }
                '\r' if chars.peek() == Some(&'\n') => {}
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            '"' if !field_started => {
                in_quotes = true;
                field_started = true;
                quote_line = line;
            }
            ',' => {
                values.push(std::mem::take(&mut field));
                field_started = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                finish_record(&mut values, &mut field, record_line);
                field_started = false;
                line += 1;
                record_line = line;
            }
            _ => {
                // Leading whitespace before an opening quote is not data.
                if !ch.is_whitespace() {
                    field_started = true;
                }
                field.push(ch);
            }
        }
    }

    if in_quotes {
        return Err(CoreError::Validation(format!(
            "Unterminated quoted field starting on line {quote_line}"
        )));
    }
    finish_record(&mut values, &mut field, record_line);

    Ok(records)
}

// ---------------------------------------------------------------------------
// Header detection
// ---------------------------------------------------------------------------

/// Lead attributes the importer knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportField {
    Name,
    FirstName,
    LastName,
    Email,
    Phone,
    Reference,
}

/// Exact aliases (after normalisation) for each field.
const NAME_ALIASES: &[&str] = &[
    "name",
    "fullname",
    "ownername",
    "customername",
    "homeowner",
    "homeownername",
    "contactname",
    "leadname",
    "customer",
];
const FIRST_NAME_ALIASES: &[&str] = &["firstname", "first", "givenname", "ownerfirstname"];
const LAST_NAME_ALIASES: &[&str] = &["lastname", "last", "surname", "familyname", "ownerlastname"];
const EMAIL_ALIASES: &[&str] = &[
    "owneremail",
    "email",
    "emailaddress",
    "customeremail",
    "contactemail",
    "owneremailaddress",
];
const PHONE_ALIASES: &[&str] = &[
    "ownerphone",
    "phone",
    "phonenumber",
    "ownerphonenumber",
    "customerphone",
    "contactphone",
    "mobile",
    "mobilephone",
    "cell",
    "cellphone",
    "telephone",
];
const REFERENCE_ALIASES: &[&str] = &[
    "reference",
    "ref",
    "referenceid",
    "referencenumber",
    "refno",
    "refnumber",
    "externalid",
    "accountnumber",
];

/// Substring fallbacks, tried only for fields still unresolved after the
/// exact pass. Ordered most-specific first. Reference tokens must prefix the
/// header; the others may appear anywhere in it.
const FUZZY_TOKENS: &[(ImportField, &[&str])] = &[
    (ImportField::Email, &["email"]),
    (ImportField::Phone, &["phone", "mobile", "cell"]),
    (ImportField::Reference, &["reference", "refno", "refid", "refnum"]),
    (ImportField::FirstName, &["firstname"]),
    (ImportField::LastName, &["lastname", "surname"]),
    (ImportField::Name, &["name"]),
];

/// Headers containing any of these never win a fallback match.
/// `"Contact Preferences"` or `"Email Opt-In"` describe a contact, they do
/// not hold one.
const FUZZY_EXCLUSIONS: &[&str] = &["preference", "type", "optin"];

fn fuzzy_matches(field: ImportField, header: &str, tokens: &[&str]) -> bool {
    if FUZZY_EXCLUSIONS.iter().any(|x| header.contains(x)) {
        return false;
    }
    // "Best Email Address" is still an email column; "Mailing Address" is not
    // anything we read.
    if field != ImportField::Email && header.contains("address") {
        return false;
    }
    match field {
        ImportField::Reference => tokens.iter().any(|t| header.starts_with(t)),
        _ => tokens.iter().any(|t| header.contains(t)),
    }
}

/// Lower-case a header and keep only ASCII letters and digits, so that
/// `"Owner E-mail"`, `"owner_email"`, and `"OwnerEmail"` compare equal.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn aliases(field: ImportField) -> &'static [&'static str] {
    match field {
        ImportField::Name => NAME_ALIASES,
        ImportField::FirstName => FIRST_NAME_ALIASES,
        ImportField::LastName => LAST_NAME_ALIASES,
        ImportField::Email => EMAIL_ALIASES,
        ImportField::Phone => PHONE_ALIASES,
        ImportField::Reference => REFERENCE_ALIASES,
    }
}

/// Where the lead's name comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NameColumns {
    Single { index: usize },
    Split { first: usize, last: Option<usize> },
}

/// Column indices resolved from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnMap {
    pub name: NameColumns,
    pub email: Option<usize>,
    pub phone: Option<usize>,
    pub reference: Option<usize>,
}

impl ColumnMap {
    /// Resolve columns from a header row.
    ///
    /// An exact alias match on the normalised header wins; remaining fields
    /// then fall back to substring matching. A column is never assigned to
    /// more than one field. Fails when no name column can be found.
    pub fn detect(headers: &[String]) -> Result<Self, CoreError> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let mut taken: HashSet<usize> = HashSet::new();
        let mut resolved: Vec<(ImportField, usize)> = Vec::new();

        let order = [
            ImportField::Email,
            ImportField::Phone,
            ImportField::Reference,
            ImportField::FirstName,
            ImportField::LastName,
            ImportField::Name,
        ];

        for field in order {
            let hit = normalized
                .iter()
                .enumerate()
                .find(|(i, h)| !taken.contains(i) && aliases(field).contains(&h.as_str()));
            if let Some((i, _)) = hit {
                taken.insert(i);
                resolved.push((field, i));
            }
        }

        for (field, tokens) in FUZZY_TOKENS {
            if resolved.iter().any(|(f, _)| f == field) {
                continue;
            }
            let hit = normalized
                .iter()
                .enumerate()
                .find(|(i, h)| !taken.contains(i) && fuzzy_matches(*field, h, tokens));
            if let Some((i, _)) = hit {
                taken.insert(i);
                resolved.push((*field, i));
            }
        }

        let find = |field: ImportField| {
            resolved
                .iter()
                .find(|(f, _)| *f == field)
                .map(|(_, i)| *i)
        };

        let name = match (find(ImportField::Name), find(ImportField::FirstName)) {
            (Some(index), _) => NameColumns::Single { index },
            (None, Some(first)) => NameColumns::Split {
                first,
                last: find(ImportField::LastName),
            },
            (None, None) => {
                return Err(CoreError::Validation(format!(
                    "CSV has no name column. Found headers: {headers:?}"
                )))
            }
        };

        Ok(Self {
            name,
            email: find(ImportField::Email),
            phone: find(ImportField::Phone),
            reference: find(ImportField::Reference),
        })
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// Raw values pulled from one data record, trimmed, empty as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub line: usize,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub reference: Option<String>,
}

fn cell(record: &CsvRecord, index: Option<usize>) -> Option<String> {
    let value = record.values.get(index?)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Project every data record onto the resolved columns.
pub fn extract_rows(table: &CsvTable, map: &ColumnMap) -> Vec<ImportRow> {
    table
        .records
        .iter()
        .map(|record| {
            let name = match map.name {
                NameColumns::Single { index } => cell(record, Some(index)),
                NameColumns::Split { first, last } => {
                    let joined = [cell(record, Some(first)), cell(record, last)]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>()
                        .join(" ");
                    (!joined.is_empty()).then_some(joined)
                }
            };
            ImportRow {
                line: record.line,
                name,
                email: cell(record, map.email),
                phone: cell(record, map.phone),
                reference: cell(record, map.reference),
            }
        })
        .collect()
}

/// A row that passed validation and is ready to insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidLead {
    pub line: usize,
    pub name: String,
    /// Lower-cased.
    pub email: Option<String>,
    /// Ten national digits.
    pub phone: Option<String>,
    pub reference: Option<String>,
    pub customer_type: Option<CustomerType>,
    /// True when the email domain was on neither list.
    pub classified_by_default: bool,
}

/// A row that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Validate one extracted row.
pub fn validate_row(row: &ImportRow) -> Result<ValidLead, String> {
    let name = row.name.clone().ok_or("Name is required")?;
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(format!("Name exceeds {MAX_NAME_LENGTH} characters"));
    }

    let email = match &row.email {
        Some(raw) if is_valid_email(raw) => Some(normalize_email(raw)),
        Some(raw) => return Err(format!("Invalid email '{raw}'")),
        None => None,
    };

    let phone = match &row.phone {
        Some(raw) => Some(normalize_phone(raw).ok_or_else(|| format!("Invalid phone '{raw}'"))?),
        None => None,
    };

    if email.is_none() && phone.is_none() {
        return Err("Row has neither an email nor a phone number".into());
    }

    if let Some(reference) = &row.reference {
        if reference.chars().count() > MAX_REFERENCE_LENGTH {
            return Err(format!("Reference exceeds {MAX_REFERENCE_LENGTH} characters"));
        }
    }

    let customer_type = email.as_deref().and_then(classify_email);
    let classified_by_default = email.as_deref().is_some_and(|e| !is_known_domain(e));

    Ok(ValidLead {
        line: row.line,
        name,
        email,
        phone,
        reference: row.reference.clone(),
        customer_type,
        classified_by_default,
    })
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// The outcome of checking a whole file, before anything is written.
#[derive(Debug, Clone, Serialize)]
pub struct ImportPlan {
    pub total_rows: usize,
    pub columns: ColumnMap,
    pub leads: Vec<ValidLead>,
    pub duplicates: Vec<RowError>,
    pub errors: Vec<RowError>,
}

/// Per-customer-type counts of the importable leads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CustomerTypeCounts {
    pub owner: usize,
    pub lease: usize,
    pub unclassified: usize,
}

impl ImportPlan {
    pub fn customer_type_counts(&self) -> CustomerTypeCounts {
        let mut counts = CustomerTypeCounts::default();
        for lead in &self.leads {
            match lead.customer_type {
                Some(CustomerType::Owner) => counts.owner += 1,
                Some(CustomerType::Lease) => counts.lease += 1,
                None => counts.unclassified += 1,
            }
        }
        counts
    }
}

/// Parse, detect columns, validate, classify, and de-duplicate a CSV upload.
///
/// `existing_emails` holds the tenant's current lead emails, lower-cased.
/// A row is a duplicate when its email is already in the tenant or appeared
/// on an earlier row of the same file.
pub fn plan_import(data: &[u8], existing_emails: &HashSet<String>) -> Result<ImportPlan, CoreError> {
    let table = parse_csv(data)?;
    if table.records.len() > MAX_IMPORT_ROWS {
        return Err(CoreError::Validation(format!(
            "CSV has {} rows; the maximum per import is {MAX_IMPORT_ROWS}",
            table.records.len()
        )));
    }

    let columns = ColumnMap::detect(&table.headers)?;
    let rows = extract_rows(&table, &columns);

    let mut seen: HashSet<String> = HashSet::new();
    let mut leads = Vec::new();
    let mut duplicates = Vec::new();
    let mut errors = Vec::new();

    for row in &rows {
        match validate_row(row) {
            Ok(lead) => {
                if let Some(email) = &lead.email {
                    if existing_emails.contains(email) {
                        duplicates.push(RowError {
                            line: lead.line,
                            message: format!("A lead with email '{email}' already exists"),
                        });
                        continue;
                    }
                    if !seen.insert(email.clone()) {
                        duplicates.push(RowError {
                            line: lead.line,
                            message: format!("Email '{email}' appears earlier in this file"),
                        });
                        continue;
                    }
                }
                leads.push(lead);
            }
            Err(message) => errors.push(RowError {
                line: row.line,
                message,
            }),
        }
    }

    Ok(ImportPlan {
        total_rows: rows.len(),
        columns,
        leads,
        duplicates,
        errors,
    })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    // --- parsing ---

    #[test]
    fn parses_quoted_commas_and_escaped_quotes() {
        let csv = "Name,Notes\n\"Smith, Jane\",\"Said \"\"yes\"\"\"\n";
        let table = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.headers, headers(&["Name", "Notes"]));
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].values, vec!["Smith, Jane", "Said \"yes\""]);
    }

    #[test]
    fn parses_newlines_inside_quotes_and_tracks_lines() {
        let csv = "Name,Address\r\n\"Jane\",\"1 Main St\r\nApt 2\"\r\nBob,2 Oak Ave\r\n";
        let table = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].line, 2);
        assert_eq!(table.records[0].values[1], "1 Main St\nApt 2");
        assert_eq!(table.records[1].line, 4);
        assert_eq!(table.records[1].values, vec!["Bob", "2 Oak Ave"]);
    }

    #[test]
    fn skips_blank_lines_and_strips_bom() {
        let csv = "\u{feff}Name\n\nJane\n,\n\nBob";
        let table = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.headers, headers(&["Name"]));
        let names: Vec<_> = table.records.iter().map(|r| r.values[0].as_str()).collect();
        assert_eq!(names, vec!["Jane", "Bob"]);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_matches!(parse_csv(b""), Err(CoreError::Validation(_)));
        assert_matches!(parse_csv(b"\n\n"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn unterminated_quote_is_rejected() {
        let err = parse_csv(b"Name\n\"Jane").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert_matches!(parse_csv(&[0x4e, 0xff, 0xfe]), Err(CoreError::Validation(_)));
    }

    // --- header detection ---

    #[test]
    fn detects_canonical_headers() {
        let map =
            ColumnMap::detect(&headers(&["Name", "Owner Email", "Owner Phone", "Reference"]))
                .unwrap();
        assert_eq!(map.name, NameColumns::Single { index: 0 });
        assert_eq!(map.email, Some(1));
        assert_eq!(map.phone, Some(2));
        assert_eq!(map.reference, Some(3));
    }

    #[test]
    fn detects_headers_with_punctuation_and_case() {
        let map = ColumnMap::detect(&headers(&[
            "REF #",
            "owner_phone",
            "E-mail Address",
            "Customer Name",
        ]))
        .unwrap();
        assert_eq!(map.name, NameColumns::Single { index: 3 });
        assert_eq!(map.email, Some(2));
        assert_eq!(map.phone, Some(1));
        assert_eq!(map.reference, Some(0));
    }

    #[test]
    fn fuzzy_match_falls_back_to_substrings() {
        let map = ColumnMap::detect(&headers(&[
            "Primary Homeowner Name",
            "Best Email To Reach",
            "Cell #",
        ]))
        .unwrap();
        assert_eq!(map.name, NameColumns::Single { index: 0 });
        assert_eq!(map.email, Some(1));
        assert_eq!(map.phone, Some(2));
        assert_eq!(map.reference, None);
    }

    #[test]
    fn mailing_address_is_not_an_email_column() {
        let map =
            ColumnMap::detect(&headers(&["Name", "Mailing Address", "Phone"])).unwrap();
        assert_eq!(map.email, None);
        assert_eq!(map.phone, Some(2));

        let csv = "Name,Mailing Address,Phone\nJane,12 Oak St,555-234-5678\n";
        let plan = plan_import(csv.as_bytes(), &HashSet::new()).unwrap();
        assert!(plan.errors.is_empty());
        assert_eq!(plan.leads.len(), 1);
        assert_eq!(plan.leads[0].phone.as_deref(), Some("5552345678"));
    }

    #[test]
    fn preference_and_opt_in_columns_are_ignored() {
        let map = ColumnMap::detect(&headers(&["Name", "Email", "Contact Preferences"])).unwrap();
        assert_eq!(map.reference, None);

        let map = ColumnMap::detect(&headers(&["Name", "Email Opt-In", "Email Type"])).unwrap();
        assert_eq!(map.email, None);
    }

    #[test]
    fn reference_fallback_requires_prefix() {
        let map =
            ColumnMap::detect(&headers(&["Name", "Reference Code", "Customer Reference"]))
                .unwrap();
        assert_eq!(map.reference, Some(1));

        let map = ColumnMap::detect(&headers(&["Name", "Best Email Address"])).unwrap();
        assert_eq!(map.email, Some(1));
    }

    #[test]
    fn owner_email_is_not_mistaken_for_name() {
        let map = ColumnMap::detect(&headers(&["Owner Email", "Owner Name"])).unwrap();
        assert_eq!(map.email, Some(0));
        assert_eq!(map.name, NameColumns::Single { index: 1 });
    }

    #[test]
    fn split_first_and_last_name_columns() {
        let map = ColumnMap::detect(&headers(&["First Name", "Last Name", "Email"])).unwrap();
        assert_eq!(
            map.name,
            NameColumns::Split {
                first: 0,
                last: Some(1)
            }
        );
    }

    #[test]
    fn missing_name_column_is_an_error() {
        let err = ColumnMap::detect(&headers(&["Email", "Phone"])).unwrap_err();
        assert!(err.to_string().contains("no name column"));
    }

    // --- row validation ---

    fn row(name: Option<&str>, email: Option<&str>, phone: Option<&str>) -> ImportRow {
        ImportRow {
            line: 2,
            name: name.map(String::from),
            email: email.map(String::from),
            phone: phone.map(String::from),
            reference: None,
        }
    }

    #[test]
    fn valid_row_is_normalized_and_classified() {
        let lead = validate_row(&row(Some("Jane"), Some("Jane@Gmail.com"), Some("(555) 234-5678")))
            .unwrap();
        assert_eq!(lead.email.as_deref(), Some("jane@gmail.com"));
        assert_eq!(lead.phone.as_deref(), Some("5552345678"));
        assert_eq!(lead.customer_type, Some(CustomerType::Owner));
        assert!(!lead.classified_by_default);
    }

    #[test]
    fn row_without_name_is_rejected() {
        assert_eq!(
            validate_row(&row(None, Some("a@gmail.com"), None)).unwrap_err(),
            "Name is required"
        );
    }

    #[test]
    fn row_with_bad_email_or_phone_is_rejected() {
        assert!(validate_row(&row(Some("A"), Some("nope"), None))
            .unwrap_err()
            .contains("Invalid email"));
        assert!(validate_row(&row(Some("A"), None, Some("123")))
            .unwrap_err()
            .contains("Invalid phone"));
    }

    #[test]
    fn row_needs_a_contact_method() {
        assert!(validate_row(&row(Some("A"), None, None)).is_err());
        let phone_only = validate_row(&row(Some("A"), None, Some("555-234-5678"))).unwrap();
        assert_eq!(phone_only.customer_type, None);
    }

    // --- full plan ---

    #[test]
    fn plan_classifies_and_collects_row_errors() {
        let csv = "\
Name,Owner Email,Owner Phone,Reference
Jane Owner,user@gmail.com,555-234-5678,R-1
Lee Lease,user@enphase.com,,R-2
,nobody@gmail.com,,R-3
Bad Email,not-an-email,,R-4
Corp Buyer,buyer@smallbiz.org,,R-5
";
        let plan = plan_import(csv.as_bytes(), &HashSet::new()).unwrap();

        assert_eq!(plan.total_rows, 5);
        assert_eq!(plan.leads.len(), 3);
        assert_eq!(plan.errors.len(), 2);
        assert_eq!(plan.errors[0].line, 4);
        assert_eq!(plan.errors[1].line, 5);

        assert_eq!(plan.leads[0].customer_type, Some(CustomerType::Owner));
        assert_eq!(plan.leads[1].customer_type, Some(CustomerType::Lease));
        assert_eq!(plan.leads[2].customer_type, Some(CustomerType::Owner));
        assert!(plan.leads[2].classified_by_default);

        let counts = plan.customer_type_counts();
        assert_eq!(counts.owner, 2);
        assert_eq!(counts.lease, 1);
    }

    #[test]
    fn plan_flags_duplicates_against_tenant_and_file() {
        let csv = "Name,Email\nA,a@gmail.com\nB,b@gmail.com\nA again,A@GMAIL.COM\n";
        let existing: HashSet<String> = ["b@gmail.com".to_string()].into_iter().collect();
        let plan = plan_import(csv.as_bytes(), &existing).unwrap();

        assert_eq!(plan.leads.len(), 1);
        assert_eq!(plan.duplicates.len(), 2);
        assert!(plan.duplicates[0].message.contains("already exists"));
        assert!(plan.duplicates[1].message.contains("earlier in this file"));
    }

    #[test]
    fn plan_rejects_oversized_files() {
        let mut csv = String::from("Name,Phone\n");
        for i in 0..=MAX_IMPORT_ROWS {
            csv.push_str(&format!("Lead {i},555-234-5678\n"));
        }
        let err = plan_import(csv.as_bytes(), &HashSet::new()).unwrap_err();
        assert!(err.to_string().contains("maximum per import"));
    }

    #[test]
    fn plan_combines_split_name_columns() {
        let csv = "First Name,Last Name,Email\nJane,Doe,jane@yahoo.com\nCher,,cher@aol.com\n";
        let plan = plan_import(csv.as_bytes(), &HashSet::new()).unwrap();
        assert_eq!(plan.leads[0].name, "Jane Doe");
        assert_eq!(plan.leads[1].name, "Cher");
    }
}
