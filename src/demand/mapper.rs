//! Map stage for demand records

use super::{require, Context, DemandKey, Quantity};
use crate::config::ColumnMapping;
use crate::engine::Mapper;
use crate::error::MappingError;
use crate::source::Record;
use chrono::{NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Emits one `((day, (country, description)), quantity)` pair per record
#[derive(Debug, Clone, Default)]
pub struct DemandMapper {
    columns: ColumnMapping,
}

impl DemandMapper {
    pub fn new(columns: ColumnMapping) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &ColumnMapping {
        &self.columns
    }

    fn map_record(&self, record: &Record) -> Result<(DemandKey, Quantity), MappingError> {
        let columns = &self.columns;

        let raw_date = require(record, &columns.date)?;
        let date = parse_day(raw_date)
            .ok_or_else(|| MappingError::malformed(&columns.date, raw_date, "unrecognized date"))?;

        let country = require(record, &columns.country)?;
        let description = require(record, &columns.description)?;

        let raw_quantity = require(record, &columns.quantity)?;
        let quantity = parse_quantity(raw_quantity).ok_or_else(|| {
            MappingError::malformed(&columns.quantity, raw_quantity, "not an integer quantity")
        })?;

        Ok((
            DemandKey::new(date, Context::new(country, description)),
            quantity,
        ))
    }
}

impl Mapper<Record, DemandKey, Quantity> for DemandMapper {
    fn map(&self, record: &Record) -> Result<Vec<(DemandKey, Quantity)>, MappingError> {
        self.map_record(record).map(|pair| vec![pair])
    }
}

/// Parse a date or timestamp and truncate it to its calendar day
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parse an integral quantity; spreadsheet exports may write `3.0`
pub fn parse_quantity(raw: &str) -> Option<Quantity> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<Quantity>() {
        return Some(value);
    }

    let value = raw.parse::<f64>().ok()?;
    let in_range = value >= Quantity::MIN as f64 && value <= Quantity::MAX as f64;
    if value.is_finite() && value.fract() == 0.0 && in_range {
        Some(value as Quantity)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, &str)]) -> Record {
        Record::from_pairs(1, fields.iter().copied())
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_maps_exactly_one_pair() {
        let mapper = DemandMapper::default();
        let rec = record(&[
            ("InvoiceDate", "2011-01-01"),
            ("Country", "UK"),
            ("Description", "MUG"),
            ("Quantity", "3"),
        ]);

        let pairs = mapper.map(&rec).unwrap();
        assert_eq!(
            pairs,
            vec![(DemandKey::new(day(2011, 1, 1), Context::new("UK", "MUG")), 3)]
        );
    }

    #[test]
    fn test_timestamp_is_truncated_to_day() {
        let mapper = DemandMapper::default();
        let rec = record(&[
            ("InvoiceDate", "12/1/2010 8:26"),
            ("Country", "France"),
            ("Description", "  LANTERN "),
            ("Quantity", "-2"),
        ]);

        let (key, qty) = mapper.map(&rec).unwrap().remove(0);
        assert_eq!(key.date, day(2010, 12, 1));
        assert_eq!(key.context.description, "LANTERN");
        assert_eq!(qty, -2);
    }

    #[test]
    fn test_missing_quantity_is_mapping_error() {
        let mapper = DemandMapper::default();
        let rec = record(&[
            ("InvoiceDate", "2011-01-01"),
            ("Country", "UK"),
            ("Description", "MUG"),
        ]);

        assert_eq!(
            mapper.map(&rec).unwrap_err(),
            MappingError::missing("Quantity")
        );
    }

    #[test]
    fn test_blank_field_counts_as_missing() {
        let mapper = DemandMapper::default();
        let rec = record(&[
            ("InvoiceDate", "2011-01-01"),
            ("Country", "UK"),
            ("Description", "   "),
            ("Quantity", "1"),
        ]);

        assert_eq!(
            mapper.map(&rec).unwrap_err(),
            MappingError::missing("Description")
        );
    }

    #[test]
    fn test_malformed_fields() {
        let mapper = DemandMapper::default();
        let bad_date = record(&[
            ("InvoiceDate", "yesterday"),
            ("Country", "UK"),
            ("Description", "MUG"),
            ("Quantity", "1"),
        ]);
        let bad_qty = record(&[
            ("InvoiceDate", "2011-01-01"),
            ("Country", "UK"),
            ("Description", "MUG"),
            ("Quantity", "1.5"),
        ]);

        assert!(matches!(
            mapper.map(&bad_date),
            Err(MappingError::MalformedField { ref field, .. }) if field == "InvoiceDate"
        ));
        assert!(matches!(
            mapper.map(&bad_qty),
            Err(MappingError::MalformedField { ref field, .. }) if field == "Quantity"
        ));
    }

    #[test]
    fn test_custom_columns() {
        let mapper = DemandMapper::new(ColumnMapping {
            date: "day".into(),
            country: "market".into(),
            description: "sku".into(),
            quantity: "units".into(),
        });
        let rec = record(&[
            ("day", "2011-03-04T10:00:00"),
            ("market", "DE"),
            ("sku", "A1"),
            ("units", "7"),
        ]);

        let (key, qty) = mapper.map(&rec).unwrap().remove(0);
        assert_eq!(key, DemandKey::new(day(2011, 3, 4), Context::new("DE", "A1")));
        assert_eq!(qty, 7);
    }

    #[test]
    fn test_parse_quantity_variants() {
        assert_eq!(parse_quantity("12"), Some(12));
        assert_eq!(parse_quantity(" -4 "), Some(-4));
        assert_eq!(parse_quantity("6.0"), Some(6));
        assert_eq!(parse_quantity("6.25"), None);
        assert_eq!(parse_quantity("NaN"), None);
        assert_eq!(parse_quantity("many"), None);
    }

    #[test]
    fn test_parse_day_formats() {
        assert_eq!(parse_day("2011-01-05"), Some(day(2011, 1, 5)));
        assert_eq!(parse_day("2011-01-05 23:59:59"), Some(day(2011, 1, 5)));
        assert_eq!(parse_day("1/5/2011"), Some(day(2011, 1, 5)));
        assert_eq!(parse_day("05.01.2011"), Some(day(2011, 1, 5)));
        assert_eq!(parse_day("2011-13-01"), None);
    }
}
