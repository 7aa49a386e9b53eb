//! Shared fixture: a small study mirrored into an in-memory store.
//!
//! ```text
//! arm_1
//!   baseline   ── demographics (age, sex, consent)
//!              ── vitals       (weight, smoker)
//!              ── medications* (drug_name, dose)
//!   follow_up  ── vitals, medications*
//!                                     * repeating instrument
//! ```
//!
//! | record | age | sex | consent | weight | smoker | medications        |
//! |--------|-----|-----|---------|--------|--------|--------------------|
//! | 1      | 17  | F   | 1       | 60     | false  |                    |
//! | 2      | 18  | M   | 0       | 80     | true   | aspirin, ibuprofen |
//! | 3      | 45  | F   | yes     | 95     | true   |                    |
//! | 4      | 70  | M   | -       | -      | -      |                    |
//! | 5      | 30  | F   | 1       | 70     | false  |                    |
//! | 6      | -   | -   | -       | -      | -      | aspirin            |

#![allow(dead_code)]

use std::collections::BTreeSet;

use rss::model::{Category, FilterSpec, NewRow, Schema, SchemaBuilder};
use rss::store::Store;
use serde_json::Value;
use url::Url;

pub const BASELINE: i64 = 1;
pub const FOLLOW_UP: i64 = 2;

pub const DEMOGRAPHICS: i64 = 1;
pub const VITALS: i64 = 2;
pub const MEDICATIONS: i64 = 3;

pub fn study_schema() -> Schema {
    SchemaBuilder::new()
        .arm("arm_1")
        .event("baseline", "arm_1", false)
        .event("follow_up", "arm_1", false)
        .instrument("demographics", false, &["baseline"])
        .instrument("vitals", false, &["baseline", "follow_up"])
        .instrument("medications", true, &["baseline", "follow_up"])
        .field("age", "demographics")
        .field("sex", "demographics")
        .field("consent", "demographics")
        .field("weight", "vitals")
        .field("smoker", "vitals")
        .field("drug_name", "medications")
        .field("dose", "medications")
        .build()
        .unwrap()
}

/// An in-memory store holding the study schema and no rows.
pub fn empty_study() -> (Store, Schema) {
    let store = Store::open_in_memory().unwrap();
    let schema = study_schema();
    store.save_schema(&schema).unwrap();
    (store, schema)
}

/// An in-memory store holding the study in the table above.
pub fn study() -> (Store, Schema) {
    let (store, schema) = empty_study();

    let demographics = [
        (1, "17", "F", Some("1")),
        (2, "18", "M", Some("0")),
        (3, "45", "F", Some("yes")),
        (4, "70", "M", None),
        (5, "30", "F", Some("1")),
    ];
    for (record, age, sex, consent) in demographics {
        let mut row = NewRow::new(record, BASELINE, DEMOGRAPHICS)
            .with("age", age)
            .with("sex", sex);
        if let Some(consent) = consent {
            row = row.with("consent", consent);
        }
        store.insert_row(Category::Event, &row).unwrap();
    }

    let vitals = [(1, 60, "false"), (2, 80, "true"), (3, 95, "true"), (5, 70, "false")];
    for (record, weight, smoker) in vitals {
        let row = NewRow::new(record, BASELINE, VITALS)
            .with("weight", weight)
            .with("smoker", smoker);
        store.insert_row(Category::Event, &row).unwrap();
    }

    let medications = [
        (2, 1, "aspirin", "100"),
        (2, 2, "ibuprofen", "200"),
        (6, 1, "aspirin", "50"),
    ];
    for (record, instance, drug, dose) in medications {
        let row = NewRow::new(record, BASELINE, MEDICATIONS)
            .instance(instance)
            .with("drug_name", drug)
            .with("dose", dose);
        store.insert_row(Category::Instrument, &row).unwrap();
    }

    (store, schema)
}

pub fn ids(values: &[i64]) -> BTreeSet<i64> {
    values.iter().copied().collect()
}

pub fn spec(value: Value) -> FilterSpec {
    FilterSpec::from_json(&value).unwrap()
}

pub fn request_url() -> Url {
    Url::parse("http://localhost/api/v1/reports/events/report?per_page=50").unwrap()
}
