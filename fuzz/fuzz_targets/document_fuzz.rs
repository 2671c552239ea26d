//! Fuzz test for table document decoding
//!
//! Feeds arbitrary byte sequences through the document decoder and the
//! table materialization pass to find panics, infinite loops and memory
//! safety issues.
//!
//! Run with: cargo +nightly fuzz run document_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::path::Path;
use trellis_core::{DataTypeInfo, DataTypeRegistry};
use trellis_storage::TableDocument;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // Decoding arbitrary JSON must return Ok or Err, never panic.
    let Ok(document) = serde_json::from_str::<TableDocument>(input) else {
        return;
    };

    let mut registry = DataTypeRegistry::new();
    registry.register(DataTypeInfo::new("imagej-imgplus", "Image"));
    registry.register(DataTypeInfo::new("mask", "Mask"));

    // Materialization either yields an internally consistent table or a
    // storage error; a partial table must never escape.
    if let Ok(table) = document.into_table(Path::new("fuzz.json"), &registry) {
        for (i, row) in table.rows().iter().enumerate() {
            assert_eq!(row.index, i);
            for annotation in row.data_annotations() {
                assert_eq!(annotation.owner, Some(i));
                assert!(!annotation.storage_folder.is_absolute());
            }
        }
        let _ = table.text_annotation_columns();
        let _ = table.data_annotation_columns();
    }
});
