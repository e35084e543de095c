use super::*;
use crate::config::FormatConfig;
use crate::coverage::{select_cover, CoverageIndex, Selection};
use crate::document::{Document, Element};
use crate::extractor::{extract, RecordBatch};
use crate::fixtures::{diffgram, pairs, Row};
use std::collections::BTreeSet;

fn batch(xml: &str) -> RecordBatch {
    extract(xml.as_bytes(), &FormatConfig::default())
        .unwrap()
        .into_batch()
        .unwrap()
}

fn selection(buyer: &str, records: Vec<usize>) -> Selection {
    Selection {
        buyer_id: buyer.to_string(),
        records,
        new_items: BTreeSet::new(),
    }
}

fn serialize(serializer: &PartitionSerializer<'_>, sequence: usize, pick: &Selection) -> Partition {
    serializer
        .serialize(sequence, pick, &mut NameAllocator::new())
        .unwrap()
}

fn records_of(partition: &Partition) -> Vec<Element> {
    let doc = Document::parse(&partition.bytes).unwrap();
    doc.root
        .descendants_named("Pedidos")
        .into_iter()
        .cloned()
        .collect()
}

fn field(record: &Element, name: &str) -> String {
    record.child(name).map(|e| e.text()).unwrap_or_default()
}

// ========================================================================
// Serialization
// ========================================================================

#[test]
fn test_partition_holds_only_selected_records() {
    let batch = batch(&pairs(&[("B1", "I1"), ("B2", "I2"), ("B1", "I3")]));
    let config = FormatConfig::default();
    let serializer = PartitionSerializer::new(&batch, &config);

    let partition = serialize(&serializer, 1, &selection("B1", vec![0, 2]));
    let records = records_of(&partition);

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| field(r, "CNPJLojaCompradora") == "B1"));
    assert_eq!(field(&records[0], "CodigoFab"), "I1");
    assert_eq!(field(&records[1], "CodigoFab"), "I3");
    assert_eq!(partition.record_count, 2);
    assert_eq!(partition.buyer_id, "B1");
}

#[test]
fn test_row_identity_regenerated() {
    let batch = batch(&pairs(&[("B2", "I0"), ("B1", "I1"), ("B2", "I2"), ("B1", "I3")]));
    let config = FormatConfig::default();
    let serializer = PartitionSerializer::new(&batch, &config);

    let partition = serialize(&serializer, 1, &selection("B1", vec![1, 3]));
    let records = records_of(&partition);

    assert_eq!(records[0].attribute("diffgr:id"), Some("Pedidos1"));
    assert_eq!(records[0].attribute("msdata:rowOrder"), Some("0"));
    assert_eq!(records[1].attribute("diffgr:id"), Some("Pedidos2"));
    assert_eq!(records[1].attribute("msdata:rowOrder"), Some("1"));
}

#[test]
fn test_no_records_leak_between_partitions() {
    let batch = batch(&pairs(&[("B1", "I1"), ("B2", "I2"), ("B3", "I3")]));
    let config = FormatConfig::default();
    let serializer = PartitionSerializer::new(&batch, &config);

    let first = serialize(&serializer, 1, &selection("B1", vec![0]));
    let second = serialize(&serializer, 2, &selection("B3", vec![2]));

    assert_eq!(records_of(&first).len(), 1);
    let second_records = records_of(&second);
    assert_eq!(second_records.len(), 1);
    assert_eq!(field(&second_records[0], "CNPJLojaCompradora"), "B3");

    // the template keeps every original record
    assert_eq!(batch.document.root.descendants_named("Pedidos").len(), 3);
}

#[test]
fn test_serialization_is_deterministic() {
    let batch = batch(&pairs(&[("B1", "I1"), ("B1", "I2"), ("B2", "I3")]));
    let config = FormatConfig::default();
    let serializer = PartitionSerializer::new(&batch, &config);
    let pick = selection("B1", vec![0, 1]);

    let a = serialize(&serializer, 1, &pick);
    let _ = serialize(&serializer, 2, &selection("B2", vec![2]));
    let b = serialize(&serializer, 1, &pick);

    assert_eq!(a.bytes, b.bytes);
    assert_eq!(a.sha256(), b.sha256());
    assert_eq!(a.sha256().len(), 64);
}

#[test]
fn test_other_document_content_carried_through() {
    let batch = batch(&pairs(&[("B1", "I1"), ("B2", "I2")]));
    let config = FormatConfig::default();
    let serializer = PartitionSerializer::new(&batch, &config);

    let partition = serialize(&serializer, 1, &selection("B2", vec![1]));
    let doc = Document::parse(&partition.bytes).unwrap();

    assert_eq!(doc.root.name, "DataSet");
    let schema = doc.root.child("schema").unwrap();
    assert_eq!(schema.attribute("id"), Some("NewDataSet"));
    let diffgram = doc.root.child("diffgram").unwrap();
    assert_eq!(diffgram.name, "diffgr:diffgram");
    assert!(diffgram.attribute("xmlns:diffgr").is_some());
}

#[test]
fn test_passthrough_fields_preserved() {
    let batch = batch(&pairs(&[("B1", "I1")]));
    let config = FormatConfig::default();
    let serializer = PartitionSerializer::new(&batch, &config);

    let partition = serialize(&serializer, 1, &selection("B1", vec![0]));
    let record = &records_of(&partition)[0];

    assert_eq!(field(record, "Descricao"), "Item I1");
    assert_eq!(field(record, "Quantidade"), "1");
    let names: Vec<_> = record.child_elements().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["CNPJLojaCompradora", "CodigoFab", "Descricao", "Grupo", "Quantidade"]
    );
}

#[test]
fn test_namespace_declared_when_missing() {
    let xml = "<NewDataSet><Pedidos><CNPJLojaCompradora>B1</CNPJLojaCompradora><CodigoFab>I1</CodigoFab></Pedidos></NewDataSet>";
    let batch = batch(xml);
    let config = FormatConfig::default();
    let serializer = PartitionSerializer::new(&batch, &config);

    let partition = serialize(&serializer, 1, &selection("B1", vec![0]));
    let doc = Document::parse(&partition.bytes).unwrap();

    assert_eq!(
        doc.root.attribute("xmlns:diffgr"),
        Some(crate::config::DIFFGRAM_NAMESPACE)
    );
    assert_eq!(
        doc.root.attribute("xmlns:msdata"),
        Some(crate::config::MSDATA_NAMESPACE)
    );
    let record = doc.root.child("Pedidos").unwrap();
    assert_eq!(record.attribute("diffgr:id"), Some("Pedidos1"));
}

#[test]
fn test_existing_prefix_reused() {
    let xml = r#"<root xmlns:dg="urn:schemas-microsoft-com:xml-diffgram-v1" xmlns:md="urn:schemas-microsoft-com:xml-msdata"><NewDataSet><Pedidos dg:id="Pedidos7" md:rowOrder="6"><CNPJLojaCompradora>B1</CNPJLojaCompradora><CodigoFab>I1</CodigoFab></Pedidos></NewDataSet></root>"#;
    let batch = batch(xml);
    let config = FormatConfig::default();
    let serializer = PartitionSerializer::new(&batch, &config);

    let partition = serialize(&serializer, 1, &selection("B1", vec![0]));
    let record = &records_of(&partition)[0];

    assert_eq!(record.attribute("dg:id"), Some("Pedidos1"));
    assert_eq!(record.attribute("md:rowOrder"), Some("0"));
    assert!(record.attribute("diffgr:id").is_none());
    assert_eq!(record.attributes.len(), 2);
}

#[test]
fn test_unknown_record_position_is_error() {
    let batch = batch(&pairs(&[("B1", "I1")]));
    let config = FormatConfig::default();
    let serializer = PartitionSerializer::new(&batch, &config);

    let result = serializer.serialize(
        1,
        &selection("B1", vec![5]),
        &mut NameAllocator::new(),
    );
    assert!(matches!(result, Err(crate::SplitError::UnknownRecord(5))));
}

// ========================================================================
// Labels, names and summaries
// ========================================================================

#[test]
fn test_label_from_first_record_group() {
    let xml = diffgram(&[
        Row::new("B1", "I1").group(Some("Tools")),
        Row::new("B1", "I2").group(Some("Paint")),
    ]);
    let batch = batch(&xml);
    let config = FormatConfig::default();
    let serializer = PartitionSerializer::new(&batch, &config);

    let partition = serialize(&serializer, 1, &selection("B1", vec![0, 1]));
    assert_eq!(partition.label, "Tools");
    assert_eq!(partition.file_name, "Tools_B1.xml");
}

#[test]
fn test_label_defaults_to_sentinel() {
    let xml = diffgram(&[Row::new("B1", "I1").group(None)]);
    let batch = batch(&xml);
    let config = FormatConfig::default();
    let serializer = PartitionSerializer::new(&batch, &config);

    let partition = serialize(&serializer, 1, &selection("B1", vec![0]));
    assert_eq!(partition.label, "sem-grupo");
}

#[test]
fn test_empty_selection_uses_sentinel_and_clears_section() {
    let batch = batch(&pairs(&[("B1", "I1")]));
    let config = FormatConfig::default();
    let serializer = PartitionSerializer::new(&batch, &config);

    let partition = serialize(&serializer, 1, &selection("B1", vec![]));
    assert_eq!(partition.label, "sem-grupo");
    assert_eq!(partition.record_count, 0);
    assert!(records_of(&partition).is_empty());
}

#[test]
fn test_index_in_name() {
    let batch = batch(&pairs(&[("B1", "I1")]));
    let config = FormatConfig::default().index_in_name(true);
    let serializer = PartitionSerializer::new(&batch, &config);

    let partition = serialize(&serializer, 3, &selection("B1", vec![0]));
    assert_eq!(partition.file_name, "G1_B1_3.xml");
}

#[test]
fn test_summary_rows_blank_for_missing_fields() {
    let batch = batch(&pairs(&[("B1", "I1")]));
    let config = FormatConfig::default();
    let serializer = PartitionSerializer::new(&batch, &config);

    let partition = serialize(&serializer, 1, &selection("B1", vec![0]));
    assert_eq!(
        partition.summary,
        vec![SummaryRow {
            item_id: "I1".to_string(),
            description: "Item I1".to_string(),
            quantity: "1".to_string(),
            package_quantity: String::new(),
        }]
    );
}

#[test]
fn test_output_name_sanitizes_buyer() {
    let config = FormatConfig::default();
    let name = output_name("G1", "12.345.678/0001-90", None, &config).unwrap();
    assert_eq!(name, "G1_12.345.678_0001-90.xml");
}

#[test]
fn test_name_allocator_dedups_collisions() {
    let config = FormatConfig::default();
    let mut names = NameAllocator::new();

    let a = names.claim("G", "A/B", 1, &config);
    let b = names.claim("G", "A:B", 2, &config);
    let c = names.claim("G", "A|B", 3, &config);

    assert_eq!(a, "G_A_B.xml");
    assert_eq!(b, "G_A_B_2.xml");
    assert_eq!(c, "G_A_B_3.xml");
}

#[test]
fn test_name_allocator_falls_back_for_unusable_names() {
    let config = FormatConfig::default();
    let mut names = NameAllocator::new();

    assert_eq!(names.claim(".", "/", 1, &config), "sem-grupo_1.xml");
    assert_eq!(names.claim("..", "\\", 2, &config), "sem-grupo_2.xml");
    assert_eq!(names.claim("G", "B2", 3, &config), "G_B2.xml");
}

#[test]
fn test_serializer_shares_allocator_across_partitions() {
    let batch = batch(&pairs(&[("A/B", "I1"), ("A:B", "I2")]));
    let config = FormatConfig::default();
    let serializer = PartitionSerializer::new(&batch, &config);
    let mut names = NameAllocator::new();

    let first = serializer
        .serialize(1, &selection("A/B", vec![0]), &mut names)
        .unwrap();
    let second = serializer
        .serialize(2, &selection("A:B", vec![1]), &mut names)
        .unwrap();

    assert_eq!(first.file_name, "G1_A_B.xml");
    assert_eq!(second.file_name, "G1_A_B_2.xml");
}

// ========================================================================
// End to end through the selector
// ========================================================================

#[test]
fn test_partitions_cover_universe_one_buyer_each() {
    let batch = batch(&pairs(&[
        ("B1", "I1"),
        ("B1", "I2"),
        ("B2", "I2"),
        ("B2", "I3"),
        ("B3", "I1"),
    ]));
    let config = FormatConfig::default();
    let index = CoverageIndex::build(&batch.records);
    let plan = select_cover(&index);
    let serializer = PartitionSerializer::new(&batch, &config);

    let mut union = BTreeSet::new();
    for (i, pick) in plan.selections.iter().enumerate() {
        let partition = serialize(&serializer, i + 1, pick);
        let buyers: BTreeSet<_> = records_of(&partition)
            .iter()
            .map(|r| field(r, "CNPJLojaCompradora"))
            .collect();
        assert_eq!(buyers.len(), 1);
        union.extend(partition.items.iter().cloned());
    }

    assert_eq!(plan.selections.len(), 2);
    assert_eq!(&union, index.universe());
}
