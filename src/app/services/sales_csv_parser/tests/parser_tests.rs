//! Tests for the end-to-end sales export parser

use super::*;
use crate::Error;
use crate::app::models::CanonicalField;
use crate::app::services::sales_csv_parser::{ByteSource, ParseStatus, SalesCsvParser};
use crate::config::{DelimiterPolicy, PipelineConfig};

const COMMA_EXPORT: &str = "sep=,\nData,Família [Artigos],Doc.,Vendedor,Nome [Clientes],Valor [Documentos GC Lin]\n01-03-2024,ELET,FT,Ana,João Silva,100,50\n01-03-2024,ELET,NC,Ana,João Silva,20,00\n";

#[test]
fn test_semicolon_export_with_declaration() {
    let parser = SalesCsvParser::default();
    let result = parser.parse_text("test.csv", &create_test_export()).unwrap();

    assert_eq!(result.delimiter, ';');
    assert_eq!(result.header.len(), 7);
    assert_eq!(
        net_amounts(&result.table),
        vec![dec("100.50"), dec("-20.00"), dec("1234.56")]
    );
    assert_eq!(result.stats.total_records, 4);
    assert_eq!(result.stats.rows_rejected_cancelled, 1);
    assert_eq!(result.status(), ParseStatus::Complete);
}

#[test]
fn test_comma_export_with_unquoted_decimal_commas() {
    let parser = SalesCsvParser::default();
    let result = parser.parse_text("comma.csv", COMMA_EXPORT).unwrap();

    assert_eq!(result.delimiter, ',');
    assert_eq!(result.table.len(), 2);
    assert_eq!(net_amounts(&result.table), vec![dec("100.50"), dec("-20.00")]);
    assert_eq!(result.stats.rows_malformed, 0);
}

#[test]
fn test_invalid_month_is_a_parse_rejection() {
    let text = "sep=;\nData;Valor\n31-13-2024;10,00\n01-03-2024;5,00\n";
    let result = SalesCsvParser::default().parse_text("test.csv", text).unwrap();

    assert_eq!(result.stats.rows_rejected_parse, 1);
    assert_eq!(result.table.len(), 1);
}

#[test]
fn test_zero_amount_is_rejected() {
    let text = "sep=;\nData;Valor\n01-03-2024;0,00\n01-03-2024;5,00\n";
    let result = SalesCsvParser::default().parse_text("test.csv", text).unwrap();

    assert_eq!(result.stats.rows_rejected_parse, 1);
    assert_eq!(net_amounts(&result.table), vec![dec("5.00")]);
}

#[test]
fn test_negative_spilled_amount_is_a_parse_rejection() {
    let text = "sep=,\nData,Vendedor,Valor\n01-03-2024,Ana,-20,00\n01-03-2024,Ana,5,00\n";
    let result = SalesCsvParser::default().parse_text("comma.csv", text).unwrap();

    assert_eq!(result.stats.rows_malformed, 0);
    assert_eq!(result.stats.rows_rejected_parse, 1);
    assert_eq!(net_amounts(&result.table), vec![dec("5.00")]);
}

#[test]
fn test_oversized_amounts_are_rejected_before_aggregation() {
    let text = "sep=;\nData;Valor\n01-03-2024;79228162514264337593543950335\n02-03-2024;79228162514264337593543950335\n03-03-2024;12,00\n";
    let result = SalesCsvParser::default().parse_text("huge.csv", text).unwrap();

    assert_eq!(result.stats.rows_rejected_parse, 2);
    assert_eq!(result.stats.accepted, 1);
    assert_eq!(result.table.net_total(), dec("12.00"));

    let summary = crate::app::services::sales_views::SalesSummary::from_table(&result.table);
    assert_eq!(summary.gross_sales, dec("12.00"));
}

#[test]
fn test_missing_amount_column() {
    let text = "sep=;\nData;Vendedor;Total\n01-03-2024;Ana;5,00\n";
    let err = SalesCsvParser::default().parse_text("test.csv", text).unwrap_err();

    assert!(matches!(err, Error::RequiredColumnMissing { ref field, .. } if field == "amount"));
    assert!(!err.is_critical());
}

#[test]
fn test_all_rows_rejected_is_empty_result() {
    let text = "sep=;\nData;Valor\nxx;5,00\n01-03-2024;0\n";
    let result = SalesCsvParser::default().parse_text("bad.csv", text).unwrap();

    assert_eq!(result.status(), ParseStatus::EmptyResult);
    assert_eq!(result.stats.rows_rejected_parse, 2);

    let err = result.into_non_empty().unwrap_err();
    assert!(matches!(err, Error::EmptyResult { ref source_name } if source_name == "bad.csv"));
}

#[test]
fn test_malformed_rows_are_counted() {
    let text = "sep=;\nData;Vendedor;Valor\n01-03-2024;Ana;5,00\n01-03-2024;Ana\n01-03-2024;Ana;1;2;3\n";
    let result = SalesCsvParser::default().parse_text("test.csv", text).unwrap();

    assert_eq!(result.stats.total_records, 3);
    assert_eq!(result.stats.rows_malformed, 2);
    assert_eq!(result.table.len(), 1);
    assert!(result.stats.is_balanced());
    assert!(result.stats.errors.iter().any(|e| e.contains("expected 3 fields, found 2")));
}

#[test]
fn test_row_counts_are_conserved() {
    let result = SalesCsvParser::default()
        .parse_text("test.csv", &create_test_export())
        .unwrap();
    let stats = &result.stats;

    assert_eq!(
        result.table.len() + stats.rows_rejected_parse + stats.rows_rejected_cancelled + stats.rows_malformed,
        stats.total_records
    );
}

#[test]
fn test_sign_follows_document_code() {
    let result = SalesCsvParser::default()
        .parse_text("test.csv", &create_test_export())
        .unwrap();
    let credit_codes = PipelineConfig::default().credit_codes();

    for sale in &result.table {
        assert_ne!(sale.net_amount, dec("0"));
        assert_eq!(sale.net_amount < dec("0"), credit_codes.contains(&sale.document_code));
    }
}

#[test]
fn test_cancelled_rows_never_reach_the_table() {
    let result = SalesCsvParser::default()
        .parse_text("test.csv", &create_test_export())
        .unwrap();

    assert!(result.table.iter().all(|s| s.date.to_string() != "2024-03-04"));
}

#[test]
fn test_parsing_is_idempotent() {
    let parser = SalesCsvParser::default();
    let first = parser.parse_text("test.csv", &create_test_export()).unwrap();
    let second = parser.parse_text("test.csv", &create_test_export()).unwrap();

    assert_eq!(first.table, second.table);
    assert_eq!(first.stats, second.stats);
}

#[test]
fn test_comma_policy_misreads_undeclared_semicolon_file() {
    let text = "Data;Valor\n01-03-2024;5,00\n";
    let parser = SalesCsvParser::new(
        PipelineConfig::default().with_delimiter_policy(DelimiterPolicy::DeclarationOrComma),
    );

    // The single comma-split column goes to the amount, leaving no date
    let err = parser.parse_text("test.csv", text).unwrap_err();
    assert_eq!(err.missing_field(), Some("date"));

    let result = SalesCsvParser::default().parse_text("test.csv", text).unwrap();
    assert_eq!(net_amounts(&result.table), vec![dec("5.00")]);
}

#[test]
fn test_absent_optional_columns_use_placeholders() {
    let text = "sep=;\nData;Valor\n01-03-2024;5,00\n";
    let result = SalesCsvParser::default().parse_text("test.csv", text).unwrap();

    assert!(result.column_map.is_absent(CanonicalField::Family));
    let sale = &result.table.records()[0];
    assert_eq!(sale.family, "UNSPECIFIED_FAMILY");
    assert_eq!(sale.customer, "UNSPECIFIED_CUSTOMER");
}

#[test]
fn test_parse_source_decodes_legacy_bytes() {
    // "Família" in Windows-1252 with CRLF line ends
    let bytes = b"sep=;\r\nData;Fam\xedlia [Artigos];Valor\r\n01-03-2024;ELET;10,00\r\n".to_vec();
    let source = ByteSource::buffer("upload.csv", bytes);

    let result = SalesCsvParser::default().parse_source(&source).unwrap();
    assert_eq!(result.header[1], "Família [Artigos]");
    assert_eq!(result.table.records()[0].family, "ELET");
}

#[test]
fn test_parse_source_from_file() {
    let file = create_temp_file(create_test_export().as_bytes());
    let result = SalesCsvParser::default()
        .parse_source(&ByteSource::path(file.path()))
        .unwrap();
    assert_eq!(result.table.len(), 3);
}

#[test]
fn test_missing_file_is_source_unavailable() {
    let err = SalesCsvParser::default()
        .parse_source(&ByteSource::path("/nonexistent/export.csv"))
        .unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable { .. }));
    assert!(err.is_critical());
}

#[test]
fn test_batch_concatenates_and_isolates_structural_errors() {
    let parser = SalesCsvParser::default();
    let sources = vec![
        ByteSource::buffer("a.csv", create_test_export().into_bytes()),
        ByteSource::buffer("empty.csv", b"sep=;\n\n".to_vec()),
        ByteSource::buffer("b.csv", COMMA_EXPORT.as_bytes().to_vec()),
    ];

    let batch = parser.parse_batch(&sources).unwrap();

    assert_eq!(batch.files.len(), 3);
    assert_eq!(batch.succeeded_count(), 2);
    assert_eq!(batch.table.len(), 5);
    assert_eq!(
        net_amounts(&batch.table),
        vec![dec("100.50"), dec("-20.00"), dec("1234.56"), dec("100.50"), dec("-20.00")]
    );

    let failed: Vec<_> = batch.failed_files().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, "empty.csv");
    assert!(matches!(failed[0].1, Error::EmptyInput { .. }));

    let total = batch.total_stats();
    assert_eq!(total.accepted, 5);
    assert!(total.is_balanced());
}

#[test]
fn test_batch_aborts_on_unavailable_source() {
    let parser = SalesCsvParser::default();
    let sources = vec![
        ByteSource::buffer("a.csv", create_test_export().into_bytes()),
        ByteSource::path("/nonexistent/export.csv"),
    ];

    assert!(matches!(
        parser.parse_batch(&sources),
        Err(Error::SourceUnavailable { .. })
    ));
}
