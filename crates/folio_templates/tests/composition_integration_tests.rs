//! Integration tests for template set composition.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use folio_templates::{ComposerConfig, TemplateError, TemplateModel, TemplatePackage};
use serde::Serialize;
use serde_json::json;
use tempfile::tempdir;

#[derive(Serialize)]
struct Invoice {
    total: u32,
}

impl TemplateModel for Invoice {
    fn template_name(&self) -> &str {
        "Invoice"
    }
}

#[derive(Serialize)]
struct Receipt {
    amount: u32,
}

impl TemplateModel for Receipt {
    fn template_name(&self) -> &str {
        "Receipt"
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn invoice_package(root: &Path) {
    write(root, "Templates/InvoiceHeader.html", "<h1>INV</h1>");
    write(root, "Templates/Invoice.hbs", "Total: {{total}}");
    write(root, "Templates/InvoiceFooter.html", "<hr/>");
}

fn missing_set(err: &TemplateError) -> HashSet<String> {
    err.missing().iter().cloned().collect()
}

#[tokio::test]
async fn test_compose_invoice_from_package() {
    let temp = tempdir().unwrap();
    invoice_package(temp.path());

    let compositor = TemplatePackage::open(&ComposerConfig::new(temp.path())).unwrap();
    let output = compositor.compose(&Invoice { total: 42 }).await.unwrap();

    assert_eq!(output, "<h1>INV</h1>Total: 42<hr/>");
}

#[tokio::test]
async fn test_compose_preserves_resource_whitespace() {
    let temp = tempdir().unwrap();
    write(temp.path(), "Templates/LetterHeader.html", "<header>\n");
    write(temp.path(), "Templates/Letter.hbs", "Dear {{name}},");
    write(temp.path(), "Templates/LetterFooter.html", "\n</footer>\n");

    let compositor = TemplatePackage::open(&ComposerConfig::new(temp.path())).unwrap();
    let output = compositor
        .compose_value("Letter", json!({ "name": "Ada" }))
        .await
        .unwrap();

    assert_eq!(output, "<header>\nDear Ada,\n</footer>\n");
}

#[tokio::test]
async fn test_receipt_with_only_footer_fails() {
    let temp = tempdir().unwrap();
    write(temp.path(), "Templates/ReceiptFooter.html", "<hr/>");

    let compositor = TemplatePackage::open(&ComposerConfig::new(temp.path())).unwrap();
    let err = compositor.compose(&Receipt { amount: 5 }).await.unwrap_err();

    let expected: HashSet<String> = [
        "The template file: /Templates/Receipt.hbs, was not found.".to_string(),
        "The resource file: Templates.ReceiptHeader.html, was not found.".to_string(),
    ]
    .into_iter()
    .collect();
    assert_eq!(missing_set(&err), expected);
}

#[tokio::test]
async fn test_single_missing_piece_is_named_alone() {
    for (missing, expected) in [
        (
            "Templates/InvoiceHeader.html",
            "The resource file: Templates.InvoiceHeader.html, was not found.",
        ),
        (
            "Templates/InvoiceFooter.html",
            "The resource file: Templates.InvoiceFooter.html, was not found.",
        ),
        (
            "Templates/Invoice.hbs",
            "The template file: /Templates/Invoice.hbs, was not found.",
        ),
    ] {
        let temp = tempdir().unwrap();
        invoice_package(temp.path());
        fs::remove_file(temp.path().join(missing)).unwrap();

        let compositor = TemplatePackage::open(&ComposerConfig::new(temp.path())).unwrap();
        let err = compositor.compose(&Invoice { total: 1 }).await.unwrap_err();

        assert_eq!(err.missing(), [expected]);
    }
}

#[tokio::test]
async fn test_all_missing_pieces_reported_together() {
    let temp = tempdir().unwrap();
    invoice_package(temp.path());

    let compositor = TemplatePackage::open(&ComposerConfig::new(temp.path())).unwrap();
    let err = compositor
        .compose_value("Statement", json!({ "balance": 0 }))
        .await
        .unwrap_err();

    assert!(matches!(&err, TemplateError::Resolution { model, .. } if model == "Statement"));
    assert_eq!(err.missing().len(), 3);
    assert_eq!(err.to_string().lines().count(), 3);
}

#[tokio::test]
async fn test_empty_header_and_footer() {
    let temp = tempdir().unwrap();
    write(temp.path(), "Templates/InvoiceHeader.html", "");
    write(temp.path(), "Templates/Invoice.hbs", "Total: {{total}}");
    write(temp.path(), "Templates/InvoiceFooter.html", "");

    let compositor = TemplatePackage::open(&ComposerConfig::new(temp.path())).unwrap();
    let output = compositor.compose(&Invoice { total: 9 }).await.unwrap();

    assert_eq!(output, "Total: 9");
}

#[tokio::test]
async fn test_compose_twice_is_byte_identical() {
    let temp = tempdir().unwrap();
    invoice_package(temp.path());

    let compositor = TemplatePackage::open(&ComposerConfig::new(temp.path()).chunk_size(3)).unwrap();
    let first = compositor.compose(&Invoice { total: 42 }).await.unwrap();
    let second = compositor.compose(&Invoice { total: 42 }).await.unwrap();

    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[tokio::test]
async fn test_large_header_streamed_in_chunks() {
    let temp = tempdir().unwrap();
    let header = "é<p>row</p>\n".repeat(2_000);
    write(temp.path(), "Templates/ReportHeader.html", &header);
    write(temp.path(), "Templates/Report.hbs", "{{title}}");
    write(temp.path(), "Templates/ReportFooter.html", "end");

    let compositor = TemplatePackage::open(&ComposerConfig::new(temp.path()).chunk_size(7)).unwrap();
    let output = compositor
        .compose_value("Report", json!({ "title": "Q3" }))
        .await
        .unwrap();

    assert_eq!(output, format!("{header}Q3end"));
}

#[tokio::test]
async fn test_header_removed_after_loading_fails_without_output() {
    let temp = tempdir().unwrap();
    invoice_package(temp.path());

    let compositor = TemplatePackage::open(&ComposerConfig::new(temp.path())).unwrap();
    fs::remove_file(temp.path().join("Templates/InvoiceHeader.html")).unwrap();

    let err = compositor.compose(&Invoice { total: 1 }).await.unwrap_err();
    assert_eq!(
        err.missing(),
        ["The resource file: Templates.InvoiceHeader.html, was not found."]
    );
}

#[tokio::test]
async fn test_strict_models_reject_missing_fields() {
    let temp = tempdir().unwrap();
    invoice_package(temp.path());

    let config = ComposerConfig::new(temp.path()).strict_models(true);
    let compositor = TemplatePackage::open(&config).unwrap();
    let err = compositor
        .compose_value("Invoice", json!({ "subtotal": 1 }))
        .await
        .unwrap_err();

    assert!(matches!(err, TemplateError::Render { template, .. } if template == "/Templates/Invoice.hbs"));
}

#[tokio::test]
async fn test_validate_reports_each_member() {
    let temp = tempdir().unwrap();
    invoice_package(temp.path());
    fs::remove_file(temp.path().join("Templates/InvoiceFooter.html")).unwrap();

    let compositor = TemplatePackage::open(&ComposerConfig::new(temp.path())).unwrap();
    let report = compositor.validate("Invoice").await.unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.entries.len(), 3);
    assert_eq!(
        report.missing_messages(),
        vec!["The resource file: Templates.InvoiceFooter.html, was not found.".to_string()]
    );
}

#[test]
fn test_open_rejects_invalid_config() {
    let temp = tempdir().unwrap();
    let err = TemplatePackage::open(&ComposerConfig::new(temp.path()).chunk_size(0)).unwrap_err();
    assert!(matches!(err, TemplateError::InvalidConfig(_)));
}
