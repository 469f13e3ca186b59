use std::fs;

use validocu_engine::{
    check_specs, AliasResolver, Datatype, FieldNormalizer, FieldSpec, FileSpecSource, IssueType, LayoutItem,
    NormalizedFieldSet, NormalizerOptions, SourceError, SpecMatcher, SpecSource, StaticSpecSource,
};

fn spec(key: &str, label: &str, required: bool, datatype: Option<Datatype>, regex: Option<&str>) -> FieldSpec {
    FieldSpec {
        doc_type: "CONTRATO".into(),
        field_key: key.into(),
        label: label.into(),
        is_required: required,
        datatype,
        regex: regex.map(str::to_string),
        suggestion_template: None,
        example_text: None,
    }
}

fn fields(items: &[LayoutItem]) -> NormalizedFieldSet {
    let resolver = AliasResolver::defaults_only();
    FieldNormalizer::new(&resolver, NormalizerOptions::default()).normalize(items, Some("CONTRATO"))
}

struct DownSpecs;

impl SpecSource for DownSpecs {
    fn specs_for(&self, _doc_type: &str) -> Result<Vec<FieldSpec>, SourceError> {
        Err(SourceError::Unavailable("timeout".into()))
    }
}

#[test]
fn missing_required_field_yields_one_missing_issue() {
    let specs = vec![spec("issuer_id", "RUT emisor", true, Some(Datatype::Rut), None)];
    let issues = check_specs(&specs, &fields(&[LayoutItem::new("Fecha", "2025-01-01")]));
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].issue_type, IssueType::Missing);
    assert_eq!(issues[0].field_key, "issuer_id");
    assert_eq!(issues[0].message, "Missing required field: RUT emisor.");
    assert!(issues[0].evidence.is_none());
}

#[test]
fn optional_absent_field_is_silent() {
    let specs = vec![spec("address", "Domicilio", false, None, None)];
    assert!(check_specs(&specs, &NormalizedFieldSet::default()).is_empty());
}

#[test]
fn invalid_rut_yields_format_issue_with_evidence() {
    let specs = vec![spec("issuer_id", "RUT emisor", true, Some(Datatype::Rut), None)];
    let f = fields(&[LayoutItem::new("RUT_E", "12.345.678-4").on_page(0)]);
    let issues = check_specs(&specs, &f);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].issue_type, IssueType::Format);
    assert_eq!(issues[0].message, "RUT emisor is not a valid RUT.");
    let ev = issues[0].evidence.as_ref().expect("evidence");
    assert_eq!(ev[0].text, "12.345.678-4");
    assert_eq!(ev[0].label, "RUT_E");
}

#[test]
fn valid_values_produce_no_issues() {
    let specs = vec![
        spec("issuer_id", "RUT emisor", true, Some(Datatype::Rut), None),
        spec("date", "Fecha", true, Some(Datatype::Date), None),
        spec("total_amount", "Monto", true, Some(Datatype::Money), None),
    ];
    let f = fields(&[
        LayoutItem::new("RUT", "12.345.678-5"),
        LayoutItem::new("Fecha", "16/03/2025"),
        LayoutItem::new("Monto", "$ 1.234.567"),
    ]);
    assert!(check_specs(&specs, &f).is_empty());
}

#[test]
fn regex_takes_precedence_over_datatype() {
    // the datatype would reject this value; the pattern accepts it
    let specs = vec![spec("date", "Fecha", true, Some(Datatype::Date), Some(r"^\d{2}\.\d{2}\.\d{4}$"))];
    let mut f = NormalizedFieldSet::default();
    f.insert_first("date", "16.03.2025".into(), &LayoutItem::new("Fecha", "16.03.2025"));
    assert!(check_specs(&specs, &f).is_empty());

    let specs = vec![spec("folio", "Folio", false, None, Some(r"^F-\d+$"))];
    let mut f = NormalizedFieldSet::default();
    f.insert_first("folio", "12345".into(), &LayoutItem::new("Folio", "12345"));
    let issues = check_specs(&specs, &f);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].message, "Folio does not match the expected format.");
}

#[test]
fn bad_date_and_money_messages() {
    let specs = vec![
        spec("date", "Fecha", true, Some(Datatype::Date), None),
        spec("total_amount", "", true, Some(Datatype::Money), None),
        spec("notes", "Notas", true, Some(Datatype::String), None),
    ];
    let mut f = NormalizedFieldSet::default();
    f.insert_first("date", "marzo 2025".into(), &LayoutItem::new("Fecha", "marzo 2025"));
    f.insert_first("total_amount", "mucho".into(), &LayoutItem::new("Monto", "mucho"));
    f.insert_first("notes", "cualquier cosa".into(), &LayoutItem::new("Notas", "cualquier cosa"));
    let issues = check_specs(&specs, &f);
    let messages: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["Fecha must be YYYY-MM-DD.", "total_amount does not look like a valid amount."]
    );
}

#[test]
fn suggestion_template_is_carried() {
    let mut s = spec("issuer_id", "RUT emisor", true, Some(Datatype::Rut), None);
    s.suggestion_template = Some("Solicite una copia legible del carnet.".into());
    let issues = check_specs(&[s], &NormalizedFieldSet::default());
    assert_eq!(issues[0].suggestion.as_deref(), Some("Solicite una copia legible del carnet."));
}

#[test]
fn matcher_filters_by_doc_type_and_dedupes_keys() {
    let mut other = spec("address", "Domicilio", true, None, None);
    other.doc_type = "CARNET".into();
    let mut dup = spec("date", "Fecha (dup)", true, None, None);
    dup.is_required = false;
    let source = StaticSpecSource(vec![spec("date", "Fecha", true, None, None), dup, other]);
    let matcher = SpecMatcher::new(&source);

    let loaded = matcher.load("contrato");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].label, "Fecha");

    let issues = matcher.validate("Contrato", &NormalizedFieldSet::default());
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].field_key, "date");
}

#[test]
fn unavailable_spec_source_means_no_issues() {
    let matcher = SpecMatcher::new(&DownSpecs);
    assert!(matcher.load("CONTRATO").is_empty());
    assert!(matcher.validate("CONTRATO", &NormalizedFieldSet::default()).is_empty());
}

#[test]
fn file_source_reads_yaml_and_tolerates_unknown_datatypes() {
    let td = tempfile::tempdir().unwrap();
    let path = td.path().join("specs.yaml");
    fs::write(
        &path,
        r#"
- doc_type: CONTRATO
  field_key: issuer_id
  label: RUT emisor
  is_required: true
  datatype: RUT
- doc_type: CONTRATO
  field_key: notes
  datatype: free-form
- doc_type: CARNET
  field_key: address
  is_required: true
"#,
    )
    .unwrap();
    let source = FileSpecSource::new(path.clone());
    let specs = source.specs_for("Contrato").expect("specs");
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].datatype, Some(Datatype::Rut));
    assert_eq!(specs[1].datatype, None);
    assert_eq!(specs[1].display_label(), "notes");
}

#[test]
fn issues_serialize_with_screaming_type() {
    let issues = check_specs(&[spec("date", "Fecha", true, None, None)], &NormalizedFieldSet::default());
    let v = serde_json::to_value(&issues[0]).unwrap();
    assert_eq!(v["issue_type"], "MISSING");
    assert!(v.get("suggestion").is_none());
}
