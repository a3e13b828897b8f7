use postbox_core::{
    build_filename, fallback_filename, filename_for, render_template, Entry, RawEntry,
};
use pretty_assertions::assert_eq;

fn entry(doctype: &str, subject: &str, date_text: &str, index: usize) -> Entry {
    let raw = RawEntry {
        doctype: doctype.to_string(),
        subject: subject.to_string(),
        date_text: date_text.to_string(),
        ..RawEntry::default()
    };
    Entry::from_raw(&raw, index, "YYYYMMDD")
}

#[test]
fn unsafe_separators_become_spaces() {
    let e = entry("Kontoauszug", "Jan/Feb:Report", "15.01.2023", 1);
    assert_eq!(
        build_filename("{date}_{doctype}_{subject_complete}", &e).as_deref(),
        Some("20230115_Kontoauszug_Jan Feb Report.pdf")
    );
}

#[test]
fn unknown_placeholders_stay_verbatim() {
    let e = entry("Info", "Hallo", "01.02.2024", 4);
    assert_eq!(
        render_template("{doctype}-{nope}-{index}", &e),
        "Info-{nope}-4"
    );
}

#[test]
fn existing_extensions_are_replaced() {
    let e = entry("Brief", "scan.final.PDF", "01.02.2024", 1);
    assert_eq!(
        build_filename("{subject_complete}", &e).as_deref(),
        Some("scan.pdf")
    );
}

#[test]
fn dotted_dates_are_not_mistaken_for_extensions() {
    let raw = RawEntry {
        doctype: "Kontoauszug".to_string(),
        date_text: "15.01.2023".to_string(),
        ..RawEntry::default()
    };
    let e = Entry::from_raw(&raw, 1, "DD.MM.YYYY");
    assert_eq!(
        build_filename("{doctype} {date}", &e).as_deref(),
        Some("Kontoauszug 15.01.2023.pdf")
    );
}

#[test]
fn empty_result_falls_back_to_index_name() {
    let e = entry("", "", "", 7);
    assert_eq!(build_filename("{isin}{iban}", &e), None);
    assert_eq!(build_filename(" / : ... ", &e), None);
    assert_eq!(filename_for("{isin}", &e), "postbox_download_7.pdf");
    assert_eq!(fallback_filename(7), "postbox_download_7.pdf");
}

#[test]
fn reserved_device_names_are_patched() {
    let e = entry("CON", "", "", 1);
    assert_eq!(build_filename("{doctype}", &e).as_deref(), Some("CON_.pdf"));
}

#[test]
fn construction_is_idempotent_on_its_own_base_name() {
    let cases = [
        ("Kontoauszug", "Jan/Feb:Report", "{date}_{doctype}_{subject_complete}"),
        ("Brief", "  a.pdf . ", "{subject_complete}"),
        ("CON", "", "{doctype}"),
        ("Depot", "Report v1.5 | x.tar.gz", "{doctype} {subject_complete}"),
        ("Info", "x", "{doctype}-{unknown}"),
    ];
    for (doctype, subject, template) in cases {
        let e = entry(doctype, subject, "15.01.2023", 2);
        let first = filename_for(template, &e);
        let base = first.strip_suffix(".pdf").unwrap();
        let second = filename_for(base, &e);
        assert_eq!(first, second, "template {template:?}");
    }
}

#[test]
fn long_multibyte_subject_fits_file_name_limit() {
    let e = entry("Abrechnung", &"€".repeat(300), "15.01.2024", 1);
    let name = filename_for("{subject_complete}", &e);

    assert!(name.len() <= 255, "{} bytes", name.len());
    assert!(name.ends_with(".pdf"));
    assert!(name.trim_end_matches(".pdf").chars().all(|c| c == '€'));

    let again = entry("Abrechnung", &name, "15.01.2024", 1);
    assert_eq!(filename_for("{subject_complete}", &again), name);
}

#[test]
fn byte_truncation_keeps_char_boundaries() {
    assert_eq!(postbox_core::truncate_utf8("äöü", 5), "äö");
    assert_eq!(postbox_core::truncate_utf8("äöü", 6), "äöü");
    assert_eq!(postbox_core::truncate_utf8("abc", 0), "");
}
