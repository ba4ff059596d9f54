//! End-to-end conversion into a filesystem output tree.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use dts_build::{BuildConfig, BuildReport, DocumentBuilder, SegmentationPolicy};
use dts_storage::FsStorage;
use dts_tei::xml::parse_str;
use dts_tei::{DTS_NS, TEI_NS, Warning};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

const ZONES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <teiHeader><fileDesc><titleStmt><title>Zones</title></titleStmt></fileDesc></teiHeader>
  <text>
    <front>
      <div xml:id="pref" type="preface"><head>Preface</head><p>a</p></div>
      <div xml:id="ded"><p>b</p></div>
    </front>
    <body>
      <div xml:id="c1" type="chapter"><head>One</head>
        <div xml:id="c1s1" type="section"><p>c</p></div>
      </div>
      <div xml:id="c2" type="chapter"><p>d</p></div>
    </body>
    <back>
      <div xml:id="notes"><p>e &amp; f</p></div>
    </back>
  </text>
</TEI>
"#;

const PAGES: &str = r##"<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <facsimile>
    <surface xml:id="s1"><graphic url="p1.jpg"/></surface>
    <surface xml:id="s3"><graphic url="p3.jpg"/></surface>
  </facsimile>
  <text><body>
    <p><pb n="1" facs="#s1"/>first page</p>
    <p>second <pb n="2" facs="#s2"/>page</p>
    <pb n="3" facs="#s3"/><p>third page</p>
  </body></text>
</TEI>"##;

fn convert(output: &Path, config: BuildConfig, source: &str) -> BuildReport {
    let input = output.with_extension("xml");
    fs::write(&input, source).unwrap();
    let storage = FsStorage::new(output.to_path_buf());
    DocumentBuilder::new(&storage, config)
        .convert_file(&input)
        .unwrap()
}

fn read_json(path: PathBuf) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn members(document: &Value) -> Vec<&str> {
    document["member"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["ref"].as_str().unwrap())
        .collect()
}

fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn visit(dir: &Path, root: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                visit(&path, root, out);
            } else {
                let key = path.strip_prefix(root).unwrap().to_path_buf();
                out.insert(key, fs::read(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    visit(root, root, &mut out);
    out
}

#[test]
fn test_zones_in_document_order() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");

    let report = convert(&out, BuildConfig::new("zones"), ZONES);

    assert!(report.is_complete());
    assert_eq!(report.fragments, 6);
    assert_eq!(report.cite_depth, 2);

    let level1 = read_json(out.join("zones/navigation/level/1.json"));
    assert_eq!(members(&level1), vec!["pref", "ded", "c1", "c2", "notes"]);
    assert_eq!(level1["citeDepth"], 2);
    assert_eq!(level1["parent"], Value::Null);
    assert_eq!(level1["@id"], "/api/dts/navigation?id=zones&level=1");

    let toplevel = read_json(out.join("zones/navigation/toplevel.json"));
    assert_eq!(toplevel, level1);

    let nested = read_json(out.join("zones/navigation/ref/c1/level/2.json"));
    assert_eq!(members(&nested), vec!["c1s1"]);
    assert_eq!(
        nested["parent"],
        json!({"type": "Resource", "ref": "/api/dts/navigation?id=zones"})
    );
    assert_eq!(nested["passage"], "/api/dts/document?id=zones&ref={ref}");

    let level2 = read_json(out.join("zones/navigation/level/2.json"));
    assert_eq!(members(&level2), vec!["c1s1"]);
    assert_eq!(
        level2["parent"],
        json!({"type": "Resource", "ref": "/api/dts/navigation?id=zones"})
    );

    assert!(!out.join("zones/navigation/ref/c2").exists());
    assert!(!out.join("zones/navigation/level/3.json").exists());
}

#[test]
fn test_two_divs_per_zone() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    let source = r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><text>
        <front><div xml:id="f1"/><div xml:id="f2"/></front>
        <body><div xml:id="b1"><div xml:id="b1a"/></div><div xml:id="b2"/></body>
        <back><div xml:id="k1"/><div xml:id="k2"/></back>
    </text></TEI>"#;

    let report = convert(&out, BuildConfig::new("doc"), source);

    assert_eq!(report.fragments, 7);
    let level1 = read_json(out.join("doc/navigation/level/1.json"));
    assert_eq!(members(&level1), vec!["f1", "f2", "b1", "b2", "k1", "k2"]);
    let toplevel = read_json(out.join("doc/navigation/ref/b1/toplevel.json"));
    assert_eq!(members(&toplevel), vec!["b1a"]);
    assert_eq!(toplevel["level"], 2);
}

#[test]
fn test_generated_ids_follow_document_order() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    let source = r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><text><body>
        <div xml:id="named"><div><head>Deep</head></div></div>
        <div><p>later</p></div>
    </body></text></TEI>"#;

    convert(&out, BuildConfig::new("doc"), source);

    let level2 = read_json(out.join("doc/navigation/level/2.json"));
    assert_eq!(members(&level2), vec!["genid-div1"]);
    let level1 = read_json(out.join("doc/navigation/level/1.json"));
    assert_eq!(members(&level1), vec!["named", "genid-div2"]);

    let full = fs::read_to_string(out.join("doc/document.xml")).unwrap();
    assert!(full.contains(r#"<div xml:id="genid-div1"><head>Deep</head></div>"#));
    assert!(full.contains(r#"<div xml:id="genid-div2"><p>later</p></div>"#));
}

#[test]
fn test_fragments_parse_back() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");

    convert(&out, BuildConfig::new("zones"), ZONES);

    for id in ["pref", "ded", "c1", "c1s1", "c2", "notes"] {
        let xml = fs::read_to_string(out.join(format!("zones/document/{id}.xml"))).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));

        let root = parse_str(&xml).unwrap();
        assert!(root.is(TEI_NS, "TEI"));
        assert_eq!(root.children.len(), 1);

        let container = &root.children[0];
        assert!(container.is(DTS_NS, "wrapper"));
        assert_eq!(container.children.len(), 1);
        assert!(container.children[0].is(TEI_NS, "div"));
        assert_eq!(container.children[0].xml_id(), Some(id));
    }

    let notes = fs::read_to_string(out.join("zones/document/notes.xml")).unwrap();
    assert!(notes.contains("<p>e &amp; f</p>"));
}

#[test]
fn test_conversion_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let first = tmp.path().join("first");
    let second = tmp.path().join("second");

    convert(&first, BuildConfig::new("zones"), ZONES);
    convert(&second, BuildConfig::new("zones"), ZONES);

    let first = snapshot(&first);
    assert_eq!(first.len(), 6 + 1 + 3 + 2);
    assert_eq!(first, snapshot(&second));
}

#[test]
fn test_positional_pages() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");

    let report = convert(
        &out,
        BuildConfig::new("pages").with_policy(SegmentationPolicy::page_breaks()),
        PAGES,
    );

    assert!(report.is_complete());
    assert_eq!(report.fragments, 3);
    assert_eq!(report.cite_depth, 1);
    assert_eq!(
        report.warnings,
        vec![Warning::UnresolvedSideReference {
            fragment: "pb-2".to_owned(),
            reference: "s2".to_owned(),
        }]
    );

    let first = fs::read_to_string(out.join("pages/document/pb-1.xml")).unwrap();
    assert!(first.contains(r#"<surface xml:id="s1"><graphic url="p1.jpg"/></surface>"#));
    let second = fs::read_to_string(out.join("pages/document/pb-2.xml")).unwrap();
    assert!(!second.contains("surface"));
    assert!(second.contains(r##"<p><pb n="2" facs="#s2"/>page</p>"##));
    let third = fs::read_to_string(out.join("pages/document/pb-3.xml")).unwrap();
    assert!(third.contains(r#"<surface xml:id="s3"><graphic url="p3.jpg"/></surface>"#));
    assert!(third.contains("<p>third page</p>"));

    assert_eq!(
        fs::read_to_string(out.join("pages/document.xml")).unwrap(),
        PAGES
    );

    let level1 = read_json(out.join("pages/navigation/level/1.json"));
    assert_eq!(members(&level1), vec!["pb-1", "pb-2", "pb-3"]);
    assert!(!out.join("pages/navigation/ref").exists());
}
