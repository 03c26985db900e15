//! Integration tests for the signature engine
//!
//! Tests the full path: core config -> factory registry -> signature -> change classification

use std::io::Write;
use std::path::Path;

use patchward_core::config::PatchwardConfig;
use patchward_core::error::{PatchwardError, SignatureError};
use patchward_core::types::{Construct, ConstructId, ConstructType, ProgrammingLanguage};
use patchward_signature::{
    ChangeType, PatchVerdict, SignatureEngineConfig, SignatureEngineError, SignatureFactories,
    SignatureFactory, assess_patch, compare_versions,
};

fn java_method(qname: &str, body: &str) -> Construct {
    Construct::new(
        ConstructId::new(ProgrammingLanguage::Java, ConstructType::Method, qname),
        body,
    )
}

fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn registry_from_core_config() {
    let core = PatchwardConfig::parse(
        r#"
[signature]
java_similarity = "jaccard"
python_similarity = "ngram"
ngram_size = 3
"#,
    )
    .unwrap();
    let config = SignatureEngineConfig::from_core(&core.signature);
    config.validate().unwrap();

    let factories = SignatureFactories::from_config(&config);
    let java = factories.for_language(ProgrammingLanguage::Java);
    assert_eq!(java.similarity().name(), "jaccard");
    let python = factories.for_language(ProgrammingLanguage::Python);
    assert_eq!(python.similarity().name(), "ngram");
}

#[test]
fn file_based_signatures_classify_changes() {
    let dir = tempfile::tempdir().unwrap();
    let old = write_file(
        dir.path(),
        "old.java",
        "{\n    // validate\n    if (n < 0) throw new IllegalArgumentException();\n    return n * 2;\n}\n",
    );
    let same = write_file(
        dir.path(),
        "same.java",
        "{ if (n < 0) throw new IllegalArgumentException(); return n * 2; }",
    );
    let changed = write_file(
        dir.path(),
        "changed.java",
        "{ if (n <= 0) throw new IllegalArgumentException(); return n * 2; }",
    );

    let factories = SignatureFactories::default();
    let id = ConstructId::new(ProgrammingLanguage::Java, ConstructType::Method, "a.B.twice(int)");
    let factory = factories.for_construct(&id);

    let old_sig = factory.create_signature_from_file(&id, &old).unwrap();
    let same_sig = factory.create_signature_from_file(&id, &same).unwrap();
    let changed_sig = factory.create_signature_from_file(&id, &changed).unwrap();

    let unchanged = factory.compute_change(&old_sig, &same_sig).unwrap();
    assert_eq!(unchanged.change_type(), ChangeType::Unchanged);
    assert_eq!(unchanged.score(), 1.0);

    let modified = factory.compute_change(&old_sig, &changed_sig).unwrap();
    assert_eq!(modified.change_type(), ChangeType::Modified);
    assert!(modified.score() > 0.0 && modified.score() < 1.0);
}

#[test]
fn file_signature_for_unsupported_id_fails_before_reading() {
    let factories = SignatureFactories::default();
    let id = ConstructId::new(ProgrammingLanguage::Java, ConstructType::Package, "com.acme");
    let err = factories
        .for_construct(&id)
        .create_signature_from_file(&id, Path::new("/nonexistent/Package.java"))
        .unwrap_err();
    assert!(matches!(err, SignatureEngineError::UnsupportedConstruct { .. }));
}

#[test]
fn missing_file_is_io_error() {
    let factories = SignatureFactories::default();
    let id = ConstructId::new(ProgrammingLanguage::Python, ConstructType::Function, "m.f");
    let err = factories
        .for_construct(&id)
        .create_signature_from_file(&id, Path::new("/nonexistent/m.py"))
        .unwrap_err();
    assert!(matches!(err, SignatureEngineError::Io { .. }));
}

#[test]
fn oversized_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "big.py", &"x = 1\n".repeat(100));
    let config = SignatureEngineConfig {
        max_body_size: 64,
        ..Default::default()
    };
    let factories = SignatureFactories::from_config(&config);
    let id = ConstructId::new(ProgrammingLanguage::Python, ConstructType::Module, "big");
    let err = factories
        .for_construct(&id)
        .create_signature_from_file(&id, &path)
        .unwrap_err();
    assert!(matches!(err, SignatureEngineError::BodyTooLarge { .. }));
}

#[test]
fn precondition_error_maps_to_core_error() {
    let factories = SignatureFactories::default();
    let a = java_method("a.B.c()", "return 1;");
    let b = java_method("a.B.d()", "return 1;");
    let factory = factories.for_construct(&a.id);
    let sa = factory.create_signature(&a).unwrap();
    let sb = factory.create_signature(&b).unwrap();

    let err: PatchwardError = factory.compute_change(&sa, &sb).unwrap_err().into();
    assert!(matches!(
        err,
        PatchwardError::Signature(SignatureError::Precondition(_))
    ));
}

#[test]
fn operator_regrouping_is_a_modification() {
    let factories = SignatureFactories::default();
    let post = java_method("a.B.sum(int,int)", "{ return a++ + b; }");
    let pre = java_method("a.B.sum(int,int)", "{ return a + ++b; }");
    let factory = factories.for_construct(&post.id);

    let change = factory
        .compute_change(
            &factory.create_signature(&post).unwrap(),
            &factory.create_signature(&pre).unwrap(),
        )
        .unwrap();
    assert_eq!(change.change_type(), ChangeType::Modified);
    assert!(change.score() < 1.0);
}

#[test]
fn repeated_statement_is_a_modification_under_jaccard() {
    let config = SignatureEngineConfig {
        java_similarity: patchward_signature::SimilarityAlgorithm::Jaccard,
        ..Default::default()
    };
    let factories = SignatureFactories::from_config(&config);
    let once = java_method("a.B.flush()", "{ out.flush(); }");
    let twice = java_method("a.B.flush()", "{ out.flush(); out.flush(); }");
    let factory = factories.for_construct(&once.id);

    let change = factory
        .compute_change(
            &factory.create_signature(&once).unwrap(),
            &factory.create_signature(&twice).unwrap(),
        )
        .unwrap();
    assert_eq!(change.change_type(), ChangeType::Modified);
}

#[test]
fn signatures_are_identical_across_threads() {
    let factories = SignatureFactories::default();
    let construct = java_method(
        "a.B.loop(int)",
        "{ for (int i = 0; i < n; i++) { /* body */ sum += i; } return sum; }",
    );
    let reference = factories
        .for_construct(&construct.id)
        .create_signature(&construct)
        .unwrap();

    let factories = &factories;
    let construct = &construct;
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(move || {
                    factories
                        .for_construct(&construct.id)
                        .create_signature(&construct)
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), reference);
        }
    });
}

#[test]
fn version_comparison_and_patch_assessment() {
    let factories = SignatureFactories::default();
    let factory = factories.for_language(ProgrammingLanguage::Java);

    let vulnerable = vec![
        java_method("a.Parser.parse(String)", "{ return eval(s); }"),
        java_method("a.Parser.helper()", "{ return 0; }"),
    ];
    let fixed = vec![
        java_method("a.Parser.parse(String)", "{ return safeEval(sanitize(s)); }"),
        java_method("a.Parser.helper()", "{ return 0; }"),
        java_method("a.Parser.sanitize(String)", "{ return s.strip(); }"),
    ];

    let report = compare_versions(factory, &vulnerable, &fixed);
    assert_eq!(report.count(ChangeType::Modified), 1);
    assert_eq!(report.count(ChangeType::Added), 1);
    assert_eq!(report.count(ChangeType::Unchanged), 1);

    let used = java_method("a.Parser.parse(String)", "{\n  return eval(s);\n}");
    let assessment = assess_patch(factory, &vulnerable[0], &fixed[0], &used).unwrap();
    assert_eq!(assessment.verdict, PatchVerdict::Vulnerable);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["changes"].as_array().unwrap().len(), 3);
    assert_eq!(json["changes"][0]["change_type"], "UNCHANGED");
    assert_eq!(json["changes"][1]["change_type"], "MODIFIED");
}
