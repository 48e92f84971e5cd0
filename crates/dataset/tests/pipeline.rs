use mlmprep_dataset::{process, process_with_config, Config, DatasetError, Split, Store};
use mlmprep_tokenizer::{Tokenizer, TokenizerConfig};
use std::io::Write;
use std::path::{Path, PathBuf};

const TRAIN_LINES: [&str; 4] = [
    "Porto posat l'esquinç al peu sense sutura marejant metges i perdius i això no es cura.",
    "La sang s’ha cuit fins a tornar-se dura i passa el temps i passa i això no es cura.",
    "Camí de massa ampla tessitura estintolada, encara sobre la corda insegura.",
    "Hola",
];
const VALID_LINE: &str = "La corda insegura s'ha cuit malament";

struct Fixture {
    dir: tempfile::TempDir,
    train: PathBuf,
    valid: PathBuf,
    tokenizer: Tokenizer,
}

fn write_lines(path: &Path, lines: &[&str]) {
    let mut file = std::fs::File::create(path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let train = dir.path().join("train.txt");
    let valid = dir.path().join("valid.txt");
    write_lines(&train, &TRAIN_LINES);
    write_lines(&valid, &[VALID_LINE]);

    let config = TokenizerConfig {
        vocab_size: 10,
        min_frequency: 2,
        lowercase: false,
        ..Default::default()
    };
    let tokenizer = Tokenizer::train(&train, config).unwrap();

    Fixture {
        dir,
        train,
        valid,
        tokenizer,
    }
}

#[test]
fn test_small_corpus_end_to_end() {
    let fx = fixture();
    let out = fx.dir.path().join("data");
    assert_eq!(fx.tokenizer.len(), 39);

    let summary = process(&fx.train, &fx.valid, &fx.tokenizer, &out, 12, 10, 2).unwrap();
    assert_eq!(summary.train.examples, 4);
    assert_eq!(summary.valid.examples, 1);
    assert_eq!(summary.train.path, out.join("train_12_10.store"));

    let train = Store::open(&out, Split::Train, 12, 10).unwrap();
    let valid = Store::open(&out, Split::Valid, 12, 10).unwrap();
    assert_eq!(train.len(), 4);
    assert_eq!(valid.len(), 1);

    let hola = train.get(3).unwrap();
    assert_eq!(hola.shape(), (4, 12));
    let tokens: Vec<&str> = hola
        .ids()
        .iter()
        .map(|&id| fx.tokenizer.id_to_token(id).unwrap())
        .collect();
    assert_eq!(
        tokens,
        vec![
            "[CLS]", "▁", "H", "o", "l", "a", "[SEP]", "<pad>", "<pad>", "<pad>", "<pad>", "<pad>"
        ]
    );
    assert_eq!(hola.special_tokens_mask(), &[1, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1]);
    assert_eq!(hola.attention_mask(), &[1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0]);
    assert_eq!(hola.type_ids(), &[0; 12]);
    assert_eq!(fx.tokenizer.decode(hola.ids(), true).unwrap(), "Hola");

    let truncated = valid.get(0).unwrap();
    assert_eq!(truncated.ids()[0], 4);
    assert_eq!(truncated.ids()[11], 3);
    assert_eq!(truncated.attention_mask(), &[1; 12]);

    assert!(matches!(
        train.get(4),
        Err(DatasetError::Index { index: 4, len: 4 })
    ));
}

#[test]
fn test_entries_follow_line_order() {
    let fx = fixture();
    let out = fx.dir.path().join("data");
    process(&fx.train, &fx.valid, &fx.tokenizer, &out, 64, 10, 3).unwrap();

    let store = Store::open(&out, Split::Train, 64, 10).unwrap();
    for (example, line) in store.iter().zip(TRAIN_LINES) {
        let expected = fx.tokenizer.process(line, None, Some(64)).unwrap();
        assert_eq!(example.ids(), expected.ids.as_slice());
    }
    assert_eq!(store.iter().count(), 4);
}

#[test]
fn test_reprocessing_is_byte_identical() {
    let fx = fixture();
    let first = fx.dir.path().join("first");
    let second = fx.dir.path().join("second");

    process(&fx.train, &fx.valid, &fx.tokenizer, &first, 12, 10, 1).unwrap();
    process(&fx.train, &fx.valid, &fx.tokenizer, &second, 12, 10, 100).unwrap();

    for name in ["train_12_10.store", "valid_12_10.store"] {
        let a = std::fs::read(first.join(name)).unwrap();
        let b = std::fs::read(second.join(name)).unwrap();
        assert_eq!(a, b, "{name} differs between runs");
    }

    // rerunning into the same directory replaces the stores
    process(&fx.train, &fx.valid, &fx.tokenizer, &first, 12, 10, 1).unwrap();
    assert_eq!(
        std::fs::read(first.join("train_12_10.store")).unwrap(),
        std::fs::read(second.join("train_12_10.store")).unwrap()
    );
}

#[test]
fn test_failed_valid_split_leaves_no_train_store() {
    let fx = fixture();
    let out = fx.dir.path().join("data");
    let missing = fx.dir.path().join("missing.txt");

    let err = process(&fx.train, &missing, &fx.tokenizer, &out, 12, 10, 2).err();
    assert!(matches!(err, Some(DatasetError::NotFound { .. })));

    let leftovers: Vec<_> = std::fs::read_dir(&out)
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
    assert!(matches!(
        Store::open(&out, Split::Train, 12, 10),
        Err(DatasetError::NotFound { .. })
    ));
}

#[test]
fn test_failed_run_removes_stale_stores_for_key() {
    let fx = fixture();
    let out = fx.dir.path().join("data");
    process(&fx.train, &fx.valid, &fx.tokenizer, &out, 12, 10, 2).unwrap();
    process(&fx.train, &fx.valid, &fx.tokenizer, &out, 16, 10, 2).unwrap();

    let missing = fx.dir.path().join("missing.txt");
    assert!(process(&missing, &fx.valid, &fx.tokenizer, &out, 12, 10, 2).is_err());

    assert!(!out.join("train_12_10.store").exists());
    assert!(!out.join("valid_12_10.store").exists());
    // other keys are untouched
    assert_eq!(Store::open(&out, Split::Valid, 16, 10).unwrap().len(), 1);
}

#[test]
fn test_store_key_must_match() {
    let fx = fixture();
    let out = fx.dir.path().join("data");
    process(&fx.train, &fx.valid, &fx.tokenizer, &out, 12, 10, 2).unwrap();

    assert!(matches!(
        Store::open(&out, Split::Train, 12, 30000),
        Err(DatasetError::NotFound { .. })
    ));
}

#[test]
fn test_subset_of_single_example_store() {
    let fx = fixture();
    let out = fx.dir.path().join("data");
    process(&fx.train, &fx.valid, &fx.tokenizer, &out, 12, 10, 2).unwrap();

    let valid = Store::open(&out, Split::Valid, 12, 10)
        .unwrap()
        .with_subset(0.01)
        .unwrap();
    assert_eq!(valid.len(), 1);

    let train = Store::open(&out, Split::Train, 12, 10)
        .unwrap()
        .with_subset(0.5)
        .unwrap();
    assert_eq!(train.len(), 2);
    assert_eq!(train.iter().count(), 2);
}

#[test]
fn test_process_with_config() {
    let fx = fixture();
    let out = fx.dir.path().join("data");
    let config: Config = serde_json::from_str(
        r#"{"vocab": {"max_size": 10}, "training": {"max_seq_length": 12},
            "data": {"processing_minibatch_size": 3}}"#,
    )
    .unwrap();

    let summary = process_with_config(&fx.train, &fx.valid, &fx.tokenizer, &out, &config).unwrap();
    assert_eq!(summary.max_seq_length, 12);
    assert_eq!(summary.max_vocab_size, 10);
    assert_eq!(summary.train.examples, 4);

    let mut bad = config.clone();
    bad.training.max_seq_length = 1;
    assert!(matches!(
        process_with_config(&fx.train, &fx.valid, &fx.tokenizer, &out, &bad),
        Err(DatasetError::InvalidConfig(_))
    ));
}
