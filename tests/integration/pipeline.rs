//! Library-level tests for the normalization pipeline.

use lognorm::{AlgorithmId, EngineError, EngineRegistry, Level, MinedLine, Pipeline, Workspace, extract};

fn per_line(lines: &[String], _: &Workspace) -> Result<Vec<MinedLine>, EngineError> {
    Ok(lines.iter().map(|l| MinedLine::new(l.clone(), "<*>")).collect())
}

fn failing(_: &[String], _: &Workspace) -> Result<Vec<MinedLine>, EngineError> {
    Err(EngineError::Malformed("row 1: missing EventTemplate".into()))
}

const DISTINCT: &[&str] = &[
    "2024-06-01 12:00:00 INFO start",
    "2024-06-01 12:00:01 WARN slow query",
    "2024-06-01 12:00:02 ERROR upstream timeout",
];

#[test]
fn stack_frame_joins_its_record() {
    let records = Pipeline::default().normalize(&[
        "2024-06-01 12:00:00 INFO start",
        "2024-06-01 12:00:01 ERROR boom",
        "    at foo.bar(x.js:1)",
    ]);
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].level, Some(Level::Error));
    assert_eq!(records[1].message.lines().count(), 2);
    assert!(records[1].message.ends_with("at foo.bar(x.js:1)"));
}

#[test]
fn json_line_is_one_record() {
    let records =
        Pipeline::default().normalize(&[r#"{"timestamp":"2024-01-01T00:00:00Z","level":"INFO","message":"hi"}"#]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].timestamp.as_deref(), Some("2024-01-01T00:00:00Z"));
    assert_eq!(records[0].level, Some(Level::Info));
    assert_eq!(records[0].message, "hi");
    assert_eq!(records[0].meta_str("parsing_method"), Some("json"));
}

#[test]
fn empty_input_is_empty_output() {
    let pipeline = Pipeline::default();
    assert!(pipeline.normalize::<&str>(&[]).is_empty());
    assert!(pipeline.parse::<&str>(&[]).is_empty());
}

#[test]
fn unstructured_lines_fall_back_one_record_each() {
    let lines: Vec<String> = (0..100)
        .map(|i| format!("worker {i} picked up the next batch"))
        .collect();
    let records = Pipeline::default().parse(&lines);
    assert_eq!(records.len(), 100);
    for (record, line) in records.iter().zip(&lines) {
        assert_eq!(record.timestamp, None);
        assert_eq!(record.level, None);
        assert_eq!(&record.raw_data, line);
        assert_eq!(record.meta_str("parsing_method"), Some("regex_fallback"));
    }
}

#[test]
fn injected_timestamp_and_level_are_recovered() {
    let cases = [
        ("TRACE", Level::Trace),
        ("debug", Level::Debug),
        ("INFO", Level::Info),
        ("WARNING", Level::Warn),
        ("Error", Level::Error),
        ("CRITICAL", Level::Fatal),
        ("FATAL", Level::Fatal),
    ];
    for (keyword, expected) in cases {
        for line in [
            format!("2024-06-01T12:00:00Z {keyword} payload accepted"),
            format!("[2024-06-01 12:00:00] [{keyword}] payload accepted"),
            format!("payload accepted at 2024-06-01 12:00:00 level={keyword}"),
        ] {
            let entry = extract(&line);
            assert_eq!(entry.timestamp.as_deref(), Some("2024-06-01T12:00:00Z"), "line: {line}");
            assert_eq!(entry.level, Some(expected), "line: {line}");
        }
    }
}

#[test]
fn second_extraction_pass_changes_nothing() {
    let first = extract("2024-06-01 12:00:00 ERROR [worker-3] disk full user=root path=/var");
    let second = extract(&first.message);
    assert_eq!(second.message, first.message);
    assert_eq!(second.timestamp, None);
    assert_eq!(second.level, None);
    assert!(second.metadata.is_empty());
}

#[test]
fn n_records_with_k_frames_stitch_to_n() {
    const N: usize = 5;
    const K: usize = 3;
    let mut lines = Vec::new();
    for i in 0..N {
        lines.push(format!("2024-06-01 12:00:0{i} ERROR request {i} crashed"));
        for f in 0..K {
            lines.push(format!("    at handler.step{f}(app.js:{})", f + 1));
        }
    }
    let records = Pipeline::default().parse(&lines);
    assert_eq!(records.len(), N);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.message.lines().count(), K + 1);
        assert_eq!(record.timestamp.as_deref(), Some(format!("2024-06-01T12:00:0{i}Z").as_str()));
    }
}

#[test]
fn trace_id_carries_forward() {
    let records = Pipeline::default().parse(&[
        "2024-06-01 12:00:00 INFO begin trace_id=abc",
        "2024-06-01 12:00:01 INFO step one",
        "2024-06-01 12:00:02 INFO step two",
        "2024-06-01 12:00:03 INFO step three",
        "2024-06-01 12:00:04 INFO step four",
    ]);
    assert_eq!(records.len(), 5);
    for record in &records {
        assert_eq!(record.meta_str("trace_id"), Some("abc"));
    }
}

#[test]
fn fully_stamped_batch_keeps_its_length() {
    let lines = [
        "2024-06-01 12:00:00 INFO a",
        "2024-06-01 12:00:01 WARN    looks indented...",
        "2024-06-01 12:00:02 ERROR Caused by: nothing",
        "2024-06-01 12:00:03 DEBUG d",
    ];
    assert_eq!(Pipeline::default().parse(&lines).len(), lines.len());
}

#[test]
fn selected_engine_tags_records() {
    let registry = EngineRegistry::empty().with_engine(AlgorithmId::LogMine, per_line);
    let records = Pipeline::new(registry).parse(DISTINCT);
    assert_eq!(records.len(), 3);
    for record in &records {
        assert_eq!(record.meta_str("parsing_method"), Some("logmine"));
        assert_eq!(record.meta_str("ml_template"), Some("<*>"));
        assert_eq!(record.meta_str("ml_confidence"), Some("0.8"));
    }
    assert_eq!(records[2].level, Some(Level::Error));
    assert_eq!(records[2].message, "upstream timeout");
}

#[test]
fn unavailable_engine_moves_to_backup() {
    let registry = EngineRegistry::empty().with_engine(AlgorithmId::Drain, per_line);
    let records = Pipeline::new(registry).parse(DISTINCT);
    assert!(records.iter().all(|r| r.meta_str("parsing_method") == Some("drain")));
}

#[test]
fn failing_engine_moves_to_next_backup() {
    let registry = EngineRegistry::empty()
        .with_engine(AlgorithmId::LogMine, failing)
        .with_engine(AlgorithmId::Spell, per_line);
    let records = Pipeline::new(registry).parse(DISTINCT);
    assert!(records.iter().all(|r| r.meta_str("parsing_method") == Some("spell")));
}

#[test]
fn panicking_engine_moves_to_next_backup() {
    let crashing = |_: &[String], _: &Workspace| -> Result<Vec<MinedLine>, EngineError> { panic!("segfault in miner") };
    let registry = EngineRegistry::empty()
        .with_engine(AlgorithmId::LogMine, crashing)
        .with_engine(AlgorithmId::Drain, per_line);
    let records = Pipeline::new(registry).parse(DISTINCT);
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.meta_str("parsing_method") == Some("drain")));
}

#[test]
fn collapsing_engines_fall_back_to_regex() {
    let collapse = |_: &[String], _: &Workspace| -> Result<Vec<MinedLine>, EngineError> {
        Ok(vec![MinedLine::new("everything", "<*>")])
    };
    let registry = [
        AlgorithmId::Drain,
        AlgorithmId::Spell,
        AlgorithmId::Iplom,
        AlgorithmId::LogCluster,
        AlgorithmId::LogMine,
    ]
    .into_iter()
    .fold(EngineRegistry::empty(), |registry, id| registry.with_engine(id, collapse));

    let records = Pipeline::new(registry).parse(DISTINCT);
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.meta_str("parsing_method") == Some("regex_fallback")));
    assert!(records.iter().all(|r| r.meta_str("ml_template").is_none()));
}

#[test]
fn mined_traceback_stitches_like_the_fallback() {
    let own_template = |lines: &[String], _: &Workspace| -> Result<Vec<MinedLine>, EngineError> {
        Ok(lines.iter().map(|l| MinedLine::new(l.clone(), l.clone())).collect())
    };
    let registry = [
        AlgorithmId::Drain,
        AlgorithmId::Spell,
        AlgorithmId::Iplom,
        AlgorithmId::LogCluster,
        AlgorithmId::LogMine,
    ]
    .into_iter()
    .fold(EngineRegistry::empty(), |registry, id| registry.with_engine(id, own_template));
    let lines = [
        "2024-06-01 12:00:00 ERROR job crashed",
        r#"  File "worker.py", line 12, in run"#,
        "    return handler(payload)",
        "2024-06-01 12:00:01 INFO retrying job",
    ];

    let fallback = Pipeline::default().parse(&lines);
    let mined = Pipeline::new(registry).parse(&lines);
    assert_eq!(fallback.len(), 2);
    assert_eq!(mined.len(), fallback.len());
    assert!(mined.iter().all(|r| r.meta_str("parsing_method") != Some("regex_fallback")));
    assert_eq!(mined[0].raw_data, lines[..3].join("\n"));
    assert_eq!(mined[0].level, Some(Level::Error));
    assert_eq!(mined[1].raw_data, lines[3]);
}

#[test]
fn shared_templates_merge_untimed_lines() {
    let by_prefix = |lines: &[String], _: &Workspace| -> Result<Vec<MinedLine>, EngineError> {
        Ok(lines
            .iter()
            .map(|l| {
                let template = if l.starts_with("part") { "part <*>" } else { l.as_str() };
                MinedLine::new(l.clone(), template)
            })
            .collect())
    };
    let registry = EngineRegistry::empty().with_engine(AlgorithmId::LogMine, by_prefix);
    let records = Pipeline::new(registry).parse(&["2024-06-01 12:00:00 INFO job report", "part one", "part two"]);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].message, "job report");
    assert_eq!(records[1].message, "part one\npart two");
    assert_eq!(records[1].level, Some(Level::Info));
}

#[test]
fn one_pipeline_serves_concurrent_batches() {
    let pipeline = Pipeline::new(EngineRegistry::empty().with_engine(AlgorithmId::LogMine, per_line));
    let pipeline = &pipeline;
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(move || pipeline.parse(DISTINCT)))
            .collect();
        for handle in handles {
            let records = handle.join().unwrap();
            assert_eq!(records.len(), 3);
            assert_eq!(records[0].meta_str("parsing_method"), Some("logmine"));
        }
    });
}
