//! Public-API segmentation properties, driven by the scripted acoustic
//! model so no ONNX model binary is required.

use vocalis::{ScriptedModel, VadConfig, VadDetector, VadSegment, VadStream};

const WINDOW: usize = 512;

fn detector(probs: Vec<f32>, config: VadConfig) -> VadDetector {
    VadDetector::with_model(config, Box::new(ScriptedModel::new(probs))).unwrap()
}

/// Expand a run-length pattern of (probability, windows) into a script.
fn script(pattern: &[(f32, usize)]) -> Vec<f32> {
    pattern
        .iter()
        .flat_map(|&(p, n)| std::iter::repeat(p).take(n))
        .collect()
}

fn buffer_for(probs: &[f32]) -> Vec<f32> {
    vec![0.1f32; probs.len() * WINDOW]
}

fn assert_well_formed(segments: &[VadSegment], config: &VadConfig) {
    let min_speech_s = config.min_speech_ms as f32 / 1000.0;
    for (i, seg) in segments.iter().enumerate() {
        assert!(seg.start_time_s < seg.end_time_s, "degenerate segment {seg:?}");
        assert!(seg.is_speech);
        assert!((0.0..=1.0).contains(&seg.confidence));
        // Every segment except the final flush meets the minimum duration.
        if i + 1 < segments.len() {
            assert!(
                seg.duration_s() >= min_speech_s,
                "segment {i} too short: {seg:?}"
            );
        }
    }
    for pair in segments.windows(2) {
        assert!(pair[0].start_time_s < pair[1].start_time_s, "unordered");
        assert!(pair[0].end_time_s <= pair[1].start_time_s, "overlapping");
    }
}

#[test]
fn segments_well_formed_across_patterns_and_configs() {
    let patterns: Vec<Vec<(f32, usize)>> = vec![
        vec![(0.0, 50)],
        vec![(0.9, 50)],
        vec![(0.9, 20), (0.0, 10), (0.9, 20), (0.0, 10)],
        vec![(0.0, 5), (0.9, 3), (0.0, 5), (0.9, 40), (0.0, 8)],
        vec![(0.6, 15), (0.4, 10), (0.7, 15), (0.1, 12)],
        vec![(0.9, 2), (0.0, 6), (0.9, 2), (0.0, 6), (0.9, 2)],
        vec![(0.9, 1200), (0.0, 40)],
    ];
    let configs = vec![
        VadConfig::default(),
        VadConfig {
            threshold: 0.3,
            ..Default::default()
        },
        VadConfig {
            min_speech_ms: 100,
            min_silence_ms: 200,
            ..Default::default()
        },
        VadConfig {
            max_speech_s: 10.0,
            ..Default::default()
        },
    ];

    for pattern in &patterns {
        for config in &configs {
            let probs = script(pattern);
            let buffer = buffer_for(&probs);
            let mut det = detector(probs, config.clone());
            let segments = det.process_audio(&buffer).unwrap();
            assert_well_formed(&segments, config);
        }
    }
}

#[test]
fn silence_only_is_empty_in_both_modes() {
    let probs = vec![0.0f32; 60];
    let buffer = buffer_for(&probs);

    let mut det = detector(probs.clone(), VadConfig::default());
    assert!(det.process_audio(&buffer).unwrap().is_empty());

    let mut det = detector(probs, VadConfig::default());
    let dir = tempfile::tempdir().unwrap();
    let mut stream = VadStream::new(&mut det, dir.path()).unwrap();
    stream.process_chunk(&buffer).unwrap();
    assert_eq!(stream.finalize().unwrap(), 0);
    assert!(!dir.path().join("segment_1.wav").exists());
}

#[test]
fn repeated_batch_passes_are_identical() {
    let probs = script(&[(0.9, 25), (0.0, 10), (0.8, 30), (0.2, 15)]);
    let buffer = buffer_for(&probs);
    let mut det = detector(probs, VadConfig::default());

    let first = det.process_audio(&buffer).unwrap();
    let second = det.process_audio(&buffer).unwrap();
    let third = det.process_audio(&buffer).unwrap();
    assert_eq!(first, second);
    assert_eq!(second, third);
}

/// Feed `buffer` through a stream in ragged chunk sizes; return the count.
fn stream_count(probs: Vec<f32>, buffer: &[f32], chunk_sizes: &[usize]) -> u32 {
    let mut det = detector(probs, VadConfig::default());
    let dir = tempfile::tempdir().unwrap();
    let mut stream = VadStream::new(&mut det, dir.path()).unwrap();

    let mut offset = 0;
    let mut i = 0;
    while offset < buffer.len() {
        let size = chunk_sizes[i % chunk_sizes.len()];
        let end = (offset + size).min(buffer.len());
        stream.process_chunk(&buffer[offset..end]).unwrap();
        offset = end;
        i += 1;
    }
    stream.finalize().unwrap()
}

#[test]
fn streaming_matches_batch_within_one_segment() {
    let patterns: Vec<Vec<(f32, usize)>> = vec![
        vec![(0.0, 4), (0.9, 20), (0.0, 10), (0.9, 20), (0.0, 10)],
        vec![(0.9, 30), (0.0, 8), (0.9, 30), (0.0, 8), (0.9, 30), (0.0, 8)],
        // Ends mid-speech: the batch final flush emits, the stream flush
        // filters short tails, hence the ±1 allowance.
        vec![(0.0, 6), (0.9, 25), (0.0, 10), (0.9, 6)],
        vec![(0.0, 40), (0.9, 18), (0.0, 40)],
    ];
    let chunkings: Vec<Vec<usize>> = vec![
        vec![100, 200, 300, 400, 500],
        vec![512],
        vec![1], // pathological single-sample feeding
        vec![7000],
    ];

    for pattern in &patterns {
        let probs = script(pattern);
        let buffer = buffer_for(&probs);

        let mut det = detector(probs.clone(), VadConfig::default());
        let batch = det.process_audio(&buffer).unwrap().len() as i64;

        for chunking in &chunkings {
            let streamed = stream_count(probs.clone(), &buffer, chunking) as i64;
            assert!(
                (batch - streamed).abs() <= 1,
                "pattern {pattern:?} chunking {chunking:?}: batch {batch} vs stream {streamed}"
            );
        }
    }
}

#[test]
fn stream_writes_one_wav_per_segment() {
    let probs = script(&[(0.0, 4), (0.9, 20), (0.0, 10), (0.9, 20), (0.0, 10)]);
    let buffer = buffer_for(&probs);
    let mut det = detector(probs, VadConfig::default());
    let dir = tempfile::tempdir().unwrap();

    let mut stream = VadStream::new(&mut det, dir.path()).unwrap();
    stream.process_chunk(&buffer).unwrap();
    let total = stream.finalize().unwrap();

    assert_eq!(total, 2);
    for n in 1..=total {
        let path = dir.path().join(format!("segment_{n}.wav"));
        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, 16_000);
        assert!(reader.len() > 0);
    }
}

#[test]
fn export_and_stream_disagree_only_on_padding_and_gain() {
    // Same audio through the batch exporter and the stream: equal file
    // counts; stream files are longer by up to two pads and peak at 0.9.
    let probs = script(&[(0.0, 4), (0.9, 20), (0.0, 10)]);
    let buffer = buffer_for(&probs);

    let mut det = detector(probs.clone(), VadConfig::default());
    let batch_dir = tempfile::tempdir().unwrap();
    let exported = vocalis::export_segments(&mut det, &buffer, batch_dir.path()).unwrap();

    let mut det = detector(probs, VadConfig::default());
    let stream_dir = tempfile::tempdir().unwrap();
    let mut stream = VadStream::new(&mut det, stream_dir.path()).unwrap();
    stream.process_chunk(&buffer).unwrap();
    let streamed = stream.finalize().unwrap() as usize;

    assert_eq!(exported, 1);
    assert_eq!(streamed, 1);

    let batch_wav = hound::WavReader::open(batch_dir.path().join("segment_1.wav")).unwrap();
    let stream_wav = hound::WavReader::open(stream_dir.path().join("segment_1.wav")).unwrap();
    let pad = 480u32;
    assert!(stream_wav.len() <= batch_wav.len() + 2 * pad + 2 * 512);
    assert!(stream_wav.len() > batch_wav.len() / 2);
}
