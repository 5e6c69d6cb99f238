//! 剪辑加载端到端测试
//!
//! 通过真实的 SymphoniaDecoder 验证：加载 → 查询 → 拷贝 → 释放 → 剪辑构造。


use audio_test_fixtures::{
    STEREO_8K_FRAMES, STEREO_44K_SAMPLES, ensure_fixtures_generated, fixture_path,
};
use m4a_clip_loader::audio::DEFAULT_CLIP_NAME;
use m4a_clip_loader::{
    AudioError, ClipLoader, LoaderOptions, NativeDecoder, SymphoniaDecoder, load_clip, load_clips,
};
use std::path::PathBuf;

fn log(msg_zh: impl AsRef<str>, msg_en: impl AsRef<str>) {
    println!("{} / {}", msg_zh.as_ref(), msg_en.as_ref());
}

#[test]
fn test_known_samples_round_trip() {
    ensure_fixtures_generated();
    let decoder = SymphoniaDecoder::new();

    let clip = load_clip(&decoder, fixture_path("stereo_44k_4frames.wav")).unwrap();

    assert_eq!(clip.name(), DEFAULT_CLIP_NAME);
    assert_eq!(clip.sample_rate(), 44100);
    assert_eq!(clip.channels(), 2);
    assert_eq!(clip.frame_count(), 4);
    assert_eq!(clip.samples().len(), STEREO_44K_SAMPLES.len());
    for (i, (got, want)) in clip.samples().iter().zip(STEREO_44K_SAMPLES).enumerate() {
        assert!(
            (got - want).abs() < 1e-5,
            "样本{i}不匹配 / sample {i} mismatch: {got} vs {want}"
        );
    }
    assert_eq!(decoder.live_handles(), 0);

    log(
        format!("往返样本一致，{}帧", clip.frame_count()),
        format!("Round trip matched, {} frames", clip.frame_count()),
    );
}

#[test]
fn test_stereo_8k_geometry() {
    ensure_fixtures_generated();
    let decoder = SymphoniaDecoder::new();

    let clip = load_clip(&decoder, fixture_path("valid_stereo_8k.wav")).unwrap();

    assert_eq!(clip.sample_rate(), 8000);
    assert_eq!(clip.channels(), 2);
    assert_eq!(clip.frame_count(), STEREO_8K_FRAMES as u64);
    assert_eq!(clip.samples().len(), STEREO_8K_FRAMES * 2);

    // 右声道是左声道的相反数
    for (l, r) in clip.channel_samples(0).zip(clip.channel_samples(1)) {
        assert!((l + r).abs() < 1e-6);
    }
    assert_eq!(clip.channel_samples(0).count(), STEREO_8K_FRAMES);
    assert_eq!(decoder.live_handles(), 0);
}

#[test]
fn test_zero_length_clip_is_valid() {
    ensure_fixtures_generated();
    let decoder = SymphoniaDecoder::new();

    let clip = load_clip(&decoder, fixture_path("mono_zero_length.wav")).unwrap();

    assert!(clip.is_empty());
    assert_eq!(clip.frame_count(), 0);
    assert_eq!(clip.channels(), 1);
    assert_eq!(clip.sample_rate(), 44100);
    assert_eq!(clip.duration_seconds(), 0.0);
    assert_eq!(decoder.live_handles(), 0);

    log("零长度剪辑加载成功", "Zero-length clip loaded");
}

#[test]
fn test_pcm16_is_normalized() {
    ensure_fixtures_generated();
    let decoder = SymphoniaDecoder::new();

    let clip = load_clip(&decoder, fixture_path("pcm16_mono.wav")).unwrap();

    assert_eq!(clip.sample_rate(), 22050);
    assert_eq!(clip.channels(), 1);
    assert_eq!(clip.frame_count(), 5);
    let expected = [0.0f32, 0.5, -0.5, 32767.0 / 32768.0, -1.0];
    for (got, want) in clip.samples().iter().zip(expected) {
        assert!((got - want).abs() < 1e-5);
    }
    assert!(clip.samples().iter().all(|s| (-1.0..=1.0).contains(s)));
}

#[test]
fn test_frame_count_matches_length_over_channels() {
    ensure_fixtures_generated();
    let decoder = SymphoniaDecoder::new();

    for name in [
        "stereo_44k_4frames.wav",
        "valid_stereo_8k.wav",
        "mono_zero_length.wav",
        "pcm16_mono.wav",
    ] {
        let clip = load_clip(&decoder, fixture_path(name)).unwrap();
        assert_eq!(
            clip.frame_count() * clip.channels() as u64,
            clip.samples().len() as u64,
            "{name}"
        );
        assert!(clip.channels() >= 1);
        assert!(clip.sample_rate() >= 1);
    }
}

#[test]
fn test_custom_clip_name_and_memory_ceiling() {
    ensure_fixtures_generated();
    let loader = ClipLoader::with_options(
        SymphoniaDecoder::new(),
        LoaderOptions {
            clip_name: "intro".to_string(),
            ..Default::default()
        },
    );
    let clip = loader.load(fixture_path("valid_stereo_8k.wav")).unwrap();
    assert_eq!(clip.name(), "intro");

    // 32个f32样本需要128字节
    let tight = ClipLoader::with_options(
        SymphoniaDecoder::new(),
        LoaderOptions {
            max_decoded_bytes: 64,
            ..Default::default()
        },
    );
    let err = tight.load(fixture_path("valid_stereo_8k.wav")).unwrap_err();
    assert!(matches!(err, AudioError::OutOfMemory));
    assert_eq!(tight.decoder().live_handles(), 0);
}

#[test]
fn test_parallel_loading_preserves_order() {
    ensure_fixtures_generated();
    let decoder = SymphoniaDecoder::new();

    let paths: Vec<PathBuf> = [
        "stereo_44k_4frames.wav",
        "fake.m4a",
        "valid_stereo_8k.wav",
        "mono_zero_length.wav",
        "stereo_audio.txt",
        "pcm16_mono.wav",
    ]
    .iter()
    .map(|n| fixture_path(n))
    .collect();

    let results = load_clips(&decoder, &paths);

    assert_eq!(results.len(), paths.len());
    assert_eq!(results[0].as_ref().unwrap().sample_rate(), 44100);
    assert!(results[1].is_err());
    assert_eq!(results[2].as_ref().unwrap().sample_rate(), 8000);
    assert!(results[3].as_ref().unwrap().is_empty());
    assert!(results[4].is_err());
    assert_eq!(results[5].as_ref().unwrap().sample_rate(), 22050);
    assert_eq!(decoder.live_handles(), 0);

    log(
        format!("并行加载{}个文件，顺序保持", paths.len()),
        format!("Loaded {} files in parallel, order kept", paths.len()),
    );
}

#[test]
fn test_repeated_parallel_loads_leak_no_handles() {
    ensure_fixtures_generated();
    let decoder = SymphoniaDecoder::new();
    let paths: Vec<PathBuf> = (0..32)
        .map(|i| {
            if i % 3 == 0 {
                fixture_path("empty.m4a")
            } else {
                fixture_path("stereo_44k_4frames.wav")
            }
        })
        .collect();

    let results = load_clips(&decoder, &paths);

    let ok = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(ok, paths.len() - paths.len().div_ceil(3));
    assert_eq!(decoder.live_handles(), 0);
}

#[test]
fn test_clips_share_no_buffers() {
    ensure_fixtures_generated();
    let decoder = SymphoniaDecoder::new();

    let a = load_clip(&decoder, fixture_path("stereo_44k_4frames.wav")).unwrap();
    let b = load_clip(&decoder, fixture_path("stereo_44k_4frames.wav")).unwrap();

    assert_eq!(a.samples(), b.samples());
    assert_ne!(a.samples().as_ptr(), b.samples().as_ptr());
}

#[test]
fn test_native_contract_directly() {
    ensure_fixtures_generated();
    let decoder = SymphoniaDecoder::new();

    let handle = decoder
        .load(&fixture_path("valid_stereo_8k.wav"))
        .unwrap();
    assert_eq!(decoder.live_handles(), 1);
    assert_eq!(decoder.length(handle).unwrap(), STEREO_8K_FRAMES * 2);

    let mut buffer = vec![0.0f32; STEREO_8K_FRAMES * 2];
    decoder.copy_data(handle, &mut buffer).unwrap();
    assert_eq!(buffer[0], 0.0);
    assert!((buffer[2] - 1.0 / STEREO_8K_FRAMES as f32).abs() < 1e-6);

    decoder.release(handle).unwrap();
    assert_eq!(decoder.live_handles(), 0);
}
